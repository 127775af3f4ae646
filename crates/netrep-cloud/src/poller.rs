//! Polling for resource state
//!
//! The control plane is eventually consistent: right after a create, a GET can
//! still answer not-found, and right after a delete it can still answer with the
//! cached resource. The [`Poller`] absorbs this by re-observing the resource at a
//! fixed interval until the wait condition holds or the attempt budget runs out.
//!
//! Every attempt sleeps for the full interval first, including the very first
//! one, so a poll never returns before one interval has passed and at least one
//! observation was made.

use crate::error::{CloudError, Result};
use crate::model::{MirrorState, ReplicationStatus, ResourceState};
use crate::provider::ResourceClient;
use crate::resource::{ResourceId, ResourceTarget, VolumeRef};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Which aspect of a resource to observe
///
/// `Replication` only applies to volumes; other levels always observe existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Probe {
    #[default]
    Existence,
    Replication,
}

/// Result of a single observation
#[derive(Debug)]
pub enum PollOutcome {
    Present(ResourceState),
    Absent,
    ObservationFailed(CloudError),
}

impl From<Result<ResourceState>> for PollOutcome {
    fn from(result: Result<ResourceState>) -> Self {
        match result {
            Ok(state) => PollOutcome::Present(state),
            Err(e) if e.is_not_found() => PollOutcome::Absent,
            Err(e) => PollOutcome::ObservationFailed(e),
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Present(state) => write!(f, "present: {}", state),
            PollOutcome::Absent => write!(f, "not found"),
            PollOutcome::ObservationFailed(e) => write!(f, "observation failed: {}", e),
        }
    }
}

pub type StatePredicate = Arc<dyn Fn(&ResourceState) -> bool + Send + Sync>;

/// Condition that ends a wait
#[derive(Clone)]
pub enum WaitMode {
    /// A successful observation ends the wait
    AwaitPresence,
    /// A failed observation ends the wait
    AwaitAbsence,
    /// A successful observation whose state satisfies the predicate ends the wait
    AwaitPredicate(StatePredicate),
}

impl WaitMode {
    pub fn is_satisfied_by(&self, outcome: &PollOutcome) -> bool {
        match (self, outcome) {
            (WaitMode::AwaitPresence, PollOutcome::Present(_)) => true,
            // Any failure counts, not only not-found. Throttling and the like
            // end an absence wait too.
            (WaitMode::AwaitAbsence, PollOutcome::Absent | PollOutcome::ObservationFailed(_)) => {
                true
            }
            (WaitMode::AwaitPredicate(predicate), PollOutcome::Present(state)) => predicate(state),
            _ => false,
        }
    }
}

impl fmt::Debug for WaitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitMode::AwaitPresence => write!(f, "AwaitPresence"),
            WaitMode::AwaitAbsence => write!(f, "AwaitAbsence"),
            WaitMode::AwaitPredicate(_) => write!(f, "AwaitPredicate(..)"),
        }
    }
}

/// Interval, attempt budget and exit condition of a wait
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    /// Delay before every attempt
    pub interval: Duration,
    /// Maximum number of observations (0 is treated as 1)
    pub max_attempts: u32,
    pub mode: WaitMode,
}

impl WaitPolicy {
    pub fn presence(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            mode: WaitMode::AwaitPresence,
        }
    }

    pub fn absence(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            mode: WaitMode::AwaitAbsence,
        }
    }

    pub fn predicate<F>(interval: Duration, max_attempts: u32, predicate: F) -> Self
    where
        F: Fn(&ResourceState) -> bool + Send + Sync + 'static,
    {
        Self {
            interval,
            max_attempts,
            mode: WaitMode::AwaitPredicate(Arc::new(predicate)),
        }
    }

    /// Effective number of attempts
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Worst-case wall-clock time spent sleeping
    pub fn worst_case(&self) -> Duration {
        self.interval * self.attempts()
    }
}

/// Interval and attempt budget shared by several waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitBudget {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl WaitBudget {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn presence(&self) -> WaitPolicy {
        WaitPolicy::presence(self.interval, self.max_attempts)
    }

    pub fn absence(&self) -> WaitPolicy {
        WaitPolicy::absence(self.interval, self.max_attempts)
    }
}

/// Observation call resolved once per poll
#[derive(Debug, Clone)]
enum Observation {
    Resource(ResourceTarget),
    Replication(VolumeRef),
}

impl Observation {
    fn resolve(id: &ResourceId, probe: Probe) -> Self {
        match (id.target(), probe) {
            (ResourceTarget::Volume(volume), Probe::Replication) => {
                Observation::Replication(volume)
            }
            (target, _) => Observation::Resource(target),
        }
    }
}

enum Resolution<T> {
    Satisfied {
        value: T,
        attempts: u32,
    },
    Exhausted {
        attempts: u32,
        last_outcome: Option<PollOutcome>,
        last_state: Option<ResourceState>,
    },
}

/// Re-observes remote resources until a wait condition holds
pub struct Poller<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    cancel: CancellationToken,
}

impl<'a, C: ResourceClient + ?Sized> Poller<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self::with_cancellation(client, CancellationToken::new())
    }

    /// Poller whose sleeps and observations abort once `cancel` fires
    pub fn with_cancellation(client: &'a C, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Wait until `policy` is satisfied for the resource
    ///
    /// # Returns
    /// * `Ok(())` - the wait condition held within the attempt budget
    /// * `Err(CloudError::Timeout)` - attempts exhausted
    /// * `Err(CloudError::Cancelled)` - the cancellation token fired
    pub async fn poll(&self, id: &ResourceId, probe: Probe, policy: &WaitPolicy) -> Result<()> {
        let accept = |outcome: &PollOutcome| policy.mode.is_satisfied_by(outcome).then_some(());
        match self.run(id, probe, policy, accept).await? {
            Resolution::Satisfied { attempts, .. } => {
                tracing::info!(
                    resource = %id,
                    attempts,
                    mode = ?policy.mode,
                    "Wait condition reached"
                );
                Ok(())
            }
            Resolution::Exhausted {
                attempts,
                last_outcome,
                ..
            } => {
                tracing::warn!(resource = %id, attempts, mode = ?policy.mode, "Wait timed out");
                Err(CloudError::Timeout {
                    resource: id.to_string(),
                    attempts,
                    last: last_outcome.map(|o| o.to_string()),
                })
            }
        }
    }

    /// Wait until the volume's replication reaches `target` mirror state
    pub async fn wait_for_mirror_state(
        &self,
        volume: &ResourceId,
        target: MirrorState,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<ReplicationStatus> {
        volume.volume_ref()?;

        let policy = WaitPolicy::predicate(interval, max_attempts, move |state| {
            matches!(state, ResourceState::Replication(status) if status.mirror_state == Some(target))
        });

        let accept = |outcome: &PollOutcome| match outcome {
            PollOutcome::Present(ResourceState::Replication(status))
                if policy.mode.is_satisfied_by(outcome) =>
            {
                Some(status.clone())
            }
            _ => None,
        };

        match self.run(volume, Probe::Replication, &policy, accept).await? {
            Resolution::Satisfied {
                value: status,
                attempts,
            } => {
                tracing::info!(volume = %volume, %target, attempts, "Mirror state reached");
                Ok(status)
            }
            Resolution::Exhausted {
                attempts,
                last_state,
                ..
            } => {
                let last_observed = match last_state {
                    Some(ResourceState::Replication(status)) => status.mirror_state,
                    _ => None,
                };
                tracing::warn!(volume = %volume, %target, attempts, ?last_observed, "Mirror state wait timed out");
                Err(CloudError::MirrorStateTimeout {
                    volume: volume.to_string(),
                    target,
                    attempts,
                    last_observed,
                })
            }
        }
    }

    /// Observe until `accept` yields a value or the budget runs out
    async fn run<T>(
        &self,
        id: &ResourceId,
        probe: Probe,
        policy: &WaitPolicy,
        accept: impl Fn(&PollOutcome) -> Option<T>,
    ) -> Result<Resolution<T>> {
        let observation = Observation::resolve(id, probe);
        let attempts = policy.attempts();
        let mut last_outcome = None;
        let mut last_state = None;

        for attempt in 1..=attempts {
            if self.cancel.is_cancelled() {
                return Err(CloudError::Cancelled);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(CloudError::Cancelled),
                _ = sleep(policy.interval) => {}
            }

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => return Err(CloudError::Cancelled),
                outcome = self.observe(&observation) => outcome,
            };

            tracing::debug!(resource = %id, attempt, max_attempts = attempts, "Observed {}", outcome);

            if let Some(value) = accept(&outcome) {
                return Ok(Resolution::Satisfied {
                    value,
                    attempts: attempt,
                });
            }

            if let PollOutcome::Present(state) = &outcome {
                last_state = Some(state.clone());
            }
            last_outcome = Some(outcome);
        }

        Ok(Resolution::Exhausted {
            attempts,
            last_outcome,
            last_state,
        })
    }

    async fn observe(&self, observation: &Observation) -> PollOutcome {
        let result = match observation {
            Observation::Resource(ResourceTarget::Account(account)) => self
                .client
                .get_account(account)
                .await
                .map(ResourceState::Resource),
            Observation::Resource(ResourceTarget::Pool(pool)) => {
                self.client.get_pool(pool).await.map(ResourceState::Resource)
            }
            Observation::Resource(ResourceTarget::Volume(volume)) => self
                .client
                .get_volume(volume)
                .await
                .map(ResourceState::Resource),
            Observation::Resource(ResourceTarget::Snapshot(snapshot)) => self
                .client
                .get_snapshot(snapshot)
                .await
                .map(ResourceState::Resource),
            Observation::Replication(volume) => self
                .client
                .get_replication_status(volume)
                .await
                .map(ResourceState::Replication),
        };
        PollOutcome::from(result)
    }
}
