use crate::utils::{self, LoadedSettings};
use colored::Colorize;
use netrep_cloud::{Poller, Probe, ResourceClient, ResourceTarget, SnapshotSpec};

/// Snapshot the primary volume and wait until it is visible
pub async fn create(loaded: &LoadedSettings, name: &str) -> anyhow::Result<()> {
    let settings = &loaded.settings;
    let anf = utils::connect(settings)?;
    let plan = utils::build_plan(settings, anf.subscription_id())?;

    let spec = SnapshotSpec {
        id: plan.primary.volume.snapshot(name)?,
        location: plan.primary.location.clone(),
    };
    println!("Creating snapshot {}...", spec.id.to_string().cyan());
    anf.create_snapshot(&spec).await?;

    let budget = utils::wait_budget(&settings.polling.readiness);
    Poller::with_cancellation(&anf, utils::cancel_on_ctrl_c())
        .poll(&spec.id, Probe::Existence, &budget.presence())
        .await?;

    println!("{}", format!("✓ Snapshot {} created", name).green().bold());
    Ok(())
}

/// Delete a snapshot of the primary volume and wait until it is gone
pub async fn delete(loaded: &LoadedSettings, name: &str) -> anyhow::Result<()> {
    let settings = &loaded.settings;
    let anf = utils::connect(settings)?;
    let plan = utils::build_plan(settings, anf.subscription_id())?;

    let id = plan.primary.volume.snapshot(name)?;
    let ResourceTarget::Snapshot(snapshot) = id.target() else {
        anyhow::bail!("{} is not a snapshot", id);
    };
    println!("Deleting snapshot {}...", id.to_string().cyan());
    anf.delete_snapshot(&snapshot).await?;

    let budget = utils::wait_budget(&settings.polling.deletion);
    Poller::with_cancellation(&anf, utils::cancel_on_ctrl_c())
        .poll(&id, Probe::Existence, &budget.absence())
        .await?;

    println!("{}", format!("✓ Snapshot {} deleted", name).green().bold());
    Ok(())
}
