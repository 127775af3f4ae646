//! Cleanup sequencing against a scripted control plane

mod common;

use common::{MockClient, Reply, sample_plan};
use netrep_cloud::{
    CleanupSequencer, CloudError, Poller, RunReport, Site, SiteStage, SiteTeardown, WaitBudget,
};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

fn budget() -> WaitBudget {
    WaitBudget::new(Duration::ZERO, 3)
}

fn full_teardown() -> Vec<SiteTeardown> {
    let plan = sample_plan();
    vec![
        SiteTeardown::full(&plan.secondary),
        SiteTeardown::full(&plan.primary),
    ]
}

#[tokio::test]
async fn test_full_cleanup_order() {
    let client = MockClient::new();
    let sequencer = CleanupSequencer::new(&client, Poller::new(&client), budget());

    let report = assert_ok!(sequencer.run(&full_teardown()).await);
    assert!(report.is_success());
    assert_eq!(report.succeeded.len(), 8);

    assert_eq!(
        client.mutations(),
        vec![
            "delete_replication SecondaryVolume",
            "delete_volume SecondaryVolume",
            "delete_pool SecondaryPool",
            "delete_account SecondaryANFAccount",
            "delete_replication PrimaryVolume",
            "delete_volume PrimaryVolume",
            "delete_pool PrimaryPool",
            "delete_account PrimaryANFAccount",
        ]
    );

    // Every deletion is followed by exactly one absence observation
    let calls = client.calls();
    assert_eq!(calls.len(), 16);
    assert_eq!(calls[1], "get_replication_status SecondaryVolume");
    assert_eq!(calls[3], "get_volume SecondaryVolume");
    assert_eq!(calls[5], "get_pool SecondaryPool");
    assert_eq!(calls[7], "get_account SecondaryANFAccount");
}

#[tokio::test]
async fn test_missing_replication_is_tolerated() {
    let client = MockClient::new();
    client.script(
        "delete_replication SecondaryVolume",
        vec![Reply::ReplicationMissing],
    );
    client.script(
        "get_replication_status SecondaryVolume",
        vec![Reply::ReplicationMissing],
    );
    let sequencer = CleanupSequencer::new(&client, Poller::new(&client), budget());

    let report = assert_ok!(sequencer.run(&full_teardown()).await);
    assert!(report.is_success());
    assert_eq!(client.count("delete_volume SecondaryVolume"), 1);
    assert_eq!(client.count("delete_account PrimaryANFAccount"), 1);
}

#[tokio::test]
async fn test_failure_aborts_site_and_continues() {
    let client = MockClient::new();
    client.script("delete_pool SecondaryPool", vec![Reply::Throttled]);
    let sequencer = CleanupSequencer::new(&client, Poller::new(&client), budget());

    let report = assert_ok!(sequencer.run(&full_teardown()).await);
    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].site, Site::Secondary);
    assert_eq!(report.failed[0].step_id, "delete-pool");

    // Secondary account is left behind; primary is fully removed
    assert_eq!(client.count("delete_account SecondaryANFAccount"), 0);
    assert_eq!(client.count("delete_account PrimaryANFAccount"), 1);
    assert_eq!(report.succeeded.len(), 6);
}

#[tokio::test]
async fn test_absence_timeout_is_a_failure() {
    let client = MockClient::new();
    client.script("get_volume PrimaryVolume", vec![Reply::Ok]);
    let sequencer = CleanupSequencer::new(&client, Poller::new(&client), budget());

    let report = assert_ok!(sequencer.run(&full_teardown()).await);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].site, Site::Primary);
    assert_eq!(report.failed[0].step_id, "delete-volume");
    assert_eq!(client.count("get_volume PrimaryVolume"), 3);
    assert_eq!(client.count("delete_pool PrimaryPool"), 0);
}

#[tokio::test]
async fn test_teardown_follows_run_progress() {
    let plan = sample_plan();
    let mut run = RunReport::new();
    run.primary.account_id = Some(plan.primary.account.clone());
    run.primary.pool_id = Some(plan.primary.pool.clone());
    run.primary.advance(SiteStage::PoolCreated);

    let sites = SiteTeardown::for_run(&run);
    assert_eq!(sites[0].site, Site::Secondary);
    assert!(sites[0].is_empty());
    assert!(sites[1].volume.is_none());
    assert!(sites[1].replication.is_none());

    let client = MockClient::new();
    let sequencer = CleanupSequencer::new(&client, Poller::new(&client), budget());
    let report = assert_ok!(sequencer.run(&sites).await);
    assert!(report.is_success());
    assert_eq!(
        client.mutations(),
        vec!["delete_pool PrimaryPool", "delete_account PrimaryANFAccount"]
    );
}

#[tokio::test]
async fn test_cancellation_is_returned() {
    let client = MockClient::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let sequencer = CleanupSequencer::new(
        &client,
        Poller::with_cancellation(&client, cancel),
        budget(),
    );

    let err = assert_err!(sequencer.run(&full_teardown()).await);
    assert!(matches!(err, CloudError::Cancelled));
    assert!(client.mutations().is_empty());
}

#[tokio::test]
async fn test_no_deletion_after_cancellation() {
    let client = MockClient::new();
    let cancel = CancellationToken::new();
    client.cancel_on("delete_replication SecondaryVolume", cancel.clone());
    let sequencer = CleanupSequencer::new(
        &client,
        Poller::with_cancellation(&client, cancel),
        budget(),
    );

    let err = assert_err!(sequencer.run(&full_teardown()).await);
    assert!(matches!(err, CloudError::Cancelled));
    assert_eq!(client.mutations(), vec!["delete_replication SecondaryVolume"]);
}
