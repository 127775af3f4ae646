use crate::utils::{self, LoadedSettings};
use colored::Colorize;
use netrep_cloud::{
    CleanupSequencer, CloudError, Poller, ReplicationOrchestrator, RunReport, SiteTeardown,
};

pub async fn handle(loaded: &LoadedSettings, cleanup: bool) -> anyhow::Result<()> {
    println!("{}", "Azure NetApp Files cross-region replication".bold());
    utils::print_loaded_config(loaded);

    let settings = &loaded.settings;
    let cleanup = cleanup || settings.cleanup;

    let anf = utils::connect(settings)?;
    let plan = utils::build_plan(settings, anf.subscription_id())?;

    println!();
    println!(
        "Primary:   {} ({}) → {}",
        plan.primary.volume.name().cyan(),
        plan.primary.location,
        plan.primary.service_level
    );
    println!(
        "Secondary: {} ({}) → {}",
        plan.secondary.volume.name().cyan(),
        plan.secondary.location,
        plan.secondary.service_level
    );
    println!("Schedule:  {}", plan.schedule);
    println!();

    let cancel = utils::cancel_on_ctrl_c();
    let mut report = RunReport::new();
    let orchestrator = ReplicationOrchestrator::new(
        &anf,
        Poller::with_cancellation(&anf, cancel.clone()),
        &plan,
    );
    let result = orchestrator.run(&mut report).await;

    utils::print_run_report(&report);
    match &result {
        Ok(()) => println!(
            "{}",
            "✓ Replication between primary and secondary volumes is authorized"
                .green()
                .bold()
        ),
        Err(e) => println!("{}", format!("✗ Replication setup failed: {}", e).red().bold()),
    }

    if cleanup {
        println!();
        println!("{}", "Cleaning up created resources...".yellow());
        let budget = utils::wait_budget(&settings.polling.deletion);
        let sequencer =
            CleanupSequencer::new(&anf, Poller::with_cancellation(&anf, cancel), budget);
        match sequencer.run(&SiteTeardown::for_run(&report)).await {
            Ok(cleanup_report) => utils::print_cleanup_report(&cleanup_report),
            Err(CloudError::Cancelled) => {
                println!("{}", "⚠ Cleanup interrupted".yellow());
            }
            Err(e) => return Err(e.into()),
        }
    }

    result?;
    Ok(())
}
