use crate::utils::{self, LoadedSettings};
use colored::Colorize;
use netrep_cloud::{CleanupSequencer, Poller, SiteTeardown};

pub async fn handle(loaded: &LoadedSettings, yes: bool) -> anyhow::Result<()> {
    println!("{}", "Removing replication resources...".yellow());
    utils::print_loaded_config(loaded);

    let settings = &loaded.settings;
    let anf = utils::connect(settings)?;
    let plan = utils::build_plan(settings, anf.subscription_id())?;
    let sites = [
        SiteTeardown::full(&plan.secondary),
        SiteTeardown::full(&plan.primary),
    ];

    println!();
    println!("{}", "Resources to delete (in order):".bold());
    for site in &sites {
        for id in [&site.volume, &site.pool, &site.account].into_iter().flatten() {
            println!("  • [{}] {}", site.site, id.to_string().cyan());
        }
    }

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: this deletes the volumes and all data on them.".yellow()
        );
        println!("Run again with --yes to proceed");
        return Ok(());
    }

    let budget = utils::wait_budget(&settings.polling.deletion);
    let poller = Poller::with_cancellation(&anf, utils::cancel_on_ctrl_c());
    let report = CleanupSequencer::new(&anf, poller, budget)
        .run(&sites)
        .await?;
    utils::print_cleanup_report(&report);

    if !report.is_success() {
        anyhow::bail!("{} cleanup step(s) failed", report.failed.len());
    }
    Ok(())
}
