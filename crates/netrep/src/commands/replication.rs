use crate::utils::{self, LoadedSettings};
use colored::Colorize;
use netrep_cloud::{MirrorState, Poller, ResourceClient};

/// Break replication on the secondary volume and wait for the Broken state
pub async fn break_replication(loaded: &LoadedSettings, yes: bool) -> anyhow::Result<()> {
    let settings = &loaded.settings;
    let anf = utils::connect(settings)?;
    let plan = utils::build_plan(settings, anf.subscription_id())?;
    let volume = &plan.secondary.volume;

    utils::print_loaded_config(loaded);
    println!("Breaking replication on {}", volume.to_string().cyan());

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: the secondary volume becomes writable and stops receiving updates.".yellow()
        );
        println!("Run again with --yes to proceed");
        return Ok(());
    }

    anf.break_replication(&volume.volume_ref()?).await?;

    let budget = utils::wait_budget(&settings.polling.readiness);
    let poller = Poller::with_cancellation(&anf, utils::cancel_on_ctrl_c());
    let status = poller
        .wait_for_mirror_state(volume, MirrorState::Broken, budget.interval, budget.max_attempts)
        .await?;

    println!(
        "{}",
        format!(
            "✓ Replication broken (mirror state: {})",
            status
                .mirror_state
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        )
        .green()
        .bold()
    );
    Ok(())
}
