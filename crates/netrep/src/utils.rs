use colored::Colorize;
use netrep_cloud::{
    CleanupReport, ProtocolType, ReplicationPlan, ResourceId, RunReport, ServiceLevel, Site,
    SitePlan, WaitBudget,
};
use netrep_cloud_azure::{AzureCredentials, AzureNetAppFiles};
use netrep_config::{Settings, SiteConfig, WaitConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Settings plus the file they were read from
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<LoadedSettings> {
    let (settings, source) = netrep_config::load(explicit)?;
    Ok(LoadedSettings { settings, source })
}

/// Print which settings file is in effect
pub fn print_loaded_config(loaded: &LoadedSettings) {
    match &loaded.source {
        Some(path) => println!("📄 Settings: {}", path.display().to_string().cyan()),
        None => println!("📄 Settings: {}", "built-in defaults".dimmed()),
    }
}

/// Authenticate and build the Azure client
///
/// A `subscription_id` in the settings wins over the one in the credentials.
pub fn connect(settings: &Settings) -> anyhow::Result<AzureNetAppFiles> {
    let mut credentials = AzureCredentials::from_env()?;
    if let Some(subscription) = &settings.subscription_id {
        credentials.subscription_id = subscription.clone();
    }
    Ok(AzureNetAppFiles::new(&credentials)?)
}

pub fn wait_budget(config: &WaitConfig) -> WaitBudget {
    WaitBudget::new(Duration::from_secs(config.interval_secs), config.max_attempts)
}

fn site_plan(site: Site, config: &SiteConfig, subscription: &str) -> anyhow::Result<SitePlan> {
    let service_level: ServiceLevel = config.service_level.parse()?;
    let account = ResourceId::account(subscription, &config.resource_group, &config.account);
    Ok(SitePlan::new(
        site,
        &config.location,
        config.subnet_id(subscription),
        service_level,
        account,
        &config.pool,
        &config.volume,
    )?)
}

/// Resolve settings into a plan for `subscription`
pub fn build_plan(settings: &Settings, subscription: &str) -> anyhow::Result<ReplicationPlan> {
    let protocol_types = settings
        .protocol_types
        .iter()
        .map(|p| p.parse::<ProtocolType>())
        .collect::<Result<Vec<_>, _>>()?;

    let plan = ReplicationPlan {
        primary: site_plan(Site::Primary, &settings.primary, subscription)?,
        secondary: site_plan(Site::Secondary, &settings.secondary, subscription)?,
        pool_size_bytes: settings.pool_size_bytes,
        volume_size_bytes: settings.volume_size_bytes,
        protocol_types,
        schedule: settings.replication_schedule.parse()?,
        tags: settings
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<HashMap<_, _>>(),
        readiness: wait_budget(&settings.polling.readiness),
        mirror: settings.polling.mirror.as_ref().map(wait_budget),
    };
    plan.validate()?;
    Ok(plan)
}

/// Token cancelled on the first Ctrl+C
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, stopping after the current call...".yellow());
            cancel.cancel();
        }
    });
    token
}

pub fn print_run_report(report: &RunReport) {
    println!();
    println!("{}", "Provisioning summary:".bold());
    for progress in [&report.primary, &report.secondary] {
        println!("  {} site: {}", progress.site, progress.stage.to_string().cyan());
        if let Some(volume) = &progress.volume_id {
            println!("    volume: {}", volume);
        }
    }
    if let Some(status) = &report.replication {
        let mirror = status
            .mirror_state
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  mirror state: {}", mirror.green());
    }
}

pub fn print_cleanup_report(report: &CleanupReport) {
    println!();
    for step in &report.succeeded {
        println!("  ✓ [{}] {}: {}", step.site, step.step_id, step.message);
    }
    for step in &report.failed {
        println!(
            "  ✗ [{}] {}: {}",
            step.site,
            step.step_id,
            step.error.as_deref().unwrap_or("unknown error").red()
        );
    }
    println!();
    if report.is_success() {
        println!(
            "{}",
            format!("✓ Cleanup completed in {} ms", report.duration_ms)
                .green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "⚠ Cleanup finished with {} failed step(s); remaining resources must be removed manually",
                report.failed.len()
            )
            .yellow()
            .bold()
        );
    }
}
