use crate::utils::{self, LoadedSettings};
use colored::Colorize;
use netrep_cloud::{ReplicationStatus, ResourceClient, Site};

pub async fn handle(loaded: &LoadedSettings, json: bool) -> anyhow::Result<()> {
    let settings = &loaded.settings;
    let anf = utils::connect(settings)?;
    let plan = utils::build_plan(settings, anf.subscription_id())?;

    let mut statuses = Vec::new();
    for site in [Site::Primary, Site::Secondary] {
        let volume = &plan.site(site).volume;
        let status = anf.get_replication_status(&volume.volume_ref()?).await;
        statuses.push((site, volume, status));
    }

    if json {
        let value: serde_json::Map<String, serde_json::Value> = statuses
            .iter()
            .map(|(site, _, status)| {
                let value = match status {
                    Ok(s) => serde_json::to_value(s).unwrap_or_default(),
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                (site.to_string().to_lowercase(), value)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    utils::print_loaded_config(loaded);
    for (site, volume, status) in &statuses {
        println!();
        println!("{} {}", format!("{} volume", site).bold(), volume.name().cyan());
        match status {
            Ok(status) => print_status(status),
            Err(e) if e.is_replication_missing() || e.is_not_found() => {
                println!("  {}", "not replicated".dimmed());
            }
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }
    Ok(())
}

fn print_status(status: &ReplicationStatus) {
    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| "unknown".to_string());

    let healthy = match status.healthy {
        Some(true) => "yes".green(),
        Some(false) => "no".red(),
        None => "unknown".normal(),
    };
    println!("  healthy:      {}", healthy);
    println!(
        "  mirror state: {}",
        or_unknown(status.mirror_state.map(|m| m.to_string()))
    );
    println!(
        "  relationship: {}",
        or_unknown(status.relationship_status.map(|r| r.to_string()))
    );
    if let Some(progress) = &status.total_progress {
        println!("  transferred:  {} bytes", progress);
    }
    if let Some(message) = status.error_message.as_deref().filter(|m| !m.is_empty()) {
        println!("  error:        {}", message.red());
    }
}
