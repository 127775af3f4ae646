mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "netrep")]
#[command(
    about = "Set up and tear down cross-region replication for Azure NetApp Files",
    long_about = None
)]
struct Cli {
    /// Settings file (default: discovered, see NETREP_CONFIG_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision both sites and authorize replication
    Run {
        /// Delete everything that was created once the run ends, even on failure
        #[arg(long, env = "NETREP_CLEANUP")]
        cleanup: bool,
    },
    /// Delete replication, volumes, pools and accounts of both sites
    Cleanup {
        /// Proceed without the confirmation notice
        #[arg(short, long)]
        yes: bool,
    },
    /// Show replication status of both volumes
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Break replication on the secondary volume
    #[command(name = "break-replication")]
    BreakReplication {
        /// Proceed without the confirmation notice
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage snapshots of the primary volume
    #[command(subcommand)]
    Snapshot(SnapshotCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum SnapshotCommands {
    /// Create a snapshot
    Create {
        /// Snapshot name
        name: String,
    },
    /// Delete a snapshot and wait until it is gone
    Delete {
        /// Snapshot name
        name: String,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "netrep={level},netrep_cloud={level},netrep_cloud_azure={level},netrep_config={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Version needs neither settings nor credentials
    if matches!(cli.command, Commands::Version) {
        println!("netrep {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(cli.verbose);

    let loaded = utils::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { cleanup } => commands::run::handle(&loaded, cleanup).await?,
        Commands::Cleanup { yes } => commands::cleanup::handle(&loaded, yes).await?,
        Commands::Status { json } => commands::status::handle(&loaded, json).await?,
        Commands::BreakReplication { yes } => {
            commands::replication::break_replication(&loaded, yes).await?
        }
        Commands::Snapshot(SnapshotCommands::Create { name }) => {
            commands::snapshot::create(&loaded, &name).await?
        }
        Commands::Snapshot(SnapshotCommands::Delete { name }) => {
            commands::snapshot::delete(&loaded, &name).await?
        }
        Commands::Version => {
            unreachable!("Version is handled before settings loading");
        }
    }

    Ok(())
}
