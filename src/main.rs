use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediation_manager::config::{self, IntegrationConfig};
use mediation_manager::integration::{IntegrationManager, UpdateCheckState};
use mediation_manager::logging::init_logging;
use mediation_manager::version::catalogs::HttpCatalog;
use mediation_manager::version::checker::NetworkStatus;
use mediation_manager::version::compare::compare;
use mediation_manager::version::types::PluginData;
use tracing::info;

#[derive(Parser)]
#[command(name = "mediation-manager")]
#[command(version, about = "Manage mediation network adapter versions in a host project")]
struct Cli {
    /// Root of the host project
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Config file (defaults to <project>/mediation-manager.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the log file as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two version strings
    Compare { version_a: String, version_b: String },
    /// Show installed and latest versions of every network
    Status,
    /// Report available updates, at most once per configured interval
    CheckUpdates {
        /// Check even if the interval has not elapsed
        #[arg(long)]
        force: bool,
    },
    /// Turn the periodic plugin update prompt on or off
    AutoUpdate {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Tell whether an adapter is installed, optionally at minimum versions
    Installed {
        /// Adapter directory name under MaxSdk/Mediation, e.g. Vungle
        adapter: String,
        #[arg(long)]
        min_ios: Option<String>,
        #[arg(long)]
        min_android: Option<String>,
    },
    /// Add a network's packages to the manifest
    Install { network: String },
    /// Remove a network's packages from the manifest
    Uninstall { network: String },
    /// Move the plugin and installed adapters to the package manager
    Migrate,
    /// Android Gradle file changes
    Gradle {
        #[command(subcommand)]
        action: GradleAction,
    },
}

#[derive(Subcommand)]
enum GradleAction {
    /// Add, update or remove the quality service plugin according to the config
    QualityService,
    /// Rewrite gradle.properties and apply custom Gradle versions
    Properties,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = init_logging(&config::log_dir(), cli.json_logs)
        .context("Failed to initialize logging")?;

    let config = IntegrationConfig::load_or_default(cli.config.as_deref(), &cli.project)
        .context("Failed to load config")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: IntegrationConfig) -> anyhow::Result<()> {
    let catalog = Arc::new(HttpCatalog::new(&config.catalog.base_url));
    let check_interval = chrono::Duration::milliseconds(config.auto_update.check_interval);
    let auto_update_enabled = config.auto_update.enabled;
    let manager = IntegrationManager::new(config, catalog);

    match command {
        Command::Compare {
            version_a,
            version_b,
        } => println!("{:?}", compare(&version_a, &version_b)),
        Command::Status => {
            let mut data = manager.load_plugin_data().await?;
            let statuses = manager.refresh_current_versions(&mut data);
            print_status(&data, &statuses);
        }
        Command::CheckUpdates { force } => {
            let state_path = config::update_state_path();
            let mut state = UpdateCheckState::load(&state_path);
            let now = chrono::Utc::now();

            if !force && !(auto_update_enabled && state.should_check(now, check_interval)) {
                info!("Skipping update check");
                return Ok(());
            }

            let data = manager.load_plugin_data().await?;
            println!("{}", manager.update_report(&data));

            state.record_check(now);
            state
                .save(&state_path)
                .with_context(|| format!("Failed to save {}", state_path.display()))?;
        }
        Command::AutoUpdate { enabled } => {
            let state_path = config::update_state_path();
            let mut state = UpdateCheckState::load(&state_path);
            state.auto_update_enabled = enabled;
            state
                .save(&state_path)
                .with_context(|| format!("Failed to save {}", state_path.display()))?;
            info!("Plugin update prompts enabled: {}", enabled);
        }
        Command::Installed {
            adapter,
            min_ios,
            min_android,
        } => {
            let installed = manager.is_adapter_installed(
                &adapter,
                min_ios.as_deref(),
                min_android.as_deref(),
            );
            println!("{installed}");
        }
        Command::Install { network } => {
            let data = manager.load_plugin_data().await?;
            manager
                .install_network(&data, &network)
                .with_context(|| format!("Failed to install {network}"))?;
        }
        Command::Uninstall { network } => {
            let data = manager.load_plugin_data().await?;
            manager
                .uninstall_network(&data, &network)
                .with_context(|| format!("Failed to uninstall {network}"))?;
        }
        Command::Migrate => {
            let data = manager.load_plugin_data().await?;
            let migrated = manager
                .migrate_to_package_manager(&data)
                .context("Failed to migrate to the package manager")?;
            println!("Migrated {} adapters", migrated.len());
        }
        Command::Gradle { action } => match action {
            GradleAction::QualityService => {
                let outcome = manager
                    .apply_quality_service()
                    .context("Failed to apply quality service plugin")?;
                println!("{outcome:?}");
            }
            GradleAction::Properties => manager
                .update_android_properties()
                .context("Failed to update Android properties")?,
        },
    }

    Ok(())
}

fn print_status(data: &PluginData, statuses: &[(String, NetworkStatus)]) {
    for (name, status) in statuses {
        let Some(network) = data.find_network(name) else {
            continue;
        };
        let current = network.current_versions.unity.as_deref().unwrap_or("-");
        let latest = network.latest_versions.unity.as_deref().unwrap_or("-");
        let warning = if status.requires_update {
            " (requires update)"
        } else {
            ""
        };

        println!(
            "{:<32} {:<36} {:<36} {:?}{}",
            network.display_name, current, latest, status.action, warning
        );
    }
}
