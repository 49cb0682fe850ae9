use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hangar_config::{get_data_path, HangarConfig};
use hangar_core::Core;

#[derive(Parser)]
#[command(name = "hangar")]
#[command(about = "Resolve tracks, latest versions and install status of simulator add-ons")]
struct Cli {
    /// Config file, defaults to config.json in the data directory
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the install status of every add-on
    Status {
        /// Print JSON instead of one line per add-on
        #[arg(long)]
        json: bool,
    },
    /// Get latest version info
    Latest {
        /// Add-on key
        addon: String,
        /// Track url, defaults to the selected track
        #[arg(long)]
        track: Option<String>,
    },
    /// Switch the selected track of an add-on
    Select {
        /// Add-on key
        addon: String,
        /// Track url
        track: String,
    },
    /// Reveal a hidden add-on
    Discover {
        /// Add-on key
        addon: String,
    },
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging();

    let config_path = match cli.config {
        Some(path) => path,
        None => get_data_path("config.json")?,
    };
    tracing::debug!(config = %config_path.display(), "loading config");
    let config = HangarConfig::load_or_default(&config_path)?;
    let core = Core::new(config).await?;

    match cli.command {
        Commands::Status { json } => {
            core.refresh_all().await?;
            let statuses = core.get_all_statuses().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                for info in statuses {
                    println!(
                        "{:<24} {:<14} {}",
                        info.addon_key,
                        info.status.to_string(),
                        info.selected_track.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Latest { addon, track } => {
            let release = core.latest_version(&addon, track.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&release)?);
        }
        Commands::Select { addon, track } => {
            let track = core.select_track(&addon, &track).await?;
            println!("Selected track {} for {}", track.url, addon);
            let outcome = core.refresh(&addon).await?;
            println!("Status: {}", outcome.status);
        }
        Commands::Discover { addon } => {
            let outcome = core.discover(&addon).await?;
            println!("Status: {}", outcome.status);
        }
    }

    Ok(())
}
