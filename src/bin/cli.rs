//! billwatch CLI
//!
//! Local execution entry point. For AWS Lambda, use `billwatch-lambda`.

use std::path::PathBuf;

use billwatch::{
    error::Result,
    models::Config,
    pipeline,
    storage::{RecordStore, SqliteRecordStore},
};
use clap::{Parser, Subcommand};

/// billwatch - New Bill Announcer
#[derive(Parser, Debug)]
#[command(
    name = "billwatch",
    version,
    about = "Logs newly introduced bills from a legislation feed and announces them"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "billwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one poll cycle
    Run {
        /// Print the cycle report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration
    Validate,

    /// Show logged bill count and bills logged without announcement
    Status,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The log level lives in the config, so read it before the logger exists
    // and report a load failure afterwards.
    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };
    config.apply_env_overrides();

    match cli.command {
        Command::Run { json } => {
            config.validate()?;
            log::info!("Polling {}", config.feed.url);

            let report = pipeline::run_once(&config).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if !report.is_clean() {
                log::warn!("Cycle finished with per-entry failures; see log above");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("  feed:     {}", config.feed.url);
            log::info!("  store:    {}", config.store.database_url);
            log::info!("  notifier: {:?}", config.notifier.kind);
        }

        Command::Status => {
            let store = SqliteRecordStore::open(&config.store).await?;
            let status = async {
                let count = store.count().await?;
                let pending = store.pending().await?;
                Ok::<_, billwatch::error::StoreError>((count, pending))
            }
            .await;
            store.close().await;
            let (count, pending) = status?;

            log::info!("Record store: {}", config.store.database_url);
            log::info!("Logged bills: {}", count);
            if pending.is_empty() {
                log::info!("Every logged bill was announced.");
            } else {
                log::info!("Logged without announcement: {}", pending.len());
                for record in &pending {
                    log::info!(
                        "  {} (first seen {})",
                        record.identifier,
                        record.first_seen_at.to_rfc3339()
                    );
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
