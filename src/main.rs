use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use verdictbot::config::{BotConfig, LogFormat, LoggingConfig};

#[derive(Parser)]
#[command(
    name = "verdictbot",
    about = "Relays homework review status changes to Telegram",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the review API and forward status changes
    Run {
        /// Config file (defaults to $VERDICTBOT_CONFIG, then ./verdictbot.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run a single polling cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Print the effective configuration and verify credentials
    CheckConfig {
        /// Config file (defaults to $VERDICTBOT_CONFIG, then ./verdictbot.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Load the config with a temporary stderr logger installed, so fallback
/// warnings are visible before the configured subscriber exists.
fn resolve_config(path: Option<&Path>) -> Result<BotConfig> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, || BotConfig::resolve(path))
}

fn init_tracing(cfg: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (&cfg.file, cfg.format) {
        (Some(path), format) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            match format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Text => builder.init(),
            }
        }
        (None, LogFormat::Json) => builder.json().init(),
        (None, LogFormat::Text) => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, once } => {
            let config = resolve_config(config.as_deref())?;
            init_tracing(&config.logging)?;
            tracing::info!(endpoint = %config.api.endpoint, once, "Starting verdictbot");

            let shutdown = CancellationToken::new();
            let on_signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received");
                    on_signal.cancel();
                }
            });

            if let Err(e) = verdictbot::run(&config, once, shutdown).await {
                tracing::error!(error = %e, "verdictbot stopped");
                return Err(e);
            }
        }
        Commands::CheckConfig { config } => {
            let config = resolve_config(config.as_deref())?;
            init_tracing(&config.logging)?;

            println!("{}", toml::to_string_pretty(&config)?);
            verdictbot::startup::check_credentials(&config.credentials)?;
            println!("All credentials present.");
        }
    }

    Ok(())
}
