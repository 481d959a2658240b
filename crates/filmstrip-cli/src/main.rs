use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmstrip_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "filmstrip")]
#[command(author, version, about = "Synchronized horizontal image rows, headless tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config,
    /// Replay an interaction trace against virtual surfaces
    Simulate {
        /// Trace file (TOML)
        trace: PathBuf,
        /// Print every Nth frame (0 prints only the summary)
        #[arg(short = 'e', long, default_value_t = 10)]
        every: usize,
        /// Pace frames at the configured frame rate
        #[arg(long)]
        realtime: bool,
        /// Print frames as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Config => commands::config::run(&config),
        Commands::Simulate {
            trace,
            every,
            realtime,
            json,
        } => {
            let options = commands::simulate::Options {
                every,
                realtime,
                json,
            };
            commands::simulate::run(&config, &trace, options).await
        }
    }
}
