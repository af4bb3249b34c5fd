use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// XPLORER - telemetry explorer for storage network nodes
#[derive(Parser)]
#[command(name = "xplorer-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Telemetry API base URL (overrides config and environment)
    #[arg(long)]
    api_url: Option<String>,

    /// Nodes per page, 1..=100 (overrides config and environment)
    #[arg(long)]
    page_size: Option<u32>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<commands::Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = config::Overrides {
        api_url: cli.api_url,
        page_size: cli.page_size,
    };
    let config = config::load(cli.config.as_deref(), &overrides)?;

    if cli.print_config {
        let yaml = serde_yaml::to_string(&config).context("failed to render configuration")?;
        print!("{yaml}");
        return Ok(());
    }

    let Some(command) = cli.command else {
        bail!("no command given, see --help");
    };

    tracing::debug!(api = %config.api_base_url, page_size = config.page_size, "starting");
    let aggregator = xplorer::build_aggregator(&config)?;
    command.run(&aggregator).await
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }
}
