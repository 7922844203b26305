use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use iamai_core::Config;
use iamai_core::config::DEFAULT_CONFIG_FILE;

mod adapters;
mod commands;

#[derive(Parser)]
#[command(name = "iamai", about = "Extensible bot host")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot until interrupted
    Run(commands::run::RunArgs),
    /// Inspect plugin modules
    Plugins(commands::plugins::PluginsArgs),
}

/// Grace period for runtime tasks once the command returns. Blocking stdin
/// reads cannot be cancelled and would otherwise keep the process alive.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config);
    let level = config.as_ref().ok().map(|c| c.log.filter_directive());
    init_logging(cli.verbose, level);
    let config = config.inspect_err(|e| tracing::error!(error = %e, "Failed to load config"))?;

    match cli.command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(commands::run::run(config, args));
            runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
            result
        }
        Commands::Plugins(args) => commands::plugins::run(config, args),
    }
}

/// `--verbose` wins, then `RUST_LOG`, then the configured level.
fn init_logging(verbose: bool, configured: Option<&str>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("info")))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
