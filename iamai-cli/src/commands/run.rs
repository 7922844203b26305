//! `iamai run` - start the bot and block until SIGINT/SIGTERM

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iamai_core::{Bot, BotOptions, Config};

use crate::adapters;

/// Run arguments
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Extra plugin directory, scanned after the configured ones
    #[arg(long = "plugin-dir")]
    pub plugin_dirs: Vec<PathBuf>,

    /// Give up on an adapter's stop after this many seconds
    #[arg(long)]
    pub stop_timeout: Option<u64>,
}

/// Run the bot
pub async fn run(mut config: Config, args: RunArgs) -> Result<()> {
    config.bot.plugin_dirs.extend(args.plugin_dirs);

    let options = BotOptions {
        verbose_errors: config.log.verbose_exception,
        stop_timeout: args.stop_timeout.map(Duration::from_secs),
        ..BotOptions::default()
    };
    let bot = Arc::new(Bot::with_options(config, options));

    bot.install_adapters(&adapters::builtin_catalog())
        .context("Failed to set up adapters")?;
    bot.load_configured_plugins()
        .context("Failed to load plugins")?;

    bot.run().await?;
    Ok(())
}
