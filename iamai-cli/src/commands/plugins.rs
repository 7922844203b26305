//! Plugin inspection commands

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use iamai_core::{Bot, Config, DylibLoader, ModuleLoader};

/// Plugin arguments
#[derive(Args)]
pub struct PluginsArgs {
    #[command(subcommand)]
    pub command: PluginsCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginsCommands {
    /// Load plugins from the configured directories and list them
    List,
    /// Load a single module and report whether it is a valid plugin
    Check {
        /// Path to the plugin library
        path: PathBuf,
    },
}

/// Run plugin command
pub fn run(config: Config, args: PluginsArgs) -> Result<()> {
    match args.command {
        PluginsCommands::List => list_plugins(config),
        PluginsCommands::Check { path } => check_plugin(&path),
    }
}

fn list_plugins(config: Config) -> Result<()> {
    if config.bot.plugin_dirs.is_empty() {
        println!("No plugin directories configured");
        println!();
        println!("Add one to the configuration file:");
        println!("  {{\"bot\": {{\"plugin_dirs\": [\"./plugins\"]}}}}");
        return Ok(());
    }

    let bot = Bot::new(config);
    bot.load_configured_plugins()?;

    let names = bot.plugin_names();
    if names.is_empty() {
        println!("No plugins found");
        return Ok(());
    }

    for name in names {
        println!("✓ {}", name);
    }
    Ok(())
}

fn check_plugin(path: &std::path::Path) -> Result<()> {
    let plugin = DylibLoader::new().load(path)?;
    println!("✓ {} ({})", plugin.name(), path.display());
    Ok(())
}
