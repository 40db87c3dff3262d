use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::*;
use convgen_config::GenerationConfig;
use convgen_logger as logger;

use crate::GlobalOpts;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Print a single setting
    Get { key: String },
    /// Update a single setting
    Set { key: String, value: String },
    /// Print the path of the config file in use
    Path,
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<()> {
    let path = GenerationConfig::path();
    logger::debug(&format!("Reading config from: {}", path.display()));

    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = GenerationConfig::load().context("Failed to load config")?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
                return Ok(());
            }
            for (key, value) in config.values_iter() {
                println!("  {}: {}", key.cyan(), value);
            }
            if !config.resources.is_empty() {
                println!("  {}:", "resources".cyan());
                for resource in &config.resources {
                    println!("    {}", resource);
                }
            }
        }
        ConfigAction::Get { key } => {
            let config = GenerationConfig::load().context("Failed to load config")?;
            let value = config
                .get(&key)
                .ok_or_else(|| anyhow!("'{}' is not set", key))?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = GenerationConfig::load().context("Failed to load config")?;
            config.set(&key, value.clone())?;
            config
                .save_to(&path)
                .with_context(|| format!("Failed to save config {}", path.display()))?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
