use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use convgen_manifest::ConversionPlan;

use super::GenerationArgs;
use crate::GlobalOpts;

#[derive(Args, Debug, Clone)]
pub struct PlanCommand {
    #[command(flatten)]
    pub args: GenerationArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Scan the version directories and show what `generate` would write
pub fn handle_plan(cmd: PlanCommand, opts: &GlobalOpts) -> Result<ConversionPlan> {
    let config = cmd.args.resolve()?;
    let generator = config.generator()?;
    let plan = generator
        .plan(&config.resources)
        .context("Failed to plan conversion functions")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan, opts);
    }
    Ok(plan)
}

fn print_plan(plan: &ConversionPlan, opts: &GlobalOpts) {
    if plan.files.is_empty() {
        println!("No spoke versions found in {}", plan.scan_dir.display());
        return;
    }

    for file in &plan.files {
        println!("{} {}", file.version.bold().green(), file.path.display());
        if file.manifest.resources.is_empty() {
            if opts.verbosity_level() > 0 {
                println!("  {}", "(no resources)".yellow());
            }
            continue;
        }
        for kind in file.manifest.kinds() {
            println!("  {}", kind);
        }
    }

    if !plan.registry.is_empty() {
        println!("{}", "Spoke versions:".bold());
        for (key, versions) in plan.registry.iter() {
            println!("  {}: {}", key.cyan(), versions.join(", "));
        }
    }
}
