use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use convgen_logger as logger;
use convgen_manifest::{ConvertibleRenderer, FsWriter, GenerationReport};

use super::GenerationArgs;
use crate::GlobalOpts;

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub args: GenerationArgs,
}

/// Generate conversion functions for every spoke version
pub fn handle_generate(cmd: GenerateCommand, opts: &GlobalOpts) -> Result<GenerationReport> {
    let config = cmd.args.resolve()?;
    if config.resources.is_empty() {
        logger::warn("No resources declared: generated files will not contain conversions");
    }
    let generator = config.generator()?;
    let writer = FsWriter::with_mode(config.file_mode()?);

    logger::step(&format!(
        "Generating conversions under {} (hub {})",
        generator.scan_dir().display(),
        generator.hub_version()
    ));
    logger::spinner_start("Generating conversion functions...");

    let report = match generator.generate(&config.resources, &ConvertibleRenderer::new(), &writer) {
        Ok(report) => report,
        Err(e) => {
            logger::spinner_error("Conversion generation failed");
            return Err(e).context("Failed to generate conversion functions");
        }
    };

    logger::spinner_success(&format!(
        "Generated {} conversion file(s)",
        report.written.len()
    ));
    for path in &report.written {
        logger::info(&format!("Wrote {}", path.display()));
    }

    if !opts.quiet {
        for path in &report.written {
            println!("  {} {}", "wrote".green(), path.display());
        }
        print_registry(&report);
    }

    Ok(report)
}

fn print_registry(report: &GenerationReport) {
    if report.registry.is_empty() {
        return;
    }
    println!("{}", "Spoke versions:".bold());
    for (key, versions) in report.registry.iter() {
        println!("  {}: {}", key.cyan(), versions.join(", "));
    }
}
