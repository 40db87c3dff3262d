pub mod config;
pub mod generate;
pub mod plan;

use anyhow::{Context, Result};
use clap::Args;
use convgen_config::GenerationConfig;
use convgen_manifest::{RegistryKeying, ResourceDescriptor};
use std::path::PathBuf;
use tracing::debug;

/// Settings shared by `generate` and `plan`; flags override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Path to convgen.toml (defaults to $CONVGEN_CONFIG or ./convgen.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root directory containing apis/
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// API group, e.g. s3.aws.upbound.io
    #[arg(long)]
    pub group: Option<String>,

    /// Hub version, e.g. v1beta1
    #[arg(long = "hub", value_name = "VERSION")]
    pub hub_version: Option<String>,

    /// License header file prepended to generated files (relative to the current directory)
    #[arg(long, value_name = "PATH")]
    pub license_header: Option<PathBuf>,

    /// Resource descriptor as <short_group>.<Kind> (repeatable)
    #[arg(long = "resource", value_name = "SHORT_GROUP.KIND")]
    pub resources: Vec<ResourceDescriptor>,

    /// Registry keying: legacy or qualified
    #[arg(long)]
    pub keying: Option<RegistryKeying>,
}

impl GenerationArgs {
    /// Load the config file and apply command line overrides
    pub fn resolve(&self) -> Result<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => GenerationConfig::load().context("Failed to load config")?,
        };

        if let Some(root) = &self.root {
            config.root_dir = Some(root.to_string_lossy().into_owned());
        }
        if let Some(group) = &self.group {
            config.group = Some(group.clone());
        }
        if let Some(hub_version) = &self.hub_version {
            config.hub_version = Some(hub_version.clone());
        }
        if let Some(header) = &self.license_header {
            // config file values are relative to root_dir, flags to the cwd
            let header = if header.is_relative() {
                std::env::current_dir()
                    .context("Failed to read the current directory")?
                    .join(header)
            } else {
                header.clone()
            };
            config.license_header = Some(header.to_string_lossy().into_owned());
        }
        if let Some(keying) = self.keying {
            config.registry_keying = Some(keying);
        }
        config.resources.extend(self.resources.iter().cloned());

        debug!(
            "Resolved config: group={:?} hub={:?} resources={}",
            config.group,
            config.hub_version,
            config.resources.len()
        );
        Ok(config)
    }
}
