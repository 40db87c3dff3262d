//! Data model for conversion generation
//!
//! Descriptors come in from type discovery, manifests go out to the renderer.
//! The serialized field names of [`RenderManifest`] and [`ResourceEntry`] are
//! the variable names the conversion template reads (`APIVersion`,
//! `Resources`, `CRD`, `Kind`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::registry::VersionRegistry;

/// A declared resource kind and the short API group it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub kind: String,
    pub short_group: String,
}

impl ResourceDescriptor {
    pub fn new(kind: impl Into<String>, short_group: impl Into<String>) -> Self {
        ResourceDescriptor {
            kind: kind.into(),
            short_group: short_group.into(),
        }
    }

    /// Registry key in the `ShortGroup.Kind` form
    pub fn qualified_key(&self) -> String {
        format!("{}.{}", self.short_group, self.kind)
    }

    /// Whether a filename-derived identifier names this kind
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.kind.to_lowercase() == identifier
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_key())
    }
}

/// Parses `<short_group>.<Kind>`, e.g. `s3.Bucket`
impl FromStr for ResourceDescriptor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((short_group, kind)) = s.split_once('.') else {
            return Err(format!(
                "invalid resource '{}': expected <short_group>.<Kind>",
                s
            ));
        };
        if short_group.is_empty() || kind.is_empty() || kind.contains('.') {
            return Err(format!(
                "invalid resource '{}': expected <short_group>.<Kind>",
                s
            ));
        }
        Ok(ResourceDescriptor::new(kind, short_group))
    }
}

/// Reference to the CRD a resource entry converts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdRef {
    #[serde(rename = "Kind")]
    pub kind: String,
}

/// One resource in a rendering manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(rename = "CRD")]
    pub crd: CrdRef,
}

impl ResourceEntry {
    pub fn new(kind: impl Into<String>) -> Self {
        ResourceEntry {
            crd: CrdRef { kind: kind.into() },
        }
    }

    pub fn kind(&self) -> &str {
        &self.crd.kind
    }
}

/// Per spoke version input handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderManifest {
    #[serde(rename = "APIVersion")]
    pub api_version: String,
    #[serde(rename = "Resources", default)]
    pub resources: Vec<ResourceEntry>,
}

impl RenderManifest {
    pub fn new(api_version: impl Into<String>) -> Self {
        RenderManifest {
            api_version: api_version.into(),
            resources: Vec::new(),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(ResourceEntry::kind)
    }
}

/// A conversion file the run is going to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    pub version: String,
    pub path: PathBuf,
    pub manifest: RenderManifest,
}

/// Result of scanning the version directories, before anything is rendered
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionPlan {
    pub scan_dir: PathBuf,
    pub files: Vec<PlannedFile>,
    pub registry: VersionRegistry,
}

impl ConversionPlan {
    pub fn spoke_versions(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.version.as_str())
    }
}

/// Outcome of a successful generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub registry: VersionRegistry,
}
