//! Hub to spoke version registry
//!
//! The registry maps a resource kind to the spoke versions it was found in.
//! It is built fresh by every run and handed back to the caller, so a
//! generator can be reused without carrying state between runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::types::ResourceDescriptor;

/// How appends to the registry are keyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKeying {
    /// Writes under `ShortGroup.Kind` but extends the list stored under the
    /// plain `Kind`. Reproduces the historical registry contents exactly.
    #[default]
    Legacy,
    /// Reads and writes under `ShortGroup.Kind`.
    Qualified,
}

impl fmt::Display for RegistryKeying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKeying::Legacy => write!(f, "legacy"),
            RegistryKeying::Qualified => write!(f, "qualified"),
        }
    }
}

impl FromStr for RegistryKeying {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(RegistryKeying::Legacy),
            "qualified" => Ok(RegistryKeying::Qualified),
            other => Err(format!(
                "unknown registry keying '{}': expected 'legacy' or 'qualified'",
                other
            )),
        }
    }
}

/// Append-only mapping from registry key to spoke versions in scan order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRegistry {
    entries: BTreeMap<String, Vec<String>>,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `descriptor` exists in the spoke `version`
    pub fn record(&mut self, descriptor: &ResourceDescriptor, version: &str, keying: RegistryKeying) {
        let key = descriptor.qualified_key();
        let mut versions = match keying {
            RegistryKeying::Legacy => self.entries.get(&descriptor.kind),
            RegistryKeying::Qualified => self.entries.get(&key),
        }
        .cloned()
        .unwrap_or_default();
        versions.push(version.to_string());
        self.entries.insert(key, versions);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, versions)| (key.as_str(), versions.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
