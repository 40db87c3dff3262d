//! Generation config for convgen
//!
//! A `convgen.toml` file describes one API group: where the generated
//! sources live, which version is the hub, and the resource kinds declared
//! for the group. The file location can be overridden with `CONVGEN_CONFIG`.

use convgen_manifest::{
    ConversionGenerator, RegistryKeying, ResourceDescriptor, DEFAULT_FILE_MODE,
    DEFAULT_LICENSE_HEADER,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "CONVGEN_CONFIG";

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "convgen.toml";

/// Keys accepted by [`GenerationConfig::get`] and [`GenerationConfig::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "root-dir",
    "group",
    "hub-version",
    "license-header",
    "registry-keying",
    "file-mode",
];

/// Errors that can occur while loading or editing the config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown config key: {0}. Supported keys: {keys}", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_keying: Option<RegistryKeying>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDescriptor>,
}

impl GenerationConfig {
    /// Config file path, honoring `CONVGEN_CONFIG` when set and non-empty
    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Load from [`GenerationConfig::path`]; a missing file yields an empty config
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(GenerationConfig::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }

    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(self.root_dir.as_deref().unwrap_or("."))
    }

    /// License header path; relative paths are resolved against the root dir
    pub fn license_header_path(&self) -> PathBuf {
        let root = self.root_dir();
        match self.license_header.as_deref() {
            Some(header) if Path::new(header).is_absolute() => PathBuf::from(header),
            Some(header) => root.join(header),
            None => root.join(DEFAULT_LICENSE_HEADER),
        }
    }

    pub fn keying(&self) -> RegistryKeying {
        self.registry_keying.unwrap_or_default()
    }

    /// Permission bits for generated files, parsed from octal
    pub fn file_mode(&self) -> Result<u32, ConfigError> {
        match self.file_mode.as_deref() {
            None => Ok(DEFAULT_FILE_MODE),
            Some(mode) => parse_mode(mode),
        }
    }

    /// Check that a generator can be built: group and hub version set, file mode octal
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.required()?;
        self.file_mode()?;
        Ok(())
    }

    fn required(&self) -> Result<(&str, &str), ConfigError> {
        let group = self
            .group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .ok_or(ConfigError::Missing("group"))?;
        let hub_version = self
            .hub_version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("hub_version"))?;
        Ok((group, hub_version))
    }

    /// Build a generator from the config, checking the required settings
    pub fn generator(&self) -> Result<ConversionGenerator, ConfigError> {
        self.validate()?;
        let (group, hub_version) = self.required()?;

        Ok(ConversionGenerator::new(
            self.root_dir(),
            group,
            hub_version,
            self.license_header_path(),
        )
        .with_keying(self.keying()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "root-dir" => self.root_dir.clone(),
            "group" => self.group.clone(),
            "hub-version" => self.hub_version.clone(),
            "license-header" => self.license_header.clone(),
            "registry-keying" => self.registry_keying.map(|k| k.to_string()),
            "file-mode" => self.file_mode.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "root-dir" => self.root_dir = Some(value),
            "group" => self.group = Some(value),
            "hub-version" => self.hub_version = Some(value),
            "license-header" => self.license_header = Some(value),
            "registry-keying" => {
                let keying = value
                    .parse::<RegistryKeying>()
                    .map_err(|message| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message,
                    })?;
                self.registry_keying = Some(keying);
            }
            "file-mode" => {
                parse_mode(&value)?;
                self.file_mode = Some(value);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values_iter().is_empty() && self.resources.is_empty()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

fn parse_mode(mode: &str) -> Result<u32, ConfigError> {
    let digits = mode.trim().trim_start_matches("0o");
    match u32::from_str_radix(digits, 8) {
        Ok(bits) if bits <= 0o777 => Ok(bits),
        _ => Err(ConfigError::InvalidValue {
            key: "file-mode".to_string(),
            message: format!("'{}' is not an octal permission mode", mode),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
root_dir = "/work/provider"
group = "s3.aws.upbound.io"
hub_version = "v1beta1"
registry_keying = "qualified"

[[resources]]
kind = "Bucket"
short_group = "s3"

[[resources]]
kind = "BucketPolicy"
short_group = "s3"
"#;

    #[test]
    fn test_parse_sample() {
        let config: Result<GenerationConfig, _> = toml::from_str(SAMPLE);
        assert!(config.is_ok());
        let config = config.unwrap_or_default();

        assert_eq!(config.group.as_deref(), Some("s3.aws.upbound.io"));
        assert_eq!(config.keying(), RegistryKeying::Qualified);
        assert_eq!(config.resources.len(), 2);
        assert_eq!(config.resources[1], ResourceDescriptor::new("BucketPolicy", "s3"));
        assert_eq!(
            config.license_header_path(),
            PathBuf::from("/work/provider/hack/boilerplate.go.txt")
        );
    }

    #[test]
    fn test_generator_requires_group_and_hub() {
        let mut config = GenerationConfig::default();
        assert!(matches!(
            config.generator(),
            Err(ConfigError::Missing("group"))
        ));

        config.group = Some("s3.aws.upbound.io".to_string());
        assert!(matches!(
            config.generator(),
            Err(ConfigError::Missing("hub_version"))
        ));

        config.hub_version = Some("v1beta1".to_string());
        config.root_dir = Some("/work".to_string());
        let generator = config.generator();
        assert!(generator.is_ok());
        if let Ok(generator) = generator {
            assert_eq!(generator.scan_dir(), Path::new("/work/apis/s3"));
        }
    }

    #[test]
    fn test_validate() {
        let mut config = GenerationConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("group"))));

        config.group = Some("s3.aws.upbound.io".to_string());
        config.hub_version = Some("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("hub_version"))
        ));

        config.hub_version = Some("v1beta1".to_string());
        assert!(config.validate().is_ok());

        config.file_mode = Some("rw-r--r--".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.generator().is_err());
    }

    #[test]
    fn test_license_header_resolution() {
        let mut config = GenerationConfig {
            root_dir: Some("/work".to_string()),
            license_header: Some("LICENSE.txt".to_string()),
            ..Default::default()
        };
        assert_eq!(config.license_header_path(), PathBuf::from("/work/LICENSE.txt"));

        config.license_header = Some("/etc/header.txt".to_string());
        assert_eq!(config.license_header_path(), PathBuf::from("/etc/header.txt"));
    }

    #[test]
    fn test_file_mode() {
        let mut config = GenerationConfig::default();
        assert_eq!(config.file_mode().ok(), Some(DEFAULT_FILE_MODE));

        config.file_mode = Some("0o600".to_string());
        assert_eq!(config.file_mode().ok(), Some(0o600));

        config.file_mode = Some("999".to_string());
        assert!(config.file_mode().is_err());
    }

    #[test]
    fn test_get_set() {
        let mut config = GenerationConfig::default();
        assert!(config.is_empty());

        assert!(config.set("hub-version", "v1beta1".to_string()).is_ok());
        assert!(config.set("registry-keying", "qualified".to_string()).is_ok());
        assert!(config.set("registry-keying", "nested".to_string()).is_err());
        assert!(config.set("file-mode", "rw".to_string()).is_err());
        assert!(matches!(
            config.set("python-version", "3.12".to_string()),
            Err(ConfigError::UnknownKey(_))
        ));

        assert_eq!(config.get("hub-version").as_deref(), Some("v1beta1"));
        assert_eq!(
            config.values_iter(),
            vec![
                ("hub-version", "v1beta1".to_string()),
                ("registry-keying", "qualified".to_string()),
            ]
        );
    }

    #[test]
    fn test_save_and_load() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("nested").join("convgen.toml");
        let config: GenerationConfig = toml::from_str(SAMPLE).unwrap_or_default();

        assert!(config.save_to(&path).is_ok(), "Failed to save config");
        let loaded = GenerationConfig::load_from(&path);
        assert!(loaded.is_ok(), "Failed to load config");
        assert_eq!(loaded.unwrap_or_default(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = GenerationConfig::load_from(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
