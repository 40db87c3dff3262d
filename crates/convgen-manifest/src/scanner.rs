//! Version directory scanning
//!
//! Generated type files follow the `zz_<kind>_types.<ext>` naming convention.
//! The filename is the only link between a file and the kind it declares.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::GenerationError;
use crate::types::ResourceDescriptor;

static TYPE_FILE_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^zz_(.+)_types\.[A-Za-z0-9]+$").ok());

/// A direct child of a scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Lists the direct children of a directory
pub trait DirectoryLister {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, GenerationError>;
}

/// Lists directories on the local filesystem with [`list_dir`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, GenerationError> {
        list_dir(dir)
    }
}

/// Directory the version directories live in: `<root>/apis/<group prefix>`
pub fn scan_dir(root_dir: &Path, group: &str) -> PathBuf {
    let prefix = group.split('.').next().unwrap_or_default().to_lowercase();
    root_dir.join("apis").join(prefix)
}

/// List the direct children of `dir`, sorted by file name
pub fn list_dir(dir: &Path) -> Result<Vec<DirEntryInfo>, GenerationError> {
    let wrap = |source: std::io::Error| GenerationError::DirectoryList {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(wrap)? {
        let entry = entry.map_err(wrap)?;
        let file_type = entry.file_type().map_err(wrap)?;
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Lowercase kind identifier of a generated type file, if the name matches
pub fn type_identifier(file_name: &str) -> Option<&str> {
    TYPE_FILE_PATTERN
        .as_ref()?
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First descriptor, in input order, whose lowercase kind equals `identifier`
pub fn find_descriptor<'a>(
    descriptors: &'a [ResourceDescriptor],
    identifier: &str,
) -> Option<&'a ResourceDescriptor> {
    descriptors.iter().find(|d| d.matches_identifier(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_dir_uses_first_group_segment() {
        let dir = scan_dir(Path::new("/work"), "S3.aws.upbound.io");
        assert_eq!(dir, PathBuf::from("/work/apis/s3"));

        let dir = scan_dir(Path::new("/work"), "ec2");
        assert_eq!(dir, PathBuf::from("/work/apis/ec2"));
    }

    #[test]
    fn test_type_identifier() {
        assert_eq!(type_identifier("zz_bucket_types.go"), Some("bucket"));
        assert_eq!(
            type_identifier("zz_bucketpolicy_types.rs"),
            Some("bucketpolicy")
        );
        assert_eq!(type_identifier("zz_generated.conversion.go"), None);
        assert_eq!(type_identifier("zz_generated_terraformed.go"), None);
        assert_eq!(type_identifier("bucket_types.go"), None);
        assert_eq!(type_identifier("zz__types.go"), None);
        assert_eq!(type_identifier("zz_bucket_types"), None);
        assert_eq!(type_identifier("zz_bucket_types.go.bak"), None);
    }

    #[test]
    fn test_find_descriptor_first_match_wins() {
        let descriptors = vec![
            ResourceDescriptor::new("Bucket", "s3"),
            ResourceDescriptor::new("Bucket", "s3control"),
            ResourceDescriptor::new("Queue", "sqs"),
        ];
        let found = find_descriptor(&descriptors, "bucket");
        assert_eq!(found.map(|d| d.short_group.as_str()), Some("s3"));
        assert!(find_descriptor(&descriptors, "topic").is_none());
    }

    #[test]
    fn test_list_dir_sorted() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        assert!(fs::create_dir(root.join("v1beta1")).is_ok());
        assert!(fs::create_dir(root.join("v1alpha1")).is_ok());
        assert!(fs::write(root.join("doc.go"), "package s3").is_ok());

        let entries = list_dir(root);
        assert!(entries.is_ok());
        let entries = entries.unwrap_or_default();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["doc.go", "v1alpha1", "v1beta1"]);
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
    }

    #[test]
    fn test_list_dir_missing() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let missing = temp_dir.path().join("apis");
        match list_dir(&missing) {
            Err(GenerationError::DirectoryList { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected DirectoryList error, got {:?}", other),
        }
    }
}
