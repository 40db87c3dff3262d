//! Persisting generated files

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default permission bits for generated files
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Persists generated bytes at a path
pub trait FileWriter {
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Writes files to disk, replacing existing content
#[derive(Debug, Clone, Copy)]
pub struct FsWriter {
    mode: u32,
}

impl Default for FsWriter {
    fn default() -> Self {
        FsWriter {
            mode: DEFAULT_FILE_MODE,
        }
    }
}

impl FsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: u32) -> Self {
        FsWriter { mode }
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }
}

impl FileWriter for FsWriter {
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        debug!("Writing {} bytes to {:?}", contents.len(), path);
        fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(self.mode))?;
        }

        Ok(())
    }
}

/// Records the paths it is asked to write and leaves the disk alone
#[derive(Debug, Default)]
pub struct DryRunWriter {
    paths: RefCell<Vec<PathBuf>>,
}

impl DryRunWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.borrow().clone()
    }
}

impl FileWriter for DryRunWriter {
    fn write(&self, path: &Path, _contents: &[u8]) -> io::Result<()> {
        self.paths.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_writer_writes_bytes() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("zz_generated.conversion.go");
        assert!(FsWriter::new().write(&path, b"package v1alpha1\n").is_ok());
        assert_eq!(
            fs::read_to_string(&path).unwrap_or_default(),
            "package v1alpha1\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_writer_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("out.go");
        assert!(FsWriter::with_mode(0o600).write(&path, b"x").is_ok());
        let mode = fs::metadata(&path).map(|m| m.permissions().mode() & 0o777);
        assert_eq!(mode.ok(), Some(0o600));
    }

    #[test]
    fn test_fs_writer_missing_parent_fails() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("missing").join("out.go");
        assert!(FsWriter::new().write(&path, b"x").is_err());
    }

    #[test]
    fn test_dry_run_writer_records_paths() {
        let writer = DryRunWriter::new();
        assert!(writer.write(Path::new("a/out.go"), b"x").is_ok());
        assert!(writer.write(Path::new("b/out.go"), b"y").is_ok());
        assert_eq!(
            writer.paths(),
            vec![PathBuf::from("a/out.go"), PathBuf::from("b/out.go")]
        );
        assert!(!Path::new("a/out.go").exists());
    }
}
