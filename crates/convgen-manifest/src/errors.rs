use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::render::RenderError;

/// Errors that abort a conversion generation run
///
/// Every variant carries the path that was being processed. None of them is
/// recovered inside the crate: the first failure ends the run.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("cannot list the directory entries of {}: {source}", path.display())]
    DirectoryList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot render the conversion functions file {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("cannot write the conversion functions file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerationError {
    /// Path of the directory or file the failure refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            GenerationError::DirectoryList { path, .. }
            | GenerationError::Render { path, .. }
            | GenerationError::Write { path, .. } => path,
        }
    }
}
