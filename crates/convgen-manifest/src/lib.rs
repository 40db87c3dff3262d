//! Conversion manifest building for schema-versioned resources
//!
//! Given the declared resource kinds of an API group and its hub version,
//! this crate discovers the spoke versions on disk, matches generated type
//! files back to resource kinds, builds the hub/spoke version registry and
//! produces one rendering manifest per spoke version.
//!
//! Listing, rendering and writing are delegated to the [`DirectoryLister`],
//! [`Renderer`] and [`FileWriter`] traits, with [`FsLister`],
//! [`ConvertibleRenderer`] and [`FsWriter`] as the defaults.

pub mod errors;
pub mod generator;
pub mod registry;
pub mod render;
pub mod scanner;
pub mod types;
pub mod writer;

pub use errors::GenerationError;
pub use generator::{ConversionGenerator, CONVERSION_FILE_NAME, DEFAULT_LICENSE_HEADER};
pub use registry::{RegistryKeying, VersionRegistry};
pub use render::{ConvertibleRenderer, RenderError, Renderer};
pub use scanner::{DirEntryInfo, DirectoryLister, FsLister};
pub use types::{
    ConversionPlan, CrdRef, GenerationReport, PlannedFile, RenderManifest, ResourceDescriptor,
    ResourceEntry,
};
pub use writer::{DryRunWriter, FileWriter, FsWriter, DEFAULT_FILE_MODE};
