//! Conversion file generator
//!
//! Scans `<root>/apis/<group prefix>/` for version directories. Every
//! directory other than the hub version is a spoke, and gets one
//! `zz_generated.conversion.go` listing the resource kinds found in it.
//!
//! A run is fail-fast and happens in three phases: plan every spoke, render
//! every manifest, then write every file. Listing and render failures
//! therefore leave the tree untouched.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::GenerationError;
use crate::registry::{RegistryKeying, VersionRegistry};
use crate::render::Renderer;
use crate::scanner::{find_descriptor, scan_dir, type_identifier, DirectoryLister, FsLister};
use crate::types::{
    ConversionPlan, GenerationReport, PlannedFile, RenderManifest, ResourceDescriptor,
    ResourceEntry,
};
use crate::writer::FileWriter;

/// Name of the file generated in every spoke version directory
pub const CONVERSION_FILE_NAME: &str = "zz_generated.conversion.go";

/// Default license header location, relative to the root directory
pub const DEFAULT_LICENSE_HEADER: &str = "hack/boilerplate.go.txt";

/// Generates `conversion.Convertible` functions for the spoke versions of an API group
#[derive(Debug, Clone)]
pub struct ConversionGenerator {
    scan_dir: PathBuf,
    license_header_path: PathBuf,
    hub_version: String,
    keying: RegistryKeying,
}

impl ConversionGenerator {
    pub fn new(
        root_dir: impl AsRef<Path>,
        group: &str,
        hub_version: impl Into<String>,
        license_header_path: impl Into<PathBuf>,
    ) -> Self {
        ConversionGenerator {
            scan_dir: scan_dir(root_dir.as_ref(), group),
            license_header_path: license_header_path.into(),
            hub_version: hub_version.into(),
            keying: RegistryKeying::default(),
        }
    }

    /// Generator using the license header at `<root>/hack/boilerplate.go.txt`
    pub fn for_root(root_dir: impl AsRef<Path>, group: &str, hub_version: impl Into<String>) -> Self {
        let root_dir = root_dir.as_ref();
        Self::new(
            root_dir,
            group,
            hub_version,
            root_dir.join(DEFAULT_LICENSE_HEADER),
        )
    }

    pub fn with_keying(mut self, keying: RegistryKeying) -> Self {
        self.keying = keying;
        self
    }

    pub fn scan_dir(&self) -> &Path {
        &self.scan_dir
    }

    pub fn license_header_path(&self) -> &Path {
        &self.license_header_path
    }

    pub fn hub_version(&self) -> &str {
        &self.hub_version
    }

    /// Scan every spoke version and build its manifest without rendering anything
    pub fn plan(&self, descriptors: &[ResourceDescriptor]) -> Result<ConversionPlan, GenerationError> {
        self.plan_with(descriptors, &FsLister)
    }

    /// [`ConversionGenerator::plan`] with directory listing supplied by `lister`
    pub fn plan_with(
        &self,
        descriptors: &[ResourceDescriptor],
        lister: &dyn DirectoryLister,
    ) -> Result<ConversionPlan, GenerationError> {
        let mut plan = ConversionPlan {
            scan_dir: self.scan_dir.clone(),
            ..Default::default()
        };

        for entry in lister.list(&self.scan_dir)? {
            if !entry.is_dir || entry.name == self.hub_version {
                // the hub has nothing to convert to
                continue;
            }
            let manifest = self.spoke_manifest(
                &entry.name,
                &entry.path,
                descriptors,
                lister,
                &mut plan.registry,
            )?;
            plan.files.push(PlannedFile {
                version: entry.name,
                path: entry.path.join(CONVERSION_FILE_NAME),
                manifest,
            });
        }

        debug!(
            "Planned {} conversion files under {:?}",
            plan.files.len(),
            self.scan_dir
        );
        Ok(plan)
    }

    /// Plan, render and write the conversion files for every spoke version
    pub fn generate(
        &self,
        descriptors: &[ResourceDescriptor],
        renderer: &dyn Renderer,
        writer: &dyn FileWriter,
    ) -> Result<GenerationReport, GenerationError> {
        self.generate_with(descriptors, &FsLister, renderer, writer)
    }

    /// [`ConversionGenerator::generate`] with directory listing supplied by `lister`
    pub fn generate_with(
        &self,
        descriptors: &[ResourceDescriptor],
        lister: &dyn DirectoryLister,
        renderer: &dyn Renderer,
        writer: &dyn FileWriter,
    ) -> Result<GenerationReport, GenerationError> {
        let plan = self.plan_with(descriptors, lister)?;

        let mut rendered = Vec::with_capacity(plan.files.len());
        for file in &plan.files {
            let bytes = renderer
                .render(&file.manifest, &self.license_header_path)
                .map_err(|source| GenerationError::Render {
                    path: file.path.clone(),
                    source,
                })?;
            rendered.push((file.path.clone(), bytes));
        }

        let mut written = Vec::with_capacity(rendered.len());
        for (path, bytes) in rendered {
            writer
                .write(&path, &bytes)
                .map_err(|source| GenerationError::Write {
                    path: path.clone(),
                    source,
                })?;
            info!("Generated conversion functions file: {:?}", path);
            written.push(path);
        }

        Ok(GenerationReport {
            written,
            registry: plan.registry,
        })
    }

    fn spoke_manifest(
        &self,
        version: &str,
        version_dir: &Path,
        descriptors: &[ResourceDescriptor],
        lister: &dyn DirectoryLister,
        registry: &mut VersionRegistry,
    ) -> Result<RenderManifest, GenerationError> {
        let mut manifest = RenderManifest::new(version);
        let mut seen = HashSet::new();

        for file in lister.list(version_dir)? {
            if file.is_dir {
                continue;
            }
            let Some(identifier) = type_identifier(&file.name) else {
                continue;
            };
            let Some(descriptor) = find_descriptor(descriptors, identifier) else {
                // no hub counterpart in this run, nothing to convert
                debug!("Skipping {} in {}: no matching resource", file.name, version);
                continue;
            };

            if !seen.insert(descriptor.qualified_key()) {
                // e.g. zz_bucket_types.go next to zz_bucket_types.orig
                debug!("Skipping {} in {}: {} already found", file.name, version, descriptor);
                continue;
            }

            debug!("Found {} in spoke version {}", descriptor, version);
            manifest.resources.push(ResourceEntry::new(&descriptor.kind));
            registry.record(descriptor, version, self.keying);
        }

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ConvertibleRenderer, RenderError};
    use crate::writer::DryRunWriter;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(path: &Path) {
        if let Some(parent) = path.parent() {
            assert!(fs::create_dir_all(parent).is_ok());
        }
        assert!(fs::write(path, "package x\n").is_ok());
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _: &RenderManifest, _: &Path) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Template("boom".to_string()))
        }
    }

    #[test]
    fn test_scan_dir_from_group() {
        let generator = ConversionGenerator::for_root("/work", "s3.aws.upbound.io", "v1beta1");
        assert_eq!(generator.scan_dir(), Path::new("/work/apis/s3"));
        assert_eq!(
            generator.license_header_path(),
            Path::new("/work/hack/boilerplate.go.txt")
        );
        assert_eq!(generator.hub_version(), "v1beta1");
    }

    #[test]
    fn test_plan_skips_hub_and_files() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let apis = temp_dir.path().join("apis").join("s3");
        write_file(&apis.join("v1alpha1").join("zz_bucket_types.go"));
        write_file(&apis.join("v1beta1").join("zz_bucket_types.go"));
        write_file(&apis.join("zz_register.go"));

        let generator = ConversionGenerator::for_root(temp_dir.path(), "s3.aws", "v1beta1");
        let plan = generator.plan(&[ResourceDescriptor::new("Bucket", "s3")]);
        assert!(plan.is_ok());
        let plan = plan.unwrap_or_default();

        assert_eq!(plan.spoke_versions().collect::<Vec<_>>(), vec!["v1alpha1"]);
        assert_eq!(
            plan.files[0].path,
            apis.join("v1alpha1").join(CONVERSION_FILE_NAME)
        );
        assert_eq!(plan.files[0].manifest.kinds().collect::<Vec<_>>(), vec!["Bucket"]);
    }

    #[test]
    fn test_plan_ignores_nested_dirs_and_unknown_kinds() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let v1 = temp_dir.path().join("apis").join("s3").join("v1");
        write_file(&v1.join("zz_queue_types.go"));
        write_file(&v1.join("README.md"));
        assert!(fs::create_dir_all(v1.join("zz_bucket_types.go")).is_ok());

        let generator = ConversionGenerator::for_root(temp_dir.path(), "s3", "v2");
        let plan = generator
            .plan(&[ResourceDescriptor::new("Bucket", "s3")])
            .unwrap_or_default();

        assert_eq!(plan.files.len(), 1);
        assert!(plan.files[0].manifest.resources.is_empty());
        assert!(plan.registry.is_empty());
    }

    #[test]
    fn test_kind_recorded_once_per_version() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let v1alpha1 = temp_dir.path().join("apis").join("s3").join("v1alpha1");
        write_file(&v1alpha1.join("zz_bucket_types.go"));
        write_file(&v1alpha1.join("zz_bucket_types.orig"));

        let generator = ConversionGenerator::for_root(temp_dir.path(), "s3", "v1beta1")
            .with_keying(RegistryKeying::Qualified);
        let plan = generator
            .plan(&[ResourceDescriptor::new("Bucket", "s3")])
            .unwrap_or_default();

        assert_eq!(plan.files.len(), 1);
        assert_eq!(plan.files[0].manifest.kinds().collect::<Vec<_>>(), vec!["Bucket"]);
        assert_eq!(
            plan.registry.get("s3.Bucket"),
            Some(&["v1alpha1".to_string()][..])
        );

        let text = ConvertibleRenderer::new()
            .render_with_header(&plan.files[0].manifest, "")
            .unwrap_or_default();
        assert_eq!(text.matches("ConvertTo(dstRaw").count(), 1);
    }

    #[test]
    fn test_generate_with_dry_run_writer() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let apis = temp_dir.path().join("apis").join("s3");
        write_file(&apis.join("v1alpha1").join("zz_bucket_types.go"));
        write_file(&apis.join("v1alpha2").join("zz_bucket_types.go"));
        assert!(fs::create_dir_all(apis.join("v1beta1")).is_ok());
        write_file(&temp_dir.path().join(DEFAULT_LICENSE_HEADER));

        let writer = DryRunWriter::new();
        let generator = ConversionGenerator::for_root(temp_dir.path(), "s3", "v1beta1")
            .with_keying(RegistryKeying::Qualified);
        let report = generator.generate(
            &[ResourceDescriptor::new("Bucket", "s3")],
            &ConvertibleRenderer::new(),
            &writer,
        );
        assert!(report.is_ok());
        let report = report.unwrap_or_default();

        assert_eq!(writer.paths(), report.written);
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            report.registry.get("s3.Bucket"),
            Some(&["v1alpha1".to_string(), "v1alpha2".to_string()][..])
        );
        assert!(!apis.join("v1alpha1").join(CONVERSION_FILE_NAME).exists());
    }

    #[test]
    fn test_render_failure_writes_nothing() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let apis = temp_dir.path().join("apis").join("s3");
        write_file(&apis.join("v1alpha1").join("zz_bucket_types.go"));

        let writer = DryRunWriter::new();
        let generator = ConversionGenerator::for_root(temp_dir.path(), "s3", "v1beta1");
        let result = generator.generate(
            &[ResourceDescriptor::new("Bucket", "s3")],
            &FailingRenderer,
            &writer,
        );

        match result {
            Err(GenerationError::Render { path, .. }) => {
                assert_eq!(path, apis.join("v1alpha1").join(CONVERSION_FILE_NAME));
            }
            other => panic!("expected Render error, got {:?}", other),
        }
        assert!(writer.paths().is_empty());
    }
}
