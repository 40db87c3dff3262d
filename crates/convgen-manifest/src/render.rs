//! Rendering of conversion source files
//!
//! A [`Renderer`] turns one [`RenderManifest`] into the bytes of a source
//! file. [`ConvertibleRenderer`] is the default and emits Go code implementing
//! the controller-runtime `conversion.Convertible` interface for every
//! resource in the manifest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::RenderManifest;

/// Statement marking the output as generated
pub const GEN_STATEMENT: &str = "// Code generated by upjet. DO NOT EDIT.";

const CONVERSION_IMPORTS: &[(&str, &str)] = &[
    ("ujconversion", "github.com/crossplane/upjet/pkg/controller/conversion"),
    ("", "github.com/crossplane/upjet/pkg/resource"),
    ("", "github.com/pkg/errors"),
    ("", "sigs.k8s.io/controller-runtime/pkg/conversion"),
];

/// Errors raised while turning a manifest into source text
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot read the license header {}: {source}", path.display())]
    HeaderRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid template input: {0}")]
    Template(String),
}

/// Produces source bytes for a rendering manifest
pub trait Renderer {
    fn render(&self, manifest: &RenderManifest, license_header: &Path)
        -> Result<Vec<u8>, RenderError>;
}

/// Renders `conversion.Convertible` implementations as Go source
#[derive(Debug, Clone)]
pub struct ConvertibleRenderer {
    gen_statement: String,
}

impl Default for ConvertibleRenderer {
    fn default() -> Self {
        ConvertibleRenderer {
            gen_statement: GEN_STATEMENT.to_string(),
        }
    }
}

impl ConvertibleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gen_statement(mut self, statement: impl Into<String>) -> Self {
        self.gen_statement = statement.into();
        self
    }

    /// Render without reading a header file
    pub fn render_with_header(
        &self,
        manifest: &RenderManifest,
        header: &str,
    ) -> Result<String, RenderError> {
        if !is_identifier(&manifest.api_version) {
            return Err(RenderError::Template(format!(
                "APIVersion '{}' is not a valid package name",
                manifest.api_version
            )));
        }
        if let Some(kind) = manifest.kinds().find(|kind| !is_identifier(kind)) {
            return Err(RenderError::Template(format!(
                "Kind '{}' is not a valid type name",
                kind
            )));
        }

        let mut out = String::new();
        let header = header.trim_end();
        if !header.is_empty() {
            out.push_str(header);
            out.push_str("\n\n");
        }
        if !self.gen_statement.is_empty() {
            out.push_str(&self.gen_statement);
            out.push_str("\n\n");
        }
        out.push_str(&format!("package {}\n", manifest.api_version));

        if manifest.resources.is_empty() {
            return Ok(out);
        }

        out.push_str("\nimport (\n");
        for (alias, path) in CONVERSION_IMPORTS {
            if alias.is_empty() {
                out.push_str(&format!("\t\"{}\"\n", path));
            } else {
                out.push_str(&format!("\t{} \"{}\"\n", alias, path));
            }
        }
        out.push_str(")\n");

        for kind in manifest.kinds() {
            out.push('\n');
            out.push_str(&convert_to(kind));
            out.push('\n');
            out.push_str(&convert_from(kind));
        }
        Ok(out)
    }
}

impl Renderer for ConvertibleRenderer {
    fn render(
        &self,
        manifest: &RenderManifest,
        license_header: &Path,
    ) -> Result<Vec<u8>, RenderError> {
        let header =
            fs::read_to_string(license_header).map_err(|source| RenderError::HeaderRead {
                path: license_header.to_path_buf(),
                source,
            })?;
        self.render_with_header(manifest, &header)
            .map(String::into_bytes)
    }
}

fn convert_to(kind: &str) -> String {
    format!(
        r#"// ConvertTo converts this {kind} to the hub type.
func (tr *{kind}) ConvertTo(dstRaw conversion.Hub) error {{
	spokeVersion := tr.GetObjectKind().GroupVersionKind().Version
	hubVersion := dstRaw.GetObjectKind().GroupVersionKind().Version
	if err := ujconversion.RoundTrip(dstRaw.(resource.Terraformed), tr); err != nil {{
		return errors.Wrapf(err, "cannot convert from the spoke version %q to the hub version %q", spokeVersion, hubVersion)
	}}
	return nil
}}
"#
    )
}

fn convert_from(kind: &str) -> String {
    format!(
        r#"// ConvertFrom converts from the hub type to the {kind} type.
func (tr *{kind}) ConvertFrom(srcRaw conversion.Hub) error {{
	spokeVersion := tr.GetObjectKind().GroupVersionKind().Version
	hubVersion := srcRaw.GetObjectKind().GroupVersionKind().Version
	if err := ujconversion.RoundTrip(tr, srcRaw.(resource.Terraformed)); err != nil {{
		return errors.Wrapf(err, "cannot convert from the hub version %q to the spoke version %q", hubVersion, spokeVersion)
	}}
	return nil
}}
"#
    )
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
