//! BindingBuilder for build.rs scripts
//!
//! Generates a binding module from a schema file into `OUT_DIR` so the host
//! crate can `include!` it.

use crate::error::{GenerateError, Result};
use crate::options::GeneratorOptions;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builder for generated binding modules
///
/// Handles:
/// - resolving the schema path against the crate root
/// - generating the module into `OUT_DIR`
/// - cargo:rerun-if-changed directives
///
/// # Example
/// ```ignore
/// use idl_weld::build::BindingBuilder;
///
/// fn main() {
///     BindingBuilder::new("idl/dom.json")
///         .include("crate::dom::*")
///         .build()
///         .expect("Failed to generate bindings");
/// }
/// ```
///
/// and in the crate:
///
/// ```ignore
/// mod bindings {
///     include!(concat!(env!("OUT_DIR"), "/dom.rs"));
/// }
/// ```
pub struct BindingBuilder {
    schema_path: PathBuf,
    options: GeneratorOptions,
    output_name: Option<String>,
    additional_watch: Vec<PathBuf>,
}

impl BindingBuilder {
    /// Create a new binding builder for a schema file (relative to the
    /// crate root)
    pub fn new(schema_path: impl AsRef<Path>) -> Self {
        Self {
            schema_path: schema_path.as_ref().to_path_buf(),
            options: GeneratorOptions::default(),
            output_name: None,
            additional_watch: Vec::new(),
        }
    }

    /// Replace the generator options
    pub fn options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Add an extra `use` path to the generated module
    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.options = self.options.with_include(include);
        self
    }

    /// Suppress global exposure
    pub fn no_expose(mut self) -> Self {
        self.options = self.options.without_exposure();
        self
    }

    /// Set the output file name (default: schema stem + `.rs`)
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Add an additional file to watch for changes
    pub fn watch(mut self, path: impl AsRef<Path>) -> Self {
        self.additional_watch.push(path.as_ref().to_path_buf());
        self
    }

    /// Generate into `OUT_DIR` and return the written path
    pub fn build(self) -> Result<PathBuf> {
        let out_dir = env::var("OUT_DIR")
            .map_err(|_| GenerateError::EnvVarMissing("OUT_DIR".to_string()))?;
        let manifest_dir = env::var("CARGO_MANIFEST_DIR")
            .map_err(|_| GenerateError::EnvVarMissing("CARGO_MANIFEST_DIR".to_string()))?;

        let schema_path = Path::new(&manifest_dir).join(&self.schema_path);
        self.generate(&schema_path, Path::new(&out_dir))
    }

    /// Generate into `out_dir` with the schema path taken as given
    pub fn build_into(self, out_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let schema_path = self.schema_path.clone();
        self.generate(&schema_path, out_dir.as_ref())
    }

    fn output_file_name(&self) -> String {
        match &self.output_name {
            Some(name) => name.clone(),
            None => {
                let stem = self
                    .schema_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "bindings".to_string());
                format!("{}.rs", stem)
            }
        }
    }

    fn generate(self, schema_path: &Path, out_dir: &Path) -> Result<PathBuf> {
        if !schema_path.exists() {
            return Err(GenerateError::SchemaNotFound(schema_path.to_path_buf()));
        }
        println!("cargo:rerun-if-changed={}", self.schema_path.display());

        let mut options = self.options.clone();
        if options.source_name.is_none() {
            if let Some(name) = schema_path.file_name() {
                options.source_name = Some(name.to_string_lossy().into_owned());
            }
        }

        let source = crate::generate_file(schema_path, &options)?;
        fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join(self.output_file_name());
        fs::write(&out_path, source)?;
        debug!(path = %out_path.display(), "wrote binding module");

        for watch_path in &self.additional_watch {
            println!("cargo:rerun-if-changed={}", watch_path.display());
        }

        Ok(out_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(BindingBuilder::new("idl/dom.json").output_file_name(), "dom.rs");
        assert_eq!(
            BindingBuilder::new("idl/dom.json")
                .output_name("bindings.rs")
                .output_file_name(),
            "bindings.rs"
        );
    }

    #[test]
    fn test_options_compose() {
        let builder = BindingBuilder::new("dom.json")
            .include("crate::dom::*")
            .no_expose();
        assert_eq!(builder.options.includes, vec!["crate::dom::*"]);
        assert!(!builder.options.expose);
    }

    #[test]
    fn test_missing_schema() {
        let dir = tempfile::tempdir().unwrap();
        let result = BindingBuilder::new(dir.path().join("missing.json")).build_into(dir.path());
        assert!(matches!(result, Err(GenerateError::SchemaNotFound(_))));
    }

    #[test]
    fn test_build_into() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("shapes.json");
        fs::write(
            &schema,
            r#"{ "declarations": [ { "kind": "enum", "name": "Shape", "values": ["circle"] } ] }"#,
        )
        .unwrap();

        let out_dir = dir.path().join("out");
        let path = BindingBuilder::new(&schema).build_into(&out_dir).unwrap();
        assert_eq!(path, out_dir.join("shapes.rs"));

        let source = fs::read_to_string(path).unwrap();
        assert!(source.starts_with("// Generated by idl-weld from `shapes.json`. Do not edit.\n"));
        assert!(source.contains("pub enum Shape {"));
    }
}
