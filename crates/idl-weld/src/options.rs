//! Generator configuration
//!
//! Options are plain serde data so the CLI can read them from a TOML file
//! (`--config`) and layer its flags on top. Every field has a default:
//!
//! ```toml
//! includes = ["crate::native::*"]
//! expose = true
//! runtime_crate = "idl_weld_runtime"
//! source_name = "dom.json"
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_RUNTIME_CRATE: &str = "idl_weld_runtime";

/// Options controlling one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Extra `use` paths injected after the prelude import
    pub includes: Vec<String>,
    /// Attach `[Exposed]` interfaces to global prototypes
    pub expose: bool,
    /// Crate path generated code imports its prelude from
    pub runtime_crate: String,
    /// Source document named in the header comment
    pub source_name: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            expose: true,
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            source_name: None,
        }
    }
}

impl GeneratorOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Add an extra `use` path
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.includes.push(include.into());
        self
    }

    /// Suppress global exposure
    pub fn without_exposure(mut self) -> Self {
        self.expose = false;
        self
    }

    pub fn with_runtime_crate(mut self, runtime_crate: impl Into<String>) -> Self {
        self.runtime_crate = runtime_crate.into();
        self
    }

    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    /// Include paths as bare paths, accepting `use x;` spellings too
    pub fn include_paths(&self) -> Vec<String> {
        self.includes
            .iter()
            .map(|include| {
                let path = include.trim();
                let path = path.strip_prefix("use ").unwrap_or(path).trim();
                path.strip_suffix(';').unwrap_or(path).trim().to_string()
            })
            .filter(|path| !path.is_empty())
            .collect()
    }
}
