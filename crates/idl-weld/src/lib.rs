//! idl-weld: WebIDL binding generator
//!
//! Reads a parsed IDL schema tree (JSON) and emits one Rust module of
//! marshaling and dispatch glue that binds native Rust types to a dynamic
//! host runtime through `idl-weld-runtime`.
//!
//! # Architecture
//!
//! - `ir`: Schema tree: declarations, members, type expressions
//! - `resolve`: Partial, mixin and dictionary-inheritance merging
//! - `registry`: Converter registry and IDL-to-native type mapping
//! - `codegen`: Rust emitters and module assembly
//! - `options`: Generator configuration
//! - `build`: Build script utilities for binding host crates
//!
//! # Usage
//!
//! In your crate's `build.rs`:
//!
//! ```rust,ignore
//! use idl_weld::build::BindingBuilder;
//!
//! fn main() {
//!     BindingBuilder::new("idl/dom.json")
//!         .include("crate::dom::*")
//!         .build()
//!         .expect("Failed to generate bindings");
//! }
//! ```
//!
//! Or directly:
//!
//! ```rust,ignore
//! let source = idl_weld::generate(&json, &GeneratorOptions::default())?;
//! ```

pub mod build;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod options;
pub mod registry;
pub mod resolve;

pub use build::BindingBuilder;
pub use codegen::{
    DictionaryGenerator, EnumGenerator, InterfaceGenerator, ModuleGenerator, SourceWriter,
};
pub use error::{GenerateError, Result};
pub use ir::{
    Argument, Attribute, Builtin, Declaration, Dictionary, DictionaryMember, Enumeration, ExtAttr,
    IdlType, Interface, Member, Mixin, Operation, Schema, Signature, Typedef, WireType,
};
pub use options::GeneratorOptions;
pub use registry::{ConverterRegistry, TypeMapping};
pub use resolve::{ResolvedInterface, ResolvedSchema};

use std::path::Path;
use tracing::debug;

/// Generate a binding module from schema JSON
pub fn generate(json: &str, options: &GeneratorOptions) -> Result<String> {
    generate_schema(&Schema::from_json(json)?, options)
}

/// Generate a binding module from a schema tree
pub fn generate_schema(schema: &Schema, options: &GeneratorOptions) -> Result<String> {
    debug!(declarations = schema.declarations.len(), "generating bindings");
    let resolved = ResolvedSchema::resolve(schema)?;
    let registry = ConverterRegistry::new(&resolved)?;
    ModuleGenerator::new(&resolved, &registry, options).generate()
}

/// Generate a binding module from a schema file
pub fn generate_file(path: impl AsRef<Path>, options: &GeneratorOptions) -> Result<String> {
    generate_schema(&Schema::from_file(path)?, options)
}
