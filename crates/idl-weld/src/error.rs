//! Generation-time errors
//!
//! Every error here is fatal: generation stops and no output is produced.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a schema or emitting bindings
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An `includes` statement names an undeclared mixin or target
    #[error("Cannot resolve `{target} includes {mixin}`: `{missing}` is not declared")]
    UndeclaredInclude {
        target: String,
        mixin: String,
        missing: String,
    },

    /// A dictionary inherits from an undeclared parent
    #[error("Dictionary `{dictionary}` inherits from undeclared `{parent}`")]
    UndeclaredParent { dictionary: String, parent: String },

    /// Dictionary inheritance loops back on itself
    #[error("Dictionary inheritance cycle through `{0}`")]
    InheritanceCycle(String),

    /// A typedef refers back to itself
    #[error("Typedef cycle through `{0}`")]
    TypedefCycle(String),

    /// Two declarations share one name
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// A type expression could not be parsed
    #[error("Invalid type expression `{expr}`: {reason}")]
    InvalidType { expr: String, reason: String },

    /// A type name with no known converter
    #[error("No converter for type `{0}`; it is not declared in the schema")]
    UnknownType(String),

    /// Malformed schema JSON
    #[error("Malformed schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// Malformed TOML configuration
    #[error("Malformed configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The assembled module is not valid Rust
    #[error("Generated output is not valid Rust: {0}")]
    InvalidOutput(String),

    /// Schema file not found
    #[error("Schema not found: {0}")]
    SchemaNotFound(PathBuf),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarMissing(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
