//! Schema tree for one IDL document
//!
//! The IDL parser serializes a document as `{ "declarations": [...] }`;
//! [`Schema`] is that document on the Rust side.

use crate::error::{GenerateError, Result};
use crate::ir::{Declaration, Dictionary, Enumeration, Includes, Interface, Mixin, Typedef};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every declaration of one IDL document, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Schema {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema tree from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a schema tree file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GenerateError::SchemaNotFound(path.to_path_buf()));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add any declaration
    pub fn declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Add an interface
    pub fn interface(self, interface: Interface) -> Self {
        self.declaration(Declaration::Interface(interface))
    }

    /// Add a partial interface
    pub fn partial(self, partial: Interface) -> Self {
        self.declaration(Declaration::PartialInterface(partial))
    }

    /// Add a mixin
    pub fn mixin(self, mixin: Mixin) -> Self {
        self.declaration(Declaration::InterfaceMixin(mixin))
    }

    /// Add an `includes` statement
    pub fn includes(self, target: impl Into<String>, mixin: impl Into<String>) -> Self {
        self.declaration(Declaration::Includes(Includes {
            target: target.into(),
            mixin: mixin.into(),
        }))
    }

    /// Add a dictionary
    pub fn dictionary(self, dictionary: Dictionary) -> Self {
        self.declaration(Declaration::Dictionary(dictionary))
    }

    /// Add an enum
    pub fn enumeration(self, enumeration: Enumeration) -> Self {
        self.declaration(Declaration::Enum(enumeration))
    }

    /// Add a typedef
    pub fn typedef(self, typedef: Typedef) -> Self {
        self.declaration(Declaration::Typedef(typedef))
    }
}
