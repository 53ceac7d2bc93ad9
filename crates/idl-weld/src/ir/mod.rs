//! Intermediate Representation (IR) for IDL schema trees
//!
//! This module provides the type system and declaration structures the
//! IDL parser's output is read into.

pub mod module;
pub mod symbol;
pub mod types;

pub use module::*;
pub use symbol::*;
pub use types::*;
