//! Rust code generation for binding modules
//!
//! This module provides generators for:
//! - enum definitions and converters
//! - dictionary structs, converters and typedef aliases
//! - interface converters, callbacks and class initialization
//! - whole-module assembly and the `init` entry point

pub mod dictionary;
pub mod enums;
pub mod interface;
pub mod module;
pub mod writer;

pub use dictionary::{generate_typedef, DictionaryGenerator};
pub use enums::EnumGenerator;
pub use interface::InterfaceGenerator;
pub use module::ModuleGenerator;
pub use writer::SourceWriter;
