//! Build utilities for crates that host generated bindings
//!
//! This module provides `BindingBuilder` for use in build.rs scripts.

pub mod binding;

pub use binding::BindingBuilder;
