//! Enum emitter
//!
//! An IDL enum becomes a Rust enum with one variant per literal and a
//! `Converter` that maps variants to their literal strings and back.

use crate::codegen::SourceWriter;
use crate::ir::{enum_variant_name, Enumeration};
use std::collections::HashSet;

/// Generator for enum definitions and their converters
pub struct EnumGenerator<'a> {
    enumeration: &'a Enumeration,
}

impl<'a> EnumGenerator<'a> {
    /// Create a new enum generator
    pub fn new(enumeration: &'a Enumeration) -> Self {
        Self { enumeration }
    }

    /// Variant name for every literal, in declaration order. Literals that
    /// sanitize to the same name get a numeric suffix.
    pub fn variants(&self) -> Vec<(String, &'a str)> {
        let mut seen = HashSet::new();
        self.enumeration
            .values
            .iter()
            .map(|literal| {
                let base = enum_variant_name(literal);
                let mut variant = base.clone();
                let mut n = 1;
                while !seen.insert(variant.clone()) {
                    variant = format!("{}_{}", base, n);
                    n += 1;
                }
                (variant, literal.as_str())
            })
            .collect()
    }

    pub fn generate(&self) -> String {
        let name = &self.enumeration.name;
        let variants = self.variants();
        let mut w = SourceWriter::new();

        w.line("#[allow(non_camel_case_types)]");
        w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        w.open(format!("pub enum {} {{", name));
        for (variant, _) in &variants {
            w.line(format!("{},", variant));
        }
        w.close("}");
        w.blank();

        w.open(format!("impl Converter for {} {{", name));
        w.open("fn to_native(env: &Env, value: Value) -> Result<Self> {");
        w.line("let text = String::to_native(env, value)?;");
        if variants.is_empty() {
            w.line(format!("Err(Error::invalid_enum_value({:?}, text))", name));
        } else {
            for (i, (variant, literal)) in variants.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "} else if" };
                if i > 0 {
                    w.dedent();
                }
                w.open(format!("{} text == {:?} {{", keyword, literal));
                w.line(format!("Ok({}::{})", name, variant));
            }
            w.dedent();
            w.open("} else {");
            w.line(format!("Err(Error::invalid_enum_value({:?}, text))", name));
            w.close("}");
        }
        w.close("}");
        w.blank();

        w.open("fn to_js(&self, env: &Env) -> Result<Value> {");
        w.open("let text = match *self {");
        for (variant, literal) in &variants {
            w.line(format!("{}::{} => {:?},", name, variant, literal));
        }
        w.close("};");
        w.line("env.create_string(text)");
        w.close("}");
        w.close("}");

        w.finish()
    }
}
