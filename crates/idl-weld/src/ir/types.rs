//! Type system for idl-weld
//!
//! IDL type expressions as they appear in the schema tree, and their
//! mapping onto native Rust types and host wire types.
//!
//! # Type Mapping Overview
//!
//! | IDL Type | Native Type | Wire Type |
//! |----------|-------------|-----------|
//! | `boolean` | `bool` | Boolean |
//! | `byte`, `octet` | `i8`, `u8` | Number |
//! | `short`, `unsigned short` | `i16`, `u16` | Number |
//! | `long`, `unsigned long` | `i32`, `u32` | Number |
//! | `long long`, `unsigned long long` | `i64`, `u64` | Number |
//! | `float`, `unrestricted float` | `f32` | Number |
//! | `double`, `unrestricted double` | `f64` | Number |
//! | `DOMString` | `DomString` | String |
//! | `ByteString` | `ByteString` | String |
//! | `USVString` | `UsvString` | String |
//! | `object` | `Object` | Object |
//! | `undefined` | `()` | Undefined |
//! | `sequence<T>` | `Vec<T>` | Object |
//! | `FrozenArray<T>` | `FrozenArray<T>` | Object |
//! | `Promise<T>` | `Promise<T>` | Object |
//!
//! Names of declared enums, dictionaries, interfaces and typedefs map to
//! themselves; whether such a name exists is checked later by the
//! [`ConverterRegistry`](crate::registry::ConverterRegistry).
//!
//! # Parsing
//!
//! Types are written as strings in the schema tree and parsed with
//! [`FromStr`]. Whitespace inside multi-word builtins is normalized, so
//! `"unsigned  long"` and `"sequence< long >"` are accepted. [`Display`]
//! writes the canonical spelling back.
//!
//! [`Display`]: std::fmt::Display

use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Builtin IDL types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    Boolean,
    Byte,
    Octet,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    UnrestrictedFloat,
    Double,
    UnrestrictedDouble,
    DomString,
    ByteString,
    UsvString,
    Object,
    Undefined,
}

impl Builtin {
    /// Every builtin, in table order
    pub const ALL: [Builtin; 18] = [
        Builtin::Boolean,
        Builtin::Byte,
        Builtin::Octet,
        Builtin::Short,
        Builtin::UnsignedShort,
        Builtin::Long,
        Builtin::UnsignedLong,
        Builtin::LongLong,
        Builtin::UnsignedLongLong,
        Builtin::Float,
        Builtin::UnrestrictedFloat,
        Builtin::Double,
        Builtin::UnrestrictedDouble,
        Builtin::DomString,
        Builtin::ByteString,
        Builtin::UsvString,
        Builtin::Object,
        Builtin::Undefined,
    ];

    /// Canonical IDL spelling
    pub fn idl_name(&self) -> &'static str {
        match self {
            Builtin::Boolean => "boolean",
            Builtin::Byte => "byte",
            Builtin::Octet => "octet",
            Builtin::Short => "short",
            Builtin::UnsignedShort => "unsigned short",
            Builtin::Long => "long",
            Builtin::UnsignedLong => "unsigned long",
            Builtin::LongLong => "long long",
            Builtin::UnsignedLongLong => "unsigned long long",
            Builtin::Float => "float",
            Builtin::UnrestrictedFloat => "unrestricted float",
            Builtin::Double => "double",
            Builtin::UnrestrictedDouble => "unrestricted double",
            Builtin::DomString => "DOMString",
            Builtin::ByteString => "ByteString",
            Builtin::UsvString => "USVString",
            Builtin::Object => "object",
            Builtin::Undefined => "undefined",
        }
    }

    /// Native type name as seen through the runtime prelude
    pub fn native_name(&self) -> &'static str {
        match self {
            Builtin::Boolean => "bool",
            Builtin::Byte => "i8",
            Builtin::Octet => "u8",
            Builtin::Short => "i16",
            Builtin::UnsignedShort => "u16",
            Builtin::Long => "i32",
            Builtin::UnsignedLong => "u32",
            Builtin::LongLong => "i64",
            Builtin::UnsignedLongLong => "u64",
            Builtin::Float | Builtin::UnrestrictedFloat => "f32",
            Builtin::Double | Builtin::UnrestrictedDouble => "f64",
            Builtin::DomString => "DomString",
            Builtin::ByteString => "ByteString",
            Builtin::UsvString => "UsvString",
            Builtin::Object => "Object",
            Builtin::Undefined => "()",
        }
    }

    pub fn wire(&self) -> WireType {
        match self {
            Builtin::Boolean => WireType::Boolean,
            Builtin::DomString | Builtin::ByteString | Builtin::UsvString => WireType::String,
            Builtin::Object => WireType::Object,
            Builtin::Undefined => WireType::Undefined,
            _ => WireType::Number,
        }
    }

    /// Parse a whitespace-normalized IDL spelling
    pub fn from_idl(s: &str) -> Option<Self> {
        Builtin::ALL.iter().copied().find(|b| b.idl_name() == s)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idl_name())
    }
}

/// Host value-type tag a converted value carries on the host side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    Undefined,
    Boolean,
    Number,
    String,
    Object,
}

impl WireType {
    /// Path of the matching `ValueType` variant in generated code
    pub fn value_type_path(&self) -> &'static str {
        match self {
            WireType::Undefined => "ValueType::Undefined",
            WireType::Boolean => "ValueType::Boolean",
            WireType::Number => "ValueType::Number",
            WireType::String => "ValueType::String",
            WireType::Object => "ValueType::Object",
        }
    }
}

/// An IDL type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdlType {
    /// Builtin leaf type
    Builtin(Builtin),

    /// Name of a declared enum, dictionary, interface or typedef
    Named(String),

    /// sequence<T> -> Vec<T>
    Sequence(Box<IdlType>),

    /// FrozenArray<T> -> FrozenArray<T>
    FrozenArray(Box<IdlType>),

    /// Promise<T> -> Promise<T>
    Promise(Box<IdlType>),
}

impl IdlType {
    /// Create a builtin type
    pub fn builtin(b: Builtin) -> Self {
        IdlType::Builtin(b)
    }

    /// Create a reference to a declared name
    pub fn named(name: impl Into<String>) -> Self {
        IdlType::Named(name.into())
    }

    /// Create a sequence<T> type
    pub fn sequence(inner: IdlType) -> Self {
        IdlType::Sequence(Box::new(inner))
    }

    /// Create a FrozenArray<T> type
    pub fn frozen_array(inner: IdlType) -> Self {
        IdlType::FrozenArray(Box::new(inner))
    }

    /// Create a Promise<T> type
    pub fn promise(inner: IdlType) -> Self {
        IdlType::Promise(Box::new(inner))
    }

    pub fn undefined() -> Self {
        IdlType::Builtin(Builtin::Undefined)
    }

    /// Check if this is `undefined` (no value)
    pub fn is_undefined(&self) -> bool {
        matches!(self, IdlType::Builtin(Builtin::Undefined))
    }

    /// Innermost declared name, if any
    pub fn named_leaf(&self) -> Option<&str> {
        match self {
            IdlType::Builtin(_) => None,
            IdlType::Named(name) => Some(name),
            IdlType::Sequence(inner) | IdlType::FrozenArray(inner) | IdlType::Promise(inner) => {
                inner.named_leaf()
            }
        }
    }

    /// Native type name, without checking that named types exist
    pub fn native_name(&self) -> String {
        match self {
            IdlType::Builtin(b) => b.native_name().to_string(),
            IdlType::Named(name) => name.clone(),
            IdlType::Sequence(inner) => format!("Vec<{}>", inner.native_name()),
            IdlType::FrozenArray(inner) => format!("FrozenArray<{}>", inner.native_name()),
            IdlType::Promise(inner) => format!("Promise<{}>", inner.native_name()),
        }
    }
}

impl FromStr for IdlType {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| GenerateError::InvalidType {
            expr: s.to_string(),
            reason: reason.to_string(),
        };

        let expr = s.trim();
        if expr.is_empty() {
            return Err(invalid("empty type"));
        }

        if let Some(open) = expr.find('<') {
            let inner = expr[open + 1..]
                .strip_suffix('>')
                .ok_or_else(|| invalid("unbalanced `<`"))?;
            let inner: IdlType = inner.parse().map_err(|_| invalid("invalid type argument"))?;
            return match expr[..open].trim() {
                "sequence" => Ok(IdlType::sequence(inner)),
                "FrozenArray" => Ok(IdlType::frozen_array(inner)),
                "Promise" => Ok(IdlType::promise(inner)),
                _ => Err(invalid("unknown generic type")),
            };
        }

        let normalized = expr.split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some(builtin) = Builtin::from_idl(&normalized) {
            return Ok(IdlType::Builtin(builtin));
        }

        let mut chars = normalized.chars();
        let valid = chars
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(invalid("not an identifier"));
        }
        Ok(IdlType::Named(normalized))
    }
}

impl TryFrom<String> for IdlType {
    type Error = GenerateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdlType> for String {
    fn from(ty: IdlType) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlType::Builtin(b) => write!(f, "{}", b),
            IdlType::Named(name) => f.write_str(name),
            IdlType::Sequence(inner) => write!(f, "sequence<{}>", inner),
            IdlType::FrozenArray(inner) => write!(f, "FrozenArray<{}>", inner),
            IdlType::Promise(inner) => write!(f, "Promise<{}>", inner),
        }
    }
}
