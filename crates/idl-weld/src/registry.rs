//! Converter registry
//!
//! Every type that crosses the boundary needs a `Converter` implementation
//! on the native side. The registry knows which names have one (the builtin
//! table plus every resolved declaration) and which host wire type each
//! converts to, so emitters can write overload signatures and fail early on
//! names nothing declares.

use crate::error::{GenerateError, Result};
use crate::ir::{Builtin, IdlType, WireType};
use crate::resolve::ResolvedSchema;
use indexmap::IndexMap;
use tracing::debug;

/// What provides a converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterKind {
    Builtin,
    Enum,
    Dictionary,
    Interface,
    Typedef,
}

/// A native type with a known converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterEntry {
    pub native: String,
    pub wire: WireType,
    pub kind: ConverterKind,
    /// Whether the native type derives `Debug` and `PartialEq`
    pub plain: bool,
}

/// A mapped IDL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub native: String,
    pub wire: WireType,
}

/// Converter identities by native type name
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    entries: IndexMap<String, ConverterEntry>,
}

impl ConverterRegistry {
    /// Create a registry holding only the builtin converters
    pub fn builtins() -> Self {
        let mut registry = Self::default();
        for builtin in Builtin::ALL {
            registry.register(ConverterEntry {
                native: builtin.native_name().to_string(),
                wire: builtin.wire(),
                kind: ConverterKind::Builtin,
                plain: true,
            });
        }
        registry
    }

    /// Create a registry for a resolved schema
    pub fn new(schema: &ResolvedSchema) -> Result<Self> {
        let mut registry = Self::builtins();

        for name in schema.enums.keys() {
            registry.register(ConverterEntry {
                native: name.clone(),
                wire: WireType::String,
                kind: ConverterKind::Enum,
                plain: true,
            });
        }
        for name in schema.dictionaries.keys() {
            registry.register(ConverterEntry {
                native: name.clone(),
                wire: WireType::Object,
                kind: ConverterKind::Dictionary,
                plain: true,
            });
        }
        for name in schema.interfaces.keys() {
            registry.register(ConverterEntry {
                native: name.clone(),
                wire: WireType::Object,
                kind: ConverterKind::Interface,
                plain: false,
            });
        }
        for name in schema.typedefs.keys() {
            let wire = typedef_wire(schema, &registry, name, &mut Vec::new())?;
            registry.register(ConverterEntry {
                native: name.clone(),
                wire,
                kind: ConverterKind::Typedef,
                plain: true,
            });
        }

        registry.settle_plainness(schema);
        debug!(converters = registry.entries.len(), "built converter registry");
        Ok(registry)
    }

    /// Register a converter
    pub fn register(&mut self, entry: ConverterEntry) {
        self.entries.insert(entry.native.clone(), entry);
    }

    pub fn get(&self, native: &str) -> Option<&ConverterEntry> {
        self.entries.get(native)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map an IDL type, failing on names without a converter
    pub fn map(&self, ty: &IdlType) -> Result<TypeMapping> {
        Ok(TypeMapping {
            native: ty.native_name(),
            wire: self.wire(ty)?,
        })
    }

    /// Host wire type of `ty`
    pub fn wire(&self, ty: &IdlType) -> Result<WireType> {
        match ty {
            IdlType::Builtin(b) => Ok(b.wire()),
            IdlType::Named(name) => self
                .get(name)
                .map(|entry| entry.wire)
                .ok_or_else(|| GenerateError::UnknownType(name.clone())),
            IdlType::Sequence(inner) | IdlType::FrozenArray(inner) | IdlType::Promise(inner) => {
                self.wire(inner)?;
                Ok(WireType::Object)
            }
        }
    }

    /// Whether the native type of `ty` derives `Debug` and `PartialEq`
    pub fn is_plain(&self, ty: &IdlType) -> bool {
        match ty {
            IdlType::Builtin(_) => true,
            IdlType::Named(name) => self.get(name).map_or(false, |entry| entry.plain),
            IdlType::Sequence(inner) | IdlType::FrozenArray(inner) => self.is_plain(inner),
            IdlType::Promise(_) => false,
        }
    }

    /// Narrow `plain` for dictionaries and typedefs until nothing changes
    fn settle_plainness(&mut self, schema: &ResolvedSchema) {
        loop {
            let mut changed = false;

            for dictionary in schema.dictionaries.values() {
                let plain = dictionary.members.iter().all(|m| self.is_plain(&m.ty));
                changed |= self.narrow(&dictionary.name, plain);
            }
            for typedef in schema.typedefs.values() {
                let plain = self.is_plain(&typedef.ty);
                changed |= self.narrow(&typedef.name, plain);
            }

            if !changed {
                break;
            }
        }
    }

    fn narrow(&mut self, name: &str, plain: bool) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) if entry.plain && !plain => {
                entry.plain = false;
                true
            }
            _ => false,
        }
    }
}

fn typedef_wire(
    schema: &ResolvedSchema,
    registry: &ConverterRegistry,
    name: &str,
    visiting: &mut Vec<String>,
) -> Result<WireType> {
    if let Some(entry) = registry.get(name) {
        return Ok(entry.wire);
    }
    if visiting.iter().any(|seen| seen == name) {
        return Err(GenerateError::TypedefCycle(name.to_string()));
    }
    let typedef = schema
        .typedefs
        .get(name)
        .ok_or_else(|| GenerateError::UnknownType(name.to_string()))?;

    visiting.push(name.to_string());
    let wire = match &typedef.ty {
        IdlType::Named(target) => typedef_wire(schema, registry, target, visiting)?,
        other => registry.wire(other)?,
    };
    visiting.pop();
    Ok(wire)
}
