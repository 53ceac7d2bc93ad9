//! Schema resolution
//!
//! Turns the raw declaration list into one merged declaration per name:
//! partial interfaces are merged into their base (or promoted when there is
//! none), mixins are merged into every interface that includes them, and
//! dictionary inheritance is flattened. Resolution never touches the input
//! schema; merged declarations are built fresh and keyed by name.
//!
//! Member order after resolution is own members, then partial members in
//! declaration order, then mixin members in `includes` order. Dictionaries
//! list their own members before inherited ones.

use crate::error::{GenerateError, Result};
use crate::ir::{
    exposed_globals, Attribute, Declaration, Dictionary, DictionaryMember, Enumeration, ExtAttr,
    Interface, Member, Mixin, Schema, Signature, Typedef,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Where a resolved interface came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A regular `interface` declaration
    Declared,
    /// A partial interface with no base, standing in for one
    PromotedPartial,
}

/// An interface after partial and mixin merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterface {
    pub name: String,
    pub members: Vec<Member>,
    /// Globals named by `[Exposed]`
    pub exposed: Vec<String>,
    pub origin: Origin,
}

impl ResolvedInterface {
    fn from_interface(interface: &Interface, origin: Origin) -> Self {
        note_unknown_ext_attrs(&interface.name, &interface.ext_attrs);
        for member in &interface.members {
            if let Member::Attribute(attribute) = member {
                note_unknown_ext_attrs(&interface.name, &attribute.ext_attrs);
            }
        }
        Self {
            name: interface.name.clone(),
            members: interface.members.clone(),
            exposed: exposed_globals(&interface.ext_attrs),
            origin,
        }
    }

    pub fn is_exposed(&self) -> bool {
        !self.exposed.is_empty()
    }

    pub fn is_promoted(&self) -> bool {
        self.origin == Origin::PromotedPartial
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.members.iter().filter_map(|member| match member {
            Member::Attribute(attribute) => Some(attribute),
            _ => None,
        })
    }

    /// Constructor overloads from every `constructor` member, in order
    pub fn constructor_signatures(&self) -> Vec<&Signature> {
        self.members
            .iter()
            .filter_map(|member| match member {
                Member::Constructor(ctor) => Some(ctor.signatures.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn same_object_count(&self) -> usize {
        self.attributes().filter(|attr| attr.is_same_object()).count()
    }
}

const KNOWN_EXT_ATTRS: &[&str] = &["Exposed", "SameObject"];

fn note_unknown_ext_attrs(owner: &str, attrs: &[ExtAttr]) {
    for attr in attrs {
        if !KNOWN_EXT_ATTRS.contains(&attr.name.as_str()) {
            debug!(interface = owner, ext_attr = %attr.name, "ignoring unknown extended attribute");
        }
    }
}

/// A dictionary with inherited members flattened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDictionary {
    pub name: String,
    pub members: Vec<DictionaryMember>,
}

/// Fully merged schema, keyed by declaration name in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSchema {
    pub interfaces: IndexMap<String, ResolvedInterface>,
    pub dictionaries: IndexMap<String, ResolvedDictionary>,
    pub enums: IndexMap<String, Enumeration>,
    pub typedefs: IndexMap<String, Typedef>,
}

impl ResolvedSchema {
    /// Resolve a schema tree
    pub fn resolve(schema: &Schema) -> Result<Self> {
        let mut resolved = ResolvedSchema::default();
        let mut type_names: HashSet<&str> = HashSet::new();
        let mut mixins: IndexMap<&str, &Mixin> = IndexMap::new();
        let mut dictionaries: IndexMap<&str, &Dictionary> = IndexMap::new();

        for decl in &schema.declarations {
            let name = decl.name();
            let fresh = match decl {
                Declaration::InterfaceMixin(mixin) => mixins.insert(name, mixin).is_none(),
                Declaration::Interface(_)
                | Declaration::Dictionary(_)
                | Declaration::Enum(_)
                | Declaration::Typedef(_) => type_names.insert(name),
                Declaration::PartialInterface(_) | Declaration::Includes(_) => true,
            };
            if !fresh {
                return Err(GenerateError::DuplicateDeclaration(name.to_string()));
            }

            match decl {
                Declaration::Interface(interface) => {
                    resolved.interfaces.insert(
                        name.to_string(),
                        ResolvedInterface::from_interface(interface, Origin::Declared),
                    );
                }
                Declaration::Dictionary(dictionary) => {
                    dictionaries.insert(name, dictionary);
                }
                Declaration::Enum(enumeration) => {
                    resolved.enums.insert(name.to_string(), enumeration.clone());
                }
                Declaration::Typedef(typedef) => {
                    resolved.typedefs.insert(name.to_string(), typedef.clone());
                }
                _ => {}
            }
        }

        for decl in &schema.declarations {
            let Declaration::PartialInterface(partial) = decl else {
                continue;
            };
            match resolved.interfaces.get_mut(&partial.name) {
                Some(base) => {
                    debug!(
                        interface = %partial.name,
                        members = partial.members.len(),
                        "merged partial interface"
                    );
                    base.members.extend(partial.members.iter().cloned());
                }
                None => {
                    if !type_names.insert(&partial.name) {
                        return Err(GenerateError::DuplicateDeclaration(partial.name.clone()));
                    }
                    debug!(interface = %partial.name, "promoted orphan partial interface");
                    resolved.interfaces.insert(
                        partial.name.clone(),
                        ResolvedInterface::from_interface(partial, Origin::PromotedPartial),
                    );
                }
            }
        }

        for decl in &schema.declarations {
            let Declaration::Includes(includes) = decl else {
                continue;
            };
            let undeclared = |missing: &str| GenerateError::UndeclaredInclude {
                target: includes.target.clone(),
                mixin: includes.mixin.clone(),
                missing: missing.to_string(),
            };
            let mixin = mixins
                .get(includes.mixin.as_str())
                .ok_or_else(|| undeclared(&includes.mixin))?;
            let target = resolved
                .interfaces
                .get_mut(&includes.target)
                .ok_or_else(|| undeclared(&includes.target))?;
            debug!(interface = %includes.target, mixin = %includes.mixin, "merged mixin");
            target.members.extend(mixin.members.iter().cloned());
        }

        let mut flattened = IndexMap::new();
        for name in dictionaries.keys() {
            let members = flatten_dictionary(name, &dictionaries, &mut flattened, &mut Vec::new())?;
            resolved.dictionaries.insert(
                name.to_string(),
                ResolvedDictionary {
                    name: name.to_string(),
                    members,
                },
            );
        }

        debug!(
            interfaces = resolved.interfaces.len(),
            dictionaries = resolved.dictionaries.len(),
            enums = resolved.enums.len(),
            typedefs = resolved.typedefs.len(),
            "resolved schema"
        );
        Ok(resolved)
    }
}

fn flatten_dictionary(
    name: &str,
    dictionaries: &IndexMap<&str, &Dictionary>,
    flattened: &mut IndexMap<String, Vec<DictionaryMember>>,
    visiting: &mut Vec<String>,
) -> Result<Vec<DictionaryMember>> {
    if let Some(members) = flattened.get(name) {
        return Ok(members.clone());
    }
    if visiting.iter().any(|seen| seen == name) {
        return Err(GenerateError::InheritanceCycle(name.to_string()));
    }
    let dictionary = dictionaries
        .get(name)
        .ok_or_else(|| GenerateError::UnknownType(name.to_string()))?;

    visiting.push(name.to_string());
    let mut members = dictionary.members.clone();
    if let Some(parent) = &dictionary.inherits {
        if !dictionaries.contains_key(parent.as_str()) {
            return Err(GenerateError::UndeclaredParent {
                dictionary: name.to_string(),
                parent: parent.clone(),
            });
        }
        members.extend(flatten_dictionary(parent, dictionaries, flattened, visiting)?);
    }
    visiting.pop();

    flattened.insert(name.to_string(), members.clone());
    Ok(members)
}
