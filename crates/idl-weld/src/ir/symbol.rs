//! Declaration and member metadata
//!
//! This module provides the schema-tree structures an IDL parser hands to
//! the generator: declarations, their members, signatures and extended
//! attributes. Everything is `serde`-tagged by `kind` so a schema tree reads
//! straight from JSON.

use crate::ir::IdlType;
use serde::{Deserialize, Serialize};

/// Value of an extended attribute: one identifier or a list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtAttrValue {
    Identifier(String),
    List(Vec<String>),
}

impl ExtAttrValue {
    /// All identifiers carried by this value
    pub fn identifiers(&self) -> Vec<String> {
        match self {
            ExtAttrValue::Identifier(name) => vec![name.clone()],
            ExtAttrValue::List(names) => names.clone(),
        }
    }
}

/// Extended attribute (`[SameObject]`, `[Exposed=Window]`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtAttr {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ExtAttrValue>,
}

impl ExtAttr {
    /// Create a new valueless extended attribute
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// `[SameObject]`
    pub fn same_object() -> Self {
        Self::new("SameObject")
    }

    /// `[Exposed=X]` or `[Exposed=(X,Y)]`
    pub fn exposed(globals: &[&str]) -> Self {
        let value = match globals {
            [single] => ExtAttrValue::Identifier(single.to_string()),
            _ => ExtAttrValue::List(globals.iter().map(|g| g.to_string()).collect()),
        };
        Self {
            name: "Exposed".to_string(),
            value: Some(value),
        }
    }
}

/// Whether `[SameObject]` is present
pub fn has_same_object(attrs: &[ExtAttr]) -> bool {
    attrs.iter().any(|attr| attr.name == "SameObject")
}

/// Globals named by `[Exposed]`, empty when absent
pub fn exposed_globals(attrs: &[ExtAttr]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.name == "Exposed")
        .filter_map(|attr| attr.value.as_ref())
        .flat_map(|value| value.identifiers())
        .collect()
}

/// One operation or constructor argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
    #[serde(default)]
    pub optional: bool,
}

impl Argument {
    /// Create a new required argument
    pub fn new(name: impl Into<String>, ty: IdlType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Argument list plus return type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Signature {
    #[serde(default)]
    pub arguments: Vec<Argument>,
    /// Absent means no value (`undefined`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<IdlType>,
}

impl Signature {
    /// Create a new signature with no arguments and no return value
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument
    pub fn arg(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Set return type
    pub fn returns(mut self, ty: IdlType) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// Whether a call returns a value to the host
    pub fn returns_value(&self) -> bool {
        self.return_type.as_ref().map_or(false, |ty| !ty.is_undefined())
    }

    /// Number of arguments before the trailing run of optional ones
    pub fn required_count(&self) -> usize {
        let trailing = self
            .arguments
            .iter()
            .rev()
            .take_while(|arg| arg.optional)
            .count();
        self.arguments.len() - trailing
    }
}

/// A regular or static operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl Operation {
    /// Create a new operation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            signatures: Vec::new(),
        }
    }

    /// Mark as static
    pub fn static_op(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add an overload
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }
}

/// An attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ext_attrs: Vec<ExtAttr>,
}

impl Attribute {
    /// Create a new read-write attribute
    pub fn new(name: impl Into<String>, ty: IdlType) -> Self {
        Self {
            name: name.into(),
            ty,
            readonly: false,
            ext_attrs: Vec::new(),
        }
    }

    /// Mark as read-only
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Add an extended attribute
    pub fn with_ext_attr(mut self, attr: ExtAttr) -> Self {
        self.ext_attrs.push(attr);
        self
    }

    pub fn is_same_object(&self) -> bool {
        has_same_object(&self.ext_attrs)
    }

    /// Whether the host may assign this attribute
    pub fn is_writable(&self) -> bool {
        !self.readonly && !self.is_same_object()
    }
}

/// Constructor overloads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Constructor {
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

/// Interface, mixin or partial member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Member {
    Operation(Operation),
    Attribute(Attribute),
    Constructor(Constructor),
}

/// An interface or partial interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ext_attrs: Vec<ExtAttr>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Interface {
    /// Create a new interface
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ext_attrs: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Add an extended attribute
    pub fn with_ext_attr(mut self, attr: ExtAttr) -> Self {
        self.ext_attrs.push(attr);
        self
    }

    /// Add a constructor signature
    pub fn constructor(mut self, signature: Signature) -> Self {
        self.members.push(Member::Constructor(Constructor {
            signatures: vec![signature],
        }));
        self
    }

    /// Add an operation
    pub fn operation(mut self, operation: Operation) -> Self {
        self.members.push(Member::Operation(operation));
        self
    }

    /// Add an attribute
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.members.push(Member::Attribute(attribute));
        self
    }
}

/// An interface mixin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mixin {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// `target includes mixin;`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Includes {
    pub target: String,
    pub mixin: String,
}

/// One dictionary member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictionaryMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
    #[serde(default)]
    pub required: bool,
}

impl DictionaryMember {
    /// Create a new optional member
    pub fn new(name: impl Into<String>, ty: IdlType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A dictionary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dictionary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    #[serde(default)]
    pub members: Vec<DictionaryMember>,
}

impl Dictionary {
    /// Create a new dictionary
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inherits: None,
            members: Vec::new(),
        }
    }

    /// Set the parent dictionary
    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.inherits = Some(parent.into());
        self
    }

    /// Add a member
    pub fn member(mut self, member: DictionaryMember) -> Self {
        self.members.push(member);
        self
    }
}

/// An enum of string literals
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enumeration {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl Enumeration {
    /// Create a new enum
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Typedef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

/// A top-level schema declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Declaration {
    Interface(Interface),
    InterfaceMixin(Mixin),
    PartialInterface(Interface),
    Dictionary(Dictionary),
    Enum(Enumeration),
    Typedef(Typedef),
    Includes(Includes),
}

impl Declaration {
    /// Declared name; `includes` statements report their target
    pub fn name(&self) -> &str {
        match self {
            Declaration::Interface(i) | Declaration::PartialInterface(i) => &i.name,
            Declaration::InterfaceMixin(m) => &m.name,
            Declaration::Dictionary(d) => &d.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Typedef(t) => &t.name,
            Declaration::Includes(i) => &i.target,
        }
    }
}

// ============================================================================
// Identifier helpers
// ============================================================================

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be written as raw identifiers
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

pub fn is_rust_keyword(s: &str) -> bool {
    RUST_KEYWORDS.contains(&s)
}

/// Make `s` usable as a Rust identifier: keywords become raw identifiers,
/// or get a trailing `_` where a raw identifier is not allowed
pub fn rust_ident(s: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&s) {
        format!("{}_", s)
    } else if is_rust_keyword(s) {
        format!("r#{}", s)
    } else {
        s.to_string()
    }
}

/// Convert camelCase, PascalCase or kebab-case to snake_case
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.push(c.to_ascii_lowercase());
    }

    let trimmed = result.trim_end_matches('_');
    match trimmed.chars().next() {
        None => "_".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{}", trimmed),
        Some(_) => trimmed.to_string(),
    }
}

/// snake_case Rust identifier for a member or argument name
pub fn snake_ident(s: &str) -> String {
    rust_ident(&to_snake_case(s))
}

/// Enum variant name for a string literal
///
/// The first letter is upper-cased and every run of non-alphanumeric
/// characters becomes one `_`. A literal without any alphanumeric character
/// maps to `Empty`; a leading digit gets a `V` prefix.
pub fn enum_variant_name(literal: &str) -> String {
    if !literal.chars().any(|c| c.is_ascii_alphanumeric()) {
        return "Empty".to_string();
    }

    let mut result = String::new();
    let mut in_separator = false;
    for c in literal.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            in_separator = false;
        } else if !in_separator {
            result.push('_');
            in_separator = true;
        }
    }

    let mut chars = result.chars();
    let mut result = match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => result,
    };
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'V');
    }
    if is_rust_keyword(&result) {
        result.push('_');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Builtin;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("readTextFile"), "read_text_file");
        assert_eq!(to_snake_case("Counter"), "counter");
        assert_eq!(to_snake_case("HTMLElement"), "html_element");
        assert_eq!(to_snake_case("DOMRectReadOnly"), "dom_rect_read_only");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("on-click"), "on_click");
        assert_eq!(to_snake_case("item2D"), "item2_d");
        assert_eq!(to_snake_case("3d"), "_3d");
    }

    #[test]
    fn test_rust_ident() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("self"), "self_");
        assert_eq!(rust_ident("label"), "label");
        assert_eq!(snake_ident("loop"), "r#loop");
        assert_eq!(snake_ident("isLoop"), "is_loop");
    }

    #[test]
    fn test_enum_variant_name() {
        assert_eq!(enum_variant_name("red"), "Red");
        assert_eq!(enum_variant_name("dark-blue"), "Dark_blue");
        assert_eq!(enum_variant_name("a--b  c"), "A_b_c");
        assert_eq!(enum_variant_name(""), "Empty");
        assert_eq!(enum_variant_name("--"), "Empty");
        assert_eq!(enum_variant_name("2d"), "V2d");
        assert_eq!(enum_variant_name("self"), "Self_");
    }

    #[test]
    fn test_signature_required_count() {
        let sig = Signature::new()
            .arg(Argument::new("start", IdlType::builtin(Builtin::Long)))
            .arg(Argument::new("label", IdlType::builtin(Builtin::DomString)).optional());
        assert_eq!(sig.required_count(), 1);
        assert!(!sig.returns_value());
        assert!(sig
            .clone()
            .returns(IdlType::builtin(Builtin::Long))
            .returns_value());
        assert!(!sig.returns(IdlType::undefined()).returns_value());
    }

    #[test]
    fn test_ext_attrs() {
        let attrs = vec![ExtAttr::same_object(), ExtAttr::exposed(&["Window", "Worker"])];
        assert!(has_same_object(&attrs));
        assert_eq!(exposed_globals(&attrs), vec!["Window", "Worker"]);
        assert_eq!(exposed_globals(&[ExtAttr::exposed(&["Window"])]), vec!["Window"]);
        assert!(exposed_globals(&[]).is_empty());
    }

    #[test]
    fn test_declaration_from_json() {
        let json = r#"{
            "kind": "interface",
            "name": "Counter",
            "ext_attrs": [{ "name": "Exposed", "value": ["Window", "Worker"] }],
            "members": [
                { "kind": "attribute", "name": "value", "type": "long", "readonly": true },
                { "kind": "operation", "name": "create", "static": true,
                  "signatures": [{ "arguments": [{ "name": "start", "type": "long" }],
                                   "return_type": "Counter" }] }
            ]
        }"#;
        let decl: Declaration = serde_json::from_str(json).unwrap();
        let Declaration::Interface(interface) = decl else {
            panic!("expected interface");
        };
        assert_eq!(exposed_globals(&interface.ext_attrs), vec!["Window", "Worker"]);
        match &interface.members[1] {
            Member::Operation(op) => {
                assert!(op.is_static);
                assert_eq!(op.signatures[0].return_type, Some(IdlType::named("Counter")));
            }
            other => panic!("expected operation, found {:?}", other),
        }
    }
}
