//! Dictionary and typedef emitters

use crate::codegen::SourceWriter;
use crate::error::Result;
use crate::ir::{snake_ident, IdlType, Typedef};
use crate::registry::ConverterRegistry;
use crate::resolve::ResolvedDictionary;

/// Locals of the generated `to_js` that a member binding must not shadow
const RESERVED_BINDINGS: &[&str] = &["env", "object", "properties"];

/// Generator for dictionary structs and their converters
pub struct DictionaryGenerator<'a> {
    dictionary: &'a ResolvedDictionary,
    registry: &'a ConverterRegistry,
}

impl<'a> DictionaryGenerator<'a> {
    /// Create a new dictionary generator
    pub fn new(dictionary: &'a ResolvedDictionary, registry: &'a ConverterRegistry) -> Self {
        Self {
            dictionary,
            registry,
        }
    }

    pub fn generate(&self) -> Result<String> {
        let name = &self.dictionary.name;
        let mut fields = Vec::new();
        for member in &self.dictionary.members {
            let native = self.registry.map(&member.ty)?.native;
            let native = if member.required {
                native
            } else {
                format!("Option<{}>", native)
            };
            fields.push((snake_ident(&member.name), native, member));
        }

        let plain = self.registry.is_plain(&IdlType::named(name.as_str()));
        let mut w = SourceWriter::new();

        if plain {
            w.line("#[derive(Debug, Clone, PartialEq)]");
        } else {
            w.line("#[derive(Clone)]");
        }
        w.open(format!("pub struct {} {{", name));
        for (field, native, _) in &fields {
            w.line(format!("pub {}: {},", field, native));
        }
        w.close("}");
        w.blank();

        w.open(format!("impl Converter for {} {{", name));
        w.open("fn to_native(env: &Env, value: Value) -> Result<Self> {");
        w.line("Object::to_native(env, value)?;");
        w.open(format!("Ok({} {{", name));
        for (field, native, member) in &fields {
            w.line(format!(
                "{}: <{}>::to_native(env, env.get_named_property(value, {:?})?)?,",
                field, native, member.name
            ));
        }
        w.close("})");
        w.close("}");
        w.blank();

        w.open("fn to_js(&self, env: &Env) -> Result<Value> {");
        w.line("let object = env.create_object()?;");
        if fields.is_empty() {
            w.line("let properties: Vec<PropertyDescriptor> = Vec::new();");
        } else {
            w.line("let mut properties = Vec::new();");
        }
        for (field, _, member) in &fields {
            if member.required {
                push_property(&mut w, &member.name, &format!("self.{}", field));
            } else {
                let binding = if RESERVED_BINDINGS.contains(&field.as_str()) {
                    "member"
                } else {
                    field.as_str()
                };
                w.open(format!("if let Some({}) = &self.{} {{", binding, field));
                push_property(&mut w, &member.name, binding);
                w.close("}");
            }
        }
        w.line("env.define_properties(object, &properties)?;");
        w.line("Ok(object)");
        w.close("}");
        w.close("}");

        Ok(w.finish())
    }
}

fn push_property(w: &mut SourceWriter, name: &str, expr: &str) {
    w.open("properties.push(");
    w.open(format!("PropertyDescriptor::value({:?}, {}.to_js(env)?)", name, expr));
    w.line(".with_attributes(PropertyAttributes::JS_PROPERTY),");
    w.dedent();
    w.close(");");
}

/// `pub type Name = Native;`
pub fn generate_typedef(typedef: &Typedef, registry: &ConverterRegistry) -> Result<String> {
    let native = registry.map(&typedef.ty)?.native;
    Ok(format!("pub type {} = {};\n", typedef.name, native))
}
