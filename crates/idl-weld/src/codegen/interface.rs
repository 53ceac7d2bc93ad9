//! Interface emitter
//!
//! Produces, for one resolved interface:
//!
//! - a `Converter` impl that moves native instances across the boundary
//!   through the registered constructor
//! - a constructor callback with the external fast path and overload dispatch
//! - getter/setter callbacks per attribute, SameObject getters cached in the
//!   wrapping's slots
//! - one dispatcher per operation name (instance and static separately)
//! - `init_<iface>`, which defines the class and registers its constructor
//!
//! An exposed interface that was promoted from an orphan partial has no
//! class. It gets `expose_<iface>` instead, which splices its operations and
//! attributes straight onto each global's prototype.
//!
//! # Overload dispatch
//!
//! Each declared signature contributes one entry per callable arity: a
//! signature with trailing optional arguments appears once for every prefix
//! length from its required count up to its full length. The runtime picks
//! the first entry whose types match the actual arguments exactly, and the
//! dispatcher maps every entry back to its declared overload.

use crate::codegen::SourceWriter;
use crate::error::Result;
use crate::ir::{rust_ident, snake_ident, to_snake_case, Attribute, Member, Signature, WireType};
use crate::registry::ConverterRegistry;
use crate::resolve::ResolvedInterface;
use indexmap::IndexMap;
use tracing::debug;

/// Locals of generated callbacks that argument names must not shadow
const RESERVED_LOCALS: &[&str] = &[
    "env",
    "info",
    "args",
    "wrapping",
    "signatures",
    "result",
    "native",
];

/// Locals of the generated `init` that class bindings must not shadow
const RESERVED_INIT_LOCALS: &[&str] = &["env", "exports", "properties"];

/// All overloads sharing one operation name
struct OperationGroup<'a> {
    name: &'a str,
    is_static: bool,
    signatures: Vec<&'a Signature>,
}

/// One declared overload and the table entries that select it
struct Arm<'a> {
    entries: Vec<usize>,
    overload: usize,
    signature: &'a Signature,
}

/// Effective overload table plus its arms
struct Dispatch<'a> {
    table: Vec<Vec<WireType>>,
    arms: Vec<Arm<'a>>,
}

/// Generator for interface bindings
pub struct InterfaceGenerator<'a> {
    interface: &'a ResolvedInterface,
    registry: &'a ConverterRegistry,
    expose: bool,
    snake: String,
}

impl<'a> InterfaceGenerator<'a> {
    /// Create a new interface generator; `expose` is false when global
    /// exposure is suppressed
    pub fn new(
        interface: &'a ResolvedInterface,
        registry: &'a ConverterRegistry,
        expose: bool,
    ) -> Self {
        Self {
            interface,
            registry,
            expose,
            snake: to_snake_case(&interface.name),
        }
    }

    /// Exposed and promoted from a partial: no class, attached to globals
    pub fn is_exposed_partial(&self) -> bool {
        self.expose && self.interface.is_exposed() && self.interface.is_promoted()
    }

    /// Exposed class, attached to globals instead of the exports
    pub fn is_exposed_class(&self) -> bool {
        self.expose && self.interface.is_exposed() && !self.interface.is_promoted()
    }

    pub fn name(&self) -> &str {
        &self.interface.name
    }

    pub fn globals(&self) -> &[String] {
        &self.interface.exposed
    }

    /// `init_<iface>`
    pub fn init_fn(&self) -> String {
        format!("init_{}", self.snake)
    }

    /// `expose_<iface>`
    pub fn expose_fn(&self) -> String {
        format!("expose_{}", self.snake)
    }

    /// Local the module entry point binds the class to
    pub fn class_local(&self) -> String {
        if RESERVED_INIT_LOCALS.contains(&self.snake.as_str()) {
            format!("{}_class", self.snake)
        } else {
            rust_ident(&self.snake)
        }
    }

    fn slots_const(&self) -> String {
        format!("{}_SAME_OBJECT_SLOTS", self.snake.to_uppercase())
    }

    fn operation_groups(&self) -> Vec<OperationGroup<'a>> {
        let as_static = self.is_exposed_partial();
        let mut groups: IndexMap<(&str, bool), OperationGroup<'a>> = IndexMap::new();
        for member in &self.interface.members {
            let Member::Operation(op) = member else {
                continue;
            };
            let is_static = op.is_static || as_static;
            groups
                .entry((op.name.as_str(), is_static))
                .or_insert_with(|| OperationGroup {
                    name: &op.name,
                    is_static,
                    signatures: Vec::new(),
                })
                .signatures
                .extend(op.signatures.iter());
        }
        groups
            .into_values()
            .filter(|group| !group.signatures.is_empty())
            .collect()
    }

    fn dispatcher_fn(&self, group: &OperationGroup<'_>) -> String {
        let kind = if group.is_static { "static" } else { "call" };
        format!("{}_{}_{}", self.snake, kind, to_snake_case(group.name))
    }

    fn getter_fn(&self, attribute: &Attribute) -> String {
        format!("{}_get_{}", self.snake, to_snake_case(&attribute.name))
    }

    fn setter_fn(&self, attribute: &Attribute) -> String {
        format!("{}_set_{}", self.snake, to_snake_case(&attribute.name))
    }

    /// `Converter` impl, or `None` for an exposed partial
    pub fn generate_converter(&self) -> Option<String> {
        if self.is_exposed_partial() {
            return None;
        }
        let name = &self.interface.name;
        let mut w = SourceWriter::new();
        w.open(format!("impl Converter for {} {{", name));
        w.open("fn to_native(env: &Env, value: Value) -> Result<Self> {");
        w.line(format!("let wrapping = Wrapping::<{}>::retrieve(env, value)?;", name));
        w.line("let native = wrapping.native()?;");
        w.line("Ok(native.clone())");
        w.close("}");
        w.blank();
        w.open("fn to_js(&self, env: &Env) -> Result<Value> {");
        w.line(format!("wrap_native(env, {:?}, self.clone())", name));
        w.close("}");
        w.close("}");
        Some(w.finish())
    }

    /// Callbacks plus `init_<iface>` (or `expose_<iface>`)
    pub fn generate(&self) -> Result<String> {
        let groups = self.operation_groups();
        let mut sections = Vec::new();

        if self.is_exposed_partial() {
            if !self.interface.constructor_signatures().is_empty() {
                debug!(
                    interface = %self.interface.name,
                    "ignoring constructor of exposed partial interface"
                );
            }
        } else {
            sections.push(format!(
                "const {}: usize = {};\n",
                self.slots_const(),
                self.interface.same_object_count()
            ));
            sections.push(self.generate_constructor()?);
            let mut slot = 0;
            for attribute in self.interface.attributes() {
                let index = if attribute.is_same_object() {
                    slot += 1;
                    Some(slot - 1)
                } else {
                    None
                };
                sections.push(self.generate_getter(attribute, index)?);
                if attribute.is_writable() {
                    sections.push(self.generate_setter(attribute)?);
                }
            }
        }

        for group in &groups {
            sections.push(self.generate_dispatcher(group)?);
        }

        if self.is_exposed_partial() {
            sections.push(self.generate_expose(&groups)?);
        } else {
            sections.push(self.generate_init(&groups));
        }

        debug!(
            interface = %self.interface.name,
            operations = groups.len(),
            exposed_partial = self.is_exposed_partial(),
            "emitted interface"
        );
        Ok(sections.join("\n"))
    }

    fn dispatch<'s>(&self, signatures: &[&'s Signature]) -> Result<Dispatch<'s>> {
        let mut dispatch = Dispatch {
            table: Vec::new(),
            arms: Vec::new(),
        };
        for (overload, &signature) in signatures.iter().enumerate() {
            let wires = signature
                .arguments
                .iter()
                .map(|arg| self.registry.wire(&arg.ty))
                .collect::<Result<Vec<_>>>()?;
            if let Some(ty) = &signature.return_type {
                self.registry.map(ty)?;
            }

            let mut entries = Vec::new();
            for len in signature.required_count()..=wires.len() {
                entries.push(dispatch.table.len());
                dispatch.table.push(wires[..len].to_vec());
            }
            dispatch.arms.push(Arm {
                entries,
                overload,
                signature,
            });
        }
        Ok(dispatch)
    }

    fn write_signature_table(w: &mut SourceWriter, table: &[Vec<WireType>]) {
        w.open("let signatures: &[&[ValueType]] = &[");
        for entry in table {
            let types: Vec<&str> = entry.iter().map(|wire| wire.value_type_path()).collect();
            w.line(format!("&[{}],", types.join(", ")));
        }
        w.close("];");
    }

    /// Convert every argument of `signature` into a local; returns the locals
    fn write_arguments(&self, w: &mut SourceWriter, signature: &Signature) -> Result<Vec<String>> {
        let mut locals = Vec::new();
        for (index, arg) in signature.arguments.iter().enumerate() {
            let native = self.registry.map(&arg.ty)?.native;
            let native = if arg.optional {
                format!("Option<{}>", native)
            } else {
                native
            };
            let local = argument_local(&arg.name);
            w.line(format!("let {} = argument::<{}>(env, args, {})?;", local, native, index));
            locals.push(local);
        }
        Ok(locals)
    }

    fn generate_constructor(&self) -> Result<String> {
        let name = &self.interface.name;
        let signatures = self.interface.constructor_signatures();
        let mut w = SourceWriter::new();

        w.open(format!(
            "fn {}_constructor(env: &Env, info: &CallbackInfo) -> Result<Value> {{",
            self.snake
        ));
        w.line(format!("ensure_construct_call(info, {:?})?;", name));
        w.line("let args = info.args();");
        w.open("if args.len() == 1 && env.type_of(args[0])? == ValueType::External {");
        w.line(format!("let native = take_native::<{}>(env, args[0])?;", name));
        w.line(format!(
            "Wrapping::create(env, info.this(), native, {})?;",
            self.slots_const()
        ));
        w.line("return env.get_undefined();");
        w.close("}");

        if signatures.is_empty() {
            w.line("Err(Error::invalid_arg(\"Illegal constructor\"))");
            w.close("}");
            return Ok(w.finish());
        }

        let dispatch = self.dispatch(&signatures)?;
        Self::write_signature_table(&mut w, &dispatch.table);
        w.open("let native = match pick_signature(env, args, signatures)? {");
        for arm in &dispatch.arms {
            let ctor = native_fn_name("new", arm.overload);
            let pattern = arm_pattern(&arm.entries);
            if arm.signature.arguments.is_empty() {
                w.line(format!("{} => {}::{}(),", pattern, name, ctor));
            } else {
                w.open(format!("{} => {{", pattern));
                let locals = self.write_arguments(&mut w, arm.signature)?;
                w.line(format!("{}::{}({})", name, ctor, locals.join(", ")));
                w.close("}");
            }
        }
        w.line(format!(
            "_ => return Err(Error::no_matching_overload({:?})),",
            format!("{} constructor", name)
        ));
        w.close("};");
        w.line(format!(
            "Wrapping::create(env, info.this(), native, {})?;",
            self.slots_const()
        ));
        w.line("env.get_undefined()");
        w.close("}");
        Ok(w.finish())
    }

    fn generate_getter(&self, attribute: &Attribute, slot: Option<usize>) -> Result<String> {
        self.registry.map(&attribute.ty)?;
        let slot = match slot {
            Some(index) => format!("Some({})", index),
            None => "None".to_string(),
        };
        let mut w = SourceWriter::new();
        w.open(format!(
            "fn {}(env: &Env, info: &CallbackInfo) -> Result<Value> {{",
            self.getter_fn(attribute)
        ));
        w.line(format!(
            "Wrapping::<{}>::get_attribute(env, info, {}, |native, env| native.{}.to_js(env))",
            self.interface.name,
            slot,
            snake_ident(&attribute.name)
        ));
        w.close("}");
        Ok(w.finish())
    }

    fn generate_setter(&self, attribute: &Attribute) -> Result<String> {
        let native = self.registry.map(&attribute.ty)?.native;
        let mut w = SourceWriter::new();
        w.open(format!(
            "fn {}(env: &Env, info: &CallbackInfo) -> Result<Value> {{",
            self.setter_fn(attribute)
        ));
        w.open(format!(
            "Wrapping::<{}>::set_attribute(env, info, |native, value: {}| {{",
            self.interface.name, native
        ));
        w.line(format!("native.{} = value;", snake_ident(&attribute.name)));
        w.close("})");
        w.close("}");
        Ok(w.finish())
    }

    fn generate_dispatcher(&self, group: &OperationGroup<'_>) -> Result<String> {
        let name = &self.interface.name;
        let base = to_snake_case(group.name);
        let dispatch = self.dispatch(&group.signatures)?;
        let mut w = SourceWriter::new();

        w.open(format!(
            "fn {}(env: &Env, info: &CallbackInfo) -> Result<Value> {{",
            self.dispatcher_fn(group)
        ));
        w.line("let args = info.args();");
        if !group.is_static {
            w.line(format!(
                "let wrapping = Wrapping::<{}>::retrieve(env, info.this())?;",
                name
            ));
        }
        Self::write_signature_table(&mut w, &dispatch.table);
        w.open("match pick_signature(env, args, signatures)? {");
        for arm in &dispatch.arms {
            w.open(format!("{} => {{", arm_pattern(&arm.entries)));
            let locals = self.write_arguments(&mut w, arm.signature)?;
            let receiver = if group.is_static {
                name.to_string()
            } else {
                "wrapping.native_mut()?.".to_string()
            };
            let separator = if group.is_static { "::" } else { "" };
            let call = format!(
                "{}{}{}({})",
                receiver,
                separator,
                native_fn_name(&base, arm.overload),
                locals.join(", ")
            );
            if arm.signature.returns_value() {
                w.line(format!("let result = {};", call));
                w.line("result.to_js(env)");
            } else {
                w.line(format!("{};", call));
                w.line("env.get_undefined()");
            }
            w.close("}");
        }
        w.line(format!(
            "_ => Err(Error::no_matching_overload({:?})),",
            format!("{}.{}", name, group.name)
        ));
        w.close("}");
        w.close("}");
        Ok(w.finish())
    }

    fn write_property(w: &mut SourceWriter, descriptor: String, attributes: &str) {
        w.line(descriptor);
        w.indent();
        w.line(format!(".with_attributes({}),", attributes));
        w.dedent();
    }

    /// Write `let properties = vec![...];` with one entry per member, in
    /// member order
    fn write_property_table(
        &self,
        w: &mut SourceWriter,
        groups: &[OperationGroup<'_>],
        with_attributes: bool,
    ) {
        let mut entries: Vec<(String, &str)> = Vec::new();
        let mut emitted = Vec::new();

        for member in &self.interface.members {
            match member {
                Member::Attribute(attribute) if with_attributes => {
                    let descriptor = if attribute.is_writable() {
                        format!(
                            "PropertyDescriptor::accessor({:?}, {}, {})",
                            attribute.name,
                            self.getter_fn(attribute),
                            self.setter_fn(attribute)
                        )
                    } else {
                        format!(
                            "PropertyDescriptor::getter({:?}, {})",
                            attribute.name,
                            self.getter_fn(attribute)
                        )
                    };
                    entries.push((descriptor, "PropertyAttributes::ACCESSOR"));
                }
                Member::Operation(op) => {
                    let Some(index) = groups.iter().position(|group| {
                        group.name == op.name
                            && (group.is_static == op.is_static || self.is_exposed_partial())
                    }) else {
                        continue;
                    };
                    if emitted.contains(&index) {
                        continue;
                    }
                    emitted.push(index);
                    let group = &groups[index];
                    let attributes = if group.is_static && !self.is_exposed_partial() {
                        "PropertyAttributes::METHOD | PropertyAttributes::STATIC"
                    } else {
                        "PropertyAttributes::METHOD"
                    };
                    entries.push((
                        format!(
                            "PropertyDescriptor::method({:?}, {})",
                            group.name,
                            self.dispatcher_fn(group)
                        ),
                        attributes,
                    ));
                }
                _ => {}
            }
        }

        if entries.is_empty() {
            w.line("let properties: Vec<PropertyDescriptor> = Vec::new();");
            return;
        }
        w.open("let properties = vec![");
        for (descriptor, attributes) in entries {
            Self::write_property(w, descriptor, attributes);
        }
        w.close("];");
    }

    fn generate_init(&self, groups: &[OperationGroup<'_>]) -> String {
        let name = &self.interface.name;
        let mut w = SourceWriter::new();
        w.open(format!("pub fn {}(env: &Env) -> Result<Value> {{", self.init_fn()));
        self.write_property_table(&mut w, groups, true);
        w.line(format!(
            "let class = env.define_class({:?}, {}_constructor, &properties)?;",
            name, self.snake
        ));
        w.line(format!(
            "InstanceData::current(env)?.add_constructor(env, {:?}, class)?;",
            name
        ));
        w.line("Ok(class)");
        w.close("}");
        w.finish()
    }

    fn generate_expose(&self, groups: &[OperationGroup<'_>]) -> Result<String> {
        let mut w = SourceWriter::new();
        w.open(format!("pub fn {}(env: &Env) -> Result<()> {{", self.expose_fn()));
        w.line(format!("let globals: &[&str] = &[{}];", quoted_list(self.globals())));
        if !groups.is_empty() {
            self.write_property_table(&mut w, groups, false);
            w.line("expose_interface(env, &properties, globals)?;");
        }
        for attribute in self.interface.attributes() {
            let native = self.registry.map(&attribute.ty)?.native;
            if attribute.is_same_object() {
                w.line(format!(
                    "ExposedPartialSameObjProperty::<{}>::define(env, globals, {:?}, PropertyAttributes::ACCESSOR)?;",
                    native, attribute.name
                ));
            } else {
                w.line(format!(
                    "ExposedPartialProperty::<{}>::define(env, globals, {:?}, PropertyAttributes::ACCESSOR, {})?;",
                    native, attribute.name, attribute.readonly
                ));
            }
        }
        w.line("Ok(())");
        w.close("}");
        Ok(w.finish())
    }
}

/// Native method name for the `overload`-th signature of `base`
fn native_fn_name(base: &str, overload: usize) -> String {
    if overload == 0 {
        rust_ident(base)
    } else {
        format!("{}_{}", base, overload)
    }
}

fn argument_local(name: &str) -> String {
    let snake = to_snake_case(name);
    if RESERVED_LOCALS.contains(&snake.as_str()) {
        format!("{}_arg", snake)
    } else {
        rust_ident(&snake)
    }
}

fn arm_pattern(entries: &[usize]) -> String {
    entries
        .iter()
        .map(|entry| format!("Some({})", entry))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// `"A", "B"`
pub fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("{:?}", item))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Argument, Builtin, ExtAttr, IdlType, Interface, Operation, Schema};
    use crate::resolve::ResolvedSchema;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn long() -> IdlType {
        IdlType::builtin(Builtin::Long)
    }

    fn dom_string() -> IdlType {
        IdlType::builtin(Builtin::DomString)
    }

    fn resolve(schema: Schema) -> (ResolvedSchema, ConverterRegistry) {
        let resolved = ResolvedSchema::resolve(&schema).unwrap();
        let registry = ConverterRegistry::new(&resolved).unwrap();
        (resolved, registry)
    }

    #[test]
    fn test_constructor_with_optional_argument() {
        let (resolved, registry) = resolve(
            Schema::new().interface(
                Interface::new("Counter")
                    .constructor(Signature::new())
                    .constructor(
                        Signature::new()
                            .arg(Argument::new("start", long()))
                            .arg(Argument::new("label", dom_string()).optional()),
                    ),
            ),
        );
        let gen = InterfaceGenerator::new(&resolved.interfaces["Counter"], &registry, true);

        assert_eq!(
            gen.generate_constructor().unwrap(),
            indoc! {r#"
                fn counter_constructor(env: &Env, info: &CallbackInfo) -> Result<Value> {
                    ensure_construct_call(info, "Counter")?;
                    let args = info.args();
                    if args.len() == 1 && env.type_of(args[0])? == ValueType::External {
                        let native = take_native::<Counter>(env, args[0])?;
                        Wrapping::create(env, info.this(), native, COUNTER_SAME_OBJECT_SLOTS)?;
                        return env.get_undefined();
                    }
                    let signatures: &[&[ValueType]] = &[
                        &[],
                        &[ValueType::Number],
                        &[ValueType::Number, ValueType::String],
                    ];
                    let native = match pick_signature(env, args, signatures)? {
                        Some(0) => Counter::new(),
                        Some(1) | Some(2) => {
                            let start = argument::<i32>(env, args, 0)?;
                            let label = argument::<Option<DomString>>(env, args, 1)?;
                            Counter::new_1(start, label)
                        }
                        _ => return Err(Error::no_matching_overload("Counter constructor")),
                    };
                    Wrapping::create(env, info.this(), native, COUNTER_SAME_OBJECT_SLOTS)?;
                    env.get_undefined()
                }
            "#}
        );
    }

    #[test]
    fn test_missing_constructor_is_illegal() {
        let (resolved, registry) = resolve(Schema::new().interface(Interface::new("Node")));
        let gen = InterfaceGenerator::new(&resolved.interfaces["Node"], &registry, true);
        let output = gen.generate_constructor().unwrap();
        assert!(output.contains("take_native::<Node>(env, args[0])?"));
        assert!(output.ends_with("    Err(Error::invalid_arg(\"Illegal constructor\"))\n}\n"));
    }

    #[test]
    fn test_operation_overloads() {
        let (resolved, registry) = resolve(
            Schema::new().interface(
                Interface::new("Counter")
                    .operation(Operation::new("increment").signature(Signature::new().returns(long())))
                    .operation(
                        Operation::new("increment")
                            .signature(Signature::new().arg(Argument::new("by", long())).returns(long())),
                    ),
            ),
        );
        let gen = InterfaceGenerator::new(&resolved.interfaces["Counter"], &registry, true);
        let groups = gen.operation_groups();
        assert_eq!(groups.len(), 1);

        assert_eq!(
            gen.generate_dispatcher(&groups[0]).unwrap(),
            indoc! {r#"
                fn counter_call_increment(env: &Env, info: &CallbackInfo) -> Result<Value> {
                    let args = info.args();
                    let wrapping = Wrapping::<Counter>::retrieve(env, info.this())?;
                    let signatures: &[&[ValueType]] = &[
                        &[],
                        &[ValueType::Number],
                    ];
                    match pick_signature(env, args, signatures)? {
                        Some(0) => {
                            let result = wrapping.native_mut()?.increment();
                            result.to_js(env)
                        }
                        Some(1) => {
                            let by = argument::<i32>(env, args, 0)?;
                            let result = wrapping.native_mut()?.increment_1(by);
                            result.to_js(env)
                        }
                        _ => Err(Error::no_matching_overload("Counter.increment")),
                    }
                }
            "#}
        );
    }

    #[test]
    fn test_static_and_void_operations() {
        let (resolved, registry) = resolve(
            Schema::new().interface(
                Interface::new("Counter")
                    .operation(
                        Operation::new("create")
                            .static_op()
                            .signature(Signature::new().arg(Argument::new("start", long())).returns(IdlType::named("Counter"))),
                    )
                    .operation(
                        Operation::new("reset")
                            .signature(Signature::new().arg(Argument::new("type", long())).arg(Argument::new("args", long()))),
                    ),
            ),
        );
        let gen = InterfaceGenerator::new(&resolved.interfaces["Counter"], &registry, true);
        let output = gen.generate().unwrap();

        assert!(output.contains("fn counter_static_create(env: &Env, info: &CallbackInfo) -> Result<Value> {"));
        assert!(output.contains("let result = Counter::create(start);"));
        assert!(output.contains("let r#type = argument::<i32>(env, args, 0)?;"));
        assert!(output.contains("let args_arg = argument::<i32>(env, args, 1)?;"));
        assert!(output.contains("wrapping.native_mut()?.reset(r#type, args_arg);\n"));
        assert!(output.contains(
            "PropertyDescriptor::method(\"create\", counter_static_create)\n            .with_attributes(PropertyAttributes::METHOD | PropertyAttributes::STATIC),"
        ));
        assert!(syn::parse_file(&output).is_ok());
    }

    #[test]
    fn test_attributes_and_init() {
        let (resolved, registry) = resolve(
            Schema::new().interface(
                Interface::new("Counter")
                    .attribute(Attribute::new("value", long()).readonly())
                    .attribute(Attribute::new("label", dom_string()))
                    .attribute(
                        Attribute::new("history", IdlType::frozen_array(long()))
                            .readonly()
                            .with_ext_attr(ExtAttr::same_object()),
                    )
                    .operation(Operation::new("paint").signature(Signature::new())),
            ),
        );
        let gen = InterfaceGenerator::new(&resolved.interfaces["Counter"], &registry, true);
        let output = gen.generate().unwrap();

        assert!(output.starts_with("const COUNTER_SAME_OBJECT_SLOTS: usize = 1;\n"));
        assert!(output.contains(
            "Wrapping::<Counter>::get_attribute(env, info, None, |native, env| native.value.to_js(env))"
        ));
        assert!(output.contains(
            "Wrapping::<Counter>::get_attribute(env, info, Some(0), |native, env| native.history.to_js(env))"
        ));
        assert!(output.contains(indoc! {"
            fn counter_set_label(env: &Env, info: &CallbackInfo) -> Result<Value> {
                Wrapping::<Counter>::set_attribute(env, info, |native, value: DomString| {
                    native.label = value;
                })
            }
        "}));
        assert!(!output.contains("counter_set_value"));
        assert!(!output.contains("counter_set_history"));
        assert!(output.contains(indoc! {r#"
            pub fn init_counter(env: &Env) -> Result<Value> {
                let properties = vec![
                    PropertyDescriptor::getter("value", counter_get_value)
                        .with_attributes(PropertyAttributes::ACCESSOR),
                    PropertyDescriptor::accessor("label", counter_get_label, counter_set_label)
                        .with_attributes(PropertyAttributes::ACCESSOR),
                    PropertyDescriptor::getter("history", counter_get_history)
                        .with_attributes(PropertyAttributes::ACCESSOR),
                    PropertyDescriptor::method("paint", counter_call_paint)
                        .with_attributes(PropertyAttributes::METHOD),
                ];
                let class = env.define_class("Counter", counter_constructor, &properties)?;
                InstanceData::current(env)?.add_constructor(env, "Counter", class)?;
                Ok(class)
            }
        "#}));
        assert!(syn::parse_file(&output).is_ok());
    }

    #[test]
    fn test_exposed_partial() {
        let (resolved, registry) = resolve(
            Schema::new().partial(
                Interface::new("Navigation")
                    .with_ext_attr(ExtAttr::exposed(&["Window", "Worker"]))
                    .attribute(Attribute::new("depth", long()))
                    .attribute(
                        Attribute::new("history", IdlType::frozen_array(dom_string()))
                            .readonly()
                            .with_ext_attr(ExtAttr::same_object()),
                    )
                    .operation(
                        Operation::new("hop")
                            .signature(Signature::new().arg(Argument::new("steps", long())).returns(long())),
                    ),
            ),
        );
        let navigation = &resolved.interfaces["Navigation"];

        let gen = InterfaceGenerator::new(navigation, &registry, true);
        assert!(gen.is_exposed_partial());
        assert!(gen.generate_converter().is_none());
        let output = gen.generate().unwrap();
        assert!(!output.contains("navigation_constructor"));
        assert!(output.contains("let result = Navigation::hop(steps);"));
        assert!(output.contains(indoc! {r#"
            pub fn expose_navigation(env: &Env) -> Result<()> {
                let globals: &[&str] = &["Window", "Worker"];
                let properties = vec![
                    PropertyDescriptor::method("hop", navigation_static_hop)
                        .with_attributes(PropertyAttributes::METHOD),
                ];
                expose_interface(env, &properties, globals)?;
                ExposedPartialProperty::<i32>::define(env, globals, "depth", PropertyAttributes::ACCESSOR, false)?;
                ExposedPartialSameObjProperty::<FrozenArray<DomString>>::define(env, globals, "history", PropertyAttributes::ACCESSOR)?;
                Ok(())
            }
        "#}));
        assert!(syn::parse_file(&output).is_ok());

        // with exposure suppressed it is an ordinary class
        let gen = InterfaceGenerator::new(navigation, &registry, false);
        assert!(!gen.is_exposed_partial());
        assert!(gen.generate_converter().is_some());
        let output = gen.generate().unwrap();
        assert!(output.contains("pub fn init_navigation(env: &Env) -> Result<Value> {"));
        assert!(output.contains("fn navigation_call_hop("));
    }

    #[test]
    fn test_unknown_argument_type() {
        let (resolved, registry) = resolve(
            Schema::new().interface(
                Interface::new("Node").operation(
                    Operation::new("adopt").signature(Signature::new().arg(Argument::new("other", IdlType::named("Ghost")))),
                ),
            ),
        );
        let gen = InterfaceGenerator::new(&resolved.interfaces["Node"], &registry, true);
        assert!(gen.generate().is_err());
    }

    #[test]
    fn test_class_local() {
        let (resolved, registry) = resolve(
            Schema::new()
                .interface(Interface::new("Env"))
                .interface(Interface::new("Type")),
        );
        let env = InterfaceGenerator::new(&resolved.interfaces["Env"], &registry, true);
        let ty = InterfaceGenerator::new(&resolved.interfaces["Type"], &registry, true);
        assert_eq!(env.class_local(), "env_class");
        assert_eq!(ty.class_local(), "r#type");
        assert_eq!(ty.init_fn(), "init_type");
    }
}
