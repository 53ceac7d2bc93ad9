//! Binding module assembly
//!
//! Stitches the per-declaration emitters into one source unit: header and
//! imports, converters, enums, dictionaries, typedefs, interface callbacks,
//! and the `init` entry point. The assembled text is parsed with `syn`
//! before it is handed back.

use crate::codegen::interface::quoted_list;
use crate::codegen::{
    generate_typedef, DictionaryGenerator, EnumGenerator, InterfaceGenerator, SourceWriter,
};
use crate::error::{GenerateError, Result};
use crate::options::GeneratorOptions;
use crate::registry::ConverterRegistry;
use crate::resolve::ResolvedSchema;
use tracing::{debug, info};

/// Generator for a complete binding module
pub struct ModuleGenerator<'a> {
    schema: &'a ResolvedSchema,
    registry: &'a ConverterRegistry,
    options: &'a GeneratorOptions,
}

impl<'a> ModuleGenerator<'a> {
    /// Create a new module generator
    pub fn new(
        schema: &'a ResolvedSchema,
        registry: &'a ConverterRegistry,
        options: &'a GeneratorOptions,
    ) -> Self {
        Self {
            schema,
            registry,
            options,
        }
    }

    fn interfaces(&self) -> Vec<InterfaceGenerator<'a>> {
        self.schema
            .interfaces
            .values()
            .map(|interface| InterfaceGenerator::new(interface, self.registry, self.options.expose))
            .collect()
    }

    /// Generate and validate the module source
    pub fn generate(&self) -> Result<String> {
        let interfaces = self.interfaces();
        let mut sections = vec![self.generate_header()];

        sections.extend(interfaces.iter().filter_map(|gen| gen.generate_converter()));
        for enumeration in self.schema.enums.values() {
            sections.push(EnumGenerator::new(enumeration).generate());
        }
        for dictionary in self.schema.dictionaries.values() {
            sections.push(DictionaryGenerator::new(dictionary, self.registry).generate()?);
        }
        for typedef in self.schema.typedefs.values() {
            sections.push(generate_typedef(typedef, self.registry)?);
        }
        for gen in &interfaces {
            sections.push(gen.generate()?);
        }
        sections.push(self.generate_init(&interfaces));

        let output = sections.join("\n");
        syn::parse_file(&output).map_err(|err| {
            debug!(error = %err, "generated module failed to parse");
            GenerateError::InvalidOutput(err.to_string())
        })?;

        info!(
            source = self.options.source_name.as_deref().unwrap_or("<schema>"),
            interfaces = self.schema.interfaces.len(),
            dictionaries = self.schema.dictionaries.len(),
            enums = self.schema.enums.len(),
            typedefs = self.schema.typedefs.len(),
            bytes = output.len(),
            "generated binding module"
        );
        Ok(output)
    }

    fn generate_header(&self) -> String {
        let mut w = SourceWriter::new();
        match &self.options.source_name {
            Some(source) => {
                w.line(format!("// Generated by idl-weld from `{}`. Do not edit.", source))
            }
            None => w.line("// Generated by idl-weld. Do not edit."),
        };
        w.blank();
        w.line(format!("use {}::prelude::*;", self.options.runtime_crate));
        for include in self.options.include_paths() {
            w.line(format!("use {};", include));
        }
        w.finish()
    }

    fn generate_init(&self, interfaces: &[InterfaceGenerator<'_>]) -> String {
        let mut w = SourceWriter::new();
        w.open("pub fn init(env: &Env, exports: Value) -> Result<Value> {");

        let classes: Vec<_> = interfaces.iter().filter(|gen| !gen.is_exposed_partial()).collect();
        if interfaces.is_empty() {
            w.line("let _ = env;");
        }
        for gen in &classes {
            w.line(format!("let {} = {}(env)?;", gen.class_local(), gen.init_fn()));
        }

        let exported: Vec<_> = classes.iter().filter(|gen| !gen.is_exposed_class()).collect();
        if !exported.is_empty() {
            w.open("let properties = vec![");
            for gen in exported {
                w.line(format!(
                    "PropertyDescriptor::value({:?}, {})",
                    gen.name(),
                    gen.class_local()
                ));
                w.indent();
                w.line(".with_attributes(PropertyAttributes::METHOD),");
                w.dedent();
            }
            w.close("];");
            w.line("env.define_properties(exports, &properties)?;");
        }

        for gen in classes.iter().filter(|gen| gen.is_exposed_class()) {
            w.open("expose_interface(");
            w.line("env,");
            w.line(format!(
                "&[PropertyDescriptor::value({:?}, {}).with_attributes(PropertyAttributes::METHOD)],",
                gen.name(),
                gen.class_local()
            ));
            w.line(format!("&[{}],", quoted_list(gen.globals())));
            w.close(")?;");
        }
        for gen in interfaces.iter().filter(|gen| gen.is_exposed_partial()) {
            w.line(format!("{}(env)?;", gen.expose_fn()));
        }

        w.line("Ok(exports)");
        w.close("}");
        w.finish()
    }
}
