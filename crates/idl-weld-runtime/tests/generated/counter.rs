// Generated by idl-weld from `counter.json`. Do not edit.

use idl_weld_runtime::prelude::*;
use super::native::*;

impl Converter for Counter {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        let wrapping = Wrapping::<Counter>::retrieve(env, value)?;
        let native = wrapping.native()?;
        Ok(native.clone())
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        wrap_native(env, "Counter", self.clone())
    }
}

impl Converter for Console {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        let wrapping = Wrapping::<Console>::retrieve(env, value)?;
        let native = wrapping.native()?;
        Ok(native.clone())
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        wrap_native(env, "Console", self.clone())
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Dark_blue,
    Empty,
}

impl Converter for Color {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        let text = String::to_native(env, value)?;
        if text == "red" {
            Ok(Color::Red)
        } else if text == "dark-blue" {
            Ok(Color::Dark_blue)
        } else if text == "" {
            Ok(Color::Empty)
        } else {
            Err(Error::invalid_enum_value("Color", text))
        }
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        let text = match *self {
            Color::Red => "red",
            Color::Dark_blue => "dark-blue",
            Color::Empty => "",
        };
        env.create_string(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: Option<f64>,
}

impl Converter for Point {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        Object::to_native(env, value)?;
        Ok(Point {
            x: <f64>::to_native(env, env.get_named_property(value, "x")?)?,
            y: <Option<f64>>::to_native(env, env.get_named_property(value, "y")?)?,
        })
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        let object = env.create_object()?;
        let mut properties = Vec::new();
        properties.push(
            PropertyDescriptor::value("x", self.x.to_js(env)?)
                .with_attributes(PropertyAttributes::JS_PROPERTY),
        );
        if let Some(y) = &self.y {
            properties.push(
                PropertyDescriptor::value("y", y.to_js(env)?)
                    .with_attributes(PropertyAttributes::JS_PROPERTY),
            );
        }
        env.define_properties(object, &properties)?;
        Ok(object)
    }
}

const COUNTER_SAME_OBJECT_SLOTS: usize = 1;

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

fn counter_get_value(env: &Env, info: &CallbackInfo) -> Result<Value> {
    Wrapping::<Counter>::get_attribute(env, info, None, |native, env| native.value.to_js(env))
}

fn counter_get_label(env: &Env, info: &CallbackInfo) -> Result<Value> {
    Wrapping::<Counter>::get_attribute(env, info, None, |native, env| native.label.to_js(env))
}

fn counter_set_label(env: &Env, info: &CallbackInfo) -> Result<Value> {
    Wrapping::<Counter>::set_attribute(env, info, |native, value: DomString| {
        native.label = value;
    })
}

fn counter_get_origin(env: &Env, info: &CallbackInfo) -> Result<Value> {
    Wrapping::<Counter>::get_attribute(env, info, Some(0), |native, env| native.origin.to_js(env))
}

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

fn counter_call_paint(env: &Env, info: &CallbackInfo) -> Result<Value> {
    let args = info.args();
    let wrapping = Wrapping::<Counter>::retrieve(env, info.this())?;
    let signatures: &[&[ValueType]] = &[
        &[ValueType::String],
    ];
    match pick_signature(env, args, signatures)? {
        Some(0) => {
            let color = argument::<Color>(env, args, 0)?;
            wrapping.native_mut()?.paint(color);
            env.get_undefined()
        }
        _ => Err(Error::no_matching_overload("Counter.paint")),
    }
}

fn counter_call_palette(env: &Env, info: &CallbackInfo) -> Result<Value> {
    let args = info.args();
    let wrapping = Wrapping::<Counter>::retrieve(env, info.this())?;
    let signatures: &[&[ValueType]] = &[
        &[],
    ];
    match pick_signature(env, args, signatures)? {
        Some(0) => {
            let result = wrapping.native_mut()?.palette();
            result.to_js(env)
        }
        _ => Err(Error::no_matching_overload("Counter.palette")),
    }
}

fn counter_call_settle(env: &Env, info: &CallbackInfo) -> Result<Value> {
    let args = info.args();
    let wrapping = Wrapping::<Counter>::retrieve(env, info.this())?;
    let signatures: &[&[ValueType]] = &[
        &[ValueType::Boolean],
    ];
    match pick_signature(env, args, signatures)? {
        Some(0) => {
            let ok = argument::<bool>(env, args, 0)?;
            let result = wrapping.native_mut()?.settle(ok);
            result.to_js(env)
        }
        _ => Err(Error::no_matching_overload("Counter.settle")),
    }
}

fn counter_static_create(env: &Env, info: &CallbackInfo) -> Result<Value> {
    let args = info.args();
    let signatures: &[&[ValueType]] = &[
        &[ValueType::Number],
    ];
    match pick_signature(env, args, signatures)? {
        Some(0) => {
            let start = argument::<i32>(env, args, 0)?;
            let result = Counter::create(start);
            result.to_js(env)
        }
        _ => Err(Error::no_matching_overload("Counter.create")),
    }
}

pub fn init_counter(env: &Env) -> Result<Value> {
    let properties = vec![
        PropertyDescriptor::getter("value", counter_get_value)
            .with_attributes(PropertyAttributes::ACCESSOR),
        PropertyDescriptor::accessor("label", counter_get_label, counter_set_label)
            .with_attributes(PropertyAttributes::ACCESSOR),
        PropertyDescriptor::getter("origin", counter_get_origin)
            .with_attributes(PropertyAttributes::ACCESSOR),
        PropertyDescriptor::method("increment", counter_call_increment)
            .with_attributes(PropertyAttributes::METHOD),
        PropertyDescriptor::method("paint", counter_call_paint)
            .with_attributes(PropertyAttributes::METHOD),
        PropertyDescriptor::method("palette", counter_call_palette)
            .with_attributes(PropertyAttributes::METHOD),
        PropertyDescriptor::method("settle", counter_call_settle)
            .with_attributes(PropertyAttributes::METHOD),
        PropertyDescriptor::method("create", counter_static_create)
            .with_attributes(PropertyAttributes::METHOD | PropertyAttributes::STATIC),
    ];
    let class = env.define_class("Counter", counter_constructor, &properties)?;
    InstanceData::current(env)?.add_constructor(env, "Counter", class)?;
    Ok(class)
}

const CONSOLE_SAME_OBJECT_SLOTS: usize = 0;

fn console_constructor(env: &Env, info: &CallbackInfo) -> Result<Value> {
    ensure_construct_call(info, "Console")?;
    let args = info.args();
    if args.len() == 1 && env.type_of(args[0])? == ValueType::External {
        let native = take_native::<Console>(env, args[0])?;
        Wrapping::create(env, info.this(), native, CONSOLE_SAME_OBJECT_SLOTS)?;
        return env.get_undefined();
    }
    let signatures: &[&[ValueType]] = &[
        &[],
    ];
    let native = match pick_signature(env, args, signatures)? {
        Some(0) => Console::new(),
        _ => return Err(Error::no_matching_overload("Console constructor")),
    };
    Wrapping::create(env, info.this(), native, CONSOLE_SAME_OBJECT_SLOTS)?;
    env.get_undefined()
}

fn console_call_log(env: &Env, info: &CallbackInfo) -> Result<Value> {
    let args = info.args();
    let wrapping = Wrapping::<Console>::retrieve(env, info.this())?;
    let signatures: &[&[ValueType]] = &[
        &[ValueType::String],
    ];
    match pick_signature(env, args, signatures)? {
        Some(0) => {
            let line = argument::<DomString>(env, args, 0)?;
            wrapping.native_mut()?.log(line);
            env.get_undefined()
        }
        _ => Err(Error::no_matching_overload("Console.log")),
    }
}

pub fn init_console(env: &Env) -> Result<Value> {
    let properties = vec![
        PropertyDescriptor::method("log", console_call_log)
            .with_attributes(PropertyAttributes::METHOD),
    ];
    let class = env.define_class("Console", console_constructor, &properties)?;
    InstanceData::current(env)?.add_constructor(env, "Console", class)?;
    Ok(class)
}

fn navigation_static_hop(env: &Env, info: &CallbackInfo) -> Result<Value> {
    let args = info.args();
    let signatures: &[&[ValueType]] = &[
        &[ValueType::Number],
    ];
    match pick_signature(env, args, signatures)? {
        Some(0) => {
            let steps = argument::<i32>(env, args, 0)?;
            let result = Navigation::hop(steps);
            result.to_js(env)
        }
        _ => Err(Error::no_matching_overload("Navigation.hop")),
    }
}

pub fn expose_navigation(env: &Env) -> Result<()> {
    let globals: &[&str] = &["Window"];
    let properties = vec![
        PropertyDescriptor::method("hop", navigation_static_hop)
            .with_attributes(PropertyAttributes::METHOD),
    ];
    expose_interface(env, &properties, globals)?;
    ExposedPartialProperty::<i32>::define(env, globals, "depth", PropertyAttributes::ACCESSOR, false)?;
    ExposedPartialSameObjProperty::<FrozenArray<DomString>>::define(env, globals, "history", PropertyAttributes::ACCESSOR)?;
    Ok(())
}

pub fn init(env: &Env, exports: Value) -> Result<Value> {
    let counter = init_counter(env)?;
    let console = init_console(env)?;
    let properties = vec![
        PropertyDescriptor::value("Counter", counter)
            .with_attributes(PropertyAttributes::METHOD),
    ];
    env.define_properties(exports, &properties)?;
    expose_interface(
        env,
        &[PropertyDescriptor::value("Console", console).with_attributes(PropertyAttributes::METHOD)],
        &["Window"],
    )?;
    expose_navigation(env)?;
    Ok(exports)
}
