//! In-memory host
//!
//! A small single-threaded object heap implementing [`Host`], used to load
//! and drive generated bindings without an embedding engine. Nothing is ever
//! collected implicitly; [`MemoryHost::collect`] and
//! [`MemoryHost::teardown`] run finalizers on demand.
//!
//! Heap slots are never reused: every boolean, number, string or object
//! created stays allocated for the life of the host, including collected
//! objects. Create a fresh host per test or per short-lived session.

use crate::env::{
    Callback, CallbackInfo, Deferred, Env, Finalizer, Host, PropertyAttributes,
    PropertyDescriptor, PropertyKind, Reference, Value, ValueType,
};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

const UNDEFINED: Value = Value::from_raw(0);
const NULL: Value = Value::from_raw(1);
const GLOBAL: Value = Value::from_raw(2);

/// Settlement state of a host promise
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromiseStatus {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

type Attached = (Rc<dyn Any>, Finalizer);

#[derive(Clone)]
enum Property {
    Data {
        value: Value,
        writable: bool,
    },
    Accessor {
        getter: Option<Callback>,
        setter: Option<Callback>,
        data: Option<Rc<dyn Any>>,
    },
}

struct Function {
    callback: Callback,
    data: Option<Rc<dyn Any>>,
}

enum ObjectKind {
    Plain,
    Array(Vec<Value>),
    Function(Function),
    Error,
    Promise(PromiseStatus),
}

struct ObjectData {
    kind: ObjectKind,
    properties: IndexMap<String, Property>,
    prototype: Option<Value>,
    frozen: bool,
    wrapped: Option<Attached>,
    finalizers: Vec<Attached>,
    collected: bool,
}

impl ObjectData {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            prototype: None,
            frozen: false,
            wrapped: None,
            finalizers: Vec::new(),
            collected: false,
        }
    }

    fn needs_finalization(&self) -> bool {
        !self.collected && (self.wrapped.is_some() || !self.finalizers.is_empty())
    }
}

enum Slot {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    External(Rc<dyn Any>),
    Object(ObjectData),
}

impl Slot {
    fn value_type(&self) -> ValueType {
        match self {
            Slot::Undefined => ValueType::Undefined,
            Slot::Null => ValueType::Null,
            Slot::Boolean(_) => ValueType::Boolean,
            Slot::Number(_) => ValueType::Number,
            Slot::String(_) => ValueType::String,
            Slot::External(_) => ValueType::External,
            Slot::Object(ObjectData {
                kind: ObjectKind::Function(_),
                ..
            }) => ValueType::Function,
            Slot::Object(_) => ValueType::Object,
        }
    }
}

#[derive(Default)]
struct Heap {
    slots: Vec<Slot>,
    references: IndexMap<u32, Value>,
    next_reference: u32,
    deferreds: Vec<Option<Value>>,
    instance_data: Option<Attached>,
}

impl Heap {
    fn slot(&self, value: Value) -> Result<&Slot> {
        self.slots
            .get(value.raw() as usize)
            .ok_or(Error::InvalidHandle)
    }

    fn object(&self, value: Value) -> Result<&ObjectData> {
        match self.slot(value)? {
            Slot::Object(object) if !object.collected => Ok(object),
            Slot::Object(_) => Err(Error::InvalidHandle),
            other => Err(Error::type_mismatch(ValueType::Object, other.value_type())),
        }
    }

    fn object_mut(&mut self, value: Value) -> Result<&mut ObjectData> {
        let found = self.slot(value)?.value_type();
        match self.slots.get_mut(value.raw() as usize) {
            Some(Slot::Object(object)) => {
                if object.collected {
                    Err(Error::InvalidHandle)
                } else {
                    Ok(object)
                }
            }
            Some(_) => Err(Error::type_mismatch(ValueType::Object, found)),
            None => Err(Error::InvalidHandle),
        }
    }

    fn writable_object(&mut self, value: Value) -> Result<&mut ObjectData> {
        let object = self.object_mut(value)?;
        if object.frozen {
            return Err(Error::host("cannot modify a frozen object"));
        }
        Ok(object)
    }
}

/// Heap-backed [`Host`]
pub struct MemoryHost {
    this: Weak<MemoryHost>,
    heap: RefCell<Heap>,
}

impl MemoryHost {
    pub fn new() -> Rc<Self> {
        let heap = Heap {
            slots: vec![
                Slot::Undefined,
                Slot::Null,
                Slot::Object(ObjectData::new(ObjectKind::Plain)),
            ],
            ..Heap::default()
        };
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            heap: RefCell::new(heap),
        })
    }

    pub fn env(self: &Rc<Self>) -> Env {
        let host: Rc<dyn Host> = self.clone();
        Env::from_rc(host)
    }

    /// Collect one object: its wrap finalizer and every added finalizer run
    /// once, and the handle becomes invalid.
    pub fn collect(&self, value: Value) -> Result<()> {
        let (wrapped, finalizers, properties) = {
            let mut heap = self.heap.borrow_mut();
            let object = heap.object_mut(value)?;
            object.collected = true;
            (
                object.wrapped.take(),
                std::mem::take(&mut object.finalizers),
                std::mem::take(&mut object.properties),
            )
        };
        trace!(handle = value.raw(), "collecting object");

        let env = self.handle()?;
        for (data, finalizer) in wrapped.into_iter().chain(finalizers) {
            finalizer(&env, data);
        }
        drop(properties);
        Ok(())
    }

    /// Shut the instance down: finalize every object that still carries
    /// native data, then the instance data.
    pub fn teardown(&self) -> Result<()> {
        let pending: Vec<Value> = {
            let heap = self.heap.borrow();
            heap.slots
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| match slot {
                    Slot::Object(object) if object.needs_finalization() => {
                        Some(Value::from_raw(index as u32))
                    }
                    _ => None,
                })
                .collect()
        };
        debug!(objects = pending.len(), "tearing down host instance");

        for value in pending {
            self.collect(value)?;
        }

        let instance_data = self.heap.borrow_mut().instance_data.take();
        if let Some((data, finalizer)) = instance_data {
            finalizer(&self.handle()?, data);
        }
        Ok(())
    }

    /// Number of references not yet deleted
    pub fn live_references(&self) -> usize {
        self.heap.borrow().references.len()
    }

    pub fn promise_state(&self, promise: Value) -> Result<PromiseStatus> {
        match &self.heap.borrow().object(promise)?.kind {
            ObjectKind::Promise(status) => Ok(*status),
            _ => Err(Error::invalid_arg("value is not a promise")),
        }
    }

    pub fn is_frozen(&self, object: Value) -> Result<bool> {
        Ok(self.heap.borrow().object(object)?.frozen)
    }

    pub fn is_error(&self, value: Value) -> Result<bool> {
        Ok(matches!(
            self.heap.borrow().slot(value)?,
            Slot::Object(ObjectData {
                kind: ObjectKind::Error,
                ..
            })
        ))
    }

    /// Own property names in definition order
    pub fn property_names(&self, object: Value) -> Result<Vec<String>> {
        Ok(self
            .heap
            .borrow()
            .object(object)?
            .properties
            .keys()
            .cloned()
            .collect())
    }

    fn handle(&self) -> Result<Env> {
        let host: Rc<dyn Host> = self
            .this
            .upgrade()
            .ok_or_else(|| Error::host("host instance was dropped"))?;
        Ok(Env::from_rc(host))
    }

    fn alloc(&self, slot: Slot) -> Value {
        let mut heap = self.heap.borrow_mut();
        let raw = heap.slots.len() as u32;
        heap.slots.push(slot);
        Value::from_raw(raw)
    }

    fn invoke(&self, callback: Callback, info: CallbackInfo) -> Result<Value> {
        let env = self.handle()?;
        callback(&env, &info)
    }

    /// Find `name` on `object` or its prototype chain
    fn lookup(&self, object: Value, name: &str) -> Result<Option<Property>> {
        let heap = self.heap.borrow();
        let mut current = Some(object);
        while let Some(value) = current {
            let data = heap.object(value)?;
            if let Some(property) = data.properties.get(name) {
                return Ok(Some(property.clone()));
            }
            current = data.prototype;
        }
        Ok(None)
    }

    fn function(&self, value: Value) -> Result<(Callback, Option<Rc<dyn Any>>)> {
        let heap = self.heap.borrow();
        match &heap.object(value)?.kind {
            ObjectKind::Function(function) => Ok((function.callback, function.data.clone())),
            _ => Err(Error::type_mismatch(ValueType::Function, ValueType::Object)),
        }
    }

    fn settle(&self, deferred: Deferred, status: PromiseStatus) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        let promise = heap
            .deferreds
            .get_mut(deferred.raw() as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidHandle)?;
        match &mut heap.object_mut(promise)?.kind {
            ObjectKind::Promise(current) => {
                *current = status;
                Ok(())
            }
            _ => Err(Error::InvalidHandle),
        }
    }
}

impl Host for MemoryHost {
    fn get_undefined(&self) -> Result<Value> {
        Ok(UNDEFINED)
    }

    fn get_null(&self) -> Result<Value> {
        Ok(NULL)
    }

    fn get_global(&self) -> Result<Value> {
        Ok(GLOBAL)
    }

    fn type_of(&self, value: Value) -> Result<ValueType> {
        Ok(self.heap.borrow().slot(value)?.value_type())
    }

    fn strict_equals(&self, a: Value, b: Value) -> Result<bool> {
        let heap = self.heap.borrow();
        Ok(match (heap.slot(a)?, heap.slot(b)?) {
            (Slot::Undefined, Slot::Undefined) | (Slot::Null, Slot::Null) => true,
            (Slot::Boolean(x), Slot::Boolean(y)) => x == y,
            (Slot::Number(x), Slot::Number(y)) => x == y,
            (Slot::String(x), Slot::String(y)) => x == y,
            _ => a == b,
        })
    }

    fn create_boolean(&self, value: bool) -> Result<Value> {
        Ok(self.alloc(Slot::Boolean(value)))
    }

    fn get_value_bool(&self, value: Value) -> Result<bool> {
        match self.heap.borrow().slot(value)? {
            Slot::Boolean(flag) => Ok(*flag),
            other => Err(Error::type_mismatch(ValueType::Boolean, other.value_type())),
        }
    }

    fn create_number(&self, value: f64) -> Result<Value> {
        Ok(self.alloc(Slot::Number(value)))
    }

    fn get_value_number(&self, value: Value) -> Result<f64> {
        match self.heap.borrow().slot(value)? {
            Slot::Number(number) => Ok(*number),
            other => Err(Error::type_mismatch(ValueType::Number, other.value_type())),
        }
    }

    fn create_string(&self, value: &str) -> Result<Value> {
        Ok(self.alloc(Slot::String(value.to_string())))
    }

    fn get_value_string(&self, value: Value) -> Result<String> {
        match self.heap.borrow().slot(value)? {
            Slot::String(text) => Ok(text.clone()),
            other => Err(Error::type_mismatch(ValueType::String, other.value_type())),
        }
    }

    fn create_object(&self) -> Result<Value> {
        Ok(self.alloc(Slot::Object(ObjectData::new(ObjectKind::Plain))))
    }

    fn create_array(&self, length: u32) -> Result<Value> {
        let elements = vec![UNDEFINED; length as usize];
        Ok(self.alloc(Slot::Object(ObjectData::new(ObjectKind::Array(elements)))))
    }

    fn is_array(&self, value: Value) -> Result<bool> {
        Ok(matches!(
            self.heap.borrow().slot(value)?,
            Slot::Object(ObjectData {
                kind: ObjectKind::Array(_),
                ..
            })
        ))
    }

    fn get_array_length(&self, value: Value) -> Result<u32> {
        match &self.heap.borrow().object(value)?.kind {
            ObjectKind::Array(elements) => Ok(elements.len() as u32),
            _ => Err(Error::invalid_arg("array expected")),
        }
    }

    fn get_element(&self, object: Value, index: u32) -> Result<Value> {
        match &self.heap.borrow().object(object)?.kind {
            ObjectKind::Array(elements) => {
                Ok(elements.get(index as usize).copied().unwrap_or(UNDEFINED))
            }
            _ => Err(Error::invalid_arg("array expected")),
        }
    }

    fn set_element(&self, object: Value, index: u32, value: Value) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        match &mut heap.writable_object(object)?.kind {
            ObjectKind::Array(elements) => {
                let index = index as usize;
                if index >= elements.len() {
                    elements.resize(index + 1, UNDEFINED);
                }
                elements[index] = value;
                Ok(())
            }
            _ => Err(Error::invalid_arg("array expected")),
        }
    }

    fn get_named_property(&self, object: Value, name: &str) -> Result<Value> {
        match self.lookup(object, name)? {
            Some(Property::Data { value, .. }) => Ok(value),
            Some(Property::Accessor {
                getter: Some(getter),
                data,
                ..
            }) => self.invoke(getter, CallbackInfo::new(object, Vec::new(), None, data)),
            _ => Ok(UNDEFINED),
        }
    }

    fn set_named_property(&self, object: Value, name: &str, value: Value) -> Result<()> {
        match self.lookup(object, name)? {
            Some(Property::Accessor {
                setter: Some(setter),
                data,
                ..
            }) => {
                self.invoke(setter, CallbackInfo::new(object, vec![value], None, data))?;
                Ok(())
            }
            Some(Property::Accessor { setter: None, .. })
            | Some(Property::Data {
                writable: false, ..
            }) => Err(Error::host(format!(
                "cannot assign to read-only property `{}`",
                name
            ))),
            _ => {
                let mut heap = self.heap.borrow_mut();
                heap.writable_object(object)?.properties.insert(
                    name.to_string(),
                    Property::Data {
                        value,
                        writable: true,
                    },
                );
                Ok(())
            }
        }
    }

    fn has_named_property(&self, object: Value, name: &str) -> Result<bool> {
        Ok(self.lookup(object, name)?.is_some())
    }

    fn define_properties(&self, object: Value, properties: &[PropertyDescriptor]) -> Result<()> {
        let mut resolved = Vec::with_capacity(properties.len());
        for descriptor in properties {
            let writable = descriptor.attributes.contains(PropertyAttributes::WRITABLE);
            let property = match descriptor.kind {
                PropertyKind::Value(value) => Property::Data { value, writable },
                PropertyKind::Method(callback) => Property::Data {
                    value: self.create_function(
                        &descriptor.name,
                        callback,
                        descriptor.data.clone(),
                    )?,
                    writable,
                },
                PropertyKind::Accessor { getter, setter } => Property::Accessor {
                    getter,
                    setter,
                    data: descriptor.data.clone(),
                },
            };
            resolved.push((descriptor.name.clone(), property));
        }

        let mut heap = self.heap.borrow_mut();
        heap.writable_object(object)?.properties.extend(resolved);
        Ok(())
    }

    fn object_freeze(&self, object: Value) -> Result<()> {
        self.heap.borrow_mut().object_mut(object)?.frozen = true;
        Ok(())
    }

    fn create_function(
        &self,
        name: &str,
        callback: Callback,
        data: Option<Rc<dyn Any>>,
    ) -> Result<Value> {
        let name = self.create_string(name)?;
        let mut function = ObjectData::new(ObjectKind::Function(Function { callback, data }));
        function.properties.insert(
            "name".to_string(),
            Property::Data {
                value: name,
                writable: false,
            },
        );
        Ok(self.alloc(Slot::Object(function)))
    }

    fn define_class(
        &self,
        name: &str,
        constructor: Callback,
        properties: &[PropertyDescriptor],
    ) -> Result<Value> {
        let class = self.create_function(name, constructor, None)?;
        let prototype = self.create_object()?;
        {
            let mut heap = self.heap.borrow_mut();
            heap.object_mut(class)?.properties.insert(
                "prototype".to_string(),
                Property::Data {
                    value: prototype,
                    writable: false,
                },
            );
            heap.object_mut(prototype)?.properties.insert(
                "constructor".to_string(),
                Property::Data {
                    value: class,
                    writable: true,
                },
            );
        }

        let (statics, members): (Vec<_>, Vec<_>) =
            properties.iter().cloned().partition(|p| p.is_static());
        self.define_properties(class, &statics)?;
        self.define_properties(prototype, &members)?;

        debug!(class = name, members = members.len(), "defined class");
        Ok(class)
    }

    fn call_function(&self, receiver: Value, function: Value, args: &[Value]) -> Result<Value> {
        let (callback, data) = self.function(function)?;
        self.invoke(callback, CallbackInfo::new(receiver, args.to_vec(), None, data))
    }

    fn new_instance(&self, constructor: Value, args: &[Value]) -> Result<Value> {
        let (callback, data) = self.function(constructor)?;
        let prototype = match self.lookup(constructor, "prototype")? {
            Some(Property::Data { value, .. }) => Some(value),
            _ => None,
        };

        let mut object = ObjectData::new(ObjectKind::Plain);
        object.prototype = prototype;
        let this = self.alloc(Slot::Object(object));

        self.invoke(
            callback,
            CallbackInfo::new(this, args.to_vec(), Some(constructor), data),
        )?;
        Ok(this)
    }

    fn create_external(&self, data: Rc<dyn Any>) -> Result<Value> {
        Ok(self.alloc(Slot::External(data)))
    }

    fn get_value_external(&self, value: Value) -> Result<Rc<dyn Any>> {
        match self.heap.borrow().slot(value)? {
            Slot::External(data) => Ok(data.clone()),
            other => Err(Error::type_mismatch(ValueType::External, other.value_type())),
        }
    }

    fn wrap(&self, object: Value, data: Rc<dyn Any>, finalizer: Finalizer) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        let target = heap.object_mut(object)?;
        if target.wrapped.is_some() {
            return Err(Error::host("object already wraps native data"));
        }
        target.wrapped = Some((data, finalizer));
        Ok(())
    }

    fn unwrap(&self, object: Value) -> Result<Rc<dyn Any>> {
        self.heap
            .borrow()
            .object(object)?
            .wrapped
            .as_ref()
            .map(|(data, _)| data.clone())
            .ok_or_else(|| Error::invalid_arg("object does not wrap native data"))
    }

    fn add_finalizer(&self, object: Value, data: Rc<dyn Any>, finalizer: Finalizer) -> Result<()> {
        self.heap
            .borrow_mut()
            .object_mut(object)?
            .finalizers
            .push((data, finalizer));
        Ok(())
    }

    fn create_reference(&self, value: Value, _initial_count: u32) -> Result<Reference> {
        let mut heap = self.heap.borrow_mut();
        heap.slot(value)?;
        let raw = heap.next_reference;
        heap.next_reference += 1;
        heap.references.insert(raw, value);
        Ok(Reference::from_raw(raw))
    }

    fn get_reference_value(&self, reference: Reference) -> Result<Option<Value>> {
        let heap = self.heap.borrow();
        let value = *heap
            .references
            .get(&reference.raw())
            .ok_or(Error::InvalidHandle)?;
        match heap.slot(value)? {
            Slot::Object(object) if object.collected => Ok(None),
            _ => Ok(Some(value)),
        }
    }

    fn delete_reference(&self, reference: Reference) -> Result<()> {
        self.heap
            .borrow_mut()
            .references
            .swap_remove(&reference.raw())
            .map(|_| ())
            .ok_or(Error::InvalidHandle)
    }

    fn create_promise(&self) -> Result<(Deferred, Value)> {
        let promise = self.alloc(Slot::Object(ObjectData::new(ObjectKind::Promise(
            PromiseStatus::Pending,
        ))));
        let mut heap = self.heap.borrow_mut();
        let raw = heap.deferreds.len() as u32;
        heap.deferreds.push(Some(promise));
        Ok((Deferred::from_raw(raw), promise))
    }

    fn resolve_deferred(&self, deferred: Deferred, resolution: Value) -> Result<()> {
        self.settle(deferred, PromiseStatus::Fulfilled(resolution))
    }

    fn reject_deferred(&self, deferred: Deferred, rejection: Value) -> Result<()> {
        self.settle(deferred, PromiseStatus::Rejected(rejection))
    }

    fn create_error(&self, code: Option<&str>, message: &str) -> Result<Value> {
        let error = self.alloc(Slot::Object(ObjectData::new(ObjectKind::Error)));
        let mut properties = vec![PropertyDescriptor::value(
            "message",
            self.create_string(message)?,
        )];
        if let Some(code) = code {
            properties.push(PropertyDescriptor::value("code", self.create_string(code)?));
        }
        self.define_properties(error, &properties)?;
        Ok(error)
    }

    fn get_instance_data(&self) -> Result<Option<Rc<dyn Any>>> {
        Ok(self
            .heap
            .borrow()
            .instance_data
            .as_ref()
            .map(|(data, _)| data.clone()))
    }

    fn set_instance_data(&self, data: Rc<dyn Any>, finalizer: Finalizer) -> Result<()> {
        self.heap.borrow_mut().instance_data = Some((data, finalizer));
        Ok(())
    }
}
