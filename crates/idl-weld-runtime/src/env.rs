//! Host seam
//!
//! The runtime is written against the [`Host`] trait: the primitive object
//! and value operations of the dynamic runtime the bindings are loaded into.
//! Values are opaque copyable handles; the host owns everything they refer
//! to. [`Env`] is the clonable handle passed to every callback and converter.

use crate::error::Result;
use std::any::Any;
use std::fmt;
use std::ops::{BitOr, BitOrAssign, Deref};
use std::rc::Rc;

/// Opaque handle to a host value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value(u32);

impl Value {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Strong or weak host reference keeping a value alive across calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference(u32);

impl Reference {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Resolver half of a host promise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deferred(u32);

impl Deferred {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Runtime type tag of a host value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Symbol,
    Object,
    Function,
    External,
    BigInt,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Undefined => "undefined",
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Symbol => "symbol",
            ValueType::Object => "object",
            ValueType::Function => "function",
            ValueType::External => "external",
            ValueType::BigInt => "bigint",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native function invoked by the host
pub type Callback = fn(&Env, &CallbackInfo) -> Result<Value>;

/// Called by the host when the object a piece of native data is attached to
/// is collected, or when the host instance shuts down
pub type Finalizer = fn(&Env, Rc<dyn Any>);

/// Property attribute bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropertyAttributes(u8);

impl PropertyAttributes {
    pub const DEFAULT: Self = Self(0);
    pub const WRITABLE: Self = Self(1);
    pub const ENUMERABLE: Self = Self(1 << 1);
    pub const CONFIGURABLE: Self = Self(1 << 2);
    /// Defined on the constructor rather than the prototype
    pub const STATIC: Self = Self(1 << 3);

    /// Plain data property: writable, enumerable and configurable
    pub const JS_PROPERTY: Self = Self(0b111);
    /// Class method: writable and configurable
    pub const METHOD: Self = Self(0b101);
    /// Attribute accessor: enumerable and configurable
    pub const ACCESSOR: Self = Self(0b110);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for PropertyAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for PropertyAttributes {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// What a property descriptor defines
#[derive(Debug, Clone, Copy)]
pub enum PropertyKind {
    Value(Value),
    Method(Callback),
    Accessor {
        getter: Option<Callback>,
        setter: Option<Callback>,
    },
}

/// One entry of a batch property definition
#[derive(Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
    pub attributes: PropertyAttributes,
    /// Handed back to the callbacks through [`CallbackInfo::data`]
    pub data: Option<Rc<dyn Any>>,
}

impl PropertyDescriptor {
    fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: PropertyAttributes::DEFAULT,
            data: None,
        }
    }

    /// Data property holding `value`
    pub fn value(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, PropertyKind::Value(value))
    }

    /// Function-valued property
    pub fn method(name: impl Into<String>, callback: Callback) -> Self {
        Self::new(name, PropertyKind::Method(callback))
    }

    /// Read-only accessor
    pub fn getter(name: impl Into<String>, getter: Callback) -> Self {
        Self::new(
            name,
            PropertyKind::Accessor {
                getter: Some(getter),
                setter: None,
            },
        )
    }

    /// Read-write accessor
    pub fn accessor(name: impl Into<String>, getter: Callback, setter: Callback) -> Self {
        Self::new(
            name,
            PropertyKind::Accessor {
                getter: Some(getter),
                setter: Some(setter),
            },
        )
    }

    pub fn with_attributes(mut self, attributes: PropertyAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_data(mut self, data: Rc<dyn Any>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_static(&self) -> bool {
        self.attributes.contains(PropertyAttributes::STATIC)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("attributes", &self.attributes)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// Everything a callback learns about the call that invoked it
pub struct CallbackInfo {
    this: Value,
    args: Vec<Value>,
    new_target: Option<Value>,
    data: Option<Rc<dyn Any>>,
}

impl CallbackInfo {
    pub fn new(
        this: Value,
        args: Vec<Value>,
        new_target: Option<Value>,
        data: Option<Rc<dyn Any>>,
    ) -> Self {
        Self {
            this,
            args,
            new_target,
            data,
        }
    }

    /// The receiver
    pub fn this(&self) -> Value {
        self.this
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The constructor invoked with `new`, if this is a construct call
    pub fn new_target(&self) -> Option<Value> {
        self.new_target
    }

    pub fn data(&self) -> Option<&Rc<dyn Any>> {
        self.data.as_ref()
    }
}

/// Primitive operations of the host runtime
///
/// Implementations are single-threaded and must never hold internal borrows
/// while invoking a [`Callback`] or [`Finalizer`]: callbacks re-enter the host.
pub trait Host {
    // Singletons
    fn get_undefined(&self) -> Result<Value>;
    fn get_null(&self) -> Result<Value>;
    fn get_global(&self) -> Result<Value>;

    fn type_of(&self, value: Value) -> Result<ValueType>;
    fn strict_equals(&self, a: Value, b: Value) -> Result<bool>;

    // Primitives
    fn create_boolean(&self, value: bool) -> Result<Value>;
    fn get_value_bool(&self, value: Value) -> Result<bool>;
    fn create_number(&self, value: f64) -> Result<Value>;
    fn get_value_number(&self, value: Value) -> Result<f64>;
    fn create_string(&self, value: &str) -> Result<Value>;
    fn get_value_string(&self, value: Value) -> Result<String>;

    // Objects and arrays
    fn create_object(&self) -> Result<Value>;
    fn create_array(&self, length: u32) -> Result<Value>;
    fn is_array(&self, value: Value) -> Result<bool>;
    fn get_array_length(&self, value: Value) -> Result<u32>;
    fn get_element(&self, object: Value, index: u32) -> Result<Value>;
    fn set_element(&self, object: Value, index: u32, value: Value) -> Result<()>;
    fn get_named_property(&self, object: Value, name: &str) -> Result<Value>;
    fn set_named_property(&self, object: Value, name: &str, value: Value) -> Result<()>;
    fn has_named_property(&self, object: Value, name: &str) -> Result<bool>;
    fn define_properties(&self, object: Value, properties: &[PropertyDescriptor]) -> Result<()>;
    fn object_freeze(&self, object: Value) -> Result<()>;

    // Functions and classes
    fn create_function(
        &self,
        name: &str,
        callback: Callback,
        data: Option<Rc<dyn Any>>,
    ) -> Result<Value>;
    fn define_class(
        &self,
        name: &str,
        constructor: Callback,
        properties: &[PropertyDescriptor],
    ) -> Result<Value>;
    fn call_function(&self, receiver: Value, function: Value, args: &[Value]) -> Result<Value>;
    fn new_instance(&self, constructor: Value, args: &[Value]) -> Result<Value>;

    // Native data
    fn create_external(&self, data: Rc<dyn Any>) -> Result<Value>;
    fn get_value_external(&self, value: Value) -> Result<Rc<dyn Any>>;
    fn wrap(&self, object: Value, data: Rc<dyn Any>, finalizer: Finalizer) -> Result<()>;
    fn unwrap(&self, object: Value) -> Result<Rc<dyn Any>>;
    fn add_finalizer(&self, object: Value, data: Rc<dyn Any>, finalizer: Finalizer) -> Result<()>;

    // References
    fn create_reference(&self, value: Value, initial_count: u32) -> Result<Reference>;
    /// `None` once a weak reference's target has been collected
    fn get_reference_value(&self, reference: Reference) -> Result<Option<Value>>;
    fn delete_reference(&self, reference: Reference) -> Result<()>;

    // Promises and errors
    fn create_promise(&self) -> Result<(Deferred, Value)>;
    fn resolve_deferred(&self, deferred: Deferred, resolution: Value) -> Result<()>;
    fn reject_deferred(&self, deferred: Deferred, rejection: Value) -> Result<()>;
    fn create_error(&self, code: Option<&str>, message: &str) -> Result<Value>;

    // Per-instance data
    fn get_instance_data(&self) -> Result<Option<Rc<dyn Any>>>;
    fn set_instance_data(&self, data: Rc<dyn Any>, finalizer: Finalizer) -> Result<()>;
}

/// Handle to one host runtime instance
#[derive(Clone)]
pub struct Env(Rc<dyn Host>);

impl Env {
    pub fn new<H: Host + 'static>(host: H) -> Self {
        Self(Rc::new(host))
    }

    pub fn from_rc(host: Rc<dyn Host>) -> Self {
        Self(host)
    }

    /// Whether both handles refer to the same host instance
    pub fn same_instance(&self, other: &Env) -> bool {
        Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
    }

    pub fn undefined(&self) -> Result<Value> {
        self.0.get_undefined()
    }
}

impl Deref for Env {
    type Target = dyn Host;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Env({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}
