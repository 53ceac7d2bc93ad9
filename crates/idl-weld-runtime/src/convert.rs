//! Converter protocol
//!
//! Every native type that crosses the boundary has exactly one
//! [`Converter`] implementation. Generated code only ever calls these two
//! operations; generic wrappers compose through the inner type's converter.
//!
//! | IDL | Native | Host |
//! |-----|--------|------|
//! | `boolean` | `bool` | boolean |
//! | `byte` .. `unsigned long long` | `i8` .. `u64` | number |
//! | `float`, `double` | `f32`, `f64` | number |
//! | `DOMString`, `ByteString`, `USVString` | `String` | string |
//! | `object` | [`Object`] | object (functions carry their own tag) |
//! | `undefined` | `()` | undefined |
//! | optional `T` | `Option<T>` | undefined/null or `T` |

use crate::env::{Env, Value, ValueType};
use crate::error::{Error, Result};

/// `DOMString`
pub type DomString = String;
/// `ByteString`
pub type ByteString = String;
/// `USVString`
pub type UsvString = String;

/// Bidirectional conversion between a native type and host values
pub trait Converter: Sized {
    /// Host value to native value; fails with an invalid-argument condition
    /// when the host value has the wrong shape
    fn to_native(env: &Env, value: Value) -> Result<Self>;

    /// Native value to host value; fails only when the host does
    fn to_js(&self, env: &Env) -> Result<Value>;
}

/// Check that `value` carries the `expected` type tag
pub fn expect_type(env: &Env, value: Value, expected: ValueType) -> Result<()> {
    let found = env.type_of(value)?;
    if found != expected {
        return Err(Error::type_mismatch(expected, found));
    }
    Ok(())
}

/// Convert the positional argument at `index`; a missing argument converts
/// from `undefined`
pub fn argument<T: Converter>(env: &Env, args: &[Value], index: usize) -> Result<T> {
    let value = match args.get(index) {
        Some(value) => *value,
        None => env.get_undefined()?,
    };
    T::to_native(env, value)
}

impl Converter for bool {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        expect_type(env, value, ValueType::Boolean)?;
        env.get_value_bool(value)
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        env.create_boolean(*self)
    }
}

fn number_value(env: &Env, value: Value) -> Result<f64> {
    expect_type(env, value, ValueType::Number)?;
    env.get_value_number(value)
}

// Narrow integers wrap modulo their width after truncation; non-finite
// numbers become zero.
macro_rules! narrow_integer_converter {
    ($($ty:ty),*) => {
        $(
            impl Converter for $ty {
                fn to_native(env: &Env, value: Value) -> Result<Self> {
                    let number = number_value(env, value)?;
                    if !number.is_finite() {
                        return Ok(0);
                    }
                    Ok(number.trunc() as i64 as $ty)
                }

                fn to_js(&self, env: &Env) -> Result<Value> {
                    env.create_number(f64::from(*self))
                }
            }
        )*
    };
}

narrow_integer_converter!(i8, u8, i16, u16, i32, u32);

// 64-bit integers saturate; values beyond 2^53 lose precision on the host.
macro_rules! wide_integer_converter {
    ($($ty:ty),*) => {
        $(
            impl Converter for $ty {
                fn to_native(env: &Env, value: Value) -> Result<Self> {
                    let number = number_value(env, value)?;
                    if !number.is_finite() {
                        return Ok(0);
                    }
                    Ok(number as $ty)
                }

                fn to_js(&self, env: &Env) -> Result<Value> {
                    env.create_number(*self as f64)
                }
            }
        )*
    };
}

wide_integer_converter!(i64, u64);

impl Converter for f32 {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        Ok(number_value(env, value)? as f32)
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        env.create_number(f64::from(*self))
    }
}

impl Converter for f64 {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        number_value(env, value)
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        env.create_number(*self)
    }
}

// TODO: read DOMString through a UTF-16 accessor once `Host` has one; the
// UTF-8 transfer replaces lone surrogates.
impl Converter for String {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        expect_type(env, value, ValueType::String)?;
        env.get_value_string(value)
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        env.create_string(self)
    }
}

/// IDL `object`: an unconverted host object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Object(Value);

impl Object {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Value {
        self.0
    }
}

impl Converter for Object {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        expect_type(env, value, ValueType::Object)?;
        Ok(Object(value))
    }

    fn to_js(&self, _env: &Env) -> Result<Value> {
        Ok(self.0)
    }
}

/// Return type of operations that produce no value
impl Converter for () {
    fn to_native(_env: &Env, _value: Value) -> Result<Self> {
        Ok(())
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        env.get_undefined()
    }
}

/// Optional arguments and dictionary members
impl<T: Converter> Converter for Option<T> {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        match env.type_of(value)? {
            ValueType::Undefined | ValueType::Null => Ok(None),
            _ => T::to_native(env, value).map(Some),
        }
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        match self {
            Some(inner) => inner.to_js(env),
            None => env.get_undefined(),
        }
    }
}
