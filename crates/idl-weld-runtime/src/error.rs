//! Runtime error type
//!
//! Every failure that crosses the native/host boundary is one of these.
//! Conversion, overload and enum failures are invalid-argument conditions
//! and are reported back to the calling host code; host failures propagate
//! unchanged.

use crate::env::ValueType;
use thiserror::Error;

/// Errors raised by converters, generated callbacks and host primitives
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The host value does not have the expected shape
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    /// A value was rejected for a reason other than its type tag
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// No declared signature matches the actual argument list
    #[error("no matching overload for `{0}`")]
    NoMatchingOverload(String),

    /// A string is not one of the enumeration's declared values
    #[error("`{value}` is not a valid value for enumeration `{enumeration}`")]
    InvalidEnumValue { enumeration: String, value: String },

    /// A constructor was invoked without `new`
    #[error("Non-construct calls to the `{0}` constructor are not supported.")]
    NotConstructCall(String),

    /// No constructor was registered under this interface name
    #[error("no constructor registered for interface `{0}`")]
    ConstructorNotFound(String),

    /// Native instance is already borrowed (re-entrant call)
    #[error("native instance of `{0}` is already in use")]
    NativeBusy(&'static str),

    /// A handle that the host no longer knows about
    #[error("stale or unknown host handle")]
    InvalidHandle,

    /// Host resource failure (allocation, frozen object, consumed deferred)
    #[error("host failure: {0}")]
    Host(String),
}

impl Error {
    pub fn type_mismatch(expected: ValueType, found: ValueType) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::InvalidArg(message.into())
    }

    pub fn no_matching_overload(name: impl Into<String>) -> Self {
        Self::NoMatchingOverload(name.into())
    }

    pub fn invalid_enum_value(enumeration: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidEnumValue {
            enumeration: enumeration.into(),
            value: value.into(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Whether this is one of the invalid-argument conditions returned to
    /// host callers
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::TypeMismatch { .. }
                | Error::InvalidArg(_)
                | Error::NoMatchingOverload(_)
                | Error::InvalidEnumValue { .. }
        )
    }
}

/// Result type used throughout the runtime and generated code
pub type Result<T> = std::result::Result<T, Error>;
