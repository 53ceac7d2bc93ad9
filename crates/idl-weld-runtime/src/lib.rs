//! idl-weld-runtime: support library for generated WebIDL bindings
//!
//! Generated binding modules contain only marshaling and dispatch glue; the
//! semantics live here and are written against the [`Host`] trait, so the
//! same bindings run on any host adapter.
//!
//! # Architecture
//!
//! - `env`: host seam (handles, property descriptors, the `Host` trait)
//! - `convert`: the `Converter` protocol and its scalar implementations
//! - `sequence`: `sequence<T>` and `FrozenArray<T>`
//! - `overload`: overload resolution by argument type tags
//! - `wrap`: native instances attached to host objects, SameObject caching
//! - `promise`: native promises settled before or after crossing to the host
//! - `instance`: per-host-instance constructor registry
//! - `expose`: attaching interfaces to global prototypes
//! - `memory`: an in-memory `Host`
//!
//! # Usage
//!
//! ```rust,ignore
//! use idl_weld_runtime::memory::MemoryHost;
//!
//! let host = MemoryHost::new();
//! let env = host.env();
//! let exports = env.create_object()?;
//! my_bindings::init(&env, exports)?;
//! ```

pub mod convert;
pub mod env;
pub mod error;
pub mod expose;
pub mod instance;
pub mod memory;
pub mod overload;
pub mod promise;
pub mod sequence;
pub mod wrap;

pub use convert::{argument, ByteString, Converter, DomString, Object, UsvString};
pub use env::{
    Callback, CallbackInfo, Deferred, Env, Finalizer, Host, PropertyAttributes,
    PropertyDescriptor, PropertyKind, Reference, Value, ValueType,
};
pub use error::{Error, Result};
pub use expose::{
    expose_interface, exposure_globals, ExposedPartialProperty, ExposedPartialSameObjProperty,
};
pub use instance::{wrap_native, InstanceData};
pub use overload::pick_signature;
pub use promise::{Promise, REJECTION_MESSAGE};
pub use sequence::FrozenArray;
pub use wrap::{ensure_construct_call, native_external, take_native, Wrapping};

/// Source directory of this crate, reported by `idl-weld --include-dir`
pub const INCLUDE_DIR: &str = env!("CARGO_MANIFEST_DIR");

/// Everything generated binding modules refer to
pub mod prelude {
    pub use crate::convert::{argument, ByteString, Converter, DomString, Object, UsvString};
    pub use crate::env::{
        CallbackInfo, Env, PropertyAttributes, PropertyDescriptor, Value, ValueType,
    };
    pub use crate::error::{Error, Result};
    pub use crate::expose::{
        expose_interface, ExposedPartialProperty, ExposedPartialSameObjProperty,
    };
    pub use crate::instance::{wrap_native, InstanceData};
    pub use crate::overload::pick_signature;
    pub use crate::promise::Promise;
    pub use crate::sequence::FrozenArray;
    pub use crate::wrap::{ensure_construct_call, take_native, Wrapping};
}
