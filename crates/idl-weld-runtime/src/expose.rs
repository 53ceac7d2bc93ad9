//! Global-prototype exposure
//!
//! Exposed interfaces are attached to `global[name].prototype` for each
//! named global instead of being nested under the module exports. Partial
//! interfaces promoted to standalone declarations own no constructor, so
//! their attributes are spliced onto each prototype one property at a time,
//! each carrying its own per-global state.

use crate::convert::{argument, Converter};
use crate::env::{CallbackInfo, Env, PropertyAttributes, PropertyDescriptor, Reference, Value};
use crate::error::{Error, Result};
use std::any::{type_name, Any};
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::{trace, warn};

/// `global[name].prototype` for every name, in order
pub fn exposure_globals(env: &Env, globals: &[&str]) -> Result<Vec<Value>> {
    let global = env.get_global()?;
    globals
        .iter()
        .map(|name| {
            let dest = env.get_named_property(global, name)?;
            env.get_named_property(dest, "prototype")
        })
        .collect()
}

/// Define `properties` on the prototype of every named global
pub fn expose_interface(
    env: &Env,
    properties: &[PropertyDescriptor],
    globals: &[&str],
) -> Result<()> {
    for dest in exposure_globals(env, globals)? {
        env.define_properties(dest, properties)?;
    }
    Ok(())
}

fn callback_data<D: 'static>(info: &CallbackInfo) -> Result<Rc<D>> {
    info.data()
        .cloned()
        .and_then(|data| data.downcast::<D>().ok())
        .ok_or_else(|| Error::host(format!("missing `{}` callback data", type_name::<D>())))
}

/// An attribute of an exposed partial interface. Each global holds its own
/// value, starting from `T::default()`.
pub struct ExposedPartialProperty<T> {
    value: RefCell<T>,
}

impl<T: Converter + Default + 'static> ExposedPartialProperty<T> {
    pub fn define(
        env: &Env,
        globals: &[&str],
        name: &str,
        attributes: PropertyAttributes,
        readonly: bool,
    ) -> Result<()> {
        for dest in exposure_globals(env, globals)? {
            let data = Rc::new(Self {
                value: RefCell::new(T::default()),
            });
            env.add_finalizer(dest, data.clone(), Self::destroy)?;

            let descriptor = if readonly {
                PropertyDescriptor::getter(name, Self::getter)
            } else {
                PropertyDescriptor::accessor(name, Self::getter, Self::setter)
            };
            env.define_properties(dest, &[descriptor.with_attributes(attributes).with_data(data)])?;
        }
        Ok(())
    }

    fn getter(env: &Env, info: &CallbackInfo) -> Result<Value> {
        let data = callback_data::<Self>(info)?;
        let value = data
            .value
            .try_borrow()
            .map_err(|_| Error::NativeBusy(type_name::<T>()))?;
        value.to_js(env)
    }

    fn setter(env: &Env, info: &CallbackInfo) -> Result<Value> {
        let data = callback_data::<Self>(info)?;
        let value = argument::<T>(env, info.args(), 0)?;
        *data
            .value
            .try_borrow_mut()
            .map_err(|_| Error::NativeBusy(type_name::<T>()))? = value;
        env.get_undefined()
    }

    fn destroy(_env: &Env, _data: Rc<dyn Any>) {
        trace!("released exposed `{}` property", type_name::<T>());
    }
}

/// A `[SameObject]` attribute of an exposed partial interface. The first
/// read converts `T::default()` and caches it for that global.
pub struct ExposedPartialSameObjProperty<T> {
    cached: Cell<Option<Reference>>,
    _marker: PhantomData<T>,
}

impl<T: Converter + Default + 'static> ExposedPartialSameObjProperty<T> {
    pub fn define(
        env: &Env,
        globals: &[&str],
        name: &str,
        attributes: PropertyAttributes,
    ) -> Result<()> {
        for dest in exposure_globals(env, globals)? {
            let data = Rc::new(Self {
                cached: Cell::new(None),
                _marker: PhantomData,
            });
            env.add_finalizer(dest, data.clone(), Self::destroy)?;

            let descriptor = PropertyDescriptor::getter(name, Self::getter)
                .with_attributes(attributes)
                .with_data(data);
            env.define_properties(dest, &[descriptor])?;
        }
        Ok(())
    }

    fn getter(env: &Env, info: &CallbackInfo) -> Result<Value> {
        let data = callback_data::<Self>(info)?;
        if let Some(reference) = data.cached.get() {
            if let Some(value) = env.get_reference_value(reference)? {
                return Ok(value);
            }
        }

        let value = T::default().to_js(env)?;
        let reference = env.create_reference(value, 1)?;
        if let Some(stale) = data.cached.replace(Some(reference)) {
            env.delete_reference(stale)?;
        }
        Ok(value)
    }

    fn destroy(env: &Env, data: Rc<dyn Any>) {
        let Ok(data) = data.downcast::<Self>() else {
            warn!("exposed property finalizer received foreign data");
            return;
        };
        if let Some(reference) = data.cached.take() {
            if let Err(err) = env.delete_reference(reference) {
                warn!("failed to release cached `{}` value: {}", type_name::<T>(), err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Object;
    use crate::memory::MemoryHost;

    fn noop(env: &Env, _info: &CallbackInfo) -> Result<Value> {
        env.get_undefined()
    }

    #[derive(Default)]
    struct Fresh;

    impl Converter for Fresh {
        fn to_native(_env: &Env, _value: Value) -> Result<Self> {
            Ok(Fresh)
        }

        fn to_js(&self, env: &Env) -> Result<Value> {
            env.create_object()
        }
    }

    /// Install `global.Window` and `global.Worker` classes
    fn install_globals(env: &Env) -> Vec<Value> {
        let global = env.get_global().unwrap();
        ["Window", "Worker"]
            .iter()
            .map(|name| {
                let class = env.define_class(name, noop, &[]).unwrap();
                env.set_named_property(global, name, class).unwrap();
                env.get_named_property(class, "prototype").unwrap()
            })
            .collect()
    }

    #[test]
    fn test_expose_interface_on_every_global() {
        let host = MemoryHost::new();
        let env = host.env();
        let prototypes = install_globals(&env);

        expose_interface(
            &env,
            &[PropertyDescriptor::method("ping", noop)],
            &["Window", "Worker"],
        )
        .unwrap();
        for prototype in prototypes {
            assert!(host.property_names(prototype).unwrap().contains(&"ping".to_string()));
        }

        assert!(exposure_globals(&env, &["Missing"]).is_err());
    }

    #[test]
    fn test_partial_property_is_per_global() {
        let host = MemoryHost::new();
        let env = host.env();
        let prototypes = install_globals(&env);

        ExposedPartialProperty::<i32>::define(
            &env,
            &["Window", "Worker"],
            "level",
            PropertyAttributes::ENUMERABLE,
            false,
        )
        .unwrap();

        let five = env.create_number(5.0).unwrap();
        env.set_named_property(prototypes[0], "level", five).unwrap();

        let window = env.get_named_property(prototypes[0], "level").unwrap();
        let worker = env.get_named_property(prototypes[1], "level").unwrap();
        assert_eq!(env.get_value_number(window).unwrap(), 5.0);
        assert_eq!(env.get_value_number(worker).unwrap(), 0.0);
    }

    #[test]
    fn test_readonly_partial_property() {
        let host = MemoryHost::new();
        let env = host.env();
        let prototypes = install_globals(&env);

        ExposedPartialProperty::<String>::define(
            &env,
            &["Window"],
            "origin",
            PropertyAttributes::DEFAULT,
            true,
        )
        .unwrap();
        let text = env.create_string("x").unwrap();
        assert!(env.set_named_property(prototypes[0], "origin", text).is_err());
    }

    #[test]
    fn test_same_object_partial_property() {
        let host = MemoryHost::new();
        let env = host.env();
        let prototypes = install_globals(&env);

        ExposedPartialSameObjProperty::<Fresh>::define(
            &env,
            &["Window", "Worker"],
            "navigator",
            PropertyAttributes::ENUMERABLE,
        )
        .unwrap();

        let first = env.get_named_property(prototypes[0], "navigator").unwrap();
        let second = env.get_named_property(prototypes[0], "navigator").unwrap();
        let other = env.get_named_property(prototypes[1], "navigator").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(Object::to_native(&env, first).is_ok());
        assert_eq!(host.live_references(), 2);

        host.collect(prototypes[0]).unwrap();
        assert_eq!(host.live_references(), 1);
        host.teardown().unwrap();
        assert_eq!(host.live_references(), 0);
    }
}
