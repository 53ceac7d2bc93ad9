//! Object wrapping and SameObject caching
//!
//! A [`Wrapping`] ties one native instance to one host object. It owns the
//! native instance and one cache slot per `[SameObject]` attribute of the
//! interface; both are released in the host's finalizer for the object and
//! nowhere else.

use crate::env::{CallbackInfo, Env, Reference, Value};
use crate::error::{Error, Result};
use std::any::{type_name, Any};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::{trace, warn};

/// Native instance attached to a host object
pub struct Wrapping<T> {
    native: RefCell<T>,
    refs: RefCell<Vec<Option<Reference>>>,
}

impl<T: 'static> Wrapping<T> {
    /// Attach `native` to `js_rcv` with `same_obj_count` empty cache slots
    pub fn create(env: &Env, js_rcv: Value, native: T, same_obj_count: usize) -> Result<()> {
        let wrapping = Rc::new(Self {
            native: RefCell::new(native),
            refs: RefCell::new(vec![None; same_obj_count]),
        });
        env.wrap(js_rcv, wrapping, Self::destroy)
    }

    /// Recover the wrapping attached to `js_rcv`
    pub fn retrieve(env: &Env, js_rcv: Value) -> Result<Rc<Self>> {
        env.unwrap(js_rcv)?.downcast::<Self>().map_err(|_| {
            Error::invalid_arg(format!("receiver does not wrap a `{}`", type_name::<T>()))
        })
    }

    pub fn native(&self) -> Result<Ref<'_, T>> {
        self.native
            .try_borrow()
            .map_err(|_| Error::NativeBusy(type_name::<T>()))
    }

    pub fn native_mut(&self) -> Result<RefMut<'_, T>> {
        self.native
            .try_borrow_mut()
            .map_err(|_| Error::NativeBusy(type_name::<T>()))
    }

    /// Number of SameObject slots
    pub fn slot_count(&self) -> usize {
        self.refs.borrow().len()
    }

    /// Value cached in slot `index`, if populated
    pub fn cached(&self, env: &Env, index: usize) -> Result<Option<Value>> {
        let slot = self.refs.borrow().get(index).copied().flatten();
        match slot {
            Some(reference) => env.get_reference_value(reference),
            None => Ok(None),
        }
    }

    /// Store `value` in slot `index` behind a strong reference
    pub fn set_ref(&self, env: &Env, index: usize, value: Value) -> Result<()> {
        if index >= self.slot_count() {
            return Err(Error::invalid_arg(format!(
                "SameObject slot {} out of range for `{}`",
                index,
                type_name::<T>()
            )));
        }

        let reference = env.create_reference(value, 1)?;
        let previous = self.refs.borrow_mut()[index].replace(reference);
        if let Some(previous) = previous {
            env.delete_reference(previous)?;
        }
        Ok(())
    }

    /// Getter body shared by every generated attribute getter.
    ///
    /// With a slot index the first read converts and caches; later reads
    /// return the cached value without calling `read`.
    pub fn get_attribute<F>(
        env: &Env,
        info: &CallbackInfo,
        same_object: Option<usize>,
        read: F,
    ) -> Result<Value>
    where
        F: FnOnce(&T, &Env) -> Result<Value>,
    {
        let wrapping = Self::retrieve(env, info.this())?;

        if let Some(index) = same_object {
            if let Some(cached) = wrapping.cached(env, index)? {
                return Ok(cached);
            }
        }

        let value = {
            let native = wrapping.native()?;
            read(&native, env)?
        };

        if let Some(index) = same_object {
            wrapping.set_ref(env, index, value)?;
        }
        Ok(value)
    }

    /// Setter body shared by every generated attribute setter. The new value
    /// is converted before the native instance is borrowed.
    pub fn set_attribute<V, F>(env: &Env, info: &CallbackInfo, write: F) -> Result<Value>
    where
        V: crate::convert::Converter,
        F: FnOnce(&mut T, V),
    {
        let wrapping = Self::retrieve(env, info.this())?;
        let value = crate::convert::argument::<V>(env, info.args(), 0)?;
        write(&mut *wrapping.native_mut()?, value);
        env.get_undefined()
    }

    fn destroy(env: &Env, data: Rc<dyn Any>) {
        let Ok(wrapping) = data.downcast::<Self>() else {
            warn!("finalizer for `{}` received foreign data", type_name::<T>());
            return;
        };

        let refs: Vec<Reference> = wrapping.refs.borrow_mut().drain(..).flatten().collect();
        for reference in refs {
            if let Err(err) = env.delete_reference(reference) {
                warn!("failed to release SameObject reference: {}", err);
            }
        }
        trace!("destroyed wrapped `{}`", type_name::<T>());
    }
}

/// Host external carrying an already-constructed native instance, for the
/// constructor's wrap fast path
pub fn native_external<T: 'static>(env: &Env, native: T) -> Result<Value> {
    env.create_external(Rc::new(RefCell::new(Some(native))))
}

/// Take the native instance out of an external made by [`native_external`]
pub fn take_native<T: 'static>(env: &Env, external: Value) -> Result<T> {
    let cell = env
        .get_value_external(external)?
        .downcast::<RefCell<Option<T>>>()
        .map_err(|_| {
            Error::invalid_arg(format!("external does not carry a `{}`", type_name::<T>()))
        })?;
    let taken = cell.borrow_mut().take();
    taken.ok_or_else(|| {
        Error::invalid_arg(format!("native `{}` was already taken", type_name::<T>()))
    })
}

/// Reject calls to a constructor made without `new`
pub fn ensure_construct_call(info: &CallbackInfo, interface: &str) -> Result<()> {
    if info.new_target().is_none() {
        return Err(Error::NotConstructCall(interface.to_string()));
    }
    Ok(())
}
