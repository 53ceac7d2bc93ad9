//! Per-host-instance registry
//!
//! Several generated modules may be loaded into one host instance; they all
//! share the single [`InstanceData`] stored in the host's instance-data slot.

use crate::env::{Env, Finalizer, Reference, Value};
use crate::error::{Error, Result};
use crate::wrap::native_external;
use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Constructor references and one embedder data slot
pub struct InstanceData {
    ctors: RefCell<IndexMap<String, Reference>>,
    data: RefCell<Option<(Rc<dyn Any>, Finalizer)>>,
}

impl InstanceData {
    /// The registry of `env`, created and installed on first access
    pub fn current(env: &Env) -> Result<Rc<Self>> {
        if let Some(data) = env.get_instance_data()? {
            return data
                .downcast::<Self>()
                .map_err(|_| Error::host("instance data slot is owned by someone else"));
        }

        let registry = Rc::new(Self {
            ctors: RefCell::new(IndexMap::new()),
            data: RefCell::new(None),
        });
        env.set_instance_data(registry.clone(), Self::destroy)?;
        debug!("created instance registry");
        Ok(registry)
    }

    /// Keep `ctor` alive under `name`, replacing any earlier registration
    pub fn add_constructor(&self, env: &Env, name: &str, ctor: Value) -> Result<()> {
        let reference = env.create_reference(ctor, 1)?;
        let previous = self.ctors.borrow_mut().insert(name.to_string(), reference);
        if let Some(previous) = previous {
            env.delete_reference(previous)?;
        }
        Ok(())
    }

    pub fn constructor(&self, env: &Env, name: &str) -> Result<Value> {
        let reference = self
            .ctors
            .borrow()
            .get(name)
            .copied()
            .ok_or_else(|| Error::ConstructorNotFound(name.to_string()))?;
        env.get_reference_value(reference)?
            .ok_or_else(|| Error::ConstructorNotFound(name.to_string()))
    }

    /// Store embedder data; `finalizer` runs at teardown
    pub fn set_data(&self, data: Rc<dyn Any>, finalizer: Finalizer) {
        *self.data.borrow_mut() = Some((data, finalizer));
    }

    pub fn data(&self) -> Option<Rc<dyn Any>> {
        self.data.borrow().as_ref().map(|(data, _)| data.clone())
    }

    fn destroy(env: &Env, data: Rc<dyn Any>) {
        let Ok(registry) = data.downcast::<Self>() else {
            warn!("instance finalizer received foreign data");
            return;
        };

        let ctors = std::mem::take(&mut *registry.ctors.borrow_mut());
        for (name, reference) in ctors {
            if let Err(err) = env.delete_reference(reference) {
                warn!(interface = %name, "failed to release constructor reference: {}", err);
            }
        }

        let embedder = registry.data.borrow_mut().take();
        if let Some((data, finalizer)) = embedder {
            finalizer(env, data);
        }
        debug!("released instance registry");
    }
}

/// Turn a native value into an instance of the host class registered under
/// `name`, going through the constructor's external fast path
pub fn wrap_native<T: 'static>(env: &Env, name: &str, native: T) -> Result<Value> {
    let ctor = InstanceData::current(env)?.constructor(env, name)?;
    let external = native_external(env, native)?;
    env.new_instance(ctor, &[external])
}
