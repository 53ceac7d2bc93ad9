//! Native-side promises
//!
//! A [`Promise`] can be settled before or after it has crossed to the host.
//! The host promise is created the first time the value is converted; from
//! then on every settlement is forwarded immediately. The first settlement
//! wins and the host side is settled exactly once.

use crate::convert::Converter;
use crate::env::{Deferred, Env, Value};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Message of the error a rejected promise settles with
pub const REJECTION_MESSAGE: &str = "Promise rejected";

enum State<T> {
    Pending,
    Resolved(T),
    Rejected,
    Settled,
}

struct Inner<T> {
    state: State<T>,
    env: Option<Env>,
    deferred: Option<Deferred>,
    promise: Option<Value>,
}

/// `Promise<T>`; clones share one settlement
pub struct Promise<T>(Rc<RefCell<Inner<T>>>);

impl<T: Converter> Promise<T> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Inner {
            state: State::Pending,
            env: None,
            deferred: None,
            promise: None,
        })))
    }

    /// Fulfil with `value`. Ignored once settled.
    pub fn resolve(&self, value: T) -> Result<()> {
        {
            let mut inner = self.0.borrow_mut();
            if !matches!(inner.state, State::Pending) {
                return Ok(());
            }
            inner.state = State::Resolved(value);
        }
        self.forward()
    }

    /// Reject with the fixed rejection error. Ignored once settled.
    pub fn reject(&self) -> Result<()> {
        {
            let mut inner = self.0.borrow_mut();
            if !matches!(inner.state, State::Pending) {
                return Ok(());
            }
            inner.state = State::Rejected;
        }
        self.forward()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.0.borrow().state, State::Pending)
    }

    /// Produce the host promise, creating it on first use and settling it
    /// if the native side already has.
    pub fn conclude(&self, env: &Env) -> Result<Value> {
        let promise = {
            let mut inner = self.0.borrow_mut();
            if inner.env.is_none() {
                inner.env = Some(env.clone());
            }
            match inner.promise {
                Some(promise) => promise,
                None => {
                    let (deferred, promise) = env.create_promise()?;
                    inner.deferred = Some(deferred);
                    inner.promise = Some(promise);
                    promise
                }
            }
        };
        self.forward()?;
        Ok(promise)
    }

    /// Settle the host promise if both sides are ready
    fn forward(&self) -> Result<()> {
        let (env, deferred, outcome) = {
            let mut inner = self.0.borrow_mut();
            let (Some(env), Some(deferred)) = (inner.env.clone(), inner.deferred) else {
                return Ok(());
            };
            match std::mem::replace(&mut inner.state, State::Settled) {
                outcome @ (State::Resolved(_) | State::Rejected) => (env, deferred, outcome),
                other => {
                    inner.state = other;
                    return Ok(());
                }
            }
        };

        // On failure the outcome is put back so a later `conclude` retries.
        match outcome {
            State::Resolved(value) => match value.to_js(&env) {
                Ok(resolution) => env.resolve_deferred(deferred, resolution),
                Err(err) => {
                    self.0.borrow_mut().state = State::Resolved(value);
                    Err(err)
                }
            },
            _ => match env.create_error(None, REJECTION_MESSAGE) {
                Ok(error) => env.reject_deferred(deferred, error),
                Err(err) => {
                    self.0.borrow_mut().state = State::Rejected;
                    Err(err)
                }
            },
        }
    }
}

impl<T: Converter> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.0.borrow().state {
            State::Pending => "pending",
            State::Resolved(_) => "resolved",
            State::Rejected => "rejected",
            State::Settled => "settled",
        };
        f.debug_tuple("Promise").field(&state).finish()
    }
}

impl<T: Converter> Converter for Promise<T> {
    fn to_native(_env: &Env, _value: Value) -> Result<Self> {
        Err(Error::invalid_arg(
            "host promises cannot be converted to native promises",
        ))
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        self.conclude(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryHost, PromiseStatus};
    use std::cell::Cell;

    fn rejection_message(env: &Env, host: &MemoryHost, promise: Value) -> String {
        match host.promise_state(promise).unwrap() {
            PromiseStatus::Rejected(error) => {
                assert!(host.is_error(error).unwrap());
                let message = env.get_named_property(error, "message").unwrap();
                env.get_value_string(message).unwrap()
            }
            other => panic!("expected rejection, found {:?}", other),
        }
    }

    #[test]
    fn test_resolve_before_conclude() {
        let host = MemoryHost::new();
        let env = host.env();

        let promise = Promise::<i32>::new();
        promise.resolve(5).unwrap();
        let value = promise.to_js(&env).unwrap();

        match host.promise_state(value).unwrap() {
            PromiseStatus::Fulfilled(result) => {
                assert_eq!(env.get_value_number(result).unwrap(), 5.0)
            }
            other => panic!("expected fulfilment, found {:?}", other),
        }
    }

    #[test]
    fn test_resolve_after_conclude() {
        let host = MemoryHost::new();
        let env = host.env();

        let promise = Promise::<String>::new();
        let value = promise.conclude(&env).unwrap();
        assert_eq!(host.promise_state(value).unwrap(), PromiseStatus::Pending);

        promise.clone().resolve("done".into()).unwrap();
        assert!(matches!(
            host.promise_state(value).unwrap(),
            PromiseStatus::Fulfilled(_)
        ));
    }

    #[test]
    fn test_first_settlement_wins() {
        let host = MemoryHost::new();
        let env = host.env();

        let promise = Promise::<i32>::new();
        let value = promise.conclude(&env).unwrap();
        promise.reject().unwrap();
        promise.resolve(1).unwrap();

        assert_eq!(rejection_message(&env, &host, value), REJECTION_MESSAGE);
        assert!(!promise.is_pending());
    }

    #[test]
    fn test_conclude_is_idempotent() {
        let host = MemoryHost::new();
        let env = host.env();

        let promise = Promise::<()>::new();
        promise.reject().unwrap();
        let first = promise.conclude(&env).unwrap();
        let second = promise.conclude(&env).unwrap();
        assert_eq!(first, second);
        assert_eq!(rejection_message(&env, &host, first), "Promise rejected");
    }

    /// Converts only once `ready` is set
    struct Deferrable {
        ready: Rc<Cell<bool>>,
    }

    impl Converter for Deferrable {
        fn to_native(_env: &Env, _value: Value) -> Result<Self> {
            Err(Error::invalid_arg("not convertible"))
        }

        fn to_js(&self, env: &Env) -> Result<Value> {
            if !self.ready.get() {
                return Err(Error::host("transient"));
            }
            env.create_number(7.0)
        }
    }

    #[test]
    fn test_failed_conversion_keeps_resolution() {
        let host = MemoryHost::new();
        let env = host.env();
        let ready = Rc::new(Cell::new(false));

        let promise = Promise::new();
        promise
            .resolve(Deferrable {
                ready: ready.clone(),
            })
            .unwrap();
        assert_eq!(
            promise.conclude(&env).unwrap_err(),
            Error::host("transient")
        );
        assert!(!promise.is_pending());

        ready.set(true);
        let value = promise.conclude(&env).unwrap();
        match host.promise_state(value).unwrap() {
            PromiseStatus::Fulfilled(result) => {
                assert_eq!(env.get_value_number(result).unwrap(), 7.0)
            }
            other => panic!("expected fulfilment, found {:?}", other),
        }

        // Settled once; later calls return the same promise untouched.
        assert_eq!(promise.conclude(&env).unwrap(), value);
        promise.reject().unwrap();
        assert!(matches!(
            host.promise_state(value).unwrap(),
            PromiseStatus::Fulfilled(_)
        ));
    }

    #[test]
    fn test_host_promise_is_not_convertible() {
        let host = MemoryHost::new();
        let env = host.env();

        let (_deferred, value) = env.create_promise().unwrap();
        assert!(Promise::<i32>::to_native(&env, value)
            .unwrap_err()
            .is_invalid_argument());
    }
}
