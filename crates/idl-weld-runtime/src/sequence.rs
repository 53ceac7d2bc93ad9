//! `sequence<T>` and `FrozenArray<T>` conversion
//!
//! Both go through the same positional copy. The frozen variant is immutable
//! on both sides: natively it only derefs to a slice, and its host array is
//! frozen once filled.

use crate::convert::Converter;
use crate::env::{Env, Value};
use crate::error::{Error, Result};
use std::ops::Deref;

fn array_to_js<T: Converter>(env: &Env, items: &[T], freeze: bool) -> Result<Value> {
    let length = u32::try_from(items.len())
        .map_err(|_| Error::host(format!("sequence of {} items is too long", items.len())))?;
    let array = env.create_array(length)?;

    for (index, item) in (0..length).zip(items) {
        let member = item.to_js(env)?;
        env.set_element(array, index, member)?;
    }

    if freeze {
        env.object_freeze(array)?;
    }
    Ok(array)
}

fn array_to_native<T: Converter>(env: &Env, value: Value) -> Result<Vec<T>> {
    if !env.is_array(value)? {
        return Err(Error::invalid_arg(format!(
            "array expected, found {}",
            env.type_of(value)?
        )));
    }

    let length = env.get_array_length(value)?;
    let mut result = Vec::with_capacity(length as usize);
    for index in 0..length {
        let member = env.get_element(value, index)?;
        result.push(T::to_native(env, member)?);
    }
    Ok(result)
}

/// `sequence<T>`
impl<T: Converter> Converter for Vec<T> {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        array_to_native(env, value)
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        array_to_js(env, self, false)
    }
}

/// `FrozenArray<T>`: a sequence that cannot be modified once produced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FrozenArray<T>(Vec<T>);

impl<T> FrozenArray<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for FrozenArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for FrozenArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for FrozenArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a FrozenArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Converter> Converter for FrozenArray<T> {
    fn to_native(env: &Env, value: Value) -> Result<Self> {
        array_to_native(env, value).map(Self)
    }

    fn to_js(&self, env: &Env) -> Result<Value> {
        array_to_js(env, &self.0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DomString;
    use crate::memory::MemoryHost;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sequence_positional_conversion() {
        let host = MemoryHost::new();
        let env = host.env();

        let array = vec![3i32, 1, 2].to_js(&env).unwrap();
        assert_eq!(env.get_array_length(array).unwrap(), 3);
        let first = env.get_element(array, 0).unwrap();
        assert_eq!(env.get_value_number(first).unwrap(), 3.0);

        let back = Vec::<i32>::to_native(&env, array).unwrap();
        assert_eq!(back, vec![3, 1, 2]);
    }

    #[test]
    fn test_nested_sequences() {
        let host = MemoryHost::new();
        let env = host.env();

        let nested = vec![vec!["a".to_string()], vec![], vec!["b".into(), "c".into()]];
        let array = nested.to_js(&env).unwrap();
        assert_eq!(Vec::<Vec<DomString>>::to_native(&env, array).unwrap(), nested);
    }

    #[test]
    fn test_element_conversion_failure() {
        let host = MemoryHost::new();
        let env = host.env();

        let array = env.create_array(2).unwrap();
        let one = env.create_number(1.0).unwrap();
        let text = env.create_string("two").unwrap();
        env.set_element(array, 0, one).unwrap();
        env.set_element(array, 1, text).unwrap();

        assert!(Vec::<f64>::to_native(&env, array).unwrap_err().is_invalid_argument());

        let not_array = env.create_object().unwrap();
        assert!(Vec::<f64>::to_native(&env, not_array).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_frozen_array_is_frozen_on_host() {
        let host = MemoryHost::new();
        let env = host.env();

        let frozen: FrozenArray<u16> = vec![10, 20].into();
        let array = frozen.to_js(&env).unwrap();
        assert!(host.is_frozen(array).unwrap());

        let replacement = env.create_number(99.0).unwrap();
        assert!(env.set_element(array, 0, replacement).is_err());

        let plain = vec![10u16, 20].to_js(&env).unwrap();
        assert!(!host.is_frozen(plain).unwrap());

        let back = FrozenArray::<u16>::to_native(&env, array).unwrap();
        assert_eq!(&*back, &[10, 20]);
    }
}
