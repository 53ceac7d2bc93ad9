//! Overload resolution
//!
//! Signatures are lists of host type tags. Candidates are eliminated one
//! argument position at a time, left to right; the first survivor in
//! declaration order wins.
//!
//! Signatures are matched by exact arity, so an overload with optional
//! trailing arguments is passed once per accepted length (its effective
//! overload set). The generator emits those entries and maps every entry
//! back to the overload it came from.

use crate::env::{Env, Value, ValueType};
use crate::error::Result;

/// Pick the signature matching the actual arguments.
///
/// A candidate is eliminated at position `i` if it declares fewer than
/// `i + 1` arguments or if its type at `i` differs from the type of the
/// actual argument. Candidates declaring more arguments than were supplied
/// are eliminated at the end of the walk. Returns `None` when no candidate
/// survives; callers treat that as "no matching overload".
pub fn pick_signature(
    env: &Env,
    args: &[Value],
    signatures: &[&[ValueType]],
) -> Result<Option<usize>> {
    let mut candidates = vec![true; signatures.len()];

    for (position, arg) in args.iter().enumerate() {
        let actual = env.type_of(*arg)?;
        for (candidate, signature) in candidates.iter_mut().zip(signatures) {
            if *candidate && signature.get(position) != Some(&actual) {
                *candidate = false;
            }
        }
    }

    for (candidate, signature) in candidates.iter_mut().zip(signatures) {
        if signature.len() > args.len() {
            *candidate = false;
        }
    }

    Ok(candidates.iter().position(|candidate| *candidate))
}
