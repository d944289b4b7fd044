//! Key Derivation Module
//!
//! Turns a call's arguments into the opaque, hashable key the cache
//! containers are indexed by.

use std::collections::BTreeMap;

use crate::error::{CacheError, Result};
use crate::key::{ArgValue, CallArgs};

// == Cache Key ==
/// An opaque key derived from one call's arguments.
///
/// Two calls with equal post-skip positional arguments and equal named
/// arguments derive equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    positional: Vec<ArgValue>,
    named: BTreeMap<String, ArgValue>,
}

// == Key Deriver ==
/// Derives cache keys, optionally excluding leading positional arguments.
///
/// `skip_args` exists for receiver-like leading arguments that should not
/// participate in cache identity (e.g. a handle passed to every call).
/// Skipping more arguments than exist leaves an empty positional component.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDeriver {
    skip_args: usize,
}

impl KeyDeriver {
    // == Constructor ==
    /// Creates a deriver that drops the first `skip_args` positional values.
    pub fn new(skip_args: usize) -> Self {
        Self { skip_args }
    }

    /// Number of leading positional arguments excluded from keys.
    pub fn skip_args(&self) -> usize {
        self.skip_args
    }

    // == Derive ==
    /// Derives the cache key for `args`.
    ///
    /// Fails with [`CacheError::KeyDerivation`] if any key-participating
    /// value contains a NaN float, which has no stable equality. The
    /// failure is fatal to the call: a memoized operation is never invoked
    /// when its result could not be stored under a valid key. Skipped
    /// arguments are not validated since they never enter the key.
    pub fn derive(&self, args: &CallArgs) -> Result<CacheKey> {
        for (index, value) in args.positional().iter().enumerate().skip(self.skip_args) {
            if value.contains_nan() {
                return Err(CacheError::KeyDerivation(format!(
                    "positional argument {index} contains NaN, which has no stable equality"
                )));
            }
        }
        for (name, value) in args.named_args() {
            if value.contains_nan() {
                return Err(CacheError::KeyDerivation(format!(
                    "named argument `{name}` contains NaN, which has no stable equality"
                )));
            }
        }

        Ok(CacheKey {
            positional: args
                .positional()
                .iter()
                .skip(self.skip_args)
                .cloned()
                .collect(),
            named: args.named_args().clone(),
        })
    }
}
