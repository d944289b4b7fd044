//! Call Arguments Module
//!
//! The call representation handed to a memoized operation: an ordered list
//! of positional values plus an order-independent named mapping.

use std::collections::BTreeMap;

use crate::key::ArgValue;

// == Call Arguments ==
/// Positional and named arguments for one memoized call.
///
/// Built in builder style and consumed by the wrapped operation:
///
/// ```
/// use memo_cache::CallArgs;
///
/// let args = CallArgs::new().arg(42).arg("user").named("verbose", true);
/// assert_eq!(args.pos(0).and_then(|v| v.as_i64()), Some(42));
/// assert_eq!(args.get("verbose").and_then(|v| v.as_bool()), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    /// Positional values, in call order
    positional: Vec<ArgValue>,
    /// Named values; ordering of insertion does not affect equality
    named: BTreeMap<String, ArgValue>,
}

impl CallArgs {
    // == Constructor ==
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument, overwriting any previous value for the name.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    // == Accessors ==
    /// All positional values in call order.
    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    /// The named argument mapping.
    pub fn named_args(&self) -> &BTreeMap<String, ArgValue> {
        &self.named
    }

    /// Positional value at `index`, if present.
    pub fn pos(&self, index: usize) -> Option<&ArgValue> {
        self.positional.get(index)
    }

    /// Named value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.named.get(name)
    }

    /// Total number of arguments, positional and named.
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// True when no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}
