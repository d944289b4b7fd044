//! Argument Value Module
//!
//! A hashable, equality-comparable representation of the values a cached
//! call may be keyed by.

use std::collections::BTreeMap;

// == Argument Value ==
/// A single call-argument value in cache-key form.
///
/// Every variant is `Eq + Hash`, so any tree of values can participate in a
/// lookup key. Floats are carried as their raw bit pattern: two floats key
/// equal exactly when their bits match (`0.0` and `-0.0` are distinct
/// keys). NaN has no stable equality and is rejected during key
/// derivation, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgValue {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// f64 stored as `to_bits()`
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<ArgValue>),
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    // == Constructors ==
    /// Wraps a float, preserving its exact bit pattern.
    pub fn float(value: f64) -> Self {
        ArgValue::Float(value.to_bits())
    }

    /// Builds a sequence value from anything convertible.
    pub fn seq<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgValue>,
    {
        ArgValue::Seq(values.into_iter().map(Into::into).collect())
    }

    /// Builds a named mapping value from anything convertible.
    pub fn map<I, S, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<ArgValue>,
    {
        ArgValue::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    // == Accessors ==
    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the signed integer if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the unsigned integer if this is a `UInt`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ArgValue::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float if this is a `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    /// Returns the string slice if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the byte slice if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ArgValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    // == NaN Detection ==
    /// True if this value, or any value nested inside it, is a NaN float.
    ///
    /// Such a value has no stable equality and cannot participate in a
    /// cache key; key derivation rejects it.
    pub(crate) fn contains_nan(&self) -> bool {
        match self {
            ArgValue::Float(bits) => f64::from_bits(*bits).is_nan(),
            ArgValue::Seq(values) => values.iter().any(ArgValue::contains_nan),
            ArgValue::Map(entries) => entries.values().any(ArgValue::contains_nan),
            _ => false,
        }
    }
}

// == Conversions ==
macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(value: $t) -> Self {
                ArgValue::Int(value as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(value: $t) -> Self {
                ArgValue::UInt(value as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<()> for ArgValue {
    fn from(_: ()) -> Self {
        ArgValue::Unit
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<f32> for ArgValue {
    fn from(value: f32) -> Self {
        ArgValue::float(f64::from(value))
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::float(value)
    }
}

impl From<char> for ArgValue {
    fn from(value: char) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<&[u8]> for ArgValue {
    fn from(value: &[u8]) -> Self {
        ArgValue::Bytes(value.to_vec())
    }
}

impl From<Vec<ArgValue>> for ArgValue {
    fn from(value: Vec<ArgValue>) -> Self {
        ArgValue::Seq(value)
    }
}

impl From<BTreeMap<String, ArgValue>> for ArgValue {
    fn from(value: BTreeMap<String, ArgValue>) -> Self {
        ArgValue::Map(value)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => ArgValue::Unit,
        }
    }
}
