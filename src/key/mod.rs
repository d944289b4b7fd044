//! Key Derivation Module
//!
//! Converts a call's positional and named arguments into a single hashable,
//! equality-comparable cache key.

mod args;
mod derive;
mod value;

// Re-export public types
pub use args::CallArgs;
pub use derive::{CacheKey, KeyDeriver};
pub use value::ArgValue;
