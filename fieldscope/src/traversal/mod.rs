//! Scoped traversal and its building blocks.
//!
//! - **`traits`**: `ScopedContainer` and `Scoped`
//! - **`context`**: `ScopeContext`, the per-call permissions and depth bound
//! - **`wrappers`**: `OpaqueValue<T>` for foreign leaf types
//! - **`containers`**: `ScopedContainer` implementations for std types
//! - **`json`**: `serde_json::Value` as a leaf

mod containers;
mod context;
mod json;
mod traits;
mod wrappers;

use serde::Serialize;
use serde_json::Value;

pub use context::{DEFAULT_MAX_DEPTH, ScopeContext};
pub use traits::{Scoped, ScopedContainer};
pub use wrappers::OpaqueValue;

use crate::error::{FormatError, ScopeError};

/// Serializes a leaf into the document tree.
#[doc(hidden)]
pub fn to_leaf<T: Serialize + ?Sized>(value: &T) -> Result<Value, ScopeError> {
    serde_json::to_value(value).map_err(|err| ScopeError::Encode(FormatError::new("document", err)))
}

/// Serializes a leaf through a `serialize_with` function.
#[doc(hidden)]
pub fn to_leaf_with<T, F>(value: &T, serialize: F) -> Result<Value, ScopeError>
where
    T: ?Sized,
    F: FnOnce(&T, serde_json::value::Serializer) -> Result<Value, serde_json::Error>,
{
    serialize(value, serde_json::value::Serializer)
        .map_err(|err| ScopeError::Encode(FormatError::new("document", err)))
}
