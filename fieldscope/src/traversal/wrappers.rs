//! Wrapper type for foreign values that are emitted as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ScopeContext, ScopedContainer, to_leaf};
use crate::error::ScopeError;

// =============================================================================
// OpaqueValue - Wrapper for foreign types that are never walked
// =============================================================================

/// Wrapper for foreign types that should be emitted through `serde` unchanged.
///
/// Use this when a field's type comes from another crate and doesn't implement
/// `ScopedContainer`. The wrapped value is a leaf: it is serialized as-is on
/// marshal and left untouched by sanitizing. The field's own `#[scope]` still
/// decides whether it is emitted or reset.
///
/// Serialization is transparent, so wrapping a field does not change its
/// encoding.
///
/// This is the wrapper form of `#[scope(opaque)]`. The attribute keeps the
/// field's type unchanged; the wrapper works anywhere a type is expected, such
/// as inside a `Vec`.
///
/// ```ignore
/// use fieldscope::{OpaqueValue, Scoped};
///
/// #[derive(Default, Scoped, serde::Serialize, serde::Deserialize)]
/// struct Invoice {
///     // other_crate::Money doesn't implement ScopedContainer
///     #[scope("billing")]
///     totals: Vec<OpaqueValue<other_crate::Money>>,
/// }
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueValue<T>(pub T);

impl<T: Serialize> ScopedContainer for OpaqueValue<T> {
    fn filter_with(&self, _ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        to_leaf(&self.0)
    }

    fn sanitize_with(&mut self, _ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        Ok(())
    }
}

impl<T> OpaqueValue<T> {
    /// Consume the wrapper and return the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for OpaqueValue<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::ops::Deref for OpaqueValue<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for OpaqueValue<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for OpaqueValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OpaqueValue").field(&self.0).finish()
    }
}
