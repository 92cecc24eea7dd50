//! Core traits for scoped traversal.
//!
//! - [`ScopedContainer`]: types that participate in filtering and sanitizing
//! - [`Scoped`]: composite types with per-field scope metadata

use serde_json::Value;

use super::context::ScopeContext;
use crate::{
    error::ScopeError,
    schema::{FieldSpec, Nested},
};

// =============================================================================
// ScopedContainer - Types that can be filtered and sanitized
// =============================================================================

/// A type that participates in scoped traversal.
///
/// Implemented by `#[derive(Scoped)]` and `#[derive(Unscoped)]` types, and by
/// standard library types (scalars, strings, collections, smart pointers).
/// Leaves serialize themselves unchanged; containers walk their contents.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `ScopedContainer`",
    label = "this type cannot be walked for scoped fields",
    note = "use `#[derive(Scoped)]` or `#[derive(Unscoped)]` on the type definition",
    note = "or mark the field `#[scope(opaque)]` / wrap it in `OpaqueValue<T>` to emit it as-is"
)]
pub trait ScopedContainer {
    /// The scoped composite this type holds, if any.
    ///
    /// Returns `None` for leaves. Wrappers forward their inner type's answer
    /// and collections add one collection layer.
    fn nested() -> Option<Nested>
    where
        Self: Sized,
    {
        None
    }

    /// Builds the redacted copy of `self` for the context's permissions.
    ///
    /// `self` is never mutated. Fields whose scope is not satisfied are absent
    /// from the returned document.
    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError>;

    /// Resets every field the context's permissions may not write.
    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError>;
}

// =============================================================================
// Scoped - Composite types with field metadata
// =============================================================================

/// A composite type with per-field scope metadata.
///
/// Implemented by `#[derive(Scoped)]`. The field specs are validated into a
/// cached [`TypeSchema`](crate::TypeSchema) by [`schema_for`](crate::schema_for).
pub trait Scoped: ScopedContainer + 'static {
    /// Raw metadata for every named field, in declaration order.
    fn field_specs() -> Vec<FieldSpec>;
}
