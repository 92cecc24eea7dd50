//! `ScopedContainer` implementations for standard library types.
//!
//! Scalars and other leaf types serialize themselves unchanged. Wrappers
//! (`Option`, `Box`, `Arc`, ...) forward to their contents, and collections
//! walk every element.
//!
//! ## Map Keys Are Not Scoped
//!
//! For map containers (`HashMap`, `BTreeMap`), only **values** are walked.
//! Keys are emitted as object keys and must serialize to a string, number or
//! bool. `HashMap` entries are emitted sorted by key so output is stable.
//!
//! ## Sets Are Rebuilt On Sanitize
//!
//! Sanitizing a set element can change its hash or ordering, so sets are
//! drained and rebuilt. Elements that become equal collapse into one.

mod cells;
mod maps;
mod passthrough;
mod sets;
mod wrappers;


// =============================================================================
// Leaf implementation helper
// =============================================================================

macro_rules! impl_scoped_container_leaf {
    ($ty:ty) => {
        impl crate::traversal::ScopedContainer for $ty {
            fn filter_with(
                &self,
                _ctx: &crate::traversal::ScopeContext<'_>,
            ) -> Result<serde_json::Value, crate::error::ScopeError> {
                crate::traversal::to_leaf(self)
            }

            fn sanitize_with(
                &mut self,
                _ctx: &crate::traversal::ScopeContext<'_>,
            ) -> Result<(), crate::error::ScopeError> {
                Ok(())
            }
        }
    };
}

pub(super) use impl_scoped_container_leaf;
