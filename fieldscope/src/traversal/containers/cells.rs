//! Scoped traversal for cell-like containers.

use std::cell::{Cell, RefCell};

use serde_json::Value;

use crate::{
    error::{FormatError, ScopeError},
    schema::Nested,
    traversal::{ScopeContext, ScopedContainer},
};

// =============================================================================
// Cell implementations
// =============================================================================

impl<T> ScopedContainer for RefCell<T>
where
    T: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        T::nested()
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        let value = self.try_borrow().map_err(|_| {
            ScopeError::Encode(FormatError::new("document", "already mutably borrowed"))
        })?;
        value.filter_with(ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.get_mut().sanitize_with(ctx)
    }
}

impl<T> ScopedContainer for Cell<T>
where
    T: ScopedContainer + Copy,
{
    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        self.get().filter_with(ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.get_mut().sanitize_with(ctx)
    }
}
