//! Scoped traversal for wrapper and sequence container types.

use std::{collections::VecDeque, rc::Rc, sync::Arc};

use serde_json::Value;

use crate::{
    error::ScopeError,
    schema::Nested,
    traversal::{ScopeContext, ScopedContainer},
};

// =============================================================================
// Wrapper container implementations
// =============================================================================

impl<T> ScopedContainer for Option<T>
where
    T: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        T::nested()
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        match self {
            Some(value) => value.filter_with(ctx),
            None => Ok(Value::Null),
        }
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        match self {
            Some(value) => value.sanitize_with(ctx),
            None => Ok(()),
        }
    }
}

impl<T> ScopedContainer for Box<T>
where
    T: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        T::nested()
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        (**self).filter_with(ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        (**self).sanitize_with(ctx)
    }
}

impl<T> ScopedContainer for Arc<T>
where
    T: ScopedContainer + Clone,
{
    fn nested() -> Option<Nested> {
        T::nested()
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        (**self).filter_with(ctx)
    }

    // Shared values are cloned before sanitizing so other owners keep theirs.
    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        Arc::make_mut(self).sanitize_with(ctx)
    }
}

impl<T> ScopedContainer for Rc<T>
where
    T: ScopedContainer + Clone,
{
    fn nested() -> Option<Nested> {
        T::nested()
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        (**self).filter_with(ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        Rc::make_mut(self).sanitize_with(ctx)
    }
}

// =============================================================================
// Sequence implementations
// =============================================================================

fn filter_sequence<'a, T, I>(items: I, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError>
where
    T: ScopedContainer + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(|item| item.filter_with(ctx))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

impl<T> ScopedContainer for Vec<T>
where
    T: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        T::nested().map(Nested::collection)
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        filter_sequence(self, ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.iter_mut().try_for_each(|item| item.sanitize_with(ctx))
    }
}

impl<T> ScopedContainer for VecDeque<T>
where
    T: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        T::nested().map(Nested::collection)
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        filter_sequence(self, ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.iter_mut().try_for_each(|item| item.sanitize_with(ctx))
    }
}

impl<T, const N: usize> ScopedContainer for [T; N]
where
    T: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        T::nested().map(Nested::collection)
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        filter_sequence(self, ctx)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.iter_mut().try_for_each(|item| item.sanitize_with(ctx))
    }
}
