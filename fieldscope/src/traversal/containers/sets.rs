//! Scoped traversal for set containers.

use std::{
    collections::{BTreeSet, HashSet},
    hash::{BuildHasher, Hash},
};

use serde_json::Value;

use crate::{
    error::ScopeError,
    schema::Nested,
    traversal::{ScopeContext, ScopedContainer},
};

// =============================================================================
// Set implementations
// =============================================================================

impl<T, S> ScopedContainer for HashSet<T, S>
where
    T: ScopedContainer + Hash + Eq,
    S: BuildHasher + Clone,
{
    fn nested() -> Option<Nested> {
        T::nested().map(Nested::collection)
    }

    // Hash order is unstable, so elements are emitted sorted by their encoding.
    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        let mut items = self
            .iter()
            .map(|item| item.filter_with(ctx))
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by_cached_key(Value::to_string);
        Ok(Value::Array(items))
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        // NOTE: sanitizing can make distinct elements equal, shrinking the set.
        let hasher = self.hasher().clone();
        let mut result = HashSet::with_capacity_and_hasher(self.len(), hasher);
        for mut item in self.drain() {
            item.sanitize_with(ctx)?;
            result.insert(item);
        }
        *self = result;
        Ok(())
    }
}

impl<T> ScopedContainer for BTreeSet<T>
where
    T: ScopedContainer + Ord,
{
    fn nested() -> Option<Nested> {
        T::nested().map(Nested::collection)
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        self.iter()
            .map(|item| item.filter_with(ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        // NOTE: sanitizing can make distinct elements equal, shrinking the set.
        let mut result = BTreeSet::new();
        for mut item in std::mem::take(self) {
            item.sanitize_with(ctx)?;
            result.insert(item);
        }
        *self = result;
        Ok(())
    }
}
