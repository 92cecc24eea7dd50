//! Scoped traversal for map containers (values only).

use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    error::{SchemaError, ScopeError},
    schema::Nested,
    traversal::{ScopeContext, ScopedContainer, to_leaf},
};

/// Renders a map key as a document object key.
fn object_key<K: Serialize + ?Sized>(key: &K) -> Result<String, ScopeError> {
    match to_leaf(key)? {
        Value::String(key) => Ok(key),
        Value::Number(key) => Ok(key.to_string()),
        Value::Bool(key) => Ok(key.to_string()),
        Value::Null => Err(SchemaError::UnsupportedMapKey { found: "null" }.into()),
        Value::Array(_) => Err(SchemaError::UnsupportedMapKey { found: "a sequence" }.into()),
        Value::Object(_) => Err(SchemaError::UnsupportedMapKey { found: "a map" }.into()),
    }
}

fn filter_entries<'a, K, V, I>(
    entries: I,
    ctx: &ScopeContext<'_>,
) -> Result<Vec<(String, Value)>, ScopeError>
where
    K: Serialize + 'a,
    V: ScopedContainer + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries
        .into_iter()
        .map(|(key, value)| Ok((object_key(key)?, value.filter_with(ctx)?)))
        .collect()
}

// =============================================================================
// Map implementations (values walked, keys unchanged)
// =============================================================================

impl<K, V, S> ScopedContainer for HashMap<K, V, S>
where
    K: Serialize + Hash + Eq,
    V: ScopedContainer,
    S: BuildHasher,
{
    fn nested() -> Option<Nested> {
        V::nested().map(Nested::collection)
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        let mut entries = filter_entries(self, ctx)?;
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.values_mut().try_for_each(|value| value.sanitize_with(ctx))
    }
}

impl<K, V> ScopedContainer for BTreeMap<K, V>
where
    K: Serialize + Ord,
    V: ScopedContainer,
{
    fn nested() -> Option<Nested> {
        V::nested().map(Nested::collection)
    }

    fn filter_with(&self, ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        let entries = filter_entries(self, ctx)?;
        Ok(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    }

    fn sanitize_with(&mut self, ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        self.values_mut().try_for_each(|value| value.sanitize_with(ctx))
    }
}
