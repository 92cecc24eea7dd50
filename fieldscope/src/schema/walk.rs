//! Eager resolution of a type's nested schemas.

use std::{collections::HashSet, sync::Arc};

use super::{Nested, TypeSchema};
use crate::{error::SchemaError, traversal::Scoped};

/// Resolves the schema of `T` and of every composite reachable from it.
///
/// Each type is visited once, so self-referential and mutually recursive types
/// terminate. The result starts with `T` and follows depth-first declaration
/// order. Any invalid schema in the tree fails the whole resolution.
pub fn resolve_tree<T: Scoped>() -> Result<Vec<Arc<TypeSchema>>, SchemaError> {
    resolve_nested(Nested::composite::<T>())
}

/// Same as [`resolve_tree`], starting from a nested reference.
pub(crate) fn resolve_nested(root: Nested) -> Result<Vec<Arc<TypeSchema>>, SchemaError> {
    let mut visited = HashSet::from([root.type_id()]);
    let mut resolved = Vec::new();
    let mut pending = vec![root.schema()?];

    while let Some(schema) = pending.pop() {
        let mut children = Vec::new();
        for nested in schema.fields().iter().filter_map(|field| field.nested()) {
            if visited.insert(nested.type_id()) {
                children.push(nested.schema()?);
            }
        }
        resolved.push(schema);
        pending.extend(children.into_iter().rev());
    }

    Ok(resolved)
}
