//! Process-wide schema cache.

use std::{any::TypeId, sync::Arc};

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::TypeSchema;
use crate::{error::SchemaError, traversal::Scoped};

/// Global, thread-safe map: TypeId -> validated schema.
static SCHEMAS: Lazy<DashMap<TypeId, Arc<TypeSchema>>> = Lazy::new(DashMap::new);

/// Returns the schema for `T`, building and caching it on first use.
///
/// Concurrent first callers may each build the schema; the first one to
/// publish wins and every caller receives that instance. A failed build is
/// returned to the caller and not cached, so the next call retries.
///
/// ```rust
/// use fieldscope::{Scoped, schema_for};
///
/// #[derive(Scoped, serde::Serialize, serde::Deserialize, Default)]
/// struct Account {
///     id: u64,
///     #[scope("billing")]
///     balance: i64,
/// }
///
/// let schema = schema_for::<Account>().unwrap();
/// assert_eq!(schema.fields().len(), 2);
/// assert!(std::sync::Arc::ptr_eq(&schema, &schema_for::<Account>().unwrap()));
/// ```
pub fn schema_for<T: Scoped>() -> Result<Arc<TypeSchema>, SchemaError> {
    let type_id = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS.get(&type_id) {
        return Ok(Arc::clone(schema.value()));
    }

    let built = Arc::new(TypeSchema::build::<T>()?);
    crate::trace_event!(
        type_name = built.type_name(),
        fields = built.fields().len(),
        "built schema"
    );
    let published = SCHEMAS.entry(type_id).or_insert(built);
    Ok(Arc::clone(published.value()))
}
