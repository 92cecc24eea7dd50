//! The redacted copy produced by the marshal filter.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{PermissionSet, error::ScopeError, schema::Nested};

/// An owned, ordered document holding only the fields a permission set may
/// see.
///
/// Produced by [`ScopeEngine::filter`](crate::ScopeEngine::filter) and never
/// aliases the value it was built from. Serializing a `Redacted` with any serde
/// format emits the document as-is.
#[derive(Clone)]
pub struct Redacted {
    type_name: &'static str,
    nested: Option<Nested>,
    document: Value,
}

impl Redacted {
    pub(crate) fn new(type_name: &'static str, nested: Option<Nested>, document: Value) -> Self {
        Self {
            type_name,
            nested,
            document,
        }
    }

    /// Name of the type this copy was filtered from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn value(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    /// Top-level entry by emitted key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Filters this copy again for `permissions`.
    ///
    /// Works from the schema, not from the document: keys the schema does not
    /// know are dropped. Rescoping can only narrow a copy, and rescoping with
    /// the permissions it was filtered with returns an equal copy.
    pub fn rescope(&self, permissions: &PermissionSet) -> Result<Self, ScopeError> {
        let mut document = self.document.clone();
        if let Some(nested) = self.nested {
            rescope_value(nested, &mut document, permissions)?;
        }
        Ok(Self::new(self.type_name, self.nested, document))
    }
}

fn rescope_value(
    nested: Nested,
    value: &mut Value,
    permissions: &PermissionSet,
) -> Result<(), ScopeError> {
    if nested.is_collection() {
        let element = nested.element();
        match value {
            Value::Array(items) => items
                .iter_mut()
                .try_for_each(|item| rescope_value(element, item, permissions))?,
            Value::Object(entries) => entries
                .values_mut()
                .try_for_each(|item| rescope_value(element, item, permissions))?,
            _ => {}
        }
        return Ok(());
    }

    let Value::Object(object) = value else {
        return Ok(());
    };
    let schema = nested.schema()?;
    let mut kept = Map::with_capacity(object.len());
    for field in schema.fields() {
        if !field.is_visible(permissions) {
            continue;
        }
        let Some(mut entry) = object.remove(field.key()) else {
            continue;
        };
        if let Some(child) = field.nested() {
            rescope_value(child, &mut entry, permissions)?;
        }
        kept.insert(field.key().to_owned(), entry);
    }
    *object = kept;
    Ok(())
}

impl PartialEq for Redacted {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.document == other.document
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redacted")
            .field("type_name", &self.type_name)
            .field("document", &self.document)
            .finish()
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.document, f)
    }
}

impl Serialize for Redacted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl From<Redacted> for Value {
    fn from(redacted: Redacted) -> Self {
        redacted.document
    }
}
