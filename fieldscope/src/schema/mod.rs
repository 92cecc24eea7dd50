//! Schema introspection and the process-wide schema cache.
//!
//! A [`TypeSchema`] is the ordered list of [`FieldDescriptor`]s for one
//! `#[derive(Scoped)]` type. It is built the first time the type is used,
//! validated once, and shared as an `Arc` for the rest of the process.

mod cache;
mod descriptor;
mod walk;

use std::{any::TypeId, collections::HashSet};

pub use cache::schema_for;
pub use descriptor::{DefaultDocument, FieldDescriptor, FieldSpec, Nested};
pub use walk::resolve_tree;
pub(crate) use walk::resolve_nested;

use crate::{PermissionSet, error::SchemaError, traversal::Scoped};

/// Key under which encrypted field names are listed in an encoded object.
pub const ENCRYPTED_MARKER: &str = "_encrypted";

/// Validated field metadata for one type, in declaration order.
#[derive(Debug)]
pub struct TypeSchema {
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    pub(crate) fn build<T: Scoped>() -> Result<Self, SchemaError> {
        Self::from_specs(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            T::field_specs(),
        )
    }

    pub(crate) fn from_specs(
        type_id: TypeId,
        type_name: &'static str,
        specs: Vec<FieldSpec>,
    ) -> Result<Self, SchemaError> {
        let mut encode_keys = HashSet::with_capacity(specs.len());
        let mut decode_keys = HashSet::with_capacity(specs.len());
        let mut fields = Vec::with_capacity(specs.len());

        for spec in specs {
            let field = FieldDescriptor::from_spec(type_name, spec)?;
            for key in [field.key(), field.decode_key()] {
                if key == ENCRYPTED_MARKER {
                    return Err(SchemaError::ReservedKey {
                        type_name,
                        field: field.name(),
                        key: ENCRYPTED_MARKER,
                    });
                }
            }
            if field.is_serialized() && !encode_keys.insert(field.key()) {
                return Err(SchemaError::DuplicateKey {
                    type_name,
                    key: field.key(),
                });
            }
            if field.is_deserialized() && !decode_keys.insert(field.decode_key()) {
                return Err(SchemaError::DuplicateKey {
                    type_name,
                    key: field.decode_key(),
                });
            }
            fields.push(field);
        }

        Ok(Self {
            type_id,
            type_name,
            fields,
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by its Rust name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Looks up a field by the key it is emitted under.
    pub fn field_by_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.is_serialized() && field.key() == key)
    }

    /// Looks up a field by the key it is read from.
    pub fn field_by_decode_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.is_deserialized() && field.decode_key() == key)
    }

    /// Keys emitted on marshal for this permission set, in declaration order.
    pub fn visible_keys(&self, permissions: &PermissionSet) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|field| field.is_visible(permissions))
            .map(FieldDescriptor::key)
            .collect()
    }

    /// Fields a payload may set on unmarshal for this permission set.
    pub fn writable_fields<'a>(
        &'a self,
        permissions: &'a PermissionSet,
    ) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.is_writable(permissions))
    }

    pub fn has_encrypted_fields(&self) -> bool {
        self.fields.iter().any(FieldDescriptor::is_encrypted)
    }
}
