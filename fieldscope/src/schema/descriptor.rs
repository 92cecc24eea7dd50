//! Per-field metadata.
//!
//! [`FieldSpec`] is the raw, unvalidated form emitted by `#[derive(Scoped)]`.
//! [`FieldDescriptor`] is the validated form stored in a [`TypeSchema`], with
//! the scope expression already parsed.

use std::{any::TypeId, fmt, sync::Arc};

use serde_json::Value;

use super::{TypeSchema, schema_for};
use crate::{
    PermissionSet, ScopeExpression,
    error::{SchemaError, ScopeError},
    traversal::{ScopeContext, Scoped},
};

/// Renders a field's `Default::default()` value the way it would be emitted.
///
/// Stands in for restricted fields a payload does not carry, so types without
/// `#[serde(default)]` still decode the output of a narrower marshal.
pub type DefaultDocument = fn(&ScopeContext<'_>) -> Result<Value, ScopeError>;

// =============================================================================
// Nested - lazy reference to a nested composite's schema
// =============================================================================

/// Reference to the schema of a nested composite type.
///
/// Only function pointers are stored, so building a schema never recurses into
/// the nested type. Self-referential types therefore build in one step; the
/// nested schema is resolved on demand through [`Nested::schema`].
#[derive(Clone, Copy)]
pub struct Nested {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    resolve: fn() -> Result<Arc<TypeSchema>, SchemaError>,
    layers: u8,
}

impl Nested {
    /// A field holding `T` directly (or through `Option`, `Box`, `Arc`, ...).
    pub fn composite<T: Scoped>() -> Self {
        Self {
            type_id: TypeId::of::<T>,
            type_name: std::any::type_name::<T>,
            resolve: schema_for::<T>,
            layers: 0,
        }
    }

    /// Wraps the reference in one more collection layer (`Vec<T>`, map values).
    #[must_use]
    pub fn collection(self) -> Self {
        Self {
            layers: self.layers.saturating_add(1),
            ..self
        }
    }

    /// Number of collection layers between the field and the composite.
    pub fn layers(&self) -> u8 {
        self.layers
    }

    pub fn is_collection(&self) -> bool {
        self.layers > 0
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Resolves the nested type's schema through the cache.
    pub fn schema(&self) -> Result<Arc<TypeSchema>, SchemaError> {
        (self.resolve)()
    }

    /// The same reference with one collection layer peeled off.
    pub(crate) fn element(self) -> Self {
        Self {
            layers: self.layers.saturating_sub(1),
            ..self
        }
    }
}

impl fmt::Debug for Nested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nested")
            .field("type_name", &self.type_name())
            .field("layers", &self.layers)
            .finish()
    }
}

// =============================================================================
// FieldSpec - raw metadata emitted by the derive
// =============================================================================

/// Raw field metadata, built by generated code and validated into a
/// [`FieldDescriptor`] when the schema is first requested.
#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) key: &'static str,
    pub(crate) decode_key: &'static str,
    pub(crate) scope: &'static str,
    pub(crate) encrypt: bool,
    pub(crate) required: bool,
    pub(crate) serialized: bool,
    pub(crate) deserialized: bool,
    pub(crate) nested: Option<Nested>,
    pub(crate) default: Option<DefaultDocument>,
}

impl FieldSpec {
    pub fn new(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            decode_key: key,
            scope: "",
            encrypt: false,
            required: false,
            serialized: true,
            deserialized: true,
            nested: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_decode_key(mut self, key: &'static str) -> Self {
        self.decode_key = key;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: &'static str) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn skip_serializing(mut self) -> Self {
        self.serialized = false;
        self
    }

    #[must_use]
    pub fn skip_deserializing(mut self) -> Self {
        self.deserialized = false;
        self
    }

    #[must_use]
    pub fn with_nested(mut self, nested: Option<Nested>) -> Self {
        self.nested = nested;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultDocument) -> Self {
        self.default = Some(default);
        self
    }
}

// =============================================================================
// FieldDescriptor - validated metadata
// =============================================================================

/// Metadata for one field of a [`TypeSchema`].
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    key: &'static str,
    decode_key: &'static str,
    scope: ScopeExpression,
    encrypt: bool,
    required: bool,
    serialized: bool,
    deserialized: bool,
    nested: Option<Nested>,
    default: Option<DefaultDocument>,
}

impl FieldDescriptor {
    pub(crate) fn from_spec(
        type_name: &'static str,
        spec: FieldSpec,
    ) -> Result<Self, SchemaError> {
        let scope = ScopeExpression::parse(spec.scope).map_err(|source| {
            SchemaError::InvalidScope {
                type_name,
                field: spec.name,
                source,
            }
        })?;
        Ok(Self {
            name: spec.name,
            key: spec.key,
            decode_key: spec.decode_key,
            scope,
            encrypt: spec.encrypt,
            required: spec.required,
            serialized: spec.serialized,
            deserialized: spec.deserialized,
            nested: spec.nested,
            default: spec.default,
        })
    }

    /// The Rust field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key used when emitting the field.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Key used when reading the field from a payload.
    pub fn decode_key(&self) -> &'static str {
        self.decode_key
    }

    pub fn scope(&self) -> &ScopeExpression {
        &self.scope
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypt
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// `false` for `#[serde(skip)]` and `#[serde(skip_serializing)]` fields.
    pub fn is_serialized(&self) -> bool {
        self.serialized
    }

    /// `false` for `#[serde(skip)]` and `#[serde(skip_deserializing)]` fields.
    pub fn is_deserialized(&self) -> bool {
        self.deserialized
    }

    pub fn nested(&self) -> Option<Nested> {
        self.nested
    }

    /// Renders the field's default value, for restricted fields only.
    pub fn default_document(&self) -> Option<DefaultDocument> {
        self.default
    }

    pub fn is_nested(&self) -> bool {
        self.nested.is_some()
    }

    pub fn is_collection(&self) -> bool {
        self.nested.is_some_and(|nested| nested.is_collection())
    }

    /// Whether the field is emitted on marshal for this permission set.
    pub fn is_visible(&self, permissions: &PermissionSet) -> bool {
        self.serialized && self.scope.is_satisfied_by(permissions)
    }

    /// Whether a payload may set the field on unmarshal for this permission set.
    pub fn is_writable(&self, permissions: &PermissionSet) -> bool {
        self.scope.is_satisfied_by(permissions)
    }
}
