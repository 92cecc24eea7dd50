//! The scoping engine and the crate-root entry points.
//!
//! A [`ScopeEngine`] pairs a [`Format`] with the traversal limits and the
//! validators to run. It holds no per-call state, so one engine can serve any
//! number of threads.

use std::{any::type_name, fmt, sync::Arc};

#[cfg(feature = "json")]
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[cfg(feature = "json")]
use crate::format::Json;
use crate::{
    PermissionSet,
    defaults::fill_withheld,
    error::{FormatError, SchemaError, ScopeError},
    format::Format,
    redacted::Redacted,
    schema::{TypeSchema, resolve_nested},
    security::{Direction, SecurityContext, decrypt_fields, encrypt_fields},
    traversal::{DEFAULT_MAX_DEPTH, ScopeContext, ScopedContainer},
    validate::{RequiredFields, Validator, run_validators},
};

// =============================================================================
// ScopeEngine
// =============================================================================

/// Filters, sanitizes, encodes and decodes scoped values through one format.
///
/// ```
/// use fieldscope::{Json, PermissionSet, ScopeEngine, Scoped};
///
/// #[derive(Scoped, serde::Deserialize, Default)]
/// struct Patient {
///     id: u64,
///     #[scope("clinician")]
///     diagnosis: String,
/// }
///
/// let engine = ScopeEngine::new(Json::compact());
/// let patient = Patient { id: 4, diagnosis: "flu".into() };
///
/// let bytes = engine.marshal(&patient, &PermissionSet::from(["billing"])).unwrap();
/// assert_eq!(bytes, br#"{"id":4}"#);
/// ```
pub struct ScopeEngine<F> {
    format: F,
    max_depth: usize,
    validators: Vec<Arc<dyn Validator>>,
}

impl<F: Format> ScopeEngine<F> {
    /// An engine with the default depth limit and [`RequiredFields`] validation.
    pub fn new(format: F) -> Self {
        Self::builder(format).build()
    }

    pub fn builder(format: F) -> ScopeEngineBuilder<F> {
        ScopeEngineBuilder {
            format,
            max_depth: DEFAULT_MAX_DEPTH,
            validators: Vec::new(),
            default_validators: true,
        }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn context<'a>(&self, permissions: &'a PermissionSet) -> ScopeContext<'a> {
        ScopeContext::new(permissions).with_max_depth(self.max_depth)
    }

    /// Builds the redacted copy of `value` for `permissions`, then validates it.
    ///
    /// Fields whose scope is not satisfied are absent from the copy.
    pub fn filter<T: ScopedContainer>(
        &self,
        value: &T,
        permissions: &PermissionSet,
    ) -> Result<Redacted, ScopeError> {
        let document = self.filter_document(value, permissions)?;
        Ok(Redacted::new(type_name::<T>(), T::nested(), document))
    }

    fn filter_document<T: ScopedContainer>(
        &self,
        value: &T,
        permissions: &PermissionSet,
    ) -> Result<Value, ScopeError> {
        let document = value.filter_with(&self.context(permissions))?;
        run_validators(&self.validators, T::nested(), &document)?;
        Ok(document)
    }

    /// Resets every field of `value` that `permissions` may not write, then
    /// validates what remains visible.
    ///
    /// Works in place, so a failure can leave `value` partly sanitized. The
    /// unmarshal paths sanitize a private copy and never expose that state.
    pub fn sanitize<T: ScopedContainer>(
        &self,
        value: &mut T,
        permissions: &PermissionSet,
    ) -> Result<(), ScopeError> {
        let ctx = self.context(permissions);
        value.sanitize_with(&ctx)?;
        if !self.validators.is_empty() && T::nested().is_some() {
            let projection = value.filter_with(&ctx)?;
            run_validators(&self.validators, T::nested(), &projection)?;
        }
        Ok(())
    }

    /// Filters `value` for `permissions` and encodes the copy.
    pub fn marshal<T: ScopedContainer>(
        &self,
        value: &T,
        permissions: &PermissionSet,
    ) -> Result<Vec<u8>, ScopeError> {
        let document = self.filter_document(value, permissions)?;
        let bytes = self.encode(&document)?;
        #[cfg(feature = "tracing")]
        trace_completed::<T>(Direction::Marshal, self.format.name(), permissions);
        Ok(bytes)
    }

    /// Decodes `bytes`, sanitizes the result for `permissions` and only then
    /// assigns it to `dest`.
    ///
    /// Restricted fields missing from the payload decode as their defaults, so
    /// the output of [`marshal`](Self::marshal) always reads back.
    ///
    /// On any error `dest` is left exactly as it was.
    pub fn unmarshal<T>(
        &self,
        bytes: &[u8],
        dest: &mut T,
        permissions: &PermissionSet,
    ) -> Result<(), ScopeError>
    where
        T: ScopedContainer + DeserializeOwned,
    {
        let document: Value = self.format.decode(bytes).map_err(ScopeError::Decode)?;
        let mut decoded: T = self.decode_document(document, permissions)?;
        self.sanitize(&mut decoded, permissions)?;
        *dest = decoded;
        #[cfg(feature = "tracing")]
        trace_completed::<T>(Direction::Unmarshal, self.format.name(), permissions);
        Ok(())
    }

    /// [`marshal`](Self::marshal) with security actions and field encryption.
    ///
    /// Runs the context's marshal actions for `T` first. Emitted
    /// `#[scope(encrypt)]` fields are encrypted with the context's cipher after
    /// validation.
    pub fn marshal_with_context<T>(
        &self,
        value: &T,
        security: &SecurityContext,
    ) -> Result<Vec<u8>, ScopeError>
    where
        T: ScopedContainer + 'static,
    {
        security
            .actions()
            .run(value, Direction::Marshal, security)?;

        let mut document = self.filter_document(value, security.permissions())?;
        if let Some(nested) = T::nested() {
            encrypt_fields(nested, &mut document, security.cipher())?;
        }
        let bytes = self.encode(&document)?;
        #[cfg(feature = "tracing")]
        trace_completed::<T>(
            Direction::Marshal,
            self.format.name(),
            security.permissions(),
        );
        Ok(bytes)
    }

    /// [`unmarshal`](Self::unmarshal) with security actions and field
    /// decryption.
    ///
    /// The context's unmarshal actions for `T` see `dest` as it was before the
    /// call. Encrypted fields are decrypted before the typed value is built.
    pub fn unmarshal_with_context<T>(
        &self,
        bytes: &[u8],
        dest: &mut T,
        security: &SecurityContext,
    ) -> Result<(), ScopeError>
    where
        T: ScopedContainer + DeserializeOwned + 'static,
    {
        security
            .actions()
            .run(&*dest, Direction::Unmarshal, security)?;

        let mut document: Value = self.format.decode(bytes).map_err(ScopeError::Decode)?;
        if let Some(nested) = T::nested() {
            decrypt_fields(nested, &mut document, security.cipher())?;
        }
        let mut decoded: T = self.decode_document(document, security.permissions())?;
        self.sanitize(&mut decoded, security.permissions())?;
        *dest = decoded;
        #[cfg(feature = "tracing")]
        trace_completed::<T>(
            Direction::Unmarshal,
            self.format.name(),
            security.permissions(),
        );
        Ok(())
    }

    /// Resolves the schema of every composite reachable from `T`.
    ///
    /// Surfaces invalid scope annotations anywhere in the tree up front instead
    /// of on the first call that reaches them. Leaf types resolve to nothing.
    pub fn preflight<T: ScopedContainer>(&self) -> Result<Vec<Arc<TypeSchema>>, SchemaError> {
        T::nested().map_or_else(|| Ok(Vec::new()), resolve_nested)
    }

    /// Builds the typed value from a decoded document.
    ///
    /// Restricted fields the document leaves out are filled with their
    /// defaults first, so a payload marshaled under narrower permissions still
    /// decodes.
    fn decode_document<T>(
        &self,
        mut document: Value,
        permissions: &PermissionSet,
    ) -> Result<T, ScopeError>
    where
        T: ScopedContainer + DeserializeOwned,
    {
        if let Some(nested) = T::nested() {
            fill_withheld(nested, &mut document, &self.context(permissions))?;
        }
        serde_json::from_value(document)
            .map_err(|err| ScopeError::Decode(FormatError::new(self.format.name(), err)))
    }

    fn encode(&self, document: &Value) -> Result<Vec<u8>, ScopeError> {
        self.format.encode(document).map_err(ScopeError::Encode)
    }
}

impl<F: fmt::Debug> fmt::Debug for ScopeEngine<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeEngine")
            .field("format", &self.format)
            .field("max_depth", &self.max_depth)
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[cfg(feature = "tracing")]
fn trace_completed<T: ScopedContainer>(
    direction: Direction,
    format: &'static str,
    permissions: &PermissionSet,
) {
    let (granted, withheld) = match T::nested().map(|nested| nested.schema()) {
        Some(Ok(schema)) => {
            let granted = match direction {
                Direction::Marshal => schema.visible_keys(permissions).len(),
                Direction::Unmarshal => schema.writable_fields(permissions).count(),
            };
            (granted, schema.fields().len().saturating_sub(granted))
        }
        _ => (0, 0),
    };
    crate::trace_event!(
        type_name = type_name::<T>(),
        format,
        %direction,
        granted,
        withheld,
        "scoped call completed"
    );
}

// =============================================================================
// ScopeEngineBuilder
// =============================================================================

/// Builder for [`ScopeEngine`].
#[must_use]
pub struct ScopeEngineBuilder<F> {
    format: F,
    max_depth: usize,
    validators: Vec<Arc<dyn Validator>>,
    default_validators: bool,
}

impl<F: Format> ScopeEngineBuilder<F> {
    /// Bounds how many composites one traversal may enter.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Adds a validator. Validators run in the order they were added, after
    /// the built-in ones.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Drops the built-in [`RequiredFields`] validator.
    pub fn without_default_validators(mut self) -> Self {
        self.default_validators = false;
        self
    }

    pub fn build(self) -> ScopeEngine<F> {
        let mut validators: Vec<Arc<dyn Validator>> = Vec::with_capacity(self.validators.len() + 1);
        if self.default_validators {
            validators.push(Arc::new(RequiredFields));
        }
        validators.extend(self.validators);
        ScopeEngine {
            format: self.format,
            max_depth: self.max_depth,
            validators,
        }
    }
}

impl<F: fmt::Debug> fmt::Debug for ScopeEngineBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeEngineBuilder")
            .field("format", &self.format)
            .field("max_depth", &self.max_depth)
            .field("validators", &self.validators.len())
            .field("default_validators", &self.default_validators)
            .finish()
    }
}

// =============================================================================
// Crate-root entry points (default JSON engine)
// =============================================================================

#[cfg(feature = "json")]
static DEFAULT_ENGINE: Lazy<ScopeEngine<Json>> = Lazy::new(|| ScopeEngine::new(Json::compact()));

/// Builds the redacted copy of `value` with the default JSON engine.
#[cfg(feature = "json")]
pub fn filter<T: ScopedContainer>(
    value: &T,
    permissions: &PermissionSet,
) -> Result<Redacted, ScopeError> {
    DEFAULT_ENGINE.filter(value, permissions)
}

/// Sanitizes `value` in place with the default JSON engine.
#[cfg(feature = "json")]
pub fn sanitize<T: ScopedContainer>(
    value: &mut T,
    permissions: &PermissionSet,
) -> Result<(), ScopeError> {
    DEFAULT_ENGINE.sanitize(value, permissions)
}

/// Encodes the scoped projection of `value` as compact JSON.
#[cfg(feature = "json")]
pub fn marshal<T: ScopedContainer>(
    value: &T,
    permissions: &PermissionSet,
) -> Result<Vec<u8>, ScopeError> {
    DEFAULT_ENGINE.marshal(value, permissions)
}

/// Decodes JSON into `dest`, zeroing every field `permissions` may not write.
#[cfg(feature = "json")]
pub fn unmarshal<T>(bytes: &[u8], dest: &mut T, permissions: &PermissionSet) -> Result<(), ScopeError>
where
    T: ScopedContainer + DeserializeOwned,
{
    DEFAULT_ENGINE.unmarshal(bytes, dest, permissions)
}

#[cfg(feature = "json")]
pub fn marshal_with_context<T>(value: &T, security: &SecurityContext) -> Result<Vec<u8>, ScopeError>
where
    T: ScopedContainer + 'static,
{
    DEFAULT_ENGINE.marshal_with_context(value, security)
}

#[cfg(feature = "json")]
pub fn unmarshal_with_context<T>(
    bytes: &[u8],
    dest: &mut T,
    security: &SecurityContext,
) -> Result<(), ScopeError>
where
    T: ScopedContainer + DeserializeOwned + 'static,
{
    DEFAULT_ENGINE.unmarshal_with_context(bytes, dest, security)
}
