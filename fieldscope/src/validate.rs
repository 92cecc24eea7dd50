//! Structural validation of scoped documents.
//!
//! Validators see the document a call is about to emit (marshal) or the
//! projection of the value it just sanitized (unmarshal). Fields withheld by
//! scope are absent from both, so a permission shortfall never fails
//! validation.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::{ScopeError, ValidationError},
    schema::{Nested, TypeSchema, resolve_nested},
};

/// A structural check run after scoping.
pub trait Validator: Send + Sync {
    /// Checks one object of the type described by `schema`.
    fn validate(&self, schema: &TypeSchema, document: &Value) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&TypeSchema, &Value) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, schema: &TypeSchema, document: &Value) -> Result<(), ValidationError> {
        self(schema, document)
    }
}

/// Rejects `#[scope(required)]` fields that are present but empty.
///
/// Empty means `null`, `false`, `0`, `""`, `[]` or `{}`. Nested composites are
/// checked recursively and errors carry the dotted path of the field.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequiredFields;

impl Validator for RequiredFields {
    fn validate(&self, schema: &TypeSchema, document: &Value) -> Result<(), ValidationError> {
        check_required(schema, document, "")
    }
}

#[allow(clippy::float_cmp)]
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

fn check_required(
    schema: &TypeSchema,
    document: &Value,
    path: &str,
) -> Result<(), ValidationError> {
    let Value::Object(object) = document else {
        return Ok(());
    };
    for field in schema.fields() {
        let Some(value) = object.get(field.key()) else {
            continue;
        };
        let field_path = join(path, field.key());
        if field.is_required() && is_empty(value) {
            return Err(ValidationError::new(field_path, "required field is empty"));
        }
        if let Some(nested) = field.nested() {
            // Only reachable when called outside the engine, which resolves
            // the tree before validating.
            let schema = nested
                .schema()
                .map_err(|err| ValidationError::new(field_path.as_str(), err.to_string()))?;
            check_nested(&schema, nested, value, &field_path)?;
        }
    }
    Ok(())
}

fn check_nested(
    schema: &TypeSchema,
    nested: Nested,
    value: &Value,
    path: &str,
) -> Result<(), ValidationError> {
    if !nested.is_collection() {
        return check_required(schema, value, path);
    }
    let element = nested.element();
    match value {
        Value::Array(items) => items.iter().enumerate().try_for_each(|(index, item)| {
            check_nested(schema, element, item, &format!("{path}[{index}]"))
        }),
        Value::Object(entries) => entries
            .iter()
            .try_for_each(|(key, item)| check_nested(schema, element, item, &join(path, key))),
        _ => Ok(()),
    }
}

/// Runs `validators` on every object of the root type inside `document`.
pub(crate) fn run_validators(
    validators: &[Arc<dyn Validator>],
    root: Option<Nested>,
    document: &Value,
) -> Result<(), ScopeError> {
    let Some(root) = root else {
        return Ok(());
    };
    if validators.is_empty() {
        return Ok(());
    }
    // Every schema a validator may look up is built here, so an invalid one
    // surfaces as a schema error rather than a validation failure.
    let tree = resolve_nested(root)?;
    let Some(schema) = tree.first() else {
        return Ok(());
    };
    visit_roots(root, document, &mut |object: &Value| {
        validators
            .iter()
            .try_for_each(|validator| validator.validate(schema, object))
    })?;
    Ok(())
}

fn visit_roots<F>(nested: Nested, value: &Value, visit: &mut F) -> Result<(), ValidationError>
where
    F: FnMut(&Value) -> Result<(), ValidationError>,
{
    if !nested.is_collection() {
        return visit(value);
    }
    let element = nested.element();
    match value {
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| visit_roots(element, item, &mut *visit)),
        Value::Object(entries) => entries
            .values()
            .try_for_each(|item| visit_roots(element, item, &mut *visit)),
        _ => Ok(()),
    }
}
