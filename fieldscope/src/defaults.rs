//! Defaults for restricted fields a payload leaves out.
//!
//! Marshal omits every field the caller may not see, so a payload produced
//! under narrower permissions lacks those keys. Before the typed value is
//! built, each absent field the caller may not write is filled with its
//! rendered `Default::default()`. Sanitizing would reset it to that value
//! anyway, and the type no longer needs `#[serde(default)]` to decode.

use serde_json::Value;

use crate::{error::ScopeError, schema::Nested, traversal::ScopeContext};

/// Fills absent unwritable fields of every object of `nested`'s type inside
/// `value`, at any depth.
pub(crate) fn fill_withheld(
    nested: Nested,
    value: &mut Value,
    ctx: &ScopeContext<'_>,
) -> Result<(), ScopeError> {
    if nested.is_collection() {
        let element = nested.element();
        match value {
            Value::Array(items) => {
                for item in items {
                    fill_withheld(element, item, ctx)?;
                }
            }
            Value::Object(entries) => {
                for item in entries.values_mut() {
                    fill_withheld(element, item, ctx)?;
                }
            }
            _ => {}
        }
        return Ok(());
    }

    let Value::Object(object) = value else {
        return Ok(());
    };
    let ctx = ctx.descend()?;
    let schema = nested.schema()?;

    for field in schema.fields() {
        if !field.is_deserialized() {
            continue;
        }
        if let Some(entry) = object.get_mut(field.decode_key()) {
            if let Some(child) = field.nested() {
                fill_withheld(child, entry, &ctx)?;
            }
            continue;
        }
        if field.is_writable(ctx.permissions()) {
            continue;
        }
        if let Some(render) = field.default_document() {
            let default = render(&ctx.revealing())?;
            object.insert(field.decode_key().to_owned(), default);
        }
    }
    Ok(())
}
