//! Struct-specific `Scoped` derivation.
//!
//! This module resolves each named field's keys and options and collects
//! generic parameters that require trait bounds.

use proc_macro2::{Ident, TokenStream};
use syn::{DataStruct, Fields, Result, spanned::Spanned};

use crate::{
    DeriveOutput,
    attrs::parse_field_options,
    serde_attrs::{ContainerSerde, RenameRule, parse_field_serde},
    transform::{DeriveContext, FieldInput, FieldValue, generate_field_plan},
};

pub(crate) const SHAPE_HINT: &str = "derive `Unscoped` to emit the whole type as-is, \
                          or mark the field holding it `#[scope(opaque)]`";

pub(crate) fn derive_struct(
    name: &Ident,
    data: DataStruct,
    generics: &syn::Generics,
    container: &ContainerSerde,
    crate_root: &TokenStream,
) -> Result<DeriveOutput> {
    match data.fields {
        Fields::Named(fields) => derive_named_struct(fields, generics, container, crate_root),
        Fields::Unnamed(fields) => Err(syn::Error::new(
            fields.span(),
            format!("`Scoped` requires named fields; `{name}` is a tuple struct ({SHAPE_HINT})"),
        )),
        Fields::Unit => Err(syn::Error::new(
            name.span(),
            format!("`Scoped` requires named fields; `{name}` is a unit struct ({SHAPE_HINT})"),
        )),
    }
}

fn field_key(ident: &Ident, rename: Option<String>, rule: Option<RenameRule>) -> String {
    if let Some(rename) = rename {
        return rename;
    }
    let raw = ident.to_string();
    let raw = raw.strip_prefix("r#").unwrap_or(&raw);
    match rule {
        Some(rule) => rule.apply_to_field(raw),
        None => raw.to_owned(),
    }
}

fn derive_named_struct(
    fields: syn::FieldsNamed,
    generics: &syn::Generics,
    container: &ContainerSerde,
    crate_root: &TokenStream,
) -> Result<DeriveOutput> {
    let mut specs = Vec::new();
    let mut filters = Vec::new();
    let mut sanitizers = Vec::new();
    let mut walked_generics = Vec::new();
    let mut default_generics = Vec::new();
    let mut serialize_generics = Vec::new();

    let mut ctx = DeriveContext {
        generics,
        crate_root,
        walked_generics: &mut walked_generics,
        default_generics: &mut default_generics,
        serialize_generics: &mut serialize_generics,
    };

    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new(field.span(), "expected a named field"));
        };
        let options = parse_field_options(&field.attrs)?;
        let serde = parse_field_serde(&field.attrs)?;

        let value = match (options.opaque, serde.serialize_with) {
            (_, Some(path)) => FieldValue::SerializeWith(path),
            (true, None) => FieldValue::Opaque,
            (false, None) => FieldValue::Walked,
        };

        let key = field_key(ident, serde.rename_serialize, container.rename_all_serialize);
        let decode_key = field_key(
            ident,
            serde.rename_deserialize,
            container.rename_all_deserialize,
        );
        // The encryption marker lists emitted keys and is read back by the same keys.
        if options.encrypt && key != decode_key {
            return Err(syn::Error::new(
                ident.span(),
                format!(
                    "`#[scope(encrypt)]` requires the same key in both directions; \
                     `{ident}` is written as `{key}` but read as `{decode_key}`"
                ),
            ));
        }

        let input = FieldInput {
            index,
            ident,
            ty: &field.ty,
            span: field.ty.span(),
            key,
            decode_key,
            serialized: !serde.skip_serializing,
            deserialized: !serde.skip_deserializing,
            skip_serializing_if: serde.skip_serializing_if,
            options,
            value,
        };

        let plan = generate_field_plan(&mut ctx, &input);
        specs.push(plan.spec);
        filters.push(plan.filter);
        sanitizers.push(plan.sanitize);
    }

    Ok(DeriveOutput {
        specs,
        filters,
        sanitizers,
        walked_generics,
        default_generics,
        serialize_generics,
    })
}
