//! Per-field code generation.
//!
//! Each named field contributes three pieces to the generated impls: a
//! `FieldSpec` builder expression, a filter statement and a sanitize statement.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::ExprPath;

use crate::{
    attrs::FieldOptions,
    generics::{collect_generics_from_type, collect_walked_generics},
};

/// How a field's value reaches the document tree.
pub(crate) enum FieldValue {
    /// Walked through `ScopedContainer`.
    Walked,
    /// Serialized through `serde` as a leaf (`#[scope(opaque)]`).
    Opaque,
    /// Serialized through a `#[serde(serialize_with)]`/`with` function.
    SerializeWith(ExprPath),
}

/// Everything known about one field after attribute parsing.
pub(crate) struct FieldInput<'a> {
    pub(crate) index: usize,
    pub(crate) ident: &'a Ident,
    pub(crate) ty: &'a syn::Type,
    pub(crate) span: Span,
    pub(crate) options: FieldOptions,
    pub(crate) value: FieldValue,
    pub(crate) key: String,
    pub(crate) decode_key: String,
    pub(crate) serialized: bool,
    pub(crate) deserialized: bool,
    pub(crate) skip_serializing_if: Option<ExprPath>,
}

/// Generic parameters that need extra bounds, collected while processing fields.
pub(crate) struct DeriveContext<'a> {
    pub(crate) generics: &'a syn::Generics,
    pub(crate) crate_root: &'a TokenStream,
    pub(crate) walked_generics: &'a mut Vec<Ident>,
    pub(crate) default_generics: &'a mut Vec<Ident>,
    pub(crate) serialize_generics: &'a mut Vec<Ident>,
}

pub(crate) struct FieldPlan {
    pub(crate) spec: TokenStream,
    pub(crate) filter: TokenStream,
    pub(crate) sanitize: TokenStream,
}

/// Generates the spec, filter and sanitize code for a single field.
///
/// ## Field Rules
///
/// | Field                        | Marshal                         | Unmarshal                          |
/// |------------------------------|---------------------------------|------------------------------------|
/// | No `#[scope]` expression     | Always emitted, contents walked | Contents walked                    |
/// | `#[scope("expr")]`           | Emitted only when `expr` holds  | Reset to `Default` unless it holds |
/// | `#[scope(opaque)]`           | Serialized as-is                | Never walked                       |
/// | `#[serde(skip_serializing)]` | Never emitted                   | As above                           |
///
/// Restricted fields also carry a rendering of their default value, which
/// stands in when a payload leaves the field out.
pub(crate) fn generate_field_plan(
    ctx: &mut DeriveContext<'_>,
    field: &FieldInput<'_>,
) -> FieldPlan {
    let root = ctx.crate_root;
    let ty = field.ty;

    match &field.value {
        FieldValue::Walked => collect_walked_generics(
            ty,
            ctx.generics,
            ctx.walked_generics,
            ctx.serialize_generics,
        ),
        FieldValue::Opaque => collect_generics_from_type(ty, ctx.generics, ctx.serialize_generics),
        FieldValue::SerializeWith(_) => {}
    }
    if field.options.is_restricted() {
        collect_generics_from_type(ty, ctx.generics, ctx.default_generics);
    }

    FieldPlan {
        spec: field_spec(root, field),
        filter: filter_statement(root, field),
        sanitize: sanitize_statement(root, field),
    }
}

fn field_spec(root: &TokenStream, field: &FieldInput<'_>) -> TokenStream {
    let name = field.ident.to_string();
    let name = name.strip_prefix("r#").unwrap_or(&name);
    let key = &field.key;
    let ty = field.ty;

    let mut spec = quote! { #root::FieldSpec::new(#name, #key) };
    if field.decode_key != field.key {
        let decode_key = &field.decode_key;
        spec.extend(quote! { .with_decode_key(#decode_key) });
    }
    if let Some(scope) = &field.options.scope {
        spec.extend(quote! { .with_scope(#scope) });
    }
    if field.options.encrypt {
        spec.extend(quote! { .encrypted() });
    }
    if field.options.required {
        spec.extend(quote! { .required() });
    }
    if !field.serialized {
        spec.extend(quote! { .skip_serializing() });
    }
    if !field.deserialized {
        spec.extend(quote! { .skip_deserializing() });
    }
    if matches!(field.value, FieldValue::Walked) {
        spec.extend(quote_spanned! { field.span =>
            .with_nested(<#ty as #root::ScopedContainer>::nested())
        });
    }
    if field.options.is_restricted() && field.deserialized {
        let render = default_document(root, field);
        spec.extend(quote! { .with_default(#render) });
    }
    spec
}

/// A non-capturing closure that renders `<T as Default>::default()` the way the
/// field's filter statement would.
fn default_document(root: &TokenStream, field: &FieldInput<'_>) -> TokenStream {
    let ty = field.ty;
    let default = quote_spanned! { field.span =>
        <#ty as ::core::default::Default>::default()
    };
    let value = match &field.value {
        FieldValue::Walked => quote_spanned! { field.span =>
            #root::ScopedContainer::filter_with(&#default, __ctx)
        },
        FieldValue::Opaque => quote_spanned! { field.span =>
            #root::__private::to_leaf(&#default)
        },
        FieldValue::SerializeWith(path) => quote_spanned! { field.span =>
            #root::__private::to_leaf_with(&#default, |__value, __serializer| {
                #path(__value, __serializer)
            })
        },
    };
    quote! {
        |__ctx: &#root::ScopeContext<'_>| -> ::core::result::Result<
            #root::__private::Value,
            #root::ScopeError,
        > { #value }
    }
}

fn filter_statement(root: &TokenStream, field: &FieldInput<'_>) -> TokenStream {
    if !field.serialized {
        return TokenStream::new();
    }
    let index = field.index;
    let ident = field.ident;

    let value = match &field.value {
        FieldValue::Walked => quote_spanned! { field.span =>
            #root::ScopedContainer::filter_with(&self.#ident, &__ctx)?
        },
        FieldValue::Opaque => quote_spanned! { field.span =>
            #root::__private::to_leaf(&self.#ident)?
        },
        FieldValue::SerializeWith(path) => quote_spanned! { field.span =>
            #root::__private::to_leaf_with(&self.#ident, |__value, __serializer| {
                #path(__value, __serializer)
            })?
        },
    };
    let skip_if = field
        .skip_serializing_if
        .as_ref()
        .map(|path| quote! { && !#path(&self.#ident) });

    quote! {
        if __ctx.is_visible(&__fields[#index]) #skip_if {
            __object.insert(::std::string::String::from(__fields[#index].key()), #value);
        }
    }
}

fn sanitize_statement(root: &TokenStream, field: &FieldInput<'_>) -> TokenStream {
    let index = field.index;
    let ident = field.ident;
    let walk = match field.value {
        FieldValue::Walked => Some(quote_spanned! { field.span =>
            #root::ScopedContainer::sanitize_with(&mut self.#ident, &__ctx)?;
        }),
        FieldValue::Opaque | FieldValue::SerializeWith(_) => None,
    };
    let reset = quote_spanned! { field.span =>
        self.#ident = ::core::default::Default::default();
    };

    match (field.options.is_restricted(), walk) {
        (true, Some(walk)) => quote! {
            if __fields[#index].is_writable(__permissions) {
                #walk
            } else {
                #reset
            }
        },
        (true, None) => quote! {
            if !__fields[#index].is_writable(__permissions) {
                #reset
            }
        },
        (false, Some(walk)) => walk,
        (false, None) => TokenStream::new(),
    }
}
