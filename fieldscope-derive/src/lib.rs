//! Derive macros for `fieldscope`.
//!
//! This crate generates the traversal code behind `#[derive(Scoped)]` and
//! `#[derive(Unscoped)]`. It:
//! - reads `#[scope(...)]` field attributes and the serde attributes that decide keys
//! - emits `ScopedContainer` and `Scoped` implementations
//!
//! It does **not** parse scope expressions or evaluate permissions. Expressions
//! are validated when the schema is first built, at runtime, by the main
//! `fieldscope` crate.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Result, parse_macro_input, parse_quote, spanned::Spanned};

mod attrs;
mod derive_struct;
mod generics;
mod serde_attrs;
mod transform;
use attrs::reject_scope_attrs;
use derive_struct::{SHAPE_HINT, derive_struct};
use generics::{add_bounds, add_static_bounds};
use serde_attrs::parse_container_serde;

/// Derives `fieldscope::ScopedContainer` and `fieldscope::Scoped` for structs
/// with named fields.
///
/// # Field Attributes
///
/// - **No annotation**: The field is always visible and writable. Its contents are walked using
///   `ScopedContainer`, so nested scoped structs are filtered too (external types must implement
///   it).
///
/// - `#[scope("expr")]`: The field is emitted on marshal only when the caller's permissions
///   satisfy `expr`, and reset to `Default::default()` on unmarshal otherwise. `,` separates
///   alternatives (OR) and `+` joins names that are all required (AND):
///   `#[scope("compliance,admin+pii")]`.
///
/// - `#[scope(encrypt)]`: The field value is encrypted when the security context carries a
///   cipher. The field must be emitted and read under the same key, so split
///   `rename(serialize = .., deserialize = ..)` forms are rejected.
///
/// - `#[scope(required)]`: The field must be non-empty whenever it is emitted.
///
/// - `#[scope(opaque)]`: The field is serialized as-is through `serde` and never walked. Use this
///   for foreign types that don't implement `ScopedContainer`. Equivalent to wrapping the field
///   type in `OpaqueValue<T>`.
///
/// Options combine in one attribute: `#[scope("admin+pii", encrypt, required)]`.
///
/// # Serde Attributes
///
/// Output keys follow serde: container `rename_all` and field `rename`, `skip`,
/// `skip_serializing`, `skip_deserializing` and `skip_serializing_if` are honored.
/// `serialize_with`/`with` fields are emitted through that function as leaves.
/// `#[serde(flatten)]` is rejected, as are the container options that replace the
/// struct's map encoding: `transparent`, `into`, `from`, `try_from`, `remote` and `tag`.
///
/// # Bounds
///
/// Every type parameter is bound by `'static`. Parameters used in walked fields need
/// `ScopedContainer`, in opaque fields `Serialize`, and in restricted fields `Default`.
///
/// Enums, tuple structs, unit structs, unions and lifetime parameters are rejected at compile
/// time.
#[proc_macro_derive(Scoped, attributes(scope))]
pub fn derive_scoped(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Derives a leaf `fieldscope::ScopedContainer` implementation.
///
/// The value is serialized through `serde` unchanged and never sanitized. This is
/// useful for types with no scoped fields that still need to appear inside
/// `Scoped` structs, including enums and tuple structs.
///
/// # Required Bounds
///
/// The type must implement `Serialize`.
///
/// # Rejected Attributes
///
/// `#[scope]` is rejected on the container and on its fields, since nothing inside an
/// unscoped type is filtered.
///
/// Unions are rejected at compile time.
#[proc_macro_derive(Unscoped, attributes(scope))]
pub fn derive_unscoped(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_unscoped(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

const UNSCOPED_ATTR: &str =
    "`#[scope]` attributes are not allowed on `Unscoped` types; derive `Scoped` to restrict fields";

fn expand_unscoped(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    reject_scope_attrs(&attrs, UNSCOPED_ATTR)?;
    match &data {
        Data::Struct(data) => {
            for field in &data.fields {
                reject_scope_attrs(&field.attrs, UNSCOPED_ATTR)?;
            }
        }
        Data::Enum(data) => {
            for variant in &data.variants {
                reject_scope_attrs(&variant.attrs, UNSCOPED_ATTR)?;
                for field in &variant.fields {
                    reject_scope_attrs(&field.attrs, UNSCOPED_ATTR)?;
                }
            }
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Unscoped` cannot be derived for unions",
            ));
        }
    }

    let crate_root = crate_root();
    let mut leaf_generics = generics;
    let (_, ty_generics, _) = leaf_generics.split_for_impl();
    let self_ty: syn::Type = parse_quote!(#ident #ty_generics);
    leaf_generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(#self_ty: #crate_root::__private::Serialize));
    let (impl_generics, ty_generics, where_clause) = leaf_generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #crate_root::ScopedContainer for #ident #ty_generics #where_clause {
            fn filter_with(
                &self,
                _ctx: &#crate_root::ScopeContext<'_>,
            ) -> ::core::result::Result<#crate_root::__private::Value, #crate_root::ScopeError> {
                #crate_root::__private::to_leaf(self)
            }

            fn sanitize_with(
                &mut self,
                _ctx: &#crate_root::ScopeContext<'_>,
            ) -> ::core::result::Result<(), #crate_root::ScopeError> {
                ::core::result::Result::Ok(())
            }
        }
    })
}

/// Returns the token stream to reference the fieldscope crate root.
///
/// Handles crate renaming (e.g., `scopes = { package = "fieldscope", ... }`).
/// Inside fieldscope itself the crate is reachable as `::fieldscope` through
/// `extern crate self`, which also covers its integration tests.
fn crate_root() -> TokenStream {
    match crate_name("fieldscope") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::fieldscope },
    }
}

struct DeriveOutput {
    specs: Vec<TokenStream>,
    filters: Vec<TokenStream>,
    sanitizers: Vec<TokenStream>,
    walked_generics: Vec<Ident>,
    default_generics: Vec<Ident>,
    serialize_generics: Vec<Ident>,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    reject_scope_attrs(
        &attrs,
        "`#[scope]` belongs on fields; a container-level scope is not supported",
    )?;
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "`Scoped` types must be `'static` (schemas are cached by `TypeId`); \
             use owned field types instead of borrowed ones",
        ));
    }

    let container = parse_container_serde(&attrs)?;
    let crate_root = crate_root();

    let output = match data {
        Data::Struct(data) => derive_struct(&ident, data, &generics, &container, &crate_root)?,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                format!("`Scoped` cannot be derived for enums ({SHAPE_HINT})"),
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`Scoped` cannot be derived for unions",
            ));
        }
    };

    let DeriveOutput {
        specs,
        filters,
        sanitizers,
        walked_generics,
        default_generics,
        serialize_generics,
    } = output;

    let scoped_generics = add_static_bounds(generics);
    let scoped_generics = add_bounds(
        scoped_generics,
        &walked_generics,
        &quote!(#crate_root::ScopedContainer),
    );
    let scoped_generics = add_bounds(
        scoped_generics,
        &default_generics,
        &quote!(::core::default::Default),
    );
    let scoped_generics = add_bounds(
        scoped_generics,
        &serialize_generics,
        &quote!(#crate_root::__private::Serialize),
    );
    let (impl_generics, ty_generics, where_clause) = scoped_generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #crate_root::ScopedContainer for #ident #ty_generics #where_clause {
            fn nested() -> ::core::option::Option<#crate_root::Nested> {
                ::core::option::Option::Some(#crate_root::Nested::composite::<Self>())
            }

            #[allow(unused_variables)]
            fn filter_with(
                &self,
                __ctx: &#crate_root::ScopeContext<'_>,
            ) -> ::core::result::Result<#crate_root::__private::Value, #crate_root::ScopeError> {
                let __schema = #crate_root::schema_for::<Self>()?;
                let __ctx = __ctx.descend()?;
                let __fields = __schema.fields();
                #[allow(unused_mut)]
                let mut __object = #crate_root::__private::Map::new();
                #(#filters)*
                ::core::result::Result::Ok(#crate_root::__private::Value::Object(__object))
            }

            #[allow(unused_variables)]
            fn sanitize_with(
                &mut self,
                __ctx: &#crate_root::ScopeContext<'_>,
            ) -> ::core::result::Result<(), #crate_root::ScopeError> {
                let __schema = #crate_root::schema_for::<Self>()?;
                let __ctx = __ctx.descend()?;
                let __fields = __schema.fields();
                let __permissions = __ctx.permissions();
                #(#sanitizers)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics #crate_root::Scoped for #ident #ty_generics #where_clause {
            fn field_specs() -> ::std::vec::Vec<#crate_root::FieldSpec> {
                ::std::vec![#(#specs),*]
            }
        }
    })
}
