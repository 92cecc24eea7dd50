//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added only for generics that appear in a field that needs them:
//!
//! - walked fields need `ScopedContainer`
//! - restricted fields need `Default` (they are reset on unmarshal)
//! - opaque fields need `Serialize`
//!
//! Every type parameter is also bound by `'static`, since schemas are cached by
//! `TypeId`.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` is skipped when collecting generics, so
//! `struct TypedId<T> { id: String, _marker: PhantomData<T> }` does not require
//! `T: ScopedContainer`.
//!
//! ## OpaqueValue Handling
//!
//! In walked fields, parameters inside `OpaqueValue<T>` are bound by `Serialize`
//! instead, since the wrapper emits its contents through serde.

use proc_macro2::TokenStream;
use syn::{
    Ident, parse_quote,
    visit::{self, Visit},
};

struct TypeParamCollector<'a> {
    generics: &'a syn::Generics,
    found: &'a mut Vec<Ident>,
    /// Receives parameters found inside `OpaqueValue<..>` when set.
    opaque: Option<&'a mut Vec<Ident>>,
}

fn last_segment_is(path: &syn::Path, name: &str) -> bool {
    path.segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

fn push_unique(found: &mut Vec<Ident>, ident: &Ident) {
    if !found.iter().any(|g| g == ident) {
        found.push(ident.clone());
    }
}

impl<'ast> Visit<'ast> for TypeParamCollector<'_> {
    fn visit_path(&mut self, path: &'ast syn::Path) {
        if last_segment_is(path, "PhantomData") {
            return;
        }
        if let (Some(segment), Some(opaque)) = (path.segments.last(), self.opaque.as_deref_mut()) {
            if segment.ident == "OpaqueValue" {
                TypeParamCollector {
                    generics: self.generics,
                    found: opaque,
                    opaque: None,
                }
                .visit_path_arguments(&segment.arguments);
                return;
            }
        }
        for segment in &path.segments {
            let ident = &segment.ident;
            if self.generics.type_params().any(|param| param.ident == *ident) {
                push_unique(self.found, ident);
            }
        }
        visit::visit_path(self, path);
    }
}

/// Records every type parameter of `generics` that appears in `ty`.
pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    TypeParamCollector {
        generics,
        found: result,
        opaque: None,
    }
    .visit_type(ty);
}

/// Like [`collect_generics_from_type`] for a walked field: parameters wrapped
/// in `OpaqueValue<..>` are serialized rather than walked, so they go to
/// `serialized` instead.
pub(crate) fn collect_walked_generics(
    ty: &syn::Type,
    generics: &syn::Generics,
    walked: &mut Vec<Ident>,
    serialized: &mut Vec<Ident>,
) {
    TypeParamCollector {
        generics,
        found: walked,
        opaque: Some(serialized),
    }
    .visit_type(ty);
}

/// Adds `bound` to each type parameter listed in `used_generics`.
pub(crate) fn add_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    bound: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#bound));
        }
    }
    generics
}

/// Adds `'static` to every type parameter.
pub(crate) fn add_static_bounds(mut generics: syn::Generics) -> syn::Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    generics
}
