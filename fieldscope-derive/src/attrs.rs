//! Parsing of `#[scope(...)]` field attributes.
//!
//! This module maps attribute syntax to per-field options and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{
    Attribute, Ident, LitStr, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
};

/// Options collected from `#[scope(...)]` on one field.
///
/// | Attribute                     | Effect                                          |
/// |-------------------------------|-------------------------------------------------|
/// | None                          | Always visible and writable; contents walked    |
/// | `#[scope("a+b,c")]`           | Visible/writable only when the expression holds |
/// | `#[scope(encrypt)]`           | Encrypted when a cipher is configured           |
/// | `#[scope(required)]`          | Must be non-empty when emitted                  |
/// | `#[scope(opaque)]`            | Serialized as-is, never walked                  |
///
/// Options combine: `#[scope("admin+pii", encrypt, required)]`.
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldOptions {
    pub(crate) scope: Option<LitStr>,
    pub(crate) encrypt: bool,
    pub(crate) required: bool,
    pub(crate) opaque: bool,
}

impl FieldOptions {
    /// Whether the field may be reset on unmarshal.
    pub(crate) fn is_restricted(&self) -> bool {
        self.scope.as_ref().is_some_and(|lit| !lit.value().trim().is_empty())
    }
}

enum ScopeArg {
    Expression(LitStr),
    Flag(Ident),
}

impl Parse for ScopeArg {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        if input.peek(LitStr) {
            input.parse().map(ScopeArg::Expression)
        } else if input.peek(Ident) {
            input.parse().map(ScopeArg::Flag)
        } else {
            Err(input.error(
                "expected a scope expression string or one of `encrypt`, `required`, `opaque`",
            ))
        }
    }
}

fn set_flag(target: &mut bool, flag: &Ident) -> Result<()> {
    if *target {
        return Err(syn::Error::new(
            flag.span(),
            format!("duplicate `{flag}` option in #[scope]"),
        ));
    }
    *target = true;
    Ok(())
}

fn apply_args(options: &mut FieldOptions, args: Punctuated<ScopeArg, Token![,]>) -> Result<()> {
    for arg in args {
        match arg {
            ScopeArg::Expression(lit) => {
                if options.scope.is_some() {
                    return Err(syn::Error::new(
                        lit.span(),
                        "only one scope expression is allowed per field; \
                         use `,` for OR and `+` for AND inside the string",
                    ));
                }
                options.scope = Some(lit);
            }
            ScopeArg::Flag(flag) => {
                if flag == "encrypt" {
                    set_flag(&mut options.encrypt, &flag)?;
                } else if flag == "required" {
                    set_flag(&mut options.required, &flag)?;
                } else if flag == "opaque" {
                    set_flag(&mut options.opaque, &flag)?;
                } else {
                    return Err(syn::Error::new(
                        flag.span(),
                        format!(
                            "unknown #[scope] option `{flag}`; \
                             expected `encrypt`, `required` or `opaque`"
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn usage_error(span: Span) -> syn::Error {
    syn::Error::new(
        span,
        "expected #[scope(\"expression\")] or #[scope(encrypt | required | opaque)] \
         (e.g., #[scope(\"admin+pii\", encrypt)])",
    )
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();
    let mut seen = false;
    for attr in attrs {
        if !attr.path().is_ident("scope") {
            continue;
        }
        if seen {
            return Err(syn::Error::new(
                attr.span(),
                "multiple #[scope] attributes on the same field",
            ));
        }
        seen = true;

        match &attr.meta {
            Meta::List(list) => {
                let args =
                    list.parse_args_with(Punctuated::<ScopeArg, Token![,]>::parse_terminated)?;
                if args.is_empty() {
                    return Err(usage_error(attr.span()));
                }
                apply_args(&mut options, args)?;
            }
            Meta::Path(_) | Meta::NameValue(_) => return Err(usage_error(attr.span())),
        }
    }
    Ok(options)
}

/// Rejects `#[scope]` where it has no meaning (on the type itself).
pub(crate) fn reject_scope_attrs(attrs: &[Attribute], message: &str) -> Result<()> {
    match attrs.iter().find(|attr| attr.path().is_ident("scope")) {
        Some(attr) => Err(syn::Error::new(attr.path().span(), message)),
        None => Ok(()),
    }
}
