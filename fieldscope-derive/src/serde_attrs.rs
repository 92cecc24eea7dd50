//! The subset of `#[serde(...)]` attributes that decides field keys.
//!
//! A scoped type emits the same keys `serde` would, so the derive reads the
//! container `rename_all` rule and the field `rename`/`skip` attributes.
//! Container options that replace the struct's map encoding are rejected. Every
//! other serde option is consumed and ignored.

use proc_macro2::TokenStream;
use syn::{Attribute, ExprPath, LitStr, Result, Token, meta::ParseNestedMeta, spanned::Spanned};

/// A serde `rename_all` rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename rule `{other}`"),
                ));
            }
        })
    }

    /// Applies the rule to a snake_case field name, the way serde does.
    pub(crate) fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_owned(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply_to_field(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => Self::ScreamingSnake.apply_to_field(field).replace('_', "-"),
        }
    }
}

/// Container-level serde options.
#[derive(Debug, Default)]
pub(crate) struct ContainerSerde {
    pub(crate) rename_all_serialize: Option<RenameRule>,
    pub(crate) rename_all_deserialize: Option<RenameRule>,
}

/// Field-level serde options.
#[derive(Debug, Default)]
pub(crate) struct FieldSerde {
    pub(crate) rename_serialize: Option<String>,
    pub(crate) rename_deserialize: Option<String>,
    pub(crate) skip_serializing: bool,
    pub(crate) skip_deserializing: bool,
    pub(crate) skip_serializing_if: Option<ExprPath>,
    pub(crate) serialize_with: Option<ExprPath>,
}

fn consume_unknown(meta: &ParseNestedMeta<'_>) -> Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream = content.parse()?;
    }
    Ok(())
}

/// Parses `= "value"` or `(serialize = "a", deserialize = "b")`.
fn parse_split<T>(
    meta: &ParseNestedMeta<'_>,
    convert: impl Fn(&LitStr) -> Result<T>,
) -> Result<(Option<T>, Option<T>)> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        let serialize = convert(&lit)?;
        let deserialize = convert(&lit)?;
        return Ok((Some(serialize), Some(deserialize)));
    }

    let mut serialize = None;
    let mut deserialize = None;
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("serialize") {
            serialize = Some(convert(&lit)?);
        } else if inner.path.is_ident("deserialize") {
            deserialize = Some(convert(&lit)?);
        } else {
            return Err(inner.error("expected `serialize` or `deserialize`"));
        }
        Ok(())
    })?;
    Ok((serialize, deserialize))
}

fn parse_path_value(meta: &ParseNestedMeta<'_>) -> Result<ExprPath> {
    let lit: LitStr = meta.value()?.parse()?;
    lit.parse()
}

/// Container options under which serde no longer encodes the struct as a map
/// of its fields.
const SHAPE_CHANGING: [&str; 6] = ["transparent", "into", "from", "try_from", "remote", "tag"];

pub(crate) fn parse_container_serde(attrs: &[Attribute]) -> Result<ContainerSerde> {
    let mut options = ContainerSerde::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let (serialize, deserialize) = parse_split(&meta, RenameRule::from_lit)?;
                if serialize.is_some() {
                    options.rename_all_serialize = serialize;
                }
                if deserialize.is_some() {
                    options.rename_all_deserialize = deserialize;
                }
                Ok(())
            } else if let Some(name) = SHAPE_CHANGING
                .iter()
                .find(|name| meta.path.is_ident(name))
            {
                Err(syn::Error::new(
                    meta.path.span(),
                    format!(
                        "`#[serde({name})]` changes how the type is encoded and is not \
                         supported on `Scoped` types; derive `Unscoped` to emit the type \
                         through serde unchanged"
                    ),
                ))
            } else {
                consume_unknown(&meta)
            }
        })?;
    }
    Ok(options)
}

pub(crate) fn parse_field_serde(attrs: &[Attribute]) -> Result<FieldSerde> {
    let mut options = FieldSerde::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let (serialize, deserialize) = parse_split(&meta, |lit| Ok(lit.value()))?;
                if serialize.is_some() {
                    options.rename_serialize = serialize;
                }
                if deserialize.is_some() {
                    options.rename_deserialize = deserialize;
                }
            } else if meta.path.is_ident("skip") {
                options.skip_serializing = true;
                options.skip_deserializing = true;
            } else if meta.path.is_ident("skip_serializing") {
                options.skip_serializing = true;
            } else if meta.path.is_ident("skip_deserializing") {
                options.skip_deserializing = true;
            } else if meta.path.is_ident("skip_serializing_if") {
                options.skip_serializing_if = Some(parse_path_value(&meta)?);
            } else if meta.path.is_ident("serialize_with") {
                options.serialize_with = Some(parse_path_value(&meta)?);
            } else if meta.path.is_ident("with") {
                let mut path = parse_path_value(&meta)?;
                path.path.segments.push(syn::parse_quote!(serialize));
                options.serialize_with = Some(path);
            } else if meta.path.is_ident("flatten") {
                return Err(syn::Error::new(
                    meta.path.span(),
                    "`#[serde(flatten)]` is not supported on `Scoped` types; \
                     declare the fields directly or mark the field `#[scope(opaque)]` \
                     on an unflattened struct",
                ));
            } else {
                consume_unknown(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(options)
}
