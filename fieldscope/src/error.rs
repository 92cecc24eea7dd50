//! Error types returned by the engine.
//!
//! Every failure is returned to the immediate caller as a [`ScopeError`].
//! Omitting or zeroing a field because of missing permissions is never an
//! error.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    scope::ParseError,
    security::{CryptoError, SecurityActionError},
};

/// Top-level error for every engine operation.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("failed to encode: {0}")]
    Encode(#[source] FormatError),
    #[error("failed to decode: {0}")]
    Decode(#[source] FormatError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    SecurityAction(#[from] SecurityActionError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// A type's scope metadata or value shape cannot be processed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid scope on `{type_name}.{field}`")]
    InvalidScope {
        type_name: &'static str,
        field: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("`{type_name}` uses the key `{key}` for more than one field")]
    DuplicateKey {
        type_name: &'static str,
        key: &'static str,
    },
    #[error("`{type_name}.{field}` uses the reserved key `{key}`")]
    ReservedKey {
        type_name: &'static str,
        field: &'static str,
        key: &'static str,
    },
    #[error("map keys must serialize to a string, number or bool, found {found}")]
    UnsupportedMapKey { found: &'static str },
    #[error("value nesting exceeds the configured depth limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Error reported by a [`Format`](crate::format::Format) codec.
#[derive(Debug, Error)]
#[error("{format}: {source}")]
pub struct FormatError {
    format: &'static str,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl FormatError {
    pub fn new<E>(format: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            format,
            source: source.into(),
        }
    }

    /// Name of the format that failed.
    pub fn format(&self) -> &'static str {
        self.format
    }
}

/// Structural validation rejected a document.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("validation failed at `{path}`: {message}")]
pub struct ValidationError {
    path: String,
    message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Dotted path of the offending field, e.g. `owner.email`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
