//! Permission-scoped serialization for serde types.
//!
//! Every field of a `#[derive(Scoped)]` struct may carry a scope expression
//! naming the permissions a caller needs to see or write it:
//!
//! - `#[scope("admin")]`: one permission
//! - `#[scope("admin+pii")]`: every name joined by `+`
//! - `#[scope("compliance,admin+pii")]`: any clause separated by `,`
//!
//! Marshalling omits the fields a caller may not see. Unmarshalling resets the
//! fields a caller may not write to their default, whatever the payload says.
//! Fields without a scope are always visible and writable.
//!
//! ```
//! use fieldscope::{PermissionSet, Scoped};
//!
//! #[derive(Scoped, serde::Deserialize, Default)]
//! struct User {
//!     id: u64,
//!     #[scope("admin")]
//!     password: String,
//! }
//!
//! let user = User { id: 1, password: "hunter2".into() };
//! let bytes = fieldscope::marshal(&user, &PermissionSet::new()).unwrap();
//! assert_eq!(bytes, br#"{"id":1}"#);
//!
//! let mut decoded = User::default();
//! let payload = br#"{"id":2,"password":"injected"}"#;
//! fieldscope::unmarshal(payload, &mut decoded, &PermissionSet::from(["public"])).unwrap();
//! assert_eq!(decoded.password, "");
//! ```
//!
//! What this crate does:
//! - parses and evaluates scope expressions
//! - builds and caches one schema per scoped type
//! - filters values into a [`Redacted`] document and sanitizes decoded values
//! - runs security actions and field encryption through a [`SecurityContext`]
//!
//! What it does not do:
//! - authenticate callers or decide which permissions they hold
//! - perform I/O, other than optional `tracing` events
//!
//! The derive macros live in `fieldscope-derive` and are re-exported from this
//! crate.

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
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use fieldscope_derive::{Scoped, Unscoped};

#[allow(unused_extern_crates)]
extern crate self as fieldscope;

/// Emits a `debug` event under the `fieldscope` target when the `tracing`
/// feature is on. Compiles to nothing otherwise.
macro_rules! trace_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: "fieldscope", $($arg)*);
    };
}
pub(crate) use trace_event;

// Module declarations
mod defaults;
mod engine;
mod error;
pub mod format;
mod redacted;
mod schema;
mod scope;
mod security;
#[cfg(feature = "tracing")]
pub mod tracing;
mod traversal;
mod validate;

// Re-exports
#[cfg(feature = "json")]
pub use engine::{filter, marshal, marshal_with_context, sanitize, unmarshal, unmarshal_with_context};
pub use engine::{ScopeEngine, ScopeEngineBuilder};
pub use error::{FormatError, SchemaError, ScopeError, ValidationError};
pub use format::Format;
#[cfg(feature = "json")]
pub use format::Json;
#[cfg(feature = "toml")]
pub use format::Toml;
#[cfg(feature = "yaml")]
pub use format::Yaml;
pub use redacted::Redacted;
pub use schema::{
    DefaultDocument, ENCRYPTED_MARKER, FieldDescriptor, FieldSpec, Nested, TypeSchema,
    resolve_tree, schema_for,
};
pub use scope::{Clause, ParseError, PermissionSet, ScopeExpression};
#[cfg(feature = "encryption")]
pub use security::Aes256GcmCipher;
pub use security::{
    ActionOutcome, CryptoError, Direction, FieldCipher, SecurityActionError, SecurityActions,
    SecurityContext,
};
pub use traversal::{DEFAULT_MAX_DEPTH, OpaqueValue, ScopeContext, Scoped, ScopedContainer};
pub use validate::{RequiredFields, Validator};

#[doc(hidden)]
pub mod __private {
    pub use serde::Serialize;
    pub use serde_json::{Map, Value};

    pub use crate::traversal::{to_leaf, to_leaf_with};
}
