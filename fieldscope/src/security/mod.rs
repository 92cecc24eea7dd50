//! Security extension around the base pipeline.
//!
//! - **`context`**: `SecurityContext`, the per-call permissions, cipher, actions and metadata
//! - **`actions`**: typed pre-conditions that may abort a call before data is touched
//! - **`cipher`**: the `FieldCipher` capability and `Aes256GcmCipher`
//! - **`fields`**: encryption and decryption of `#[scope(encrypt)]` fields in a document

mod actions;
mod cipher;
mod context;
mod fields;

pub use actions::{ActionOutcome, Direction, SecurityActionError, SecurityActions};
#[cfg(feature = "encryption")]
pub use cipher::Aes256GcmCipher;
pub use cipher::{CryptoError, FieldCipher};
pub use context::SecurityContext;
pub(crate) use fields::{decrypt_fields, encrypt_fields};
