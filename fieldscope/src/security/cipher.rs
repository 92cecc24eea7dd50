//! Field cipher capability and the built-in AES-256-GCM implementation.

use thiserror::Error;

/// Symmetric encryption used for `#[scope(encrypt)]` fields.
///
/// The engine only ever hands a cipher whole serialized field values and
/// stores the returned bytes base64-encoded. Key management belongs to the
/// implementor.
pub trait FieldCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Field encryption or decryption failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("`{path}` is encrypted but no cipher is configured")]
    MissingKey { path: String },
    #[error("field encryption failed")]
    Encrypt,
    #[error("field decryption failed: the ciphertext is invalid or was tampered with")]
    Decrypt,
    #[error("`{path}` holds malformed ciphertext: {reason}")]
    MalformedCiphertext { path: String, reason: String },
    #[error("`{path}` is listed as encrypted but is not an encrypted field")]
    UnexpectedMarker { path: String },
    #[error("cipher key must be {expected} bytes, got {found}")]
    InvalidKeyLength { expected: usize, found: usize },
}

#[cfg(feature = "encryption")]
pub use self::aes::Aes256GcmCipher;

#[cfg(feature = "encryption")]
mod aes {
    use std::fmt;

    use aes_gcm::{
        Aes256Gcm, Key, Nonce,
        aead::{Aead, AeadCore, KeyInit, OsRng},
    };

    use super::{CryptoError, FieldCipher};

    const NONCE_LEN: usize = 12;

    /// AES-256-GCM with a random 96-bit nonce prefixed to every ciphertext.
    #[derive(Clone)]
    pub struct Aes256GcmCipher {
        cipher: Aes256Gcm,
    }

    impl Aes256GcmCipher {
        pub const KEY_LEN: usize = 32;

        pub fn new(key: &[u8; Self::KEY_LEN]) -> Self {
            Self {
                cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
            }
        }

        /// Builds a cipher from a key of unchecked length.
        pub fn from_slice(key: &[u8]) -> Result<Self, CryptoError> {
            Aes256Gcm::new_from_slice(key)
                .map(|cipher| Self { cipher })
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: Self::KEY_LEN,
                    found: key.len(),
                })
        }

        /// Generates a fresh random key from the OS RNG.
        pub fn generate_key() -> [u8; Self::KEY_LEN] {
            Aes256Gcm::generate_key(OsRng).into()
        }
    }

    impl fmt::Debug for Aes256GcmCipher {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Aes256GcmCipher").finish_non_exhaustive()
        }
    }

    impl FieldCipher for Aes256GcmCipher {
        fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
            let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
            let sealed = self
                .cipher
                .encrypt(&nonce, plaintext)
                .map_err(|_| CryptoError::Encrypt)?;
            let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
            out.extend_from_slice(&nonce);
            out.extend_from_slice(&sealed);
            Ok(out)
        }

        fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
            if ciphertext.len() < NONCE_LEN {
                return Err(CryptoError::Decrypt);
            }
            let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
            self.cipher
                .decrypt(Nonce::from_slice(nonce), sealed)
                .map_err(|_| CryptoError::Decrypt)
        }
    }

}
