//! The boundary between scoped documents and bytes.
//!
//! The engine never encodes or decodes on its own. It filters before
//! [`Format::encode`] and sanitizes after [`Format::decode`]; everything in
//! between belongs to the codec.

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "yaml")]
mod yaml;

use serde::{Serialize, de::DeserializeOwned};

#[cfg(feature = "json")]
pub use self::json::Json;
#[cfg(feature = "toml")]
pub use self::toml::Toml;
#[cfg(feature = "yaml")]
pub use self::yaml::Yaml;
use crate::error::FormatError;

/// A serde-backed wire format.
pub trait Format {
    /// Short lowercase name used in errors and trace events.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, FormatError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError>;

    /// Decodes into an existing value. `dest` is left untouched on failure.
    fn decode_into<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        dest: &mut T,
    ) -> Result<(), FormatError> {
        *dest = self.decode(bytes)?;
        Ok(())
    }
}
