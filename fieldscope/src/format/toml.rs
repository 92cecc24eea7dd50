use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::Format;
use crate::error::FormatError;

/// TOML through the `toml` crate.
///
/// TOML has no null, so `null` object entries (e.g. `None` options) are
/// dropped before encoding. The top-level value must be an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toml;

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(entries) => {
            entries.retain(|_, entry| !entry.is_null());
            entries.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

impl Format for Toml {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, FormatError> {
        let mut document =
            serde_json::to_value(value).map_err(|err| FormatError::new(self.name(), err))?;
        strip_nulls(&mut document);
        ::toml::to_string(&document)
            .map(String::into_bytes)
            .map_err(|err| FormatError::new(self.name(), err))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError> {
        let text = std::str::from_utf8(bytes).map_err(|err| FormatError::new(self.name(), err))?;
        ::toml::from_str(text).map_err(|err| FormatError::new(self.name(), err))
    }
}
