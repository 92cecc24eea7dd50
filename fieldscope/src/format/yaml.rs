use serde::{Serialize, de::DeserializeOwned};

use super::Format;
use crate::error::FormatError;

/// YAML through `serde_yaml`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Yaml;

impl Format for Yaml {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, FormatError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|err| FormatError::new(self.name(), err))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError> {
        serde_yaml::from_slice(bytes).map_err(|err| FormatError::new(self.name(), err))
    }
}
