use serde::{Serialize, de::DeserializeOwned};

use super::Format;
use crate::error::FormatError;

/// JSON through `serde_json`, compact by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Json {
    pretty: bool,
}

impl Json {
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Format for Json {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, FormatError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded.map_err(|err| FormatError::new(self.name(), err))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError> {
        serde_json::from_slice(bytes).map_err(|err| FormatError::new(self.name(), err))
    }
}
