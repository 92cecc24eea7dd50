use fieldscope::{PermissionSet, Scoped};
use serde::{Deserialize, Serialize};

fn is_zero(value: &u32) -> bool {
    *value == 0
}

mod as_text {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

#[derive(Default, Scoped, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
struct Settings {
    display_name: String,
    #[serde(rename = "kind")]
    r#type: String,
    r#ref: String,
    #[serde(skip_serializing_if = "is_zero")]
    #[scope("admin", required)]
    retry_count: u32,
    #[serde(serialize_with = "as_text::serialize")]
    version: u32,
    #[serde(skip_deserializing)]
    computed: bool,
    #[serde(skip)]
    cache: Vec<u8>,
}

fn main() {
    let settings = Settings::default();
    let _ = fieldscope::marshal(&settings, &PermissionSet::new());
    let mut decoded = Settings::default();
    let _ = fieldscope::unmarshal(br#"{"display_name":"x"}"#, &mut decoded, &PermissionSet::new());
}
