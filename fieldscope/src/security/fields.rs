//! Field-level encryption of redacted documents.
//!
//! Encryption runs on the document tree, after filtering and before encoding.
//! Each object that had fields encrypted gains a marker entry listing their
//! keys. Decryption runs on the decoded document before the typed value is
//! built, and accepts only fields the schema flags as encrypted.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};

use super::{CryptoError, FieldCipher};
use crate::{
    error::{FormatError, ScopeError},
    schema::{ENCRYPTED_MARKER, Nested},
};

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

/// Calls `visit` on every object of `nested`'s type inside `value`.
fn for_each_object<F>(
    nested: Nested,
    value: &mut Value,
    path: &str,
    visit: &mut F,
) -> Result<(), ScopeError>
where
    F: FnMut(Nested, &mut Map<String, Value>, &str) -> Result<(), ScopeError>,
{
    if nested.is_collection() {
        let element = nested.element();
        match value {
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    for_each_object(element, item, &format!("{path}[{index}]"), visit)?;
                }
            }
            Value::Object(entries) => {
                for (key, item) in entries.iter_mut() {
                    for_each_object(element, item, &child_path(path, key), visit)?;
                }
            }
            _ => {}
        }
        return Ok(());
    }
    match value {
        Value::Object(object) => visit(nested, object, path),
        _ => Ok(()),
    }
}

/// Encrypts every emitted `#[scope(encrypt)]` field, at any depth.
///
/// Fails with [`CryptoError::MissingKey`] when such a field is present and no
/// cipher is configured; fields withheld by scope need no key.
pub(crate) fn encrypt_fields(
    nested: Nested,
    document: &mut Value,
    cipher: Option<&dyn FieldCipher>,
) -> Result<(), ScopeError> {
    encrypt_fields_at(nested, document, "", cipher)
}

fn encrypt_object(
    nested: Nested,
    object: &mut Map<String, Value>,
    path: &str,
    cipher: Option<&dyn FieldCipher>,
) -> Result<(), ScopeError> {
    let schema = nested.schema()?;
    let mut encrypted = Vec::new();

    for field in schema.fields() {
        let Some(entry) = object.get_mut(field.key()) else {
            continue;
        };
        let field_path = child_path(path, field.key());
        if field.is_encrypted() {
            let cipher = cipher.ok_or(CryptoError::MissingKey { path: field_path })?;
            let plaintext = serde_json::to_vec(entry)
                .map_err(|err| ScopeError::Encode(FormatError::new("document", err)))?;
            let sealed = cipher.encrypt(&plaintext)?;
            *entry = Value::String(STANDARD.encode(sealed));
            encrypted.push(Value::String(field.key().to_owned()));
        } else if let Some(child) = field.nested() {
            encrypt_fields_at(child, entry, &field_path, cipher)?;
        }
    }

    if !encrypted.is_empty() {
        object.insert(ENCRYPTED_MARKER.to_owned(), Value::Array(encrypted));
    }
    Ok(())
}

fn encrypt_fields_at(
    nested: Nested,
    value: &mut Value,
    path: &str,
    cipher: Option<&dyn FieldCipher>,
) -> Result<(), ScopeError> {
    for_each_object(nested, value, path, &mut |nested, object, path| {
        encrypt_object(nested, object, path, cipher)
    })
}

/// Decrypts every field listed in a marker and removes the markers.
pub(crate) fn decrypt_fields(
    nested: Nested,
    document: &mut Value,
    cipher: Option<&dyn FieldCipher>,
) -> Result<(), ScopeError> {
    decrypt_fields_at(nested, document, "", cipher)
}

fn decrypt_fields_at(
    nested: Nested,
    value: &mut Value,
    path: &str,
    cipher: Option<&dyn FieldCipher>,
) -> Result<(), ScopeError> {
    for_each_object(nested, value, path, &mut |nested, object, path| {
        decrypt_object(nested, object, path, cipher)
    })
}

fn marked_keys(object: &mut Map<String, Value>, path: &str) -> Result<Vec<String>, CryptoError> {
    let malformed = || CryptoError::UnexpectedMarker {
        path: child_path(path, ENCRYPTED_MARKER),
    };
    match object.remove(ENCRYPTED_MARKER) {
        None => Ok(Vec::new()),
        Some(Value::Array(keys)) => keys
            .into_iter()
            .map(|key| match key {
                Value::String(key) => Ok(key),
                _ => Err(malformed()),
            })
            .collect(),
        Some(_) => Err(malformed()),
    }
}

fn decrypt_object(
    nested: Nested,
    object: &mut Map<String, Value>,
    path: &str,
    cipher: Option<&dyn FieldCipher>,
) -> Result<(), ScopeError> {
    let schema = nested.schema()?;
    let marked = marked_keys(object, path)?;

    for key in &marked {
        let field_path = child_path(path, key);
        if !schema
            .field_by_decode_key(key)
            .is_some_and(|field| field.is_encrypted())
        {
            return Err(CryptoError::UnexpectedMarker { path: field_path }.into());
        }
        let Some(entry) = object.get_mut(key) else {
            continue;
        };
        let cipher = cipher.ok_or_else(|| CryptoError::MissingKey {
            path: field_path.clone(),
        })?;
        let Value::String(encoded) = entry else {
            return Err(CryptoError::MalformedCiphertext {
                path: field_path,
                reason: "expected a base64 string".to_owned(),
            }
            .into());
        };
        let sealed = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|err| CryptoError::MalformedCiphertext {
                path: field_path.clone(),
                reason: err.to_string(),
            })?;
        let plaintext = cipher.decrypt(&sealed)?;
        *entry = serde_json::from_slice(&plaintext).map_err(|err| {
            CryptoError::MalformedCiphertext {
                path: field_path,
                reason: err.to_string(),
            }
        })?;
    }

    for field in schema.fields() {
        if marked.iter().any(|key| key == field.decode_key()) {
            continue;
        }
        let (Some(child), Some(entry)) = (field.nested(), object.get_mut(field.decode_key()))
        else {
            continue;
        };
        decrypt_fields_at(child, entry, &child_path(path, field.decode_key()), cipher)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ScopeContext, Scoped, ScopedContainer, schema::FieldSpec, traversal::to_leaf};

    /// XOR "cipher" so tests can assert on exact bytes.
    struct Xor(u8);

    impl FieldCipher for Xor {
        fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
            Ok(plaintext.iter().map(|b| b ^ self.0).collect())
        }

        fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
            self.encrypt(ciphertext)
        }
    }

    macro_rules! spec_only {
        ($name:ident, [$($spec:expr),* $(,)?]) => {
            struct $name;

            impl ScopedContainer for $name {
                fn filter_with(&self, _ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
                    to_leaf(&())
                }

                fn sanitize_with(&mut self, _ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
                    Ok(())
                }
            }

            impl Scoped for $name {
                fn field_specs() -> Vec<FieldSpec> {
                    vec![$($spec),*]
                }
            }
        };
    }

    spec_only!(Card, [
        FieldSpec::new("number", "number").encrypted(),
        FieldSpec::new("holder", "holder"),
    ]);
    spec_only!(Wallet, [
        FieldSpec::new("owner", "owner").with_scope("admin").encrypted(),
        FieldSpec::new("cards", "cards")
            .with_nested(Some(Nested::composite::<Card>().collection())),
    ]);

    fn wallet() -> Value {
        json!({
            "owner": "ada",
            "cards": [
                {"number": "4111", "holder": "ada"},
                {"number": "5500", "holder": "ada"},
            ],
        })
    }

    #[test]
    fn encrypts_at_every_depth_and_marks_objects() {
        let mut doc = wallet();
        encrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&Xor(0x2a))).unwrap();

        assert_eq!(doc["_encrypted"], json!(["owner"]));
        assert_ne!(doc["owner"], json!("ada"));
        for card in doc["cards"].as_array().unwrap() {
            assert_eq!(card["_encrypted"], json!(["number"]));
            assert_eq!(card["holder"], json!("ada"));
            assert!(card["number"].is_string());
        }
    }

    #[test]
    fn decrypt_restores_the_document() {
        let mut doc = wallet();
        let cipher = Xor(0x2a);
        encrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&cipher)).unwrap();
        decrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&cipher)).unwrap();
        assert_eq!(doc, wallet());
    }

    #[test]
    fn withheld_fields_need_no_key() {
        let mut doc = json!({"cards": []});
        encrypt_fields(Nested::composite::<Wallet>(), &mut doc, None).unwrap();
        assert_eq!(doc, json!({"cards": []}));
    }

    #[test]
    fn emitted_encrypted_field_without_key_fails() {
        let mut doc = wallet();
        let err = encrypt_fields(Nested::composite::<Wallet>(), &mut doc, None).unwrap_err();
        assert!(matches!(
            err,
            ScopeError::Crypto(CryptoError::MissingKey { ref path }) if path == "owner"
        ));
    }

    #[test]
    fn marker_on_plain_field_is_rejected() {
        let mut doc = json!({"owner": "x", "cards": [{"holder": "ada", "_encrypted": ["holder"]}]});
        let err = decrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&Xor(1)))
            .unwrap_err();
        assert!(matches!(
            err,
            ScopeError::Crypto(CryptoError::UnexpectedMarker { ref path }) if path == "cards[0].holder"
        ));
    }

    #[test]
    fn malformed_marker_is_rejected() {
        let mut doc = json!({"_encrypted": "owner"});
        let err = decrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&Xor(1)))
            .unwrap_err();
        assert!(matches!(
            err,
            ScopeError::Crypto(CryptoError::UnexpectedMarker { .. })
        ));
    }

    #[test]
    fn non_base64_ciphertext_is_malformed() {
        let mut doc = json!({"owner": "not base64!", "_encrypted": ["owner"]});
        let err = decrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&Xor(1)))
            .unwrap_err();
        assert!(matches!(
            err,
            ScopeError::Crypto(CryptoError::MalformedCiphertext { ref path, .. }) if path == "owner"
        ));
    }

    #[test]
    fn encrypted_payload_without_key_fails() {
        let mut doc = wallet();
        encrypt_fields(Nested::composite::<Wallet>(), &mut doc, Some(&Xor(3))).unwrap();
        let err = decrypt_fields(Nested::composite::<Wallet>(), &mut doc, None).unwrap_err();
        assert!(matches!(
            err,
            ScopeError::Crypto(CryptoError::MissingKey { .. })
        ));
    }

    #[test]
    fn unmarked_documents_pass_through() {
        let mut doc = wallet();
        decrypt_fields(Nested::composite::<Wallet>(), &mut doc, None).unwrap();
        assert_eq!(doc, wallet());
    }
}
