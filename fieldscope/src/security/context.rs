use std::{collections::BTreeMap, fmt, sync::Arc};

use super::{FieldCipher, SecurityActions};
use crate::PermissionSet;

/// Everything one secure marshal or unmarshal call needs.
///
/// Holds the caller's permissions, an optional cipher for
/// `#[scope(encrypt)]` fields, the security actions to run first, and free-form
/// metadata the actions may read. The engine never stores a context beyond the
/// call it was passed to.
#[derive(Clone)]
pub struct SecurityContext {
    permissions: PermissionSet,
    cipher: Option<Arc<dyn FieldCipher>>,
    actions: Arc<SecurityActions>,
    metadata: BTreeMap<String, String>,
}

impl SecurityContext {
    pub fn new(permissions: impl Into<PermissionSet>) -> Self {
        Self {
            permissions: permissions.into(),
            cipher: None,
            actions: Arc::default(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_cipher(self, cipher: impl FieldCipher + 'static) -> Self {
        self.with_shared_cipher(Arc::new(cipher))
    }

    /// Uses a cipher shared with other contexts.
    #[must_use]
    pub fn with_shared_cipher(mut self, cipher: Arc<dyn FieldCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    #[must_use]
    pub fn with_actions(self, actions: SecurityActions) -> Self {
        self.with_shared_actions(Arc::new(actions))
    }

    /// Uses a registry shared with other contexts.
    #[must_use]
    pub fn with_shared_actions(mut self, actions: Arc<SecurityActions>) -> Self {
        self.actions = actions;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn cipher(&self) -> Option<&dyn FieldCipher> {
        self.cipher.as_deref()
    }

    pub fn actions(&self) -> &SecurityActions {
        &self.actions
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl From<PermissionSet> for SecurityContext {
    fn from(permissions: PermissionSet) -> Self {
        Self::new(permissions)
    }
}

impl fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityContext")
            .field("permissions", &self.permissions)
            .field("cipher", &self.cipher.as_ref().map(|_| ".."))
            .field("actions", &self.actions)
            .field("metadata", &self.metadata)
            .finish()
    }
}
