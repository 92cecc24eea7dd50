//! Adapters for emitting scoped values through `tracing`.
//!
//! [`TracingScopedExt`] logs the scoped projection of a value as a display
//! string, so fields a permission set may not see never reach a subscriber.
//!
//! # Example
//!
//! ```ignore
//! use fieldscope::tracing::TracingScopedExt;
//!
//! tracing::info!(user = %user.tracing_scoped(&support_permissions));
//! ```

use tracing::field::{DisplayValue, display};

use crate::{PermissionSet, ScopeContext, ScopedContainer};

/// Extension trait for logging scoped values as display strings.
///
/// The output is the compact JSON rendering of the redacted copy. Scoping
/// errors render as `[scope error: ...]` instead of the value.
pub trait TracingScopedExt {
    /// Filters the value for `permissions` and wraps the result for `tracing`.
    fn tracing_scoped(&self, permissions: &PermissionSet) -> DisplayValue<String>;
}

impl<T: ScopedContainer> TracingScopedExt for T {
    fn tracing_scoped(&self, permissions: &PermissionSet) -> DisplayValue<String> {
        let text = match self.filter_with(&ScopeContext::new(permissions)) {
            Ok(document) => document.to_string(),
            Err(err) => format!("[scope error: {err}]"),
        };
        display(text)
    }
}
