//! `serde_json::Value` support for scoped traversal.
//!
//! `serde_json::Value` is treated as an opaque leaf. A field's scope decides
//! whether the whole value is emitted; its dynamic structure is never walked.

use serde_json::Value;

use super::{ScopeContext, ScopedContainer};
use crate::error::ScopeError;

impl ScopedContainer for Value {
    fn filter_with(&self, _ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        Ok(self.clone())
    }

    fn sanitize_with(&mut self, _ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        Ok(())
    }
}
