//! Per-call traversal state.

use crate::{PermissionSet, error::SchemaError, schema::FieldDescriptor};

/// Default bound on composite nesting during one traversal.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Permissions and recursion bookkeeping for one filter or sanitize pass.
#[derive(Clone, Copy, Debug)]
pub struct ScopeContext<'a> {
    permissions: &'a PermissionSet,
    depth: usize,
    max_depth: usize,
    reveal_all: bool,
}

impl<'a> ScopeContext<'a> {
    pub fn new(permissions: &'a PermissionSet) -> Self {
        Self {
            permissions,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            reveal_all: false,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn permissions(&self) -> &'a PermissionSet {
        self.permissions
    }

    /// Whether `field` is emitted in this pass.
    pub fn is_visible(&self, field: &FieldDescriptor) -> bool {
        if self.reveal_all {
            field.is_serialized()
        } else {
            field.is_visible(self.permissions)
        }
    }

    /// Context that emits every serialized field regardless of scope.
    ///
    /// Only used to render `Default::default()` values.
    pub(crate) fn revealing(self) -> Self {
        Self {
            reveal_all: true,
            ..self
        }
    }

    /// Number of composites entered so far.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Context for the fields of a composite one level deeper.
    pub fn descend(&self) -> Result<Self, SchemaError> {
        if self.depth >= self.max_depth {
            return Err(SchemaError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}
