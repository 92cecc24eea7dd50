//! Permission sets and the scope expression language attached to fields.

mod expression;
mod permissions;

pub use expression::{Clause, ParseError, ScopeExpression};
pub use permissions::PermissionSet;
