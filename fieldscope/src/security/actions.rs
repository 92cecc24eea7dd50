//! Typed pre-conditions that may veto a marshal or unmarshal.

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use thiserror::Error;

use super::SecurityContext;

/// Which way data is flowing through the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Marshal,
    Unmarshal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Marshal => "marshal",
            Self::Unmarshal => "unmarshal",
        })
    }
}

/// Result of one security action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Continue,
    Abort { reason: String },
}

impl ActionOutcome {
    pub fn abort(reason: impl Into<String>) -> Self {
        Self::Abort {
            reason: reason.into(),
        }
    }
}

/// A security action stopped the call before any data was touched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("security action `{action}` aborted {direction} of `{type_name}`: {reason}")]
pub struct SecurityActionError {
    action: String,
    type_name: &'static str,
    direction: Direction,
    reason: String,
}

impl SecurityActionError {
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

type ActionFn = dyn Fn(&dyn Any, Direction, &SecurityContext) -> ActionOutcome + Send + Sync;

struct RegisteredAction {
    name: String,
    run: Arc<ActionFn>,
}

/// Registry of security actions keyed by value type and direction.
///
/// Built once, then shared read-only. Actions for one `(type, direction)` pair
/// run in registration order; the first [`ActionOutcome::Abort`] stops the
/// call.
///
/// ```
/// use fieldscope::{ActionOutcome, Direction, SecurityActions};
///
/// struct Invoice;
///
/// let actions = SecurityActions::new().on::<Invoice, _>(
///     Direction::Marshal,
///     "require-tenant",
///     |_, _, ctx| match ctx.metadata("tenant") {
///         Some(_) => ActionOutcome::Continue,
///         None => ActionOutcome::abort("missing tenant"),
///     },
/// );
/// assert_eq!(actions.len(), 1);
/// ```
#[derive(Default)]
pub struct SecurityActions {
    actions: HashMap<(TypeId, Direction), Vec<RegisteredAction>>,
}

impl SecurityActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` for values of type `T` flowing in `direction`.
    ///
    /// On unmarshal the action sees the destination as it was before the call.
    #[must_use]
    pub fn on<T, F>(self, direction: Direction, name: impl Into<String>, action: F) -> Self
    where
        T: 'static,
        F: Fn(&T, Direction, &SecurityContext) -> ActionOutcome + Send + Sync + 'static,
    {
        self.register::<T>(direction, name.into(), typed(action))
    }

    /// Registers `action` for both directions.
    #[must_use]
    pub fn on_both<T, F>(self, name: impl Into<String>, action: F) -> Self
    where
        T: 'static,
        F: Fn(&T, Direction, &SecurityContext) -> ActionOutcome + Send + Sync + 'static,
    {
        let name = name.into();
        let run = typed(action);
        self.register::<T>(Direction::Marshal, name.clone(), Arc::clone(&run))
            .register::<T>(Direction::Unmarshal, name, run)
    }

    fn register<T: 'static>(
        mut self,
        direction: Direction,
        name: String,
        run: Arc<ActionFn>,
    ) -> Self {
        self.actions
            .entry((TypeId::of::<T>(), direction))
            .or_default()
            .push(RegisteredAction { name, run });
        self
    }

    /// Total number of registrations across all types and directions.
    pub fn len(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every action registered for `T` and `direction`, in order.
    pub(crate) fn run<T: 'static>(
        &self,
        value: &T,
        direction: Direction,
        security: &SecurityContext,
    ) -> Result<(), SecurityActionError> {
        let Some(actions) = self.actions.get(&(TypeId::of::<T>(), direction)) else {
            return Ok(());
        };
        for action in actions {
            if let ActionOutcome::Abort { reason } = (action.run)(value, direction, security) {
                crate::trace_event!(
                    action = %action.name,
                    type_name = type_name::<T>(),
                    %direction,
                    "security action aborted"
                );
                return Err(SecurityActionError {
                    action: action.name.clone(),
                    type_name: type_name::<T>(),
                    direction,
                    reason,
                });
            }
        }
        Ok(())
    }
}

fn typed<T, F>(action: F) -> Arc<ActionFn>
where
    T: 'static,
    F: Fn(&T, Direction, &SecurityContext) -> ActionOutcome + Send + Sync + 'static,
{
    Arc::new(
        move |value: &dyn Any, direction: Direction, security: &SecurityContext| {
            match value.downcast_ref::<T>() {
                Some(value) => action(value, direction, security),
                None => ActionOutcome::abort("action received a value of an unexpected type"),
            }
        },
    )
}

impl fmt::Debug for SecurityActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .actions
            .values()
            .flatten()
            .map(|action| action.name.as_str())
            .collect();
        names.sort_unstable();
        f.debug_struct("SecurityActions")
            .field("actions", &names)
            .finish()
    }
}
