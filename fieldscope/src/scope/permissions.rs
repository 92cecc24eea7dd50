//! Caller-supplied permission sets.

use std::{collections::BTreeSet, fmt};

/// The set of permission names granted to the caller for one operation.
///
/// Membership is an exact, case-sensitive string match. The set is ordered
/// internally so that `Debug` output and iteration are deterministic, but the
/// ordering carries no meaning.
///
/// ```rust
/// use fieldscope::PermissionSet;
///
/// let granted = PermissionSet::from(["admin", "pii"]);
/// assert!(granted.contains("admin"));
/// assert!(!granted.contains("Admin"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PermissionSet {
    names: BTreeSet<String>,
}

impl PermissionSet {
    /// Creates an empty permission set. Only unrestricted fields are visible to it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission, returning `true` if it was not already present.
    pub fn grant(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Removes a permission, returning `true` if it was present.
    pub fn revoke(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    /// Builder-style variant of [`PermissionSet::grant`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.grant(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.names.is_subset(&other.names)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names.iter()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for PermissionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for PermissionSet {
    fn from(names: [S; N]) -> Self {
        names.into_iter().collect()
    }
}

impl<S: Into<String>> From<Vec<S>> for PermissionSet {
    fn from(names: Vec<S>) -> Self {
        names.into_iter().collect()
    }
}

impl From<&[&str]> for PermissionSet {
    fn from(names: &[&str]) -> Self {
        names.iter().copied().collect()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
