//! Username sets used for authorization decisions.

use serde::Serialize;
use std::collections::BTreeSet;

/// A set of usernames.
///
/// Names are kept verbatim, so `Alice` and `alice` are distinct entries just as
/// they would be distinct lines in a list file. Iteration is sorted, which keeps
/// command output stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UsernameSet(BTreeSet<String>);

impl UsernameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single name. Returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    /// Insert every name from `names`.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True when every name in `other` is also in `self`.
    pub fn is_superset(&self, other: &UsernameSet) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl<S: Into<String>> FromIterator<S> for UsernameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for UsernameSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
