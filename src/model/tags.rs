use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Maximum tag label length, in grapheme clusters
pub const MAX_TAG_LEN: usize = 20;

/// The shared tag vocabulary.
///
/// Labels are unique (case-sensitive) and kept in insertion order for display.
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagRegistry {
    labels: IndexSet<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }

    /// Append a label. Returns false if it was already present.
    pub(crate) fn insert(&mut self, label: String) -> bool {
        self.labels.insert(label)
    }

    /// Remove a label, keeping the order of the rest.
    pub(crate) fn remove(&mut self, label: &str) -> bool {
        self.labels.shift_remove(label)
    }
}

impl<S: Into<String>> FromIterator<S> for TagRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TagRegistry {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}
