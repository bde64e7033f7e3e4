use serde::{Deserialize, Deserializer, Serialize};

use crate::model::tags::TagRegistry;
use crate::model::task::Task;

/// All tasks plus the tag registry: the unit that gets saved, exported, and
/// imported.
///
/// Serialized as `{"tasks": [...], "tags": [...]}`. Either field may be
/// missing or `null` on input and then defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: TagRegistry,
}

impl Board {
    pub fn new(tasks: Vec<Task>, tags: TagRegistry) -> Self {
        Board { tasks, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.tags.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
