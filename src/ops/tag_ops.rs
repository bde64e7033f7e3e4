use crate::model::board::Board;
use crate::model::tags::{MAX_TAG_LEN, TagRegistry};
use crate::util::unicode::grapheme_len;

/// Error type for tag registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("tag label is empty")]
    Empty,
    #[error("tag '{label}' is too long (max {max} characters)")]
    TooLong { label: String, max: usize },
    #[error("tag already exists: {0}")]
    Duplicate(String),
    #[error("tag not found: {0}")]
    NotFound(String),
}

/// Add a label to the registry.
pub fn create_tag(registry: &mut TagRegistry, label: &str) -> Result<(), TagError> {
    if label.is_empty() {
        return Err(TagError::Empty);
    }
    if grapheme_len(label) > MAX_TAG_LEN {
        return Err(TagError::TooLong {
            label: label.to_string(),
            max: MAX_TAG_LEN,
        });
    }
    if !registry.insert(label.to_string()) {
        return Err(TagError::Duplicate(label.to_string()));
    }
    tracing::debug!(label, "tag created");
    Ok(())
}

/// Remove a label from the registry and from every task that carries it.
/// Clears `selected` when it was filtering on that label.
pub fn delete_tag(
    board: &mut Board,
    label: &str,
    selected: &mut Option<String>,
) -> Result<(), TagError> {
    if !board.tags.remove(label) {
        return Err(TagError::NotFound(label.to_string()));
    }
    let mut stripped = 0usize;
    for task in &mut board.tasks {
        let before = task.tags.len();
        task.tags.retain(|t| t != label);
        if task.tags.len() != before {
            stripped += 1;
        }
    }
    if selected.as_deref() == Some(label) {
        *selected = None;
    }
    tracing::debug!(label, stripped, "tag deleted");
    Ok(())
}
