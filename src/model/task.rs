use serde::{Deserialize, Serialize};

/// Maximum task text length, in grapheme clusters
pub const MAX_TASK_TEXT: usize = 50;

/// Task identifier: milliseconds since the epoch at creation time
pub type TaskId = u64;

/// Comment identifier, same scheme as [`TaskId`]
pub type CommentId = u64;

/// A free-text annotation owned by exactly one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
}

/// A trackable unit of work.
///
/// Field names and shapes are the persisted JSON layout, so they must not be
/// renamed. Everything but `id` and `text` is optional on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: String,
    /// Comments in insertion order
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Tag labels, ordered, no duplicates
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// Create an incomplete task with no notes, comments, or tags
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Task {
            id,
            text: text.into(),
            completed: false,
            notes: String::new(),
            comments: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, label: &str) -> bool {
        self.tags.iter().any(|t| t == label)
    }

    pub fn find_comment(&self, comment_id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}
