use chrono::Utc;

use crate::model::tags::TagRegistry;
use crate::model::task::{CommentId, MAX_TASK_TEXT, Task, TaskId};
use crate::util::unicode::grapheme_len;

/// Error type for task and comment operations.
///
/// An operation that returns an error has left the collection untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task text is empty")]
    EmptyText,
    #[error("task text is {len} characters long (max {max})")]
    TextTooLong { len: usize, max: usize },
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("comment {comment} not found on task {task}")]
    CommentNotFound { task: TaskId, comment: CommentId },
    #[error("tag '{0}' does not exist; create it first")]
    UnknownTag(String),
    #[error("no task ids left: an existing id is already at the maximum")]
    IdsExhausted,
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Fresh time-based id, strictly greater than every id in `existing`.
///
/// Fails only when an imported id already sits at `u64::MAX`.
pub fn next_id(existing: impl IntoIterator<Item = u64>) -> Result<u64, TaskError> {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    match existing.into_iter().max() {
        Some(max) if max >= now => max.checked_add(1).ok_or(TaskError::IdsExhausted),
        _ => Ok(now),
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task(tasks: &[Task], id: TaskId) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}

pub fn find_task_mut(tasks: &mut [Task], id: TaskId) -> Option<&mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

pub(crate) fn require_task_mut(tasks: &mut [Task], id: TaskId) -> Result<&mut Task, TaskError> {
    find_task_mut(tasks, id).ok_or(TaskError::NotFound(id))
}

/// Check task text against the entry rules: not blank, at most
/// [`MAX_TASK_TEXT`] characters.
pub fn validate_text(text: &str) -> Result<(), TaskError> {
    if text.trim().is_empty() {
        return Err(TaskError::EmptyText);
    }
    let len = grapheme_len(text);
    if len > MAX_TASK_TEXT {
        return Err(TaskError::TextTooLong {
            len,
            max: MAX_TASK_TEXT,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Append a new incomplete task. Returns the assigned id.
pub fn add_task(tasks: &mut Vec<Task>, text: &str) -> Result<TaskId, TaskError> {
    validate_text(text)?;
    let id = next_id(tasks.iter().map(|t| t.id))?;
    tasks.push(Task::new(id, text));
    tracing::debug!(id, "task added");
    Ok(id)
}

/// Flip `completed` on a task, then regroup the collection so incomplete
/// tasks come first. Returns the new `completed` value.
pub fn toggle_complete(tasks: &mut Vec<Task>, id: TaskId) -> Result<bool, TaskError> {
    let task = require_task_mut(tasks, id)?;
    task.completed = !task.completed;
    let completed = task.completed;
    stable_partition(tasks);
    tracing::debug!(id, completed, "task toggled");
    Ok(completed)
}

/// Reorder so every incomplete task precedes every completed one, keeping
/// the relative order inside each group.
pub fn stable_partition(tasks: &mut Vec<Task>) {
    let (incomplete, complete): (Vec<Task>, Vec<Task>) =
        std::mem::take(tasks).into_iter().partition(|t| !t.completed);
    tasks.extend(incomplete);
    tasks.extend(complete);
}

/// Remove a task (and its comments). Returns the removed task.
pub fn delete_task(tasks: &mut Vec<Task>, id: TaskId) -> Result<Task, TaskError> {
    let idx = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(TaskError::NotFound(id))?;
    tracing::debug!(id, "task deleted");
    Ok(tasks.remove(idx))
}

/// Replace a task's notes wholesale.
pub fn update_notes(tasks: &mut [Task], id: TaskId, notes: &str) -> Result<(), TaskError> {
    let task = require_task_mut(tasks, id)?;
    task.notes = notes.to_string();
    Ok(())
}

// ---------------------------------------------------------------------------
// Task tags
// ---------------------------------------------------------------------------

/// Replace a task's tag set. Duplicates collapse to their first occurrence;
/// every label must exist in the registry.
pub fn replace_tags(
    tasks: &mut [Task],
    registry: &TagRegistry,
    id: TaskId,
    labels: &[String],
) -> Result<(), TaskError> {
    if let Some(unknown) = labels.iter().find(|l| !registry.contains(l)) {
        return Err(TaskError::UnknownTag(unknown.clone()));
    }
    let task = require_task_mut(tasks, id)?;
    let mut tags: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !tags.contains(label) {
            tags.push(label.clone());
        }
    }
    task.tags = tags;
    Ok(())
}

/// Append one registered label to a task. Already-present labels are left alone.
pub fn append_tag(
    tasks: &mut [Task],
    registry: &TagRegistry,
    id: TaskId,
    label: &str,
) -> Result<(), TaskError> {
    if !registry.contains(label) {
        return Err(TaskError::UnknownTag(label.to_string()));
    }
    let task = require_task_mut(tasks, id)?;
    if !task.has_tag(label) {
        task.tags.push(label.to_string());
    }
    Ok(())
}

/// Drop one label from a task. Missing labels are a no-op.
pub fn remove_tag(tasks: &mut [Task], id: TaskId, label: &str) -> Result<(), TaskError> {
    let task = require_task_mut(tasks, id)?;
    task.tags.retain(|t| t != label);
    Ok(())
}
