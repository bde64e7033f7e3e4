use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::board::Board;
use crate::model::tags::MAX_TAG_LEN;
use crate::model::task::{CommentId, MAX_TASK_TEXT, Task, TaskId};
use crate::util::unicode::grapheme_len;

/// Structured result from `tp check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (the board breaks an invariant the operations rely on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two or more tasks share an id
    #[serde(rename = "duplicate_task_id")]
    DuplicateTaskId { task_id: TaskId, count: usize },
    /// Two or more comments on one task share an id
    #[serde(rename = "duplicate_comment_id")]
    DuplicateCommentId { task_id: TaskId, comment_id: CommentId },
    /// A task carries a label the registry doesn't know
    #[serde(rename = "unregistered_tag")]
    UnregisteredTag { task_id: TaskId, tag: String },
    /// A task carries the same label twice
    #[serde(rename = "duplicate_task_tag")]
    DuplicateTaskTag { task_id: TaskId, tag: String },
}

/// A validation warning (data the entry rules would have rejected).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    #[serde(rename = "empty_text")]
    EmptyText { task_id: TaskId },
    #[serde(rename = "text_too_long")]
    TextTooLong { task_id: TaskId, len: usize },
    #[serde(rename = "tag_too_long")]
    TagTooLong { tag: String, len: usize },
    /// A completed task sits before an incomplete one
    #[serde(rename = "completed_before_incomplete")]
    CompletedBeforeIncomplete { task_id: TaskId },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a board and return structured results.
///
/// Read-only. Imports are accepted wholesale, so this is the place that
/// reports data the operations would never have produced.
pub fn check_board(board: &Board) -> CheckResult {
    let mut result = CheckResult::default();

    let mut id_counts: HashMap<TaskId, usize> = HashMap::new();
    for task in &board.tasks {
        *id_counts.entry(task.id).or_default() += 1;
    }
    // report in collection order, once per id
    let mut reported = HashSet::new();
    for task in &board.tasks {
        let count = id_counts[&task.id];
        if count > 1 && reported.insert(task.id) {
            result.errors.push(CheckError::DuplicateTaskId {
                task_id: task.id,
                count,
            });
        }
    }

    for task in &board.tasks {
        check_task(task, board, &mut result);
    }

    for tag in board.tags.iter() {
        let len = grapheme_len(tag);
        if len > MAX_TAG_LEN {
            result.warnings.push(CheckWarning::TagTooLong {
                tag: tag.to_string(),
                len,
            });
        }
    }

    if let Some(task_id) = misplaced_completed(&board.tasks) {
        result
            .warnings
            .push(CheckWarning::CompletedBeforeIncomplete { task_id });
    }

    result.valid = result.errors.is_empty();
    result
}

fn check_task(task: &Task, board: &Board, result: &mut CheckResult) {
    let mut comment_ids = HashSet::new();
    for comment in &task.comments {
        if !comment_ids.insert(comment.id) {
            result.errors.push(CheckError::DuplicateCommentId {
                task_id: task.id,
                comment_id: comment.id,
            });
        }
    }

    let mut seen = HashSet::new();
    for tag in &task.tags {
        if !seen.insert(tag.as_str()) {
            result.errors.push(CheckError::DuplicateTaskTag {
                task_id: task.id,
                tag: tag.clone(),
            });
        } else if !board.tags.contains(tag) {
            result.errors.push(CheckError::UnregisteredTag {
                task_id: task.id,
                tag: tag.clone(),
            });
        }
    }

    if task.text.trim().is_empty() {
        result.warnings.push(CheckWarning::EmptyText { task_id: task.id });
    } else {
        let len = grapheme_len(&task.text);
        if len > MAX_TASK_TEXT {
            result.warnings.push(CheckWarning::TextTooLong {
                task_id: task.id,
                len,
            });
        }
    }
}

/// First completed task that has an incomplete task somewhere after it.
fn misplaced_completed(tasks: &[Task]) -> Option<TaskId> {
    let last_incomplete = tasks.iter().rposition(|t| !t.completed)?;
    tasks[..last_incomplete]
        .iter()
        .find(|t| t.completed)
        .map(|t| t.id)
}
