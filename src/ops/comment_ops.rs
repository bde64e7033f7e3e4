use crate::model::task::{Comment, CommentId, Task, TaskId};
use crate::ops::task_ops::{TaskError, next_id, require_task_mut};

/// Append a comment to a task. Returns the new comment's id.
pub fn add_comment(tasks: &mut [Task], task_id: TaskId, text: &str) -> Result<CommentId, TaskError> {
    let task = require_task_mut(tasks, task_id)?;
    let id = next_id(task.comments.iter().map(|c| c.id))?;
    task.comments.push(Comment {
        id,
        text: text.to_string(),
    });
    tracing::debug!(task = task_id, comment = id, "comment added");
    Ok(id)
}

/// Replace the text of one comment in place.
pub fn edit_comment(
    tasks: &mut [Task],
    task_id: TaskId,
    comment_id: CommentId,
    text: &str,
) -> Result<(), TaskError> {
    let task = require_task_mut(tasks, task_id)?;
    let comment = task
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or(TaskError::CommentNotFound {
            task: task_id,
            comment: comment_id,
        })?;
    comment.text = text.to_string();
    Ok(())
}

/// Remove one comment. Returns the removed comment.
pub fn delete_comment(
    tasks: &mut [Task],
    task_id: TaskId,
    comment_id: CommentId,
) -> Result<Comment, TaskError> {
    let task = require_task_mut(tasks, task_id)?;
    let idx = task
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or(TaskError::CommentNotFound {
            task: task_id,
            comment: comment_id,
        })?;
    tracing::debug!(task = task_id, comment = comment_id, "comment deleted");
    Ok(task.comments.remove(idx))
}
