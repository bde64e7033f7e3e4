use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::model::task::{CommentId, Task, TaskId};

/// Tasks visible under the active tag filter. `None` or an empty label
/// means no filter.
pub fn visible_tasks<'a>(tasks: &'a [Task], selected_tag: Option<&str>) -> Vec<&'a Task> {
    match selected_tag {
        Some(tag) if !tag.is_empty() => tasks.iter().filter(|t| t.has_tag(tag)).collect(),
        _ => tasks.iter().collect(),
    }
}

/// Tasks split for two-section display, each side in input order
#[derive(Debug, Default, Serialize)]
pub struct Partitioned<'a> {
    pub incomplete: Vec<&'a Task>,
    pub complete: Vec<&'a Task>,
}

impl Partitioned<'_> {
    pub fn len(&self) -> usize {
        self.incomplete.len() + self.complete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn partition<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Partitioned<'a> {
    let (complete, incomplete) = tasks.into_iter().partition(|t| t.completed);
    Partitioned {
        incomplete,
        complete,
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Which part of a task matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Text,
    Notes,
    Comment,
}

/// A search hit inside one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub task_id: TaskId,
    pub field: MatchField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
    /// Byte ranges of the matches within the field
    #[serde(skip)]
    pub spans: Vec<Range<usize>>,
}

fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search task text, notes, and comments, in collection order.
pub fn search_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for task in tasks {
        let mut push = |field, comment_id, text: &str| {
            let spans = find_matches(re, text);
            if !spans.is_empty() {
                hits.push(SearchHit {
                    task_id: task.id,
                    field,
                    comment_id,
                    spans,
                });
            }
        };
        push(MatchField::Text, None, &task.text);
        push(MatchField::Notes, None, &task.notes);
        for comment in &task.comments {
            push(MatchField::Comment, Some(comment.id), &comment.text);
        }
    }
    hits
}
