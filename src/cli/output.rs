use crossterm::style::{Color, Stylize, style};
use serde::Serialize;

use crate::model::display::DisplayMode;
use crate::model::task::Task;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::view::{MatchField, Partitioned, SearchHit};
use crate::util::unicode::{first_line_preview, truncate_to_width};

/// Width of the note preview in list output
const NOTE_PREVIEW_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// Display mode binding
// ---------------------------------------------------------------------------

/// Colors for one display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: Color,
    pub id: Color,
    pub tag: Color,
    pub done: Color,
    pub dim: Color,
    pub warn: Color,
}

impl Palette {
    /// The one place a display mode turns into concrete colors.
    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Light => Palette {
                heading: Color::DarkBlue,
                id: Color::DarkMagenta,
                tag: Color::DarkCyan,
                done: Color::DarkGrey,
                dim: Color::DarkGrey,
                warn: Color::DarkRed,
            },
            DisplayMode::Dark => Palette {
                heading: Color::Cyan,
                id: Color::Magenta,
                tag: Color::Blue,
                done: Color::Grey,
                dim: Color::Grey,
                warn: Color::Red,
            },
        }
    }
}

/// Applies a palette, or nothing when color is off
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    palette: Palette,
    color: bool,
}

impl Painter {
    pub fn new(mode: DisplayMode, color: bool) -> Self {
        Painter {
            palette: Palette::for_mode(mode),
            color,
        }
    }

    /// No escapes at all, for tests and piped output
    pub fn plain() -> Self {
        Painter::new(DisplayMode::default(), false)
    }

    fn fg(&self, s: &str, color: Color) -> String {
        if self.color {
            style(s).with(color).to_string()
        } else {
            s.to_string()
        }
    }

    fn heading(&self, s: &str) -> String {
        if self.color {
            style(s).with(self.palette.heading).bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn struck(&self, s: &str) -> String {
        if self.color {
            style(s).with(self.palette.done).crossed_out().to_string()
        } else {
            s.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub filter: Option<&'a str>,
    #[serde(flatten)]
    pub tasks: &'a Partitioned<'a>,
}

#[derive(Serialize)]
pub struct SearchHitJson<'a> {
    #[serde(flatten)]
    pub hit: &'a SearchHit,
    pub text: &'a str,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

fn format_tags(task: &Task, p: &Painter) -> String {
    task.tags
        .iter()
        .map(|t| format!(" {}", p.fg(&format!("#{}", t), p.palette.tag)))
        .collect()
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, p: &Painter) -> String {
    let text = if task.completed {
        p.struck(&task.text)
    } else {
        task.text.clone()
    };
    let mut line = format!(
        "{} {} {}{}",
        checkbox(task),
        p.fg(&task.id.to_string(), p.palette.id),
        text,
        format_tags(task, p)
    );
    if !task.notes.is_empty() {
        let preview = first_line_preview(&task.notes, NOTE_PREVIEW_WIDTH);
        line.push_str(&p.fg(&format!("  notes: {}", preview), p.palette.dim));
    }
    match task.comments.len() {
        0 => {}
        1 => line.push_str(&p.fg("  (1 comment)", p.palette.dim)),
        n => line.push_str(&p.fg(&format!("  ({} comments)", n), p.palette.dim)),
    }
    line
}

/// Format the two-section task list
pub fn format_task_list(view: &Partitioned<'_>, filter: Option<&str>, p: &Painter) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(tag) = filter {
        lines.push(p.fg(&format!("filter: #{}", tag), p.palette.dim));
    }
    if view.is_empty() {
        lines.push("No tasks.".to_string());
        return lines;
    }
    lines.push(p.heading("To-do"));
    for task in &view.incomplete {
        lines.push(format!("  {}", format_task_line(task, p)));
    }
    if !view.complete.is_empty() {
        lines.push(p.heading("Finished Tasks"));
        for task in &view.complete {
            lines.push(format!("  {}", format_task_line(task, p)));
        }
    }
    lines
}

/// Format the detail view of one task
pub fn format_task_detail(task: &Task, p: &Painter) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} {}",
        checkbox(task),
        p.fg(&task.id.to_string(), p.palette.id),
        task.text
    )];

    if !task.tags.is_empty() {
        lines.push(format!("tags:{}", format_tags(task, p)));
    }

    if !task.notes.is_empty() {
        lines.push(p.heading("notes:"));
        for line in task.notes.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if !task.comments.is_empty() {
        lines.push(p.heading("comments:"));
        for comment in &task.comments {
            let mut body = comment.text.lines();
            let first = body.next().unwrap_or("");
            lines.push(format!(
                "  {}  {}",
                p.fg(&comment.id.to_string(), p.palette.id),
                first
            ));
            for rest in body {
                lines.push(format!("  {}  {}", " ".repeat(comment.id.to_string().len()), rest));
            }
        }
    }

    lines
}

/// Format the tag registry, marking the active filter
pub fn format_tag_list<'a>(
    tags: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
    p: &Painter,
) -> Vec<String> {
    tags.map(|t| {
        let marker = if Some(t) == selected { "*" } else { " " };
        format!("{} {}", marker, p.fg(t, p.palette.tag))
    })
    .collect()
}

/// Format one search hit with the matching field's text
pub fn format_search_hit(hit: &SearchHit, text: &str, p: &Painter) -> String {
    let field = match (hit.field, hit.comment_id) {
        (MatchField::Comment, Some(id)) => format!("comment {}", id),
        (MatchField::Text, _) => "text".to_string(),
        (MatchField::Notes, _) => "notes".to_string(),
        (MatchField::Comment, None) => "comment".to_string(),
    };
    format!(
        "{} {}: {}",
        p.fg(&hit.task_id.to_string(), p.palette.id),
        p.fg(&field, p.palette.dim),
        truncate_to_width(first_line_of(text), 60)
    )
}

fn first_line_of(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Format check results
pub fn format_check(result: &CheckResult, p: &Painter) -> Vec<String> {
    let mut lines = Vec::new();
    for err in &result.errors {
        let msg = match err {
            CheckError::DuplicateTaskId { task_id, count } => {
                format!("task id {} is used by {} tasks", task_id, count)
            }
            CheckError::DuplicateCommentId {
                task_id,
                comment_id,
            } => format!("task {}: comment id {} is used twice", task_id, comment_id),
            CheckError::UnregisteredTag { task_id, tag } => {
                format!("task {}: tag '{}' is not in the registry", task_id, tag)
            }
            CheckError::DuplicateTaskTag { task_id, tag } => {
                format!("task {}: tag '{}' appears more than once", task_id, tag)
            }
        };
        lines.push(format!("{} {}", p.fg("error:", p.palette.warn), msg));
    }
    for warning in &result.warnings {
        let msg = match warning {
            CheckWarning::EmptyText { task_id } => format!("task {}: text is empty", task_id),
            CheckWarning::TextTooLong { task_id, len } => {
                format!("task {}: text is {} characters long", task_id, len)
            }
            CheckWarning::TagTooLong { tag, len } => {
                format!("tag '{}' is {} characters long", tag, len)
            }
            CheckWarning::CompletedBeforeIncomplete { task_id } => {
                format!("task {}: completed task listed before incomplete ones", task_id)
            }
        };
        lines.push(format!("warning: {}", msg));
    }
    if result.errors.is_empty() && result.warnings.is_empty() {
        lines.push("ok".to_string());
    }
    lines
}
