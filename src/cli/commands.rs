use clap::{Args, Parser, Subcommand};

use crate::model::display::DisplayMode;
use crate::model::task::{CommentId, TaskId};

#[derive(Parser)]
#[command(name = "tp", about = concat!("taskpad v", env!("CARGO_PKG_VERSION"), " - tasks, notes, comments and tags"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the end of the list
    Add(AddArgs),
    /// List tasks, incomplete first
    List(ListArgs),
    /// Show a task with its notes and comments
    Show(IdArgs),
    /// Mark a task complete, or incomplete again
    Toggle(IdArgs),
    /// Delete a task and its comments
    Rm(IdArgs),
    /// Replace a task's notes ("" clears them)
    Note(NoteArgs),
    /// Add, edit or delete comments
    Comment(CommentCmd),
    /// Manage the tag registry and task tags
    Tag(TagCmd),
    /// Set or clear the active tag filter
    Filter(FilterArgs),
    /// Switch between light and dark display
    Theme(ThemeArgs),
    /// Search task text, notes and comments by regex
    Search(SearchArgs),
    /// Validate stored data
    Check,
    /// Write all tasks and tags to a JSON file
    Export(ExportArgs),
    /// Replace all tasks and tags from a JSON file
    Import(ImportArgs),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text (max 50 characters)
    pub text: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by tag (overrides the active filter)
    #[arg(long, conflicts_with = "all")]
    pub tag: Option<String>,
    /// Ignore the active filter
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: TaskId,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Task ID
    pub id: TaskId,
    /// Note text
    pub text: String,
}

// ---------------------------------------------------------------------------
// Comment args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CommentCmd {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Add a comment to a task
    Add {
        /// Task ID
        id: TaskId,
        /// Comment text
        text: String,
    },
    /// Replace a comment's text
    Edit {
        /// Task ID
        id: TaskId,
        /// Comment ID
        comment_id: CommentId,
        /// New text
        text: String,
    },
    /// Delete a comment
    Rm {
        /// Task ID
        id: TaskId,
        /// Comment ID
        comment_id: CommentId,
    },
}

// ---------------------------------------------------------------------------
// Tag args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TagCmd {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// List registered tags
    List,
    /// Register a new tag (max 20 characters)
    Create {
        /// Tag label
        label: String,
    },
    /// Remove a tag from the registry and from every task
    Delete {
        /// Tag label
        label: String,
    },
    /// Add a registered tag to a task
    Attach {
        /// Task ID
        id: TaskId,
        /// Tag label
        label: String,
    },
    /// Remove a tag from a task
    Detach {
        /// Task ID
        id: TaskId,
        /// Tag label
        label: String,
    },
    /// Replace all of a task's tags
    Set {
        /// Task ID
        id: TaskId,
        /// Tag labels (none clears)
        labels: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// View / data args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FilterArgs {
    /// Tag to filter by
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    pub label: Option<String>,
    /// Clear the active filter
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// light or dark (omit to toggle)
    pub mode: Option<DisplayMode>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file ("-" for stdout)
    #[arg(short, long, default_value = crate::io::snapshot_io::EXPORT_FILE_NAME)]
    pub output: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file previously written by `tp export`
    pub path: String,
}
