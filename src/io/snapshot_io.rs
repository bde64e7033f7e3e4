use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::store::{KeyValueStore, StoreError, atomic_write};
use crate::model::board::Board;
use crate::model::config::StorageConfig;

/// Store key holding the JSON array of tasks
pub const TASKS_KEY: &str = "todos";
/// Store key holding the JSON array of tag labels
pub const TAGS_KEY: &str = "tags";
/// Default file name for exports
pub const EXPORT_FILE_NAME: &str = "tasks.json";

/// Error type for snapshot persistence
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not parse snapshot: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("could not serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether an empty collection may overwrite a saved one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavePolicy {
    /// Leave the stored entry alone when the collection is empty
    #[default]
    SkipEmpty,
    /// Always write, including `[]`
    Always,
    /// Drop the stored entry when the collection is empty, so a reload sees
    /// it empty too
    ClearEmpty,
}

impl SavePolicy {
    /// The policy for a change that may empty a collection on purpose
    /// (deleting the last task or tag, importing a document). Without it the
    /// emptied collection would come back on the next load.
    pub fn clearing(self) -> Self {
        match self {
            SavePolicy::SkipEmpty => SavePolicy::ClearEmpty,
            other => other,
        }
    }
}

impl From<&StorageConfig> for SavePolicy {
    fn from(config: &StorageConfig) -> Self {
        if config.save_empty {
            SavePolicy::Always
        } else {
            SavePolicy::SkipEmpty
        }
    }
}

/// Which entries a save actually wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub tasks_written: bool,
    pub tags_written: bool,
}

// ---------------------------------------------------------------------------
// Local store snapshot
// ---------------------------------------------------------------------------

/// Write tasks and tags under their two keys, subject to `policy`.
pub fn save_snapshot(
    store: &mut dyn KeyValueStore,
    board: &Board,
    policy: SavePolicy,
) -> Result<SaveReport, PersistError> {
    let report = SaveReport {
        tasks_written: save_entry(store, TASKS_KEY, &board.tasks, board.tasks.is_empty(), policy)?,
        tags_written: save_entry(store, TAGS_KEY, &board.tags, board.tags.is_empty(), policy)?,
    };

    tracing::debug!(
        tasks = board.tasks.len(),
        tags = board.tags.len(),
        tasks_written = report.tasks_written,
        tags_written = report.tags_written,
        "snapshot saved"
    );
    Ok(report)
}

/// Returns whether the stored entry was touched.
fn save_entry<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
    empty: bool,
    policy: SavePolicy,
) -> Result<bool, PersistError> {
    match (empty, policy) {
        (true, SavePolicy::SkipEmpty) => Ok(false),
        (true, SavePolicy::ClearEmpty) => {
            store.remove(key)?;
            Ok(true)
        }
        _ => {
            let json = serde_json::to_string(value).map_err(PersistError::Serialize)?;
            store.set(key, &json)?;
            Ok(true)
        }
    }
}

/// Read tasks and tags from the store. Never fails: a missing, unreadable,
/// or malformed entry loads as an empty collection.
pub fn load_snapshot(store: &dyn KeyValueStore) -> Board {
    Board {
        tasks: load_entry(store, TASKS_KEY),
        tags: load_entry(store, TAGS_KEY),
    }
}

fn load_entry<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read stored entry, starting empty");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored entry is not valid JSON, starting empty");
            T::default()
        }
    }
}

// ---------------------------------------------------------------------------
// File export / import
// ---------------------------------------------------------------------------

/// Serialize a board as a `{"tasks": [...], "tags": [...]}` document.
pub fn export_document(board: &Board) -> Result<String, PersistError> {
    let mut json = serde_json::to_string_pretty(board).map_err(PersistError::Serialize)?;
    json.push('\n');
    Ok(json)
}

/// Write an export document to `path`, replacing any existing file in one
/// step.
pub fn export_to_file(board: &Board, path: &Path) -> Result<(), PersistError> {
    let doc = export_document(board)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    atomic_write(dir, path, doc.as_bytes()).map_err(|e| PersistError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), tasks = board.tasks.len(), "exported");
    Ok(())
}

/// Parse an export document. Missing or null `tasks` / `tags` become empty;
/// anything that isn't such a document is a [`PersistError::Parse`].
pub fn import_document(contents: &str) -> Result<Board, PersistError> {
    serde_json::from_str(contents).map_err(PersistError::Parse)
}

pub fn import_from_file(path: &Path) -> Result<Board, PersistError> {
    let contents = fs::read_to_string(path).map_err(|e| PersistError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let board = import_document(&contents)?;
    tracing::debug!(path = %path.display(), tasks = board.tasks.len(), "imported");
    Ok(board)
}
