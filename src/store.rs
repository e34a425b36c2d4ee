//! Task snapshot persistence.
//!
//! The engine performs no I/O. A host loads a snapshot through a
//! [`TaskStore`] before each poll and saves the updated snapshot after.

use crate::error::{EngineError, Result};
use crate::ordering::normalize_sort_order;
use crate::task::{Task, TasksFile};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Load/save collaborator for the full task list.
pub trait TaskStore: Send + Sync {
    /// Load the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&self) -> Result<Vec<Task>>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryStore {
    /// Create a store holding `tasks`.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    /// Copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<Vec<Task>> {
        Ok(self.snapshot())
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        *self.tasks.lock().unwrap_or_else(|e| e.into_inner()) = tasks.to_vec();
        Ok(())
    }
}

/// JSON file store writing a [`TasksFile`] envelope.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. Nothing is read until [`TaskStore::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default tasks file location.
    #[must_use]
    pub fn at_default_path() -> Self {
        Self::new(crate::paths::tasks_file())
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Task>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no tasks file, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(EngineError::Store(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let file: TasksFile = serde_json::from_slice(&bytes)
            .map_err(|e| EngineError::Store(format!("cannot parse {}: {e}", self.path.display())))?;
        if file.schema_version > SCHEMA_VERSION {
            return Err(EngineError::Store(format!(
                "{} has schema version {}, newest supported is {SCHEMA_VERSION}",
                self.path.display(),
                file.schema_version
            )));
        }

        let mut tasks = file.tasks;
        normalize_sort_order(&mut tasks);
        debug!(path = %self.path.display(), count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = TasksFile {
            schema_version: SCHEMA_VERSION,
            tasks: tasks.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| EngineError::Store(format!("cannot serialize tasks: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::task::{ReminderConfig, ReminderKind, RepeatRule};

    fn sample() -> Vec<Task> {
        let mut a = Task::new("a", "Water plants", 2_000, 1_000);
        a.reminder = ReminderConfig {
            kind: ReminderKind::Forced,
            remind_at: Some(1_900),
            ..ReminderConfig::default()
        };
        a.repeat = RepeatRule::Daily { workday_only: true };
        a.tags = vec!["home".into()];
        vec![a, Task::new("b", "Pay rent", 3_000, 1_001)]
    }

    #[test]
    fn memory_store_replaces_snapshot() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_empty());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tasks.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn json_store_persists_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");
        let store = JsonFileStore::new(&path);
        store.save(&sample()).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), sample());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 1);
        assert_eq!(raw["tasks"][0]["repeat"]["type"], "daily");
    }

    #[test]
    fn legacy_file_gets_sort_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(
            &path,
            r#"{"tasks":[{"id":"x","title":"Old","due_at":10,"created_at":7,"updated_at":7}]}"#,
        )
        .unwrap();

        let tasks = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].sort_order, 7_000);
        assert_eq!(tasks[0].quadrant, 1);
        assert_eq!(tasks[0].reminder.kind, ReminderKind::None);
    }

    #[test]
    fn rejects_newer_schema_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let store = JsonFileStore::new(&path);

        std::fs::write(&path, r#"{"schema_version":99,"tasks":[]}"#).unwrap();
        assert!(matches!(store.load(), Err(EngineError::Store(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(store.load(), Err(EngineError::Store(_))));
    }
}
