//! Task definition loading.
//!
//! Reads every `*.yaml` / `*.yml` document in a directory, in file-name
//! order, and validates each into a [`Task`]. A bad document costs only
//! itself: its [`ValidationError`] is collected and loading continues.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::error::{Result, ValidationError};
use crate::domain::task::{Task, TaskDocument};

/// Outcome of loading a task directory.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Valid tasks, in file-name order.
    pub tasks: Vec<Task>,
    /// One entry per rejected document.
    pub errors: Vec<ValidationError>,
}

/// Loads task definitions from a directory.
pub struct TaskLoader {
    tasks_dir: PathBuf,
}

impl TaskLoader {
    pub fn new(tasks_dir: impl Into<PathBuf>) -> Self {
        Self {
            tasks_dir: tasks_dir.into(),
        }
    }

    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }

    /// Load and validate every task document in the directory.
    ///
    /// Fails only when the directory itself cannot be listed.
    pub fn load(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let mut seen_ids = HashSet::new();

        for path in self.task_files()? {
            match load_task_file(&path) {
                Ok(task) if !seen_ids.insert(task.id.clone()) => {
                    let err = ValidationError::new(&path, format!("duplicate task id `{}`", task.id));
                    warn!(file = %path.display(), error = %err.reason, "Skipping task definition");
                    report.errors.push(err);
                }
                Ok(task) => {
                    debug!(task_id = %task.id, file = %path.display(), "Loaded task");
                    report.tasks.push(task);
                }
                Err(err) => {
                    warn!(file = %path.display(), error = %err.reason, "Skipping task definition");
                    report.errors.push(err);
                }
            }
        }

        Ok(report)
    }

    fn task_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.tasks_dir)? {
            let path = entry?.path();
            if path.is_file() && is_task_document(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_task_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read, parse and validate one task document.
pub fn load_task_file(path: &Path) -> std::result::Result<Task, ValidationError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ValidationError::new(path, format!("cannot read file: {e}")))?;
    let doc: TaskDocument = serde_yaml::from_str(&content)
        .map_err(|e| ValidationError::new(path, format!("malformed document: {e}")))?;
    Task::from_document(path, doc)
}
