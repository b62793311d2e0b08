//! Run configuration.
//!
//! One [`EvalConfig`] is built per run and handed to the pipeline; the core
//! reads no fixed paths or globals of its own.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::task::Task;

pub const DEFAULT_TASKS_DIR: &str = "evals/tasks";
pub const DEFAULT_RESULTS_DIR: &str = "evals/results";
pub const DEFAULT_MODEL: &str = "unknown";
pub const DEFAULT_SETTINGS: &str = "default";

/// Which loaded tasks a run executes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    /// Tasks whose `category` equals the suite name.
    Suite(String),
    /// The single task with this exact id.
    Task(String),
}

impl TaskFilter {
    /// Build a filter from the `--task` / `--suite` flags.
    ///
    /// `--task` wins over `--suite`; suite `all` means no filter.
    pub fn from_flags(suite: Option<&str>, task: Option<&str>) -> Self {
        match (task, suite) {
            (Some(id), _) => TaskFilter::Task(id.to_string()),
            (None, Some(name)) if name != "all" => TaskFilter::Suite(name.to_string()),
            _ => TaskFilter::All,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Suite(name) => task.category == *name,
            TaskFilter::Task(id) => task.id == *id,
        }
    }

    /// Keep the matching tasks, in their original order.
    pub fn select(&self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Directory holding task definition documents.
    pub tasks_dir: PathBuf,
    /// Directory run outputs are written to.
    pub results_dir: PathBuf,
    pub filter: TaskFilter,
    /// Previously persisted run to compare against.
    pub compare: Option<PathBuf>,
    /// Explicit results path, overriding the dated default.
    pub output: Option<PathBuf>,
    /// Model identifier recorded in the run snapshot.
    pub model: String,
    /// Settings file recorded in the run snapshot.
    pub settings: String,
    pub mcp_servers: Vec<String>,
}

impl EvalConfig {
    pub fn new(tasks_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            tasks_dir: tasks_dir.into(),
            results_dir: results_dir.into(),
            filter: TaskFilter::All,
            compare: None,
            output: None,
            model: DEFAULT_MODEL.to_string(),
            settings: DEFAULT_SETTINGS.to_string(),
            mcp_servers: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_compare(mut self, baseline: impl Into<PathBuf>) -> Self {
        self.compare = Some(baseline.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_settings(mut self, settings: impl Into<String>) -> Self {
        self.settings = settings.into();
        self
    }

    pub fn with_mcp_server(mut self, server: impl Into<String>) -> Self {
        self.mcp_servers.push(server.into());
        self
    }

    /// Snapshot recorded in the run output for the given task selection.
    pub fn snapshot(&self, selected: &[Task]) -> ConfigSnapshot {
        let (suite, task) = match &self.filter {
            TaskFilter::All => (None, None),
            TaskFilter::Suite(name) => (Some(name.clone()), None),
            TaskFilter::Task(id) => (None, Some(id.clone())),
        };
        ConfigSnapshot {
            model: self.model.clone(),
            settings: self.settings.clone(),
            mcp_servers: self.mcp_servers.clone(),
            suite,
            task,
            tasks_digest: compute_tasks_digest(selected),
        }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TASKS_DIR, DEFAULT_RESULTS_DIR)
    }
}

/// Configuration as recorded in a persisted run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub settings: String,
    #[serde(default)]
    pub mcp_servers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// SHA-256 of the ordered selected task ids.
    #[serde(default)]
    pub tasks_digest: String,
}

/// Deterministic digest of ordered task ids.
fn compute_tasks_digest(tasks: &[Task]) -> String {
    let mut hasher = Sha256::new();
    for task in tasks {
        hasher.update(task.id.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
