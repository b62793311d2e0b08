//! Durable run output storage.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::aggregate::Summary;
use crate::config::ConfigSnapshot;
use crate::domain::error::{EvalError, Result};
use crate::domain::result::TaskResult;

/// Everything recorded about one run. Written once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// RFC 3339 timestamp of the run start.
    pub run_id: String,
    #[serde(default)]
    pub config: ConfigSnapshot,
    #[serde(default)]
    pub tasks: Vec<TaskResult>,
    #[serde(default)]
    pub summary: Summary,
}

/// Filesystem store for run outputs.
///
/// Layout: `<results_dir>/<YYYY-MM-DD>.json`, unless the caller passes an
/// explicit path.
pub struct ResultStore {
    results_dir: PathBuf,
}

impl ResultStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Default location for a run started on `date`.
    pub fn default_path(&self, date: NaiveDate) -> PathBuf {
        self.results_dir
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /// Write `output` and return the path it landed at.
    ///
    /// Readers never see a partial file under the final name: the JSON is
    /// written to a temp file in the target directory, then renamed.
    pub fn persist(
        &self,
        output: &RunOutput,
        date: NaiveDate,
        path_override: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = match path_override {
            Some(p) => p.to_path_buf(),
            None => self.default_path(date),
        };
        let content = serde_json::to_string_pretty(output)?;

        write_atomic(&path, content.as_bytes()).map_err(|source| EvalError::Persistence {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a previously persisted run output.
pub fn read_run_output(path: &Path) -> Result<RunOutput> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
