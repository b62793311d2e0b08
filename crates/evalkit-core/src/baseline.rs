//! Baseline comparison and regression detection.
//!
//! A baseline is any previously persisted run output. Only the fields the
//! comparison needs are read, so result files from older versions still
//! work as long as they carry `tasks[].id`, `tasks[].status` and `summary`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::Summary;
use crate::domain::error::{EvalError, Result};
use crate::domain::result::{TaskResult, TaskStatus};
use crate::obs;

/// Task entry of a baseline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BaselineTask {
    pub id: String,
    #[serde(default)]
    pub status: TaskStatus,
}

/// The parts of a persisted run used for comparison.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Baseline {
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub tasks: Vec<BaselineTask>,
    pub summary: Summary,
}

impl Baseline {
    /// Read a baseline file. Any failure is reported as
    /// [`EvalError::BaselineUnavailable`].
    pub fn load(path: &Path) -> Result<Self> {
        let unavailable = |reason: String| EvalError::BaselineUnavailable {
            path: path.to_path_buf(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| unavailable(format!("malformed baseline: {e}")))
    }
}

/// Current run measured against a baseline. Deltas are current − baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline_run_id: String,
    pub pass_rate: f64,
    pub pass_rate_delta: f64,
    pub avg_tokens: f64,
    pub avg_tokens_delta: f64,
    pub avg_time_sec: f64,
    pub avg_time_sec_delta: f64,
    /// Tasks that passed in the baseline and do not pass now, in current-run
    /// order. Tasks missing from either run never appear here.
    pub regressions: Vec<String>,
}

impl Comparison {
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

/// Compare current results against a loaded baseline.
pub fn compare(results: &[TaskResult], summary: &Summary, baseline: &Baseline) -> Comparison {
    let baseline_status: HashMap<&str, TaskStatus> = baseline
        .tasks
        .iter()
        .map(|t| (t.id.as_str(), t.status))
        .collect();

    let regressions = results
        .iter()
        .filter(|r| {
            baseline_status.get(r.task_id.as_str()) == Some(&TaskStatus::Pass) && !r.is_pass()
        })
        .map(|r| r.task_id.clone())
        .collect();

    Comparison {
        baseline_run_id: baseline.run_id.clone(),
        pass_rate: summary.pass_rate,
        pass_rate_delta: summary.pass_rate - baseline.summary.pass_rate,
        avg_tokens: summary.avg_tokens,
        avg_tokens_delta: summary.avg_tokens - baseline.summary.avg_tokens,
        avg_time_sec: summary.avg_time_sec,
        avg_time_sec_delta: summary.avg_time_sec - baseline.summary.avg_time_sec,
        regressions,
    }
}

/// Load the baseline at `path`; `None` when it cannot be read.
///
/// An unreadable baseline is logged as a warning and never fails the run.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    match Baseline::load(path) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            obs::emit_baseline_unavailable(path, &e);
            None
        }
    }
}
