//! Run-level aggregation of task results.

use serde::{Deserialize, Serialize};

use crate::domain::error::{EvalError, Result};
use crate::domain::result::{TaskResult, TaskStatus};

/// Aggregate statistics for one run.
///
/// # Invariants
///
/// Derived from the run's results by [`Summary::from_results`]; counts sum
/// to `total_tasks` and `pass_rate == passed / total_tasks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_tasks: usize,
    #[serde(default)]
    pub passed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub errors: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub pending: usize,
    /// 0.0–1.0.
    #[serde(default)]
    pub pass_rate: f64,
    #[serde(default)]
    pub avg_tokens: f64,
    #[serde(default)]
    pub avg_time_sec: f64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_time_sec: f64,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Summary {
    /// Summarize a non-empty sequence of results.
    pub fn from_results(results: &[TaskResult]) -> Result<Self> {
        if results.is_empty() {
            return Err(EvalError::EmptyRun);
        }

        let mut summary = Summary {
            total_tasks: results.len(),
            ..Summary::default()
        };
        for result in results {
            match result.status {
                TaskStatus::Pass => summary.passed += 1,
                TaskStatus::Fail => summary.failed += 1,
                TaskStatus::Error => summary.errors += 1,
                TaskStatus::Pending => summary.pending += 1,
            }
            summary.total_tokens += result.metrics.tokens;
            summary.total_time_sec += result.metrics.wall_time_sec;
        }

        let total = summary.total_tasks as f64;
        summary.pass_rate = summary.passed as f64 / total;
        summary.avg_tokens = summary.total_tokens as f64 / total;
        summary.avg_time_sec = summary.total_time_sec / total;
        Ok(summary)
    }

    /// Whether every task in the run passed.
    pub fn all_passed(&self) -> bool {
        self.total_tasks > 0 && self.passed == self.total_tasks
    }
}
