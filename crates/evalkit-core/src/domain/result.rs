//! Per-task execution results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::task::Task;

/// Lifecycle status of a task result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Pass,
    Fail,
    Error,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Pass => write!(f, "pass"),
            TaskStatus::Fail => write!(f, "fail"),
            TaskStatus::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one acceptance criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub pass: bool,
    /// Weight earned: the criterion's weight when passed, 0 otherwise.
    pub score: f64,
    /// Set for criteria without a check command.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub manual_review: bool,
    /// Why the check failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CriterionOutcome {
    pub fn passed(weight: f64) -> Self {
        Self {
            pass: true,
            score: weight,
            manual_review: false,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            pass: false,
            score: 0.0,
            manual_review: false,
            error: Some(reason.into()),
        }
    }

    pub fn manual() -> Self {
        Self {
            pass: false,
            score: 0.0,
            manual_review: true,
            error: None,
        }
    }

    /// Placeholder for a criterion that was never evaluated.
    pub fn not_evaluated() -> Self {
        Self::default()
    }
}

/// Usage and timing metrics for a task result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    #[serde(default, alias = "tokens_used")]
    pub tokens: u64,
    #[serde(default)]
    pub wall_time_sec: f64,
    #[serde(default)]
    pub edits_count: u64,
    #[serde(default)]
    pub tests_passed: u64,
    #[serde(default)]
    pub tests_failed: u64,
    /// Outcome of the task's `compile` criterion, if it has one.
    #[serde(default)]
    pub compile_success: Option<bool>,
}

/// Result of executing one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(rename = "id")]
    pub task_id: String,
    pub status: TaskStatus,
    /// 0–100.
    pub score: u8,
    /// Exactly one entry per criterion of the task.
    #[serde(rename = "acceptance", default)]
    pub outcomes: BTreeMap<String, CriterionOutcome>,
    #[serde(default)]
    pub metrics: TaskMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    /// Fresh pending result with every criterion defaulted to fail/0.
    pub fn pending(task: &Task) -> Self {
        let outcomes = task
            .acceptance
            .criteria
            .iter()
            .map(|c| (c.id.clone(), CriterionOutcome::not_evaluated()))
            .collect();
        Self {
            task_id: task.id.clone(),
            status: TaskStatus::Pending,
            score: 0,
            outcomes,
            metrics: TaskMetrics::default(),
            error: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == TaskStatus::Pass
    }

    /// Criteria flagged for a human reviewer.
    pub fn manual_criteria(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.manual_review)
            .map(|(id, _)| id.as_str())
    }
}
