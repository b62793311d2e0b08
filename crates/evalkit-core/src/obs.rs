//! Structured observability hooks for evaluation run lifecycle events.
//!
//! This module provides:
//! - A run-scoped tracing span via `run_span`
//! - Emission functions for run, task, criterion, persistence and baseline events
//!
//! Events are emitted at `info!` level (`debug!` for per-criterion events);
//! filtering is controlled by `EVALKIT_LOG` / `RUST_LOG`.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::result::TaskStatus;

/// Span tagging every event of one run with its `run_id`.
///
/// # Example
///
/// ```ignore
/// use tracing::Instrument;
/// async { /* run tasks */ }.instrument(run_span(&run_id)).await;
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("evalkit.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, task_count: usize) {
    info!(event = "run.started", run_id = %run_id, task_count = task_count);
}

pub fn emit_run_finished(run_id: &str, total: usize, passed: usize, pass_rate: f64) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        total = total,
        passed = passed,
        pass_rate = pass_rate,
    );
}

pub fn emit_task_started(task_id: &str, category: &str, subject: &str) {
    info!(event = "task.started", task_id = %task_id, category = %category, subject = %subject);
}

pub fn emit_task_finished(task_id: &str, status: TaskStatus, score: u8, wall_time_sec: f64) {
    info!(
        event = "task.finished",
        task_id = %task_id,
        status = %status,
        score = score,
        wall_time_sec = wall_time_sec,
    );
}

pub fn emit_criterion_evaluated(task_id: &str, criterion_id: &str, passed: bool, manual: bool) {
    debug!(
        event = "criterion.evaluated",
        task_id = %task_id,
        criterion_id = %criterion_id,
        passed = passed,
        manual = manual,
    );
}

pub fn emit_results_persisted(path: &Path) {
    info!(event = "results.persisted", path = %path.display());
}

pub fn emit_baseline_compared(baseline_run_id: &str, pass_rate_delta: f64, regressions: usize) {
    info!(
        event = "baseline.compared",
        baseline_run_id = %baseline_run_id,
        pass_rate_delta = pass_rate_delta,
        regressions = regressions,
    );
}

/// Emit event: baseline could not be read (warning level).
pub fn emit_baseline_unavailable(path: &Path, error: &dyn std::fmt::Display) {
    warn!(event = "baseline.unavailable", path = %path.display(), error = %error);
}
