//! Task execution and scoring.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::criterion::CriterionEvaluator;
use crate::domain::error::Result;
use crate::domain::result::{TaskResult, TaskStatus};
use crate::domain::task::Task;
use crate::exec::CommandExecutor;
use crate::obs;
use crate::subject::Subject;

/// Criterion id whose outcome is mirrored into `metrics.compile_success`.
pub const COMPILE_CRITERION_ID: &str = "compile";

/// Runs one task: invokes the subject, evaluates every criterion in order,
/// and derives score and status.
#[derive(Clone)]
pub struct TaskRunner {
    evaluator: CriterionEvaluator,
    subject: Arc<dyn Subject>,
}

impl TaskRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>, subject: Arc<dyn Subject>) -> Self {
        Self {
            evaluator: CriterionEvaluator::new(executor),
            subject,
        }
    }

    /// Execute a task and return its result.
    ///
    /// Always returns a result. A failure outside criterion evaluation marks
    /// it `error`, keeping every outcome gathered so far; criteria never
    /// reached stay at fail/0.
    pub async fn run(&self, task: &Task) -> TaskResult {
        let start = Instant::now();
        obs::emit_task_started(&task.id, &task.category, self.subject.name());

        let mut result = TaskResult::pending(task);
        if let Err(e) = self.execute(task, &mut result).await {
            warn!(task_id = %task.id, error = %e, "Task execution failed");
            result.status = TaskStatus::Error;
            result.error = Some(e.to_string());
        }
        result.metrics.wall_time_sec = start.elapsed().as_secs_f64();

        obs::emit_task_finished(
            &task.id,
            result.status,
            result.score,
            result.metrics.wall_time_sec,
        );
        result
    }

    async fn execute(&self, task: &Task, result: &mut TaskResult) -> Result<()> {
        let output = self.subject.invoke(task).await?;
        result.metrics.tokens = output.usage.tokens;
        result.metrics.edits_count = output.usage.edits_count;
        result.metrics.tests_passed = output.usage.tests_passed;
        result.metrics.tests_failed = output.usage.tests_failed;

        let mut earned = 0.0;
        let mut total = 0.0;
        for criterion in &task.acceptance.criteria {
            total += criterion.weight;
            let outcome = self.evaluator.evaluate(&task.id, criterion).await;
            earned += outcome.score;
            result.outcomes.insert(criterion.id.clone(), outcome);
        }

        result.score = compute_score(earned, total);
        result.status = if result.score >= task.acceptance.min_passing_score {
            TaskStatus::Pass
        } else {
            TaskStatus::Fail
        };
        result.metrics.compile_success = result
            .outcomes
            .get(COMPILE_CRITERION_ID)
            .map(|outcome| outcome.pass);
        Ok(())
    }
}

/// `round(100 × earned / total)`, clamped to 0–100.
pub fn compute_score(earned: f64, total: f64) -> u8 {
    if total <= 0.0 {
        return 0;
    }
    (100.0 * earned / total).round().clamp(0.0, 100.0) as u8
}
