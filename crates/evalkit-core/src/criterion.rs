//! Single-criterion evaluation.

use std::sync::Arc;

use crate::domain::result::CriterionOutcome;
use crate::domain::task::Criterion;
use crate::exec::CommandExecutor;
use crate::obs;

/// Evaluates acceptance criteria through a [`CommandExecutor`].
///
/// Never returns an error: a check that exits nonzero, cannot be spawned,
/// or does not exist becomes a failing outcome, and a criterion without a
/// check becomes a failing outcome flagged for manual review.
#[derive(Clone)]
pub struct CriterionEvaluator {
    executor: Arc<dyn CommandExecutor>,
}

impl CriterionEvaluator {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    pub async fn evaluate(&self, task_id: &str, criterion: &Criterion) -> CriterionOutcome {
        let Some(check) = criterion.check.as_deref() else {
            obs::emit_criterion_evaluated(task_id, &criterion.id, false, true);
            return CriterionOutcome::manual();
        };

        let outcome = match self.executor.execute(check).await {
            Ok(exit) if exit.success() => CriterionOutcome::passed(criterion.weight),
            Ok(exit) => match exit.code {
                Some(code) => CriterionOutcome::failed(format!("check exited with code {code}")),
                None => CriterionOutcome::failed("check terminated by signal"),
            },
            Err(e) => CriterionOutcome::failed(format!("check could not be run: {e}")),
        };

        obs::emit_criterion_evaluated(task_id, &criterion.id, outcome.pass, false);
        outcome
    }
}
