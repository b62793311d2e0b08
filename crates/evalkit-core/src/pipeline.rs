//! Sequential evaluation pipeline.
//!
//! ```text
//! TaskLoader → select → TaskRunner (per task, in order) → Summary
//!     → load baseline → ResultStore → baseline comparison
//! ```
//!
//! Tasks run strictly one after another: check commands share the working
//! tree, so two tasks must never run at the same time against it.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::Instrument;

use crate::aggregate::Summary;
use crate::baseline::{compare, load_baseline, Baseline, Comparison};
use crate::config::EvalConfig;
use crate::domain::error::{EvalError, Result, ValidationError};
use crate::domain::result::TaskResult;
use crate::domain::task::Task;
use crate::exec::CommandExecutor;
use crate::loader::TaskLoader;
use crate::obs;
use crate::runner::TaskRunner;
use crate::store::{ResultStore, RunOutput};
use crate::subject::Subject;

/// Tasks chosen for a run, plus the documents rejected while loading.
#[derive(Debug, Clone)]
pub struct Selection {
    pub tasks: Vec<Task>,
    pub load_errors: Vec<ValidationError>,
}

/// A finished run, not yet persisted.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub started_at: DateTime<Utc>,
    pub output: RunOutput,
}

impl CompletedRun {
    pub fn summary(&self) -> &Summary {
        &self.output.summary
    }

    pub fn results(&self) -> &[TaskResult] {
        &self.output.tasks
    }

    /// Process exit code: 0 only when every selected task passed.
    pub fn exit_code(&self) -> u8 {
        if self.output.summary.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Wires configuration, command execution and the subject into a run.
pub struct EvalPipeline {
    config: EvalConfig,
    runner: TaskRunner,
}

impl EvalPipeline {
    pub fn new(
        config: EvalConfig,
        executor: Arc<dyn CommandExecutor>,
        subject: Arc<dyn Subject>,
    ) -> Self {
        Self {
            config,
            runner: TaskRunner::new(executor, subject),
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Load the task directory and apply the configured filter.
    ///
    /// Returns [`EvalError::NoTasksSelected`] when nothing is left to run.
    pub fn select_tasks(&self) -> Result<Selection> {
        let report = TaskLoader::new(&self.config.tasks_dir).load()?;
        let tasks = self.config.filter.select(report.tasks);
        if tasks.is_empty() {
            return Err(EvalError::NoTasksSelected);
        }
        Ok(Selection {
            tasks,
            load_errors: report.errors,
        })
    }

    /// Run `tasks` in order. `on_result` sees each result as soon as its
    /// task finishes.
    pub async fn run<F>(&self, tasks: &[Task], mut on_result: F) -> Result<CompletedRun>
    where
        F: FnMut(&Task, &TaskResult),
    {
        if tasks.is_empty() {
            return Err(EvalError::NoTasksSelected);
        }

        let started_at = Utc::now();
        let run_id = started_at.to_rfc3339_opts(SecondsFormat::Millis, true);

        let results = async {
            obs::emit_run_started(&run_id, tasks.len());
            let mut results = Vec::with_capacity(tasks.len());
            for task in tasks {
                let result = self.runner.run(task).await;
                on_result(task, &result);
                results.push(result);
            }
            results
        }
        .instrument(obs::run_span(&run_id))
        .await;

        let summary = Summary::from_results(&results)?;
        obs::emit_run_finished(&run_id, summary.total_tasks, summary.passed, summary.pass_rate);

        Ok(CompletedRun {
            started_at,
            output: RunOutput {
                run_id,
                config: self.config.snapshot(tasks),
                tasks: results,
                summary,
            },
        })
    }

    /// Write the run to the configured results location.
    pub fn persist(&self, run: &CompletedRun) -> Result<PathBuf> {
        let store = ResultStore::new(&self.config.results_dir);
        let path = store.persist(
            &run.output,
            run.started_at.date_naive(),
            self.config.output.as_deref(),
        )?;
        obs::emit_results_persisted(&path);
        Ok(path)
    }

    /// Read the configured baseline, if any and if readable.
    ///
    /// Call before [`persist`](Self::persist): the baseline may live at the
    /// path this run is about to be written to.
    pub fn load_baseline(&self) -> Option<Baseline> {
        let path = self.config.compare.as_deref()?;
        load_baseline(path)
    }

    /// Compare a finished run against a previously loaded baseline.
    pub fn compare(&self, run: &CompletedRun, baseline: &Baseline) -> Comparison {
        let comparison = compare(run.results(), run.summary(), baseline);
        obs::emit_baseline_compared(
            &comparison.baseline_run_id,
            comparison.pass_rate_delta,
            comparison.regressions.len(),
        );
        comparison
    }
}
