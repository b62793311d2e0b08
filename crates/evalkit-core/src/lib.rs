//! evalkit Core Library
//!
//! Loads declarative evaluation tasks, scores their weighted acceptance
//! criteria, aggregates a run, persists it, and detects regressions
//! against a previously stored run.

pub mod aggregate;
pub mod baseline;
pub mod config;
pub mod criterion;
pub mod domain;
pub mod exec;
pub mod fakes;
pub mod loader;
pub mod obs;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod store;
pub mod subject;
pub mod telemetry;

pub use aggregate::Summary;
pub use baseline::{compare, load_baseline, Baseline, BaselineTask, Comparison};
pub use config::{ConfigSnapshot, EvalConfig, TaskFilter};
pub use criterion::CriterionEvaluator;
pub use domain::{
    AcceptanceSpec, Criterion, CriterionOutcome, EvalError, Result, Task, TaskInput, TaskMetrics,
    TaskResult, TaskStatus, ValidationError,
};
pub use exec::{CommandExecutor, ExitOutcome, ShellExecutor};
pub use loader::{LoadReport, TaskLoader};
pub use pipeline::{CompletedRun, EvalPipeline, Selection};
pub use runner::{compute_score, TaskRunner};
pub use store::{read_run_output, ResultStore, RunOutput};
pub use subject::{StubSubject, Subject, SubjectOutput, Usage};
pub use telemetry::init_tracing;

/// evalkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
