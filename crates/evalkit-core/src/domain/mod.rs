//! Domain models for evalkit.
//!
//! - `Task`: validated task definition with its weighted criteria
//! - `TaskResult`: outcome of executing one task
//! - `EvalError` / `ValidationError`: error taxonomy

pub mod error;
pub mod result;
pub mod task;

pub use error::{EvalError, Result, ValidationError};
pub use result::{CriterionOutcome, TaskMetrics, TaskResult, TaskStatus};
pub use task::{AcceptanceSpec, Criterion, Task, TaskDocument, TaskInput};
