//! The subject under evaluation.
//!
//! A [`Subject`] receives a task and produces the assistant's raw output
//! and usage. The runner only knows this trait; concrete integrations live
//! outside the core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::error::Result;
use crate::domain::task::Task;

/// Usage reported by the subject for one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub tokens: u64,
    pub edits_count: u64,
    pub tests_passed: u64,
    pub tests_failed: u64,
}

/// What the subject returned for a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectOutput {
    /// Raw assistant output.
    pub output: String,
    pub usage: Usage,
}

/// The system being evaluated.
#[async_trait]
pub trait Subject: Send + Sync {
    /// Short name recorded in logs.
    fn name(&self) -> &str;

    async fn invoke(&self, task: &Task) -> Result<SubjectOutput>;
}

/// Placeholder subject: logs the prompt and reports no work done.
///
/// Acceptance checks then run against the working tree as it already is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubSubject;

const PROMPT_PREVIEW_CHARS: usize = 100;

#[async_trait]
impl Subject for StubSubject {
    fn name(&self) -> &str {
        "stub"
    }

    async fn invoke(&self, task: &Task) -> Result<SubjectOutput> {
        info!(
            task_id = %task.id,
            prompt = %task.prompt_preview(PROMPT_PREVIEW_CHARS),
            "Subject invocation stubbed"
        );
        Ok(SubjectOutput::default())
    }
}
