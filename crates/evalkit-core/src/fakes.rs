//! In-process fakes for the execution seams (testing only)
//!
//! Provides `ScriptedExecutor` and `FailingSubject` so scoring and run
//! behaviour can be asserted without spawning processes or calling a real
//! assistant.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::error::{EvalError, Result};
use crate::domain::task::Task;
use crate::exec::{CommandExecutor, ExitOutcome};
use crate::subject::{Subject, SubjectOutput, Usage};

/// Exit code reported for commands the script does not know.
pub const UNKNOWN_COMMAND_EXIT: i32 = 127;

// ---------------------------------------------------------------------------
// ScriptedExecutor
// ---------------------------------------------------------------------------

/// Executor answering from a fixed command → exit code table.
///
/// Every executed command is recorded in call order.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    exits: HashMap<String, i32>,
    spawn_errors: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit(mut self, command: impl Into<String>, code: i32) -> Self {
        self.exits.insert(command.into(), code);
        self
    }

    /// Make `command` fail to spawn.
    pub fn with_spawn_error(mut self, command: impl Into<String>) -> Self {
        self.spawn_errors.insert(command.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, command: &str) -> std::io::Result<ExitOutcome> {
        self.calls.lock().unwrap().push(command.to_string());

        if self.spawn_errors.contains(command) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("cannot spawn `{command}`"),
            ));
        }

        let code = self
            .exits
            .get(command)
            .copied()
            .unwrap_or(UNKNOWN_COMMAND_EXIT);
        Ok(ExitOutcome {
            code: Some(code),
            duration_ms: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// Subject whose invocation always fails.
#[derive(Debug, Clone)]
pub struct FailingSubject {
    message: String,
}

impl FailingSubject {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Subject for FailingSubject {
    fn name(&self) -> &str {
        "failing"
    }

    async fn invoke(&self, _task: &Task) -> Result<SubjectOutput> {
        Err(EvalError::Subject(self.message.clone()))
    }
}

/// Subject returning fixed usage per task id; unknown ids fail.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSubject {
    usage: HashMap<String, Usage>,
}

impl ScriptedSubject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage(mut self, task_id: impl Into<String>, usage: Usage) -> Self {
        self.usage.insert(task_id.into(), usage);
        self
    }
}

#[async_trait]
impl Subject for ScriptedSubject {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, task: &Task) -> Result<SubjectOutput> {
        let usage = self
            .usage
            .get(&task.id)
            .copied()
            .ok_or_else(|| EvalError::Subject(format!("no scripted response for {}", task.id)))?;
        Ok(SubjectOutput {
            output: String::new(),
            usage,
        })
    }
}
