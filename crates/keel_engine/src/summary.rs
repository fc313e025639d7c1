//! Per-task execution results.

use core::time::Duration;

use keel_model::error::BuildError;
use serde::Serialize;

/// Result of executing a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskExecutionSummary {
    /// Name of the executed task.
    pub task: String,
    /// Number of hook actions that fired before and after the task.
    pub actions_fired: usize,
    /// Wall-clock time spent on the task and its hooks.
    pub elapsed: Duration,
}

/// A plan execution stopped at its first failing task.
///
/// `completed` lists the summaries of the tasks that finished before the
/// failure, in plan order.
#[derive(Debug, thiserror::Error)]
#[error("build aborted after {} completed task(s): {error}", completed.len())]
pub struct ExecutionAborted {
    /// Summaries of the tasks that ran to completion.
    pub completed: Vec<TaskExecutionSummary>,
    /// The error that stopped the plan.
    #[source]
    pub error: BuildError,
}

impl From<ExecutionAborted> for BuildError {
    fn from(aborted: ExecutionAborted) -> Self {
        aborted.error
    }
}
