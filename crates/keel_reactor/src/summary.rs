//! Build results.

use core::time::Duration;

use keel_engine::summary::TaskExecutionSummary;
use serde::Serialize;

/// Result of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    /// Project name.
    pub project: String,
    /// Project version.
    pub version: String,
    /// Environments active during the build.
    pub environments: Vec<String>,
    /// Number of initializers that ran.
    pub initializers_run: usize,
    /// One summary per executed task, in plan order.
    pub tasks: Vec<TaskExecutionSummary>,
    /// Total wall-clock time, initializers included.
    pub elapsed: Duration,
}

impl BuildSummary {
    /// Returns the executed task names in order.
    #[must_use]
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|summary| summary.task.as_str()).collect()
    }
}

/// A task listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    /// Task name.
    pub name: String,
    /// Joined description fragments.
    pub description: String,
    /// Direct dependencies in declaration order.
    pub dependencies: Vec<String>,
}
