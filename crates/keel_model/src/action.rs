//! Hooks that run before or after tasks.

use crate::executable::Executable;

/// An executable hooked before and/or after named tasks.
///
/// An action marked [`only_once`](Self::only_once) fires at most once per
/// build even when several tasks in the plan trigger it.
#[derive(Debug, Clone)]
pub struct Action {
    executable: Executable,
    execute_before: Vec<String>,
    execute_after: Vec<String>,
    only_once: bool,
}

impl Action {
    /// Creates an action that is not yet hooked to any task.
    #[must_use]
    pub fn new(executable: Executable) -> Self {
        Self {
            executable,
            execute_before: Vec::new(),
            execute_after: Vec::new(),
            only_once: false,
        }
    }

    /// Runs this action before `task`.
    #[must_use]
    pub fn before(mut self, task: impl Into<String>) -> Self {
        self.execute_before.push(task.into());
        self
    }

    /// Runs this action after `task`.
    #[must_use]
    pub fn after(mut self, task: impl Into<String>) -> Self {
        self.execute_after.push(task.into());
        self
    }

    /// Limits this action to a single firing per build.
    #[must_use]
    pub fn only_once(mut self) -> Self {
        self.only_once = true;
        self
    }

    /// Returns the action name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.executable.name()
    }

    /// Returns the wrapped executable.
    #[must_use]
    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    /// Mutable access to the wrapped executable.
    pub fn executable_mut(&mut self) -> &mut Executable {
        &mut self.executable
    }

    /// Task names this action runs before.
    #[must_use]
    pub fn execute_before(&self) -> &[String] {
        &self.execute_before
    }

    /// Task names this action runs after.
    #[must_use]
    pub fn execute_after(&self) -> &[String] {
        &self.execute_after
    }

    /// Returns `true` if the action fires at most once per build.
    #[must_use]
    pub fn is_only_once(&self) -> bool {
        self.only_once
    }
}
