//! Ordered task sequences produced by the execution manager.

use keel_model::task::Task;

/// An ordered sequence of tasks in which every dependency precedes its
/// dependents and no task appears twice.
///
/// Plans borrow their tasks from the
/// [`ExecutionManager`](crate::manager::ExecutionManager) that built them.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan<'m> {
    tasks: Vec<&'m Task>,
}

impl<'m> ExecutionPlan<'m> {
    pub(crate) fn new(tasks: Vec<&'m Task>) -> Self {
        Self { tasks }
    }

    /// Returns the tasks in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[&'m Task] {
        &self.tasks
    }

    /// Returns the task names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'m str> {
        self.tasks.iter().map(|&task| task.name()).collect()
    }

    /// Returns `true` if the plan contains a task named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.iter().any(|task| task.name() == name)
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the plan contains no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes the named tasks from the plan.
    ///
    /// Dependencies of an excluded task stay in the plan.
    #[must_use]
    pub fn without<S: AsRef<str>>(mut self, excluded: &[S]) -> Self {
        self.tasks
            .retain(|task| !excluded.iter().any(|name| name.as_ref() == task.name()));
        self
    }

    /// Iterates over the tasks in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &'m Task> + '_ {
        self.tasks.iter().copied()
    }
}
