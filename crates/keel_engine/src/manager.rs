//! The execution manager.
//!
//! [`ExecutionManager`] owns every task, action and initializer registered
//! for one build. Its lifecycle has two phases:
//!
//! 1. **Registration**: [`register_task`](ExecutionManager::register_task),
//!    [`register_action`](ExecutionManager::register_action) and
//!    [`register_initializer`](ExecutionManager::register_initializer).
//! 2. **Resolved**: after [`resolve_dependencies`](ExecutionManager::resolve_dependencies)
//!    succeeds, dependency and hook names are linked and plans can be built
//!    and executed.
//!
//! Registering anything after resolution drops back to the registration
//! phase. Every non-registration operation fails with
//! [`BuildError::DependenciesNotResolved`] outside the resolved phase.
//!
//! # Example
//!
//! ```
//! use keel_engine::manager::ExecutionManager;
//! use keel_model::prelude::*;
//!
//! fn task(name: &str) -> Task {
//!     Task::new(Executable::new(name, |_| Ok(())).unwrap())
//! }
//!
//! let mut manager = ExecutionManager::new();
//! manager.register_task(task("clean"));
//! manager.register_task(task("compile").depends_on("clean"));
//! manager.resolve_dependencies().unwrap();
//!
//! let plan = manager.build_execution_plan(&["compile"]).unwrap();
//! assert_eq!(plan.names(), ["clean", "compile"]);
//!
//! let summaries = manager
//!     .execute_execution_plan(&plan, &BuildContext::new())
//!     .unwrap();
//! assert_eq!(summaries.len(), 2);
//! ```

use std::time::Instant;

use hashbrown::{HashMap, HashSet};
use keel_model::action::Action;
use keel_model::context::BuildContext;
use keel_model::error::BuildError;
use keel_model::initializer::Initializer;
use keel_model::task::Task;
use parking_lot::Mutex;

use crate::plan::ExecutionPlan;
use crate::summary::{ExecutionAborted, TaskExecutionSummary};

/// Dependency and hook links computed by resolution, indexed by task slot.
#[derive(Debug, Default)]
struct Resolution {
    dependencies: Vec<Vec<usize>>,
    before: Vec<Vec<usize>>,
    after: Vec<Vec<usize>>,
}

/// Which side of a task a hook runs on.
#[derive(Debug, Clone, Copy)]
enum HookPhase {
    Before,
    After,
}

impl HookPhase {
    fn as_str(self) -> &'static str {
        match self {
            HookPhase::Before => "before",
            HookPhase::After => "after",
        }
    }
}

/// Registry and executor for the definitions of one build.
#[derive(Debug, Default)]
pub struct ExecutionManager {
    tasks: Vec<Task>,
    task_index: HashMap<String, usize>,
    actions: Vec<Action>,
    action_index: HashMap<String, usize>,
    initializers: Vec<Initializer>,
    initializer_index: HashMap<String, usize>,
    resolution: Option<Resolution>,
    /// Only-once actions that already fired.
    fired_once: Mutex<HashSet<String>>,
}

impl ExecutionManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a task, extending any task already registered under the
    /// same name.
    pub fn register_task(&mut self, task: Task) {
        self.resolution = None;
        let name = task.name().to_owned();

        if let Some(&slot) = self.task_index.get(&name) {
            tracing::debug!(task = %name, "extending task");
            self.tasks[slot].extend(task);
        } else {
            tracing::debug!(task = %name, "registering task");
            self.task_index.insert(name, self.tasks.len());
            self.tasks.push(task);
        }
    }

    /// Registers an action, replacing any action registered under the same
    /// name.
    pub fn register_action(&mut self, action: Action) {
        self.resolution = None;
        let name = action.name().to_owned();
        tracing::debug!(
            action = %name,
            before = ?action.execute_before(),
            after = ?action.execute_after(),
            only_once = action.is_only_once(),
            "registering action"
        );

        if let Some(&slot) = self.action_index.get(&name) {
            self.actions[slot] = action;
        } else {
            self.action_index.insert(name, self.actions.len());
            self.actions.push(action);
        }
    }

    /// Registers an initializer, replacing any initializer registered under
    /// the same name.
    pub fn register_initializer(&mut self, initializer: Initializer) {
        self.resolution = None;
        let name = initializer.name().to_owned();
        tracing::debug!(
            initializer = %name,
            environments = ?initializer.environments(),
            "registering initializer"
        );

        if let Some(&slot) = self.initializer_index.get(&name) {
            self.initializers[slot] = initializer;
        } else {
            self.initializer_index.insert(name, self.initializers.len());
            self.initializers.push(initializer);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the task registered under `name`.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.task_index.get(name).map(|&slot| &self.tasks[slot])
    }

    /// Returns `true` if a task is registered under `name`.
    #[must_use]
    pub fn has_task(&self, name: &str) -> bool {
        self.task_index.contains_key(name)
    }

    /// Returns every task, sorted by name.
    #[must_use]
    pub fn tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by(|a, b| a.name().cmp(b.name()));
        tasks
    }

    /// Returns the actions in registration order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the initializers in registration order.
    #[must_use]
    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    /// Returns `true` if dependencies are resolved and nothing was
    /// registered since.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────

    /// Links every dependency and hook name to its registered task.
    ///
    /// Links are recomputed from scratch, so calling this repeatedly never
    /// duplicates them.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingTaskDependency`] if a task depends on an
    ///   unregistered task
    /// - [`BuildError::MissingActionDependency`] if an action hooks an
    ///   unregistered task
    pub fn resolve_dependencies(&mut self) -> Result<(), BuildError> {
        self.resolution = None;

        let mut resolution = Resolution {
            dependencies: Vec::with_capacity(self.tasks.len()),
            before: vec![Vec::new(); self.tasks.len()],
            after: vec![Vec::new(); self.tasks.len()],
        };

        for task in &self.tasks {
            let mut links = Vec::with_capacity(task.dependencies().len());
            for dependency in task.dependencies() {
                let Some(&slot) = self.task_index.get(dependency) else {
                    let err = BuildError::MissingTaskDependency {
                        task: task.name().to_owned(),
                        dependency: dependency.clone(),
                    };
                    tracing::debug!(error = %err, "resolution failed");
                    return Err(err);
                };
                links.push(slot);
            }
            resolution.dependencies.push(links);
        }

        for (action_slot, action) in self.actions.iter().enumerate() {
            let hooks = [
                (action.execute_before(), &mut resolution.before),
                (action.execute_after(), &mut resolution.after),
            ];
            for (names, table) in hooks {
                for name in names {
                    let Some(&slot) = self.task_index.get(name) else {
                        let err = BuildError::MissingActionDependency {
                            action: action.name().to_owned(),
                            task: name.clone(),
                        };
                        tracing::debug!(error = %err, "resolution failed");
                        return Err(err);
                    };
                    table[slot].push(action_slot);
                }
            }
        }

        self.resolution = Some(resolution);
        Ok(())
    }

    fn resolution(&self) -> Result<&Resolution, BuildError> {
        self.resolution
            .as_ref()
            .ok_or(BuildError::DependenciesNotResolved)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Planning
    // ─────────────────────────────────────────────────────────────────────

    /// Builds the plan that runs `names` and everything they depend on.
    ///
    /// Tasks are enqueued depth first: dependencies in declaration order,
    /// then the task itself. A task reached a second time is not enqueued
    /// again.
    ///
    /// # Errors
    ///
    /// - [`BuildError::DependenciesNotResolved`] before resolution
    /// - [`BuildError::NoSuchTask`] for an unregistered requested name
    /// - [`BuildError::CircularTaskDependency`] if a cycle is reachable
    pub fn build_execution_plan<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<ExecutionPlan<'_>, BuildError> {
        let resolution = self.resolution()?;

        let mut order = Vec::new();
        let mut queued = HashSet::new();

        for name in names {
            let name = name.as_ref();
            let &slot = self
                .task_index
                .get(name)
                .ok_or_else(|| BuildError::NoSuchTask(name.to_owned()))?;
            self.enqueue(resolution, slot, &mut queued, &mut order)?;
        }

        Ok(ExecutionPlan::new(
            order.into_iter().map(|slot| &self.tasks[slot]).collect(),
        ))
    }

    /// Depth-first walk from `root` on a heap-allocated stack. Chain depth is
    /// not limited by the thread stack.
    fn enqueue(
        &self,
        resolution: &Resolution,
        root: usize,
        queued: &mut HashSet<usize>,
        order: &mut Vec<usize>,
    ) -> Result<(), BuildError> {
        if queued.contains(&root) {
            return Ok(());
        }

        // Frames are (task slot, index of its next dependency to visit).
        let mut stack = vec![(root, 0usize)];
        let mut on_path = HashSet::new();
        on_path.insert(root);

        while let Some(frame) = stack.last_mut() {
            let (slot, next) = *frame;
            let Some(&dependency) = resolution.dependencies[slot].get(next) else {
                stack.pop();
                on_path.remove(&slot);
                queued.insert(slot);
                order.push(slot);
                continue;
            };
            frame.1 += 1;

            if on_path.contains(&dependency) {
                return Err(BuildError::CircularTaskDependency {
                    task: self.tasks[slot].name().to_owned(),
                    dependency: self.tasks[dependency].name().to_owned(),
                });
            }
            if !queued.contains(&dependency) {
                on_path.insert(dependency);
                stack.push((dependency, 0));
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────

    /// Runs `task`: its before hooks, its executables in registration order,
    /// then its after hooks.
    ///
    /// # Errors
    ///
    /// - [`BuildError::DependenciesNotResolved`] before resolution
    /// - [`BuildError::NoSuchTask`] if `task` is not registered here
    /// - any error raised by a hook or executable
    pub fn execute_task(
        &self,
        task: &Task,
        context: &BuildContext,
    ) -> Result<TaskExecutionSummary, BuildError> {
        let resolution = self.resolution()?;
        let &slot = self
            .task_index
            .get(task.name())
            .ok_or_else(|| BuildError::NoSuchTask(task.name().to_owned()))?;

        tracing::info!(task = %task.name(), "executing task");
        let start = Instant::now();

        let mut actions_fired =
            self.run_hooks(&resolution.before[slot], task, HookPhase::Before, context)?;
        for executable in task.executables() {
            executable.execute(context)?;
        }
        actions_fired +=
            self.run_hooks(&resolution.after[slot], task, HookPhase::After, context)?;

        Ok(TaskExecutionSummary {
            task: task.name().to_owned(),
            actions_fired,
            elapsed: start.elapsed(),
        })
    }

    fn run_hooks(
        &self,
        hooks: &[usize],
        task: &Task,
        phase: HookPhase,
        context: &BuildContext,
    ) -> Result<usize, BuildError> {
        let mut fired = 0;
        for &slot in hooks {
            let action = &self.actions[slot];
            if action.is_only_once() && !self.fired_once.lock().insert(action.name().to_owned()) {
                tracing::debug!(
                    action = %action.name(),
                    task = %task.name(),
                    "skipping only-once action, already fired"
                );
                continue;
            }

            tracing::debug!(
                action = %action.name(),
                task = %task.name(),
                phase = phase.as_str(),
                "firing action"
            );
            action.executable().execute(context)?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Executes every task of `plan` in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionAborted`] carrying the summaries of the tasks that
    /// completed before the failure.
    pub fn execute_execution_plan(
        &self,
        plan: &ExecutionPlan<'_>,
        context: &BuildContext,
    ) -> Result<Vec<TaskExecutionSummary>, ExecutionAborted> {
        let mut completed = Vec::with_capacity(plan.len());
        for task in plan.iter() {
            match self.execute_task(task, context) {
                Ok(summary) => completed.push(summary),
                Err(error) => return Err(ExecutionAborted { completed, error }),
            }
        }
        Ok(completed)
    }

    /// Runs every initializer applicable to `environments`, in registration
    /// order, and returns how many ran.
    ///
    /// # Errors
    ///
    /// - [`BuildError::DependenciesNotResolved`] before resolution
    /// - any error raised by an initializer
    pub fn execute_initializers(
        &self,
        environments: &[String],
        context: &BuildContext,
    ) -> Result<usize, BuildError> {
        self.resolution()?;

        let mut ran = 0;
        for initializer in &self.initializers {
            if !initializer.is_applicable(environments) {
                tracing::debug!(
                    initializer = %initializer.name(),
                    "skipping initializer, no matching environment"
                );
                continue;
            }
            tracing::debug!(initializer = %initializer.name(), "running initializer");
            initializer.executable().execute(context)?;
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use keel_model::executable::Executable;

    use super::*;

    fn task(name: &str) -> Task {
        Task::new(Executable::new(name, |_| Ok(())).unwrap())
    }

    fn action(name: &str) -> Action {
        Action::new(Executable::new(name, |_| Ok(())).unwrap())
    }

    #[test]
    fn operations_require_resolution() {
        let mut manager = ExecutionManager::new();
        manager.register_task(task("a"));

        assert!(matches!(
            manager.build_execution_plan(&["a"]),
            Err(BuildError::DependenciesNotResolved)
        ));
        assert!(matches!(
            manager.execute_initializers(&[], &BuildContext::new()),
            Err(BuildError::DependenciesNotResolved)
        ));
    }

    #[test]
    fn registering_after_resolution_clears_flag() {
        let mut manager = ExecutionManager::new();
        manager.register_task(task("a"));
        manager.resolve_dependencies().unwrap();
        assert!(manager.is_resolved());

        manager.register_action(action("hook").after("a"));
        assert!(!manager.is_resolved());
    }

    #[test]
    fn actions_overwrite_in_place() {
        let mut manager = ExecutionManager::new();
        manager.register_action(action("first"));
        manager.register_action(action("second"));
        manager.register_action(action("first").only_once());

        let names: Vec<_> = manager.actions().iter().map(Action::name).collect();
        assert_eq!(names, ["first", "second"]);
        assert!(manager.actions()[0].is_only_once());
    }

    #[test]
    fn repeated_resolution_does_not_duplicate_hooks() {
        let mut manager = ExecutionManager::new();
        manager.register_task(task("a"));
        manager.register_action(action("hook").before("a").after("a"));

        manager.resolve_dependencies().unwrap();
        manager.resolve_dependencies().unwrap();

        let resolution = manager.resolution().unwrap();
        assert_eq!(resolution.before[0], [0]);
        assert_eq!(resolution.after[0], [0]);
    }

    #[test]
    fn tasks_are_listed_by_name() {
        let mut manager = ExecutionManager::new();
        for name in ["zeta", "alpha", "mid"] {
            manager.register_task(task(name));
        }
        let names: Vec<_> = manager.tasks().into_iter().map(Task::name).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }
}
