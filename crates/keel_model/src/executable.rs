//! Named callables and their declared inputs.

use std::sync::Arc;

use crate::context::{BuildContext, ContextValue, Input, Inputs};
use crate::error::{BoxError, BuildError};
use crate::name::validate_name;

/// The callable signature shared by tasks, actions and initializers.
pub type ExecutableFn = dyn Fn(&Inputs<'_>) -> Result<(), BoxError> + Send + Sync;

/// A named callable with the inputs it needs from the build context.
///
/// Cloning is cheap; the callable is reference counted.
///
/// # Example
///
/// ```
/// use keel_model::context::{BuildContext, Environments};
/// use keel_model::executable::Executable;
///
/// let exe = Executable::new("show_envs", |inputs| {
///     let envs = inputs.get::<Environments>()?;
///     assert!(envs.contains("ci"));
///     Ok(())
/// })
/// .unwrap()
/// .needs::<Environments>();
///
/// let ctx = BuildContext::new().with(Environments::new(["ci"]));
/// exe.execute(&ctx).unwrap();
/// ```
#[derive(Clone)]
pub struct Executable {
    name: String,
    callable: Arc<ExecutableFn>,
    inputs: Vec<Input>,
    description: String,
    source: Option<String>,
}

impl core::fmt::Debug for Executable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Executable")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("description", &self.description)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Executable {
    /// Creates an executable named `name` wrapping `callable`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidName`] if `name` is not an identifier.
    pub fn new<F>(name: impl Into<String>, callable: F) -> Result<Self, BuildError>
    where
        F: Fn(&Inputs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Ok(Self {
            name: validate_name(name)?,
            callable: Arc::new(callable),
            inputs: Vec::new(),
            description: String::new(),
            source: None,
        })
    }

    /// Declares that the callable reads or writes a value of type `T`.
    ///
    /// Declaring the same type twice has no further effect.
    #[must_use]
    pub fn needs<T: ContextValue>(mut self) -> Self {
        let input = Input::of::<T>();
        if !self.inputs.contains(&input) {
            self.inputs.push(input);
        }
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Records the registration source that defined this executable.
    #[must_use]
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.set_source(source);
        self
    }

    /// In-place variant of [`from_source`](Self::from_source).
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = Some(source.into());
    }

    /// Returns the executable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, empty if none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the identifier of the defining source, if recorded.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the declared inputs in declaration order.
    #[must_use]
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Runs the callable against `context`.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingInput`] if a declared input is absent from `context`
    /// - [`BuildError::BuildFailed`] if the callable returns an error
    pub fn execute(&self, context: &BuildContext) -> Result<(), BuildError> {
        if let Some(missing) = self.inputs.iter().find(|i| !context.contains_input(i)) {
            return Err(BuildError::MissingInput {
                executable: self.name.clone(),
                input: missing.type_name(),
            });
        }

        tracing::debug!(executable = %self.name, "executing");
        let inputs = Inputs::new(context, &self.inputs, &self.name);
        (self.callable)(&inputs).map_err(|cause| BuildError::BuildFailed {
            executable: self.name.clone(),
            cause,
        })
    }
}
