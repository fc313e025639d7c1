//! Typed build context and input projections.
//!
//! The [`BuildContext`] is the record of values available to executables
//! during a build. Values are keyed by type: the reactor inserts the
//! [`Project`](crate::project::Project) and the active [`Environments`], and
//! hosts may insert any other `Send + Sync + 'static` value.
//!
//! Executables never see the whole context. Each one declares the [`Input`]s
//! it needs when it is registered and receives an [`Inputs`] projection that
//! only grants access to those types.
//!
//! # Example
//!
//! ```
//! use keel_model::context::{BuildContext, Input, Environments};
//!
//! let ctx = BuildContext::new().with(Environments::new(["ci"]));
//!
//! assert!(ctx.contains::<Environments>());
//! assert!(ctx.contains_input(&Input::of::<Environments>()));
//! assert!(ctx.get::<Environments>().unwrap().contains("ci"));
//! ```

use core::any::{Any, TypeId};
use core::marker::PhantomData;

use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::InputError;

/// A value that can be stored in the build context.
///
/// Implemented for every `Send + Sync + 'static` type.
pub trait ContextValue: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> ContextValue for T {}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Declaration of a context value an executable needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Input {
    type_id: TypeId,
    type_name: &'static str,
}

impl Input {
    /// Creates the declaration for values of type `T`.
    #[must_use]
    pub fn of<T: ContextValue>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environments
// ─────────────────────────────────────────────────────────────────────────────

/// The environment tags active for the current build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environments(Vec<String>);

impl Environments {
    /// Creates the set of active environments.
    #[must_use]
    pub fn new<I, S>(environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(environments.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if `environment` is active.
    #[must_use]
    pub fn contains(&self, environment: &str) -> bool {
        self.0.iter().any(|active| active == environment)
    }

    /// Returns the active environments in the order they were given.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if no environment is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BuildContext
// ─────────────────────────────────────────────────────────────────────────────

/// Storage for a single value.
struct ValueEntry {
    data: RwLock<Box<dyn Any + Send + Sync>>,
}

/// Type-keyed storage for the values available during a build.
///
/// Access goes through RAII guards, so an executable may read several values
/// at once or hold one mutably while reading others.
#[derive(Default)]
pub struct BuildContext {
    values: HashMap<TypeId, ValueEntry>,
}

impl core::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BuildContext")
            .field("values", &self.values.len())
            .finish()
    }
}

impl BuildContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with<T: ContextValue>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert<T: ContextValue>(&mut self, value: T) -> Option<T> {
        let entry = ValueEntry {
            data: RwLock::new(Box::new(value)),
        };
        self.values
            .insert(TypeId::of::<T>(), entry)
            .and_then(|old| old.data.into_inner().downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Removes a value and returns it.
    pub fn remove<T: ContextValue>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|entry| entry.data.into_inner().downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns `true` if a value of type `T` is present.
    #[must_use]
    pub fn contains<T: ContextValue>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if the value described by `input` is present.
    #[must_use]
    pub fn contains_input(&self, input: &Input) -> bool {
        self.values.contains_key(&input.type_id)
    }

    /// Borrows a value immutably.
    ///
    /// # Errors
    ///
    /// - [`InputError::NotFound`] if no value of type `T` is present
    /// - [`InputError::BorrowConflict`] if the value is borrowed mutably
    pub fn get<T: ContextValue>(&self) -> Result<ValueRef<'_, T>, InputError> {
        let type_name = core::any::type_name::<T>();
        let entry = self
            .values
            .get(&TypeId::of::<T>())
            .ok_or(InputError::NotFound(type_name))?;
        let guard = entry
            .data
            .try_read()
            .ok_or(InputError::BorrowConflict(type_name))?;

        Ok(ValueRef {
            guard,
            _marker: PhantomData,
        })
    }

    /// Borrows a value mutably.
    ///
    /// # Errors
    ///
    /// - [`InputError::NotFound`] if no value of type `T` is present
    /// - [`InputError::BorrowConflict`] if the value is already borrowed
    pub fn get_mut<T: ContextValue>(&self) -> Result<ValueRefMut<'_, T>, InputError> {
        let type_name = core::any::type_name::<T>();
        let entry = self
            .values
            .get(&TypeId::of::<T>())
            .ok_or(InputError::NotFound(type_name))?;
        let guard = entry
            .data
            .try_write()
            .ok_or(InputError::BorrowConflict(type_name))?;

        Ok(ValueRefMut {
            guard,
            _marker: PhantomData,
        })
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// RAII guard for immutable access to a context value.
pub struct ValueRef<'a, T: ContextValue> {
    guard: RwLockReadGuard<'a, Box<dyn Any + Send + Sync>>,
    _marker: PhantomData<&'a T>,
}

impl<T: ContextValue> core::ops::Deref for ValueRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // The entry was stored under TypeId::of::<T>().
        self.guard
            .downcast_ref::<T>()
            .expect("context value type mismatch (this is a bug)")
    }
}

/// RAII guard for mutable access to a context value.
pub struct ValueRefMut<'a, T: ContextValue> {
    guard: RwLockWriteGuard<'a, Box<dyn Any + Send + Sync>>,
    _marker: PhantomData<&'a mut T>,
}

impl<T: ContextValue> core::ops::Deref for ValueRefMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.guard
            .downcast_ref::<T>()
            .expect("context value type mismatch (this is a bug)")
    }
}

impl<T: ContextValue> core::ops::DerefMut for ValueRefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
            .downcast_mut::<T>()
            .expect("context value type mismatch (this is a bug)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// The projection of a [`BuildContext`] handed to one executable.
///
/// Only the types the executable declared via
/// [`Executable::needs`](crate::executable::Executable::needs) are reachable.
pub struct Inputs<'a> {
    context: &'a BuildContext,
    declared: &'a [Input],
    owner: &'a str,
}

impl<'a> Inputs<'a> {
    pub(crate) fn new(context: &'a BuildContext, declared: &'a [Input], owner: &'a str) -> Self {
        Self {
            context,
            declared,
            owner,
        }
    }

    /// Returns the name of the executable these inputs belong to.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.owner
    }

    /// Returns `true` if the executable declared an input of type `T`.
    #[must_use]
    pub fn declares<T: ContextValue>(&self) -> bool {
        let wanted = Input::of::<T>();
        self.declared.contains(&wanted)
    }

    /// Borrows a declared input immutably.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Undeclared`] if `T` was not declared, otherwise
    /// the errors of [`BuildContext::get`].
    pub fn get<T: ContextValue>(&self) -> Result<ValueRef<'a, T>, InputError> {
        self.check_declared::<T>()?;
        self.context.get::<T>()
    }

    /// Borrows a declared input mutably.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Undeclared`] if `T` was not declared, otherwise
    /// the errors of [`BuildContext::get_mut`].
    pub fn get_mut<T: ContextValue>(&self) -> Result<ValueRefMut<'a, T>, InputError> {
        self.check_declared::<T>()?;
        self.context.get_mut::<T>()
    }

    fn check_declared<T: ContextValue>(&self) -> Result<(), InputError> {
        if self.declares::<T>() {
            Ok(())
        } else {
            Err(InputError::Undeclared(core::any::type_name::<T>()))
        }
    }
}
