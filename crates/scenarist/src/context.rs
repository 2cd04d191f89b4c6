//! Per-scenario state shared between steps.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Type-erased key→value store scoped to a single scenario.
///
/// A fresh context is created before a scenario's hooks run and dropped when
/// the scenario finishes, so state never leaks between scenarios. Values must
/// be `Send` because scenarios may execute on worker threads.
///
/// # Examples
///
/// ```
/// use scenarist::Context;
///
/// let mut ctx = Context::new();
/// ctx.insert("attempts", 2_u32);
/// assert_eq!(ctx.get::<u32>("attempts"), Some(&2));
/// assert_eq!(ctx.get::<String>("attempts"), None);
/// ```
#[derive(Default)]
pub struct Context {
    values: HashMap<String, Box<dyn Any + Send>>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn insert<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Borrow the value stored under `key` when it has type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref()
    }

    /// Mutably borrow the value stored under `key` when it has type `T`.
    #[must_use]
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut()
    }

    /// Remove and return the value under `key` when it has type `T`.
    ///
    /// A value of a different type stays in place and `None` is returned.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        let boxed = self.values.remove(key)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(boxed) => {
                self.values.insert(key.to_string(), boxed);
                None
            }
        }
    }

    /// True when a value is stored under `key`, regardless of its type.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
