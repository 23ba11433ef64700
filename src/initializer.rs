//! Initializers and the entries that carry them through a registry.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::failure::InitError;

/// A one-time startup action owned by a registering module.
///
/// Any `Fn() -> Result<(), InitError> + Send + Sync` closure or function is an
/// initializer, so most callers never implement this trait by hand.
pub trait Initializer: Send + Sync {
    /// Runs the initialization. Called at most once per registration.
    fn initialize_once(&self) -> Result<(), InitError>;

    /// Label used in logs and run outcomes.
    ///
    /// Defaults to the last path segment of the type name. Closures are named
    /// after the function that defines them.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::")
        .find(|segment| !segment.is_empty() && *segment != "{{closure}}")
        .unwrap_or(path)
}

impl<F> Initializer for F
where
    F: Fn() -> Result<(), InitError> + Send + Sync,
{
    fn initialize_once(&self) -> Result<(), InitError> {
        self()
    }
}

/// Execution rank of an initializer. Higher runs earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Priority(i64);

impl Priority {
    /// The rank given to entries registered without a priority; they run last.
    pub const LOWEST: Priority = Priority(i64::MIN);
    pub const HIGHEST: Priority = Priority(i64::MAX);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LOWEST => f.write_str("lowest"),
            Self::HIGHEST => f.write_str("highest"),
            Self(value) => write!(f, "{value}"),
        }
    }
}

/// A registered initializer together with its priority and label.
///
/// Entries are immutable once handed to a registry.
///
/// # Examples
///
/// ```rust
/// use initall::{InitAllOnce, InitRegistrant, InitializerEntry, PriorityRegistry};
///
/// let registry = PriorityRegistry::new();
/// registry.register_entry(
///     InitializerEntry::from_fn(|| Ok(()))
///         .name("wine")
///         .priority(20),
/// );
/// assert!(registry.run_all_once().is_empty());
/// ```
pub struct InitializerEntry {
    pub(crate) name: Cow<'static, str>,
    pub(crate) priority: Priority,
    pub(crate) initializer: Box<dyn Initializer>,
}

impl InitializerEntry {
    /// Wraps an initializer with the lowest priority and its own name.
    pub fn new(initializer: impl Initializer + 'static) -> Self {
        Self {
            name: initializer.name(),
            priority: Priority::LOWEST,
            initializer: Box::new(initializer),
        }
    }

    /// Wraps a closure. Unlike [`new`](Self::new), the closure's return type
    /// is inferred, so `|| Ok(())` needs no annotation.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), InitError> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Priority::new(priority);
        self
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> Priority {
        self.priority
    }

    pub(crate) fn invoke(&self) -> Result<(), InitError> {
        self.initializer.initialize_once()
    }
}

impl fmt::Debug for InitializerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitializerEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
