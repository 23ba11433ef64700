use super::coordinator::{Coordinator, ExecutionOrder};
use super::{InitAllOnce, InitRegistrant, RunState};
use crate::config::RegistryConfig;
use crate::diagnostics::InitOutcome;
use crate::failure::InitError;
use crate::initializer::{Initializer, InitializerEntry};

/// Registry whose entries run in descending priority.
///
/// Entries with equal priority run in registration order. Entries registered
/// without a priority get [`Priority::LOWEST`](crate::Priority::LOWEST) and run last.
///
/// # Examples
///
/// ```rust
/// use initall::{InitAllOnce, InitError, PriorityRegistry};
///
/// let registry = PriorityRegistry::new();
/// registry.register_fn(|| Err(InitError::msg("olives failed")), 10);
/// registry.register_fn(|| Err(InitError::msg("figs failed")), 5);
/// registry.register_fn(|| Ok(()), 20);
///
/// let errors = registry.run_all_once();
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors[0].to_string(), "olives failed");
/// assert_eq!(errors[1].to_string(), "figs failed");
/// ```
pub struct PriorityRegistry {
    core: Coordinator,
}

impl PriorityRegistry {
    /// Creates an empty registry configured from the environment.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::from_env())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            core: Coordinator::new(ExecutionOrder::Priority, config),
        }
    }

    /// Registers an initializer with the given priority.
    ///
    /// Returns false when execution has already started; the initializer is
    /// then kept but never invoked.
    pub fn register(&self, initializer: impl Initializer + 'static, priority: i64) -> bool {
        self.register_entry(InitializerEntry::new(initializer).priority(priority))
    }

    /// Registers a closure with the given priority.
    pub fn register_fn<F>(&self, f: F, priority: i64) -> bool
    where
        F: Fn() -> Result<(), InitError> + Send + Sync + 'static,
    {
        self.register_entry(InitializerEntry::from_fn(f).priority(priority))
    }
}

impl Default for PriorityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InitRegistrant for PriorityRegistry {
    fn register_entry(&self, entry: InitializerEntry) -> bool {
        self.core.push(entry)
    }

    fn len(&self) -> usize {
        self.core.len()
    }
}

impl InitAllOnce for PriorityRegistry {
    fn run_all_once(&self) -> Vec<InitError> {
        self.core.run_once()
    }

    fn errors(&self) -> Vec<InitError> {
        self.core.errors()
    }

    fn outcomes(&self) -> Vec<InitOutcome> {
        self.core.outcomes()
    }

    fn state(&self) -> RunState {
        self.core.state()
    }
}
