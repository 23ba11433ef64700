use super::coordinator::{Coordinator, ExecutionOrder};
use super::wait_group::WaitGroup;
use super::{InitAllOnce, InitRegistrant, RunState};
use crate::config::RegistryConfig;
use crate::diagnostics::InitOutcome;
use crate::failure::InitError;
use crate::initializer::{Initializer, InitializerEntry};
use crate::logging::warning;

/// Registry with a two-step registration handshake.
///
/// A module first calls [`declare`](Self::declare), which counts one pending
/// registration, and later hands its initializer to the returned
/// [`Registrant`]. [`run_all_once`](InitAllOnce::run_all_once) blocks until
/// every declared registrant has registered (or been dropped), then runs the
/// entries in registration order. Priorities are ignored.
///
/// # Examples
///
/// ```rust
/// use initall::{BarrierRegistry, InitAllOnce, InitError};
/// use std::thread;
///
/// let registry = BarrierRegistry::new();
/// let registrant = registry.declare();
///
/// thread::scope(|s| {
///     s.spawn(move || registrant.register_fn(|| Err(InitError::msg("figs failed"))));
///     let errors = registry.run_all_once();
///     assert_eq!(errors.len(), 1);
/// });
/// ```
pub struct BarrierRegistry {
    core: Coordinator,
    pending: WaitGroup,
}

impl BarrierRegistry {
    /// Creates an empty registry configured from the environment.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::from_env())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            core: Coordinator::new(ExecutionOrder::Insertion, config),
            pending: WaitGroup::new(),
        }
    }

    /// Declares that one more initializer will be registered.
    ///
    /// Execution will not start until the returned [`Registrant`] registers
    /// or is dropped.
    pub fn declare(&self) -> Registrant<'_> {
        self.pending.add();
        Registrant {
            registry: self,
            registered: false,
        }
    }

    /// Number of declared registrants that have not registered yet.
    pub fn pending(&self) -> usize {
        self.pending.count()
    }
}

impl Default for BarrierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InitRegistrant for BarrierRegistry {
    /// Appends an entry without a prior declaration. The entry's priority is
    /// ignored.
    fn register_entry(&self, entry: InitializerEntry) -> bool {
        self.core.push(entry)
    }

    fn len(&self) -> usize {
        self.core.len()
    }
}

impl InitAllOnce for BarrierRegistry {
    fn run_all_once(&self) -> Vec<InitError> {
        self.pending.wait();
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

/// A declared, not yet completed registration on a [`BarrierRegistry`].
///
/// Dropping a registrant without registering releases its declaration so the
/// execution pass is not held up forever.
#[must_use = "a declared registrant blocks execution until it registers or is dropped"]
pub struct Registrant<'a> {
    registry: &'a BarrierRegistry,
    registered: bool,
}

impl Registrant<'_> {
    /// Completes the declaration with an initializer.
    ///
    /// Returns false when execution has already started; the initializer is
    /// then kept but never invoked.
    pub fn register(self, initializer: impl Initializer + 'static) -> bool {
        self.register_entry(InitializerEntry::new(initializer))
    }

    pub fn register_fn<F>(self, f: F) -> bool
    where
        F: Fn() -> Result<(), InitError> + Send + Sync + 'static,
    {
        self.register_entry(InitializerEntry::from_fn(f))
    }

    pub fn register_entry(mut self, entry: InitializerEntry) -> bool {
        self.registered = true;
        self.registry.core.push(entry)
    }
}

impl Drop for Registrant<'_> {
    fn drop(&mut self) {
        if !self.registered {
            warning!("registrant dropped without registering an initializer");
        }
        self.registry.pending.done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0} failed")]
    struct Crop(&'static str);

    fn registry() -> BarrierRegistry {
        BarrierRegistry::with_config(RegistryConfig::default())
    }

    #[test_log::test]
    fn test_scenario_insertion_order() {
        let registry = registry();
        let olives = registry.declare();
        let figs = registry.declare();
        let wine = registry.declare();
        assert_eq!(registry.pending(), 3);

        thread::scope(|s| {
            s.spawn(move || {
                thread::sleep(Duration::from_millis(10));
                olives.register_fn(|| Err(Crop("olives").into()));
                thread::sleep(Duration::from_millis(10));
                figs.register_fn(|| Err(Crop("figs").into()));
                thread::sleep(Duration::from_millis(10));
                wine.register_fn(|| Ok(()));
            });

            let errors = registry.run_all_once();
            assert_eq!(errors.len(), 2);
            assert!(errors[0].is(&Crop("olives")));
            assert!(errors[1].is(&Crop("figs")));
        });

        assert_eq!(registry.pending(), 0);
        assert_eq!(registry.outcomes().len(), 3);
        assert!(registry.has_error(&Crop("wine")).is_none());
    }

    #[test]
    fn test_priority_is_ignored() {
        let registry = registry();
        registry
            .declare()
            .register_entry(InitializerEntry::from_fn(|| Err(Crop("low").into())).priority(1));
        registry
            .declare()
            .register_entry(InitializerEntry::from_fn(|| Err(Crop("high").into())).priority(99));

        let errors = registry.run_all_once();
        assert!(errors[0].is(&Crop("low")));
        assert!(errors[1].is(&Crop("high")));
    }

    #[test]
    fn test_dropped_registrant_releases_declaration() {
        let registry = registry();
        let abandoned = registry.declare();
        assert_eq!(registry.pending(), 1);
        drop(abandoned);
        assert_eq!(registry.pending(), 0);

        assert!(registry.run_all_once().is_empty());
        assert_eq!(registry.state(), RunState::Done);
    }

    #[test]
    fn test_trigger_waits_for_many_registrants() {
        let registry = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let registrants: Vec<_> = (0..16).map(|_| registry.declare()).collect();

        thread::scope(|s| {
            for (i, registrant) in registrants.into_iter().enumerate() {
                let calls = Arc::clone(&calls);
                s.spawn(move || {
                    thread::sleep(Duration::from_millis((i % 4) as u64));
                    registrant.register_fn(move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    });
                });
            }

            assert!(registry.run_all_once().is_empty());
        });

        assert_eq!(registry.len(), 16);
        assert_eq!(calls.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_registration_after_run_is_never_invoked() {
        let registry = registry();
        registry.run_all_once();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let will_run = registry.declare().register_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(!will_run);
        assert!(registry.run_all_once().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.pending(), 0);
    }
}
