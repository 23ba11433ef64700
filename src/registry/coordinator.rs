//! Shared run-once machinery behind both registry variants.

use std::cmp::Reverse;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Instant;

use super::state::RunState;
use crate::config::RegistryConfig;
use crate::diagnostics::{InitOutcome, TraceLog};
use crate::error::{Error, panic_message};
use crate::failure::InitError;
use crate::initializer::InitializerEntry;
use crate::logging::{debug, warning};

/// How entries are ordered for the execution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionOrder {
    /// Descending priority, ties in insertion order.
    Priority,
    /// Insertion order.
    Insertion,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Arc<InitializerEntry>>,
    errors: Vec<InitError>,
    outcomes: Vec<InitOutcome>,
    state: RunState,
    /// Thread executing the pass while `Running`.
    runner: Option<ThreadId>,
}

pub(crate) struct Coordinator {
    inner: Mutex<Inner>,
    finished: Condvar,
    order: ExecutionOrder,
    config: RegistryConfig,
}

impl Coordinator {
    pub(crate) fn new(order: ExecutionOrder, config: RegistryConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            finished: Condvar::new(),
            order,
            config,
        }
    }

    // Initializers never run under this lock, so a poisoned guard still
    // protects consistent data.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an entry. Returns false when the pass has already started, in
    /// which case the entry is kept but never invoked.
    pub(crate) fn push(&self, entry: InitializerEntry) -> bool {
        let mut inner = self.lock();
        let will_run = !inner.state.has_run();
        if will_run {
            debug!("registered {} (priority {})", entry.label(), entry.rank());
            inner.state = RunState::Pending;
        } else {
            warning!(
                "{} registered after initialization started; it will not run",
                entry.label()
            );
        }
        inner.entries.push(Arc::new(entry));
        will_run
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub(crate) fn state(&self) -> RunState {
        self.lock().state
    }

    pub(crate) fn errors(&self) -> Vec<InitError> {
        self.lock().errors.clone()
    }

    pub(crate) fn outcomes(&self) -> Vec<InitOutcome> {
        self.lock().outcomes.clone()
    }

    pub(crate) fn run_once(&self) -> Vec<InitError> {
        let mut entries = {
            let inner = self.lock();
            if inner.state.has_run() {
                return self.prior_errors(inner);
            }
            let mut inner = inner;
            inner.state = RunState::Running;
            inner.runner = Some(thread::current().id());
            inner.entries.clone()
        };

        if self.order == ExecutionOrder::Priority {
            // stable: equal priorities keep insertion order
            entries.sort_by_key(|entry| Reverse(entry.rank()));
        }

        debug!("running {} initializer(s)", entries.len());
        let guard = FinishGuard(self);
        let mut trace = TraceLog::open(self.config.trace_log.as_deref());
        let mut failed = 0;

        for (position, entry) in entries.iter().enumerate() {
            debug!("initializing {}", entry.label());
            let started = Instant::now();
            let result = self.invoke(entry);
            let outcome =
                InitOutcome::new(entry, position, started.elapsed(), result.as_ref().err());
            trace.outcome(&outcome);

            let mut inner = self.lock();
            if let Err(err) = result {
                warning!("initializer {} failed: {}", entry.label(), err);
                failed += 1;
                inner.errors.push(err);
            }
            inner.outcomes.push(outcome);
        }

        trace.finished(entries.len(), failed);
        drop(guard);
        self.errors()
    }

    /// Result for a trigger that lost the run-once race.
    fn prior_errors(&self, inner: MutexGuard<'_, Inner>) -> Vec<InitError> {
        // An initializer calling back into its own registry must not wait on
        // itself.
        if inner.runner == Some(thread::current().id()) {
            return inner.errors.clone();
        }
        let inner = self
            .finished
            .wait_while(inner, |inner| inner.state.is_running())
            .unwrap_or_else(PoisonError::into_inner);
        inner.errors.clone()
    }

    fn invoke(&self, entry: &InitializerEntry) -> Result<(), InitError> {
        if !self.config.catch_panics {
            return entry.invoke();
        }
        match panic::catch_unwind(AssertUnwindSafe(|| entry.invoke())) {
            Ok(result) => result,
            Err(payload) => Err(InitError::new(Error::Panicked {
                name: entry.label().to_string(),
                message: panic_message(payload.as_ref()),
            })),
        }
    }
}

/// Moves the registry to `Done` and wakes waiting triggers, including when an
/// uncaught initializer panic unwinds through the pass.
struct FinishGuard<'a>(&'a Coordinator);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.0.lock();
        inner.state = RunState::Done;
        inner.runner = None;
        drop(inner);
        self.0.finished.notify_all();
    }
}
