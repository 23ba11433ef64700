//! Registration and run-once execution.
//!
//! Two registry variants implement the same capability with different
//! registration protocols:
//!
//! - [`PriorityRegistry`] - callers register an initializer with a priority.
//!   Execution runs in descending priority, ties in registration order.
//! - [`BarrierRegistry`] - callers first [`declare`](BarrierRegistry::declare)
//!   that they will register, then register through the returned
//!   [`Registrant`]. Execution waits for every declared registrant and runs
//!   in registration order.
//!
//! Both expose the owner side through [`InitAllOnce`]. Pick one variant per
//! deployment; they do not share entries or state.
//!
//! # Threading Model
//!
//! Each registry holds one mutex around its entries, collected errors and
//! [`RunState`]. Registration appends under that lock. The first
//! [`run_all_once`](InitAllOnce::run_all_once) flips the state to
//! [`RunState::Running`] under the lock, snapshots the entries and releases
//! it, so initializers run one at a time on the triggering thread without
//! holding the lock. Registrations arriving after that point are accepted but
//! never invoked. Other threads triggering while the pass runs block until it
//! reaches [`RunState::Done`] and then receive the final errors.

mod barrier;
mod coordinator;
mod priority;
mod state;
mod wait_group;

use std::error::Error as StdError;

pub use barrier::{BarrierRegistry, Registrant};
pub use priority::PriorityRegistry;
pub use state::RunState;

use crate::diagnostics::InitOutcome;
use crate::error::{Error, Result};
use crate::failure::InitError;
use crate::initializer::InitializerEntry;

/// Registration side of a registry, used by the modules that own initializers.
pub trait InitRegistrant: Send + Sync {
    /// Appends an entry.
    ///
    /// Always accepted. Returns false when execution has already started, in
    /// which case the entry is stored but never invoked.
    fn register_entry(&self, entry: InitializerEntry) -> bool;

    /// Number of registered entries, including late ones.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owner side of a registry, used by the entry point that triggers execution.
pub trait InitAllOnce: Send + Sync {
    /// Runs every registered initializer exactly once and returns the
    /// failures in execution order.
    ///
    /// Later calls do not run anything and return the same failures.
    fn run_all_once(&self) -> Vec<InitError>;

    /// Failures collected so far. Empty before execution.
    fn errors(&self) -> Vec<InitError>;

    /// One record per invoked initializer, in execution order.
    fn outcomes(&self) -> Vec<InitOutcome>;

    fn state(&self) -> RunState;

    /// Returns the first collected failure that is, or transitively wraps, an
    /// error equal to `target`.
    fn has_error<E>(&self, target: &E) -> Option<InitError>
    where
        E: StdError + PartialEq + 'static,
        Self: Sized,
    {
        self.errors().into_iter().find(|err| err.is(target))
    }

    /// Returns the first collected failure that is, or transitively wraps,
    /// `target` itself.
    ///
    /// Unlike [`has_error`](Self::has_error) this compares identity, so it
    /// finds a shared sentinel failure even when its message is not unique.
    fn has_failure(&self, target: &InitError) -> Option<InitError> {
        self.errors().into_iter().find(|err| err.wraps(target))
    }

    /// Returns the first collected failure that is, or transitively wraps, an
    /// `E`.
    fn find_error<E>(&self) -> Option<InitError>
    where
        E: StdError + 'static,
        Self: Sized,
    {
        self.errors()
            .into_iter()
            .find(|err| err.downcast_ref::<E>().is_some())
    }

    /// Converts collected failures into an [`Error::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error if any initializer failed.
    fn ensure_ok(&self) -> Result<()> {
        let errors = self.errors();
        match errors.first() {
            None => Ok(()),
            Some(first) => Err(Error::Failed {
                count: errors.len(),
                first: first.clone(),
            }),
        }
    }
}
