//! Process-wide, run-once component initialization.
//!
//! Independent modules register an initializer, optionally with a priority.
//! The owning entry point later runs every registered initializer exactly
//! once, in priority order, and inspects the failures they returned. A failing
//! initializer never stops the ones after it.
//!
//! # Quick Start
//!
//! ```rust
//! use initall::{InitAllOnce, InitError};
//!
//! // In any module, at startup:
//! initall::registry().register_fn(|| Err(InitError::msg("olives failed")), 10);
//! initall::registry().register_fn(|| Ok(()), 20);
//!
//! // In main:
//! let errors = initall::registry().run_all_once();
//! assert_eq!(errors.len(), 1);
//!
//! // Later calls return the same result without running anything.
//! assert_eq!(initall::registry().run_all_once().len(), 1);
//! ```
//!
//! Initializers can also be declared at link time with [`initializer!`]; the
//! process-wide registry collects them when first accessed.
//!
//! # Registration Protocols
//!
//! [`registry`] returns the [`PriorityRegistry`], the primary design. For
//! producer/consumer startup ordering, [`barrier`] returns a
//! [`BarrierRegistry`] where modules [`declare`](BarrierRegistry::declare)
//! intent first and execution waits for every declared registration. The two
//! are independent; pick one per program.
//!
//! # Logging
//!
//! With the `log` feature, registration and execution are logged through the
//! `log` crate under the `initall` target. See [`RegistryConfig`] for the
//! environment variables that control panic handling and the JSONL trace log.

pub use config::RegistryConfig;
pub use diagnostics::InitOutcome;
pub use error::{Error, Result};
pub use failure::{Chain, InitError};
pub use initializer::{Initializer, InitializerEntry, Priority};
pub use registry::{
    BarrierRegistry, InitAllOnce, InitRegistrant, PriorityRegistry, Registrant, RunState,
};
pub use static_init::StaticInitializer;

use std::sync::OnceLock;

mod config;
mod diagnostics;
mod error;
mod failure;
mod initializer;
mod logging;
mod registry;
mod static_init;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

static PRIORITY_REGISTRY: OnceLock<PriorityRegistry> = OnceLock::new();
static BARRIER_REGISTRY: OnceLock<BarrierRegistry> = OnceLock::new();

/// Returns the process-wide [`PriorityRegistry`].
///
/// Created on first access, from any thread, together with every initializer
/// declared through [`initializer!`]. Lives until the process exits.
pub fn registry() -> &'static PriorityRegistry {
    PRIORITY_REGISTRY.get_or_init(|| {
        let registry = PriorityRegistry::new();
        let declared = static_init::absorb(&registry);
        logging::debug!("registry created with {} declared initializer(s)", declared);
        registry
    })
}

/// Returns the process-wide [`BarrierRegistry`].
pub fn barrier() -> &'static BarrierRegistry {
    BARRIER_REGISTRY.get_or_init(BarrierRegistry::new)
}

/// Declares one pending registration on the process-wide [`BarrierRegistry`].
///
/// # Examples
///
/// ```rust
/// use initall::InitAllOnce;
///
/// let registrant = initall::registrant();
/// std::thread::spawn(move || registrant.register_fn(|| Ok(())));
///
/// // Blocks until the registrant above has registered.
/// assert!(initall::barrier().run_all_once().is_empty());
/// ```
pub fn registrant() -> Registrant<'static> {
    barrier().declare()
}
