//! Error types for the initall library.
//!
//! This module provides the [`Error`] enum and [`Result`] type alias for the
//! few conditions the registry itself reports. Failures returned by registered
//! initializers are carried as [`InitError`](crate::InitError) values and are
//! never interpreted here.

use thiserror::Error;

use crate::failure::InitError;

/// Error type for initall operations.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// An initializer panicked while running.
    ///
    /// The panic is caught by the execution pass and recorded as a failure of
    /// that initializer, so later initializers still run.
    #[error("initializer {name} panicked: {message}")]
    Panicked { name: String, message: String },

    /// One or more initializers failed.
    ///
    /// Returned by [`InitAllOnce::ensure_ok`](crate::InitAllOnce::ensure_ok)
    /// for owners that treat any startup failure as fatal.
    #[error("{count} initializer(s) failed, first: {first}")]
    Failed { count: usize, first: InitError },

    /// A plain-text failure, see [`InitError::msg`].
    #[error("{0}")]
    Message(String),
}

/// A specialized `Result` type for initall operations.
///
/// This is defined as `std::result::Result<T, initall::Error>` for convenience.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
