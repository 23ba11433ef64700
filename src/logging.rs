//! Crate-internal logging macros.
//!
//! With the `log` feature enabled these forward to the `log` crate under the
//! `initall` target. Without it they compile to nothing, while still
//! type-checking their format arguments.

macro_rules! debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::debug!(target: "initall", $($arg)+);
        #[cfg(not(feature = "log"))]
        {
            let _ = format_args!($($arg)+);
        }
    }};
}

macro_rules! warning {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::warn!(target: "initall", $($arg)+);
        #[cfg(not(feature = "log"))]
        {
            let _ = format_args!($($arg)+);
        }
    }};
}

pub(crate) use {debug, warning};
