//! Registry configuration.
//!
//! The process-wide registries are configured from the environment:
//!
//! - `INITALL_TRACE_LOG=<path>` - Append one JSON line per invoked initializer,
//!   plus a closing summary line, to `<path>`.
//! - `INITALL_NO_CATCH_PANIC=1` - Let a panicking initializer unwind through
//!   [`run_all_once`](crate::InitAllOnce::run_all_once) instead of recording
//!   the panic as a failure.
//!
//! Explicitly constructed registries can take a [`RegistryConfig`] directly.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static ENV_TRACE_LOG: OnceLock<Option<PathBuf>> = OnceLock::new();
static ENV_NO_CATCH_PANIC: OnceLock<bool> = OnceLock::new();

/// Checks if an environment variable is set to a truthy value ("1" or "true").
fn check_env_bool(var_name: &str) -> bool {
    std::env::var(var_name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn env_trace_log() -> Option<&'static Path> {
    ENV_TRACE_LOG
        .get_or_init(|| std::env::var_os("INITALL_TRACE_LOG").map(PathBuf::from))
        .as_deref()
}

fn env_no_catch_panic() -> bool {
    *ENV_NO_CATCH_PANIC.get_or_init(|| check_env_bool("INITALL_NO_CATCH_PANIC"))
}

/// Settings for a single registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Record a panicking initializer as a failure and keep going.
    pub catch_panics: bool,
    /// JSONL file that receives per-initializer outcomes.
    pub trace_log: Option<PathBuf>,
}

impl RegistryConfig {
    /// Reads the configuration from the environment.
    ///
    /// Variables are read once per process; later changes to the environment
    /// are not observed.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            catch_panics: !env_no_catch_panic(),
            trace_log: env_trace_log().map(Path::to_path_buf),
        }
    }

    #[must_use]
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    #[must_use]
    pub fn trace_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace_log = Some(path.into());
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            trace_log: None,
        }
    }
}
