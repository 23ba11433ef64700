use serde::Serialize;

/// Lifecycle of a registry.
///
/// ```text
/// Empty ──register──▶ Pending
///   │                    │
///   └──run_all_once──────┴──▶ Running ──▶ Done
/// ```
///
/// There is no transition back: once a registry has left `Empty`/`Pending` it
/// never executes again.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, strum::EnumIs, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunState {
    /// Nothing registered yet.
    #[default]
    Empty,
    /// Entries registered, not yet run.
    Pending,
    /// The execution pass is in progress.
    Running,
    /// The execution pass completed; errors are final.
    Done,
}

impl RunState {
    /// Whether the run-once transition has happened.
    pub fn has_run(self) -> bool {
        matches!(self, Self::Running | Self::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_run() {
        assert!(!RunState::Empty.has_run());
        assert!(!RunState::Pending.has_run());
        assert!(RunState::Running.has_run());
        assert!(RunState::Done.has_run());
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::Pending.to_string(), "pending");
        assert_eq!(RunState::Done.to_string(), "done");
        assert!(RunState::default().is_empty());
    }
}
