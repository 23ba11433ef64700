//! Per-initializer run outcomes and the JSONL trace log.
//!
//! Every invoked initializer produces an [`InitOutcome`]. Outcomes are kept on
//! the registry (see [`InitAllOnce::outcomes`](crate::InitAllOnce::outcomes))
//! and, when a trace log is configured, appended to it as one JSON object per
//! line, followed by a `finished` summary line.

use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::failure::InitError;
use crate::initializer::{InitializerEntry, Priority};

/// Record of one initializer invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitOutcome {
    pub name: String,
    pub priority: Priority,
    /// Zero-based position in the execution order.
    pub position: usize,
    pub elapsed: Duration,
    /// Display text of the failure, if the initializer failed.
    pub error: Option<String>,
}

impl InitOutcome {
    pub(crate) fn new(
        entry: &InitializerEntry,
        position: usize,
        elapsed: Duration,
        error: Option<&InitError>,
    ) -> Self {
        Self {
            name: entry.label().to_string(),
            priority: entry.rank(),
            position,
            elapsed,
            error: error.map(ToString::to_string),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum TraceEvent<'a> {
    Initializer(&'a InitOutcome),
    Finished { invoked: usize, failed: usize },
}

/// Sink for trace events. Disabled when no writer is attached.
pub(crate) struct TraceLog<W: Write = LineWriter<File>> {
    writer: Option<W>,
}

impl TraceLog {
    /// Opens `path` for appending. A file that cannot be opened disables tracing.
    pub(crate) fn open(path: Option<&Path>) -> Self {
        let writer = path.and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
                .map(LineWriter::new)
        });
        Self { writer }
    }
}

impl<W: Write> TraceLog<W> {
    #[cfg(test)]
    fn to_writer(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    pub(crate) fn outcome(&mut self, outcome: &InitOutcome) {
        self.write(&TraceEvent::Initializer(outcome));
    }

    pub(crate) fn finished(&mut self, invoked: usize, failed: usize) {
        self.write(&TraceEvent::Finished { invoked, failed });
    }

    fn write(&mut self, event: &TraceEvent<'_>) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(writer, "{}", json);
        }
    }
}
