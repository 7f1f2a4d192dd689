//! Diagnostics sink for lines the resolver skips.
//!
//! The resolver never logs directly. Callers pass a [`LineReporter`];
//! production code uses [`TracingReporter`] and tests use
//! [`RecordingReporter`] to assert on what was skipped without capturing
//! process-wide output.

use std::sync::Mutex;
use tracing::warn;

/// Receives one call per minors-file line that matched no grammar.
pub trait LineReporter {
    /// `line_number` is 1-based; `raw` is the line as read, lossily decoded
    /// when it was not valid UTF-8.
    fn skipped_line(&self, line_number: usize, raw: &str);
}

/// Emits a `warn` event per skipped line.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl LineReporter for TracingReporter {
    fn skipped_line(&self, line_number: usize, raw: &str) {
        warn!(line_number, line = %raw, "Skipping line in MIG minors file: unparsable line");
    }
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;

impl LineReporter for SilentReporter {
    fn skipped_line(&self, _line_number: usize, _raw: &str) {}
}

/// A skipped line captured by [`RecordingReporter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub raw: String,
}

/// Keeps every report in memory, in the order received.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    skipped: Mutex<Vec<SkippedLine>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped(&self) -> Vec<SkippedLine> {
        match self.skipped.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn raw_lines(&self) -> Vec<String> {
        self.skipped().into_iter().map(|s| s.raw).collect()
    }
}

impl LineReporter for RecordingReporter {
    fn skipped_line(&self, line_number: usize, raw: &str) {
        let entry = SkippedLine {
            line_number,
            raw: raw.to_string(),
        };
        match self.skipped.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
