//! The run-scoped trace log.
//!
//! One instance exists per orchestrator invocation. The engine only ever
//! appends; the caller reads the lines back for diagnostics after the run.
//! Lines are mirrored to `tracing` at debug level so the ambient subscriber
//! sees them too.

use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ScrapeLog {
    lines: Mutex<Vec<String>>,
}

impl ScrapeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{line}");
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(line);
    }

    /// Consumes the log, yielding the trace lines in append order.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
