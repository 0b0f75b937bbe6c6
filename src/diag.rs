//! Per-instance diagnostic sink.
//!
//! The original implementation gated an internal logger on a process-wide
//! read of the `GDBWIRE_DEBUG_TO_STDERR` environment variable, sampled once
//! per process, and printed `[LEVEL] FILE:LINE message` to stderr on every
//! internal warning or assertion failure. A per-process global doesn't fit
//! a library several independent [`crate::driver::Driver`] instances might
//! share a process with, so this keeps the documented wire format but reads
//! the environment once per instance, at construction, the way a
//! `tracing` subscriber is installed once per program rather than checked
//! on every log call.

use std::sync::atomic::{AtomicU64, Ordering};

/// Severity recorded alongside a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// A diagnostic sink bound to one [`crate::driver::Driver`] instance.
///
/// Every event is always forwarded to `tracing` (the crate's normal
/// structured-logging path). When stderr passthrough is enabled, the event
/// is additionally written to stderr in the legacy
/// `[LEVEL] FILE:LINE message` format for parity with the documented
/// external contract.
#[derive(Debug, Clone)]
pub struct DiagSink {
    stderr_enabled: bool,
}

static EVENTS_EMITTED: AtomicU64 = AtomicU64::new(0);

impl DiagSink {
    /// Builds a sink that samples `GDBWIRE_DEBUG_TO_STDERR` once, right now.
    pub fn from_env() -> Self {
        Self {
            stderr_enabled: std::env::var_os("GDBWIRE_DEBUG_TO_STDERR").is_some(),
        }
    }

    /// Builds a sink with stderr passthrough explicitly forced on or off,
    /// bypassing the environment. Useful for tests that want deterministic
    /// output regardless of the ambient environment.
    pub fn forced(stderr_enabled: bool) -> Self {
        Self { stderr_enabled }
    }

    pub fn is_stderr_enabled(&self) -> bool {
        self.stderr_enabled
    }

    #[track_caller]
    pub fn warn(&self, message: impl std::fmt::Display) {
        self.emit(Level::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl std::fmt::Display) {
        self.emit(Level::Error, message);
    }

    #[track_caller]
    fn emit(&self, level: Level, message: impl std::fmt::Display) {
        EVENTS_EMITTED.fetch_add(1, Ordering::Relaxed);
        let location = std::panic::Location::caller();
        match level {
            Level::Warn => tracing::warn!(file = location.file(), line = location.line(), "{message}"),
            Level::Error => tracing::error!(file = location.file(), line = location.line(), "{message}"),
        }
        if self.stderr_enabled {
            eprintln!(
                "[{}] {}:{} {}",
                level.as_str(),
                location.file(),
                location.line(),
                message
            );
        }
    }
}

impl Default for DiagSink {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn forced_sink_ignores_environment() {
        let sink = DiagSink::forced(true);
        assert!(sink.is_stderr_enabled());
        let sink = DiagSink::forced(false);
        assert!(!sink.is_stderr_enabled());
    }
}
