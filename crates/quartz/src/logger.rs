// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Leveled, prefixed logging to an injected sink.
//!
//! Verbosity is a single number compared against per-level thresholds:
//!
//! | level   | threshold |
//! |---------|-----------|
//! | `debug` | 3         |
//! | `log`   | 2         |
//! | `info`  | 1         |
//! | `warn`  | 0         |
//! | `error` | -1        |
//!
//! A call is forwarded only when the configured verbosity is at least the
//! level's threshold, so the default of `-1` lets errors through and nothing
//! else.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Prefix put in front of every line unless overridden
pub const DEFAULT_PREFIX: &str = "[quartz]";

/// Verbosity used when none is configured
pub const DEFAULT_VERBOSITY: i8 = -1;

/// Log levels, most verbose first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Debug,
    Log,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Minimum verbosity at which this level is emitted
    pub const fn threshold(self) -> i8 {
        match self {
            Self::Debug => 3,
            Self::Log => 2,
            Self::Info => 1,
            Self::Warn => 0,
            Self::Error => -1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for log lines that passed the verbosity filter
pub trait LogSink: Send + Sync {
    fn emit(&self, level: Level, line: &str);
}

/// Forwards lines to `tracing` under the `quartz` target
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, level: Level, line: &str) {
        match level {
            Level::Debug => tracing::trace!(target: "quartz", "{}", line),
            Level::Log => tracing::debug!(target: "quartz", "{}", line),
            Level::Info => tracing::info!(target: "quartz", "{}", line),
            Level::Warn => tracing::warn!(target: "quartz", "{}", line),
            Level::Error => tracing::error!(target: "quartz", "{}", line),
        }
    }
}

/// Keeps emitted lines in memory so tests can assert on them
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines emitted so far, in order
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    /// Lines emitted at exactly `level`
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogSink for CollectingSink {
    fn emit(&self, level: Level, line: &str) {
        self.lines.lock().push((level, line.to_string()));
    }
}

/// Verbosity filter plus prefix in front of a shared sink
#[derive(Clone)]
pub struct Logger {
    verbosity: i8,
    prefix: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(verbosity: i8, sink: Arc<dyn LogSink>) -> Self {
        Self {
            verbosity,
            prefix: Arc::from(DEFAULT_PREFIX),
            sink,
        }
    }

    /// Replace the line prefix; an empty prefix emits lines bare
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = Arc::from(prefix.as_ref());
        self
    }

    pub fn verbosity(&self) -> i8 {
        self.verbosity
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a call at `level` would reach the sink
    pub fn enabled(&self, level: Level) -> bool {
        self.verbosity >= level.threshold()
    }

    pub fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let line = if self.prefix.is_empty() {
            args.to_string()
        } else {
            format!("{} {}", self.prefix, args)
        };
        self.sink.emit(level, &line);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    pub fn log(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Log, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(DEFAULT_VERBOSITY, Arc::new(TracingSink))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("verbosity", &self.verbosity)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
