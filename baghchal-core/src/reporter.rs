//! Reporter interface for run-scoped logging
//!
//! Components receive a `&dyn Reporter` instead of configuring a global
//! logger, so repeated runs in one process never share handler state.

use std::cell::RefCell;

/// Logger interface for dependency injection
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to `tracing`, tagging every event with a scope (usually the experiment)
#[derive(Debug, Clone, Default)]
pub struct TracingReporter {
    scope: String,
}

impl TracingReporter {
    pub fn new(scope: impl Into<String>) -> Self {
        Self { scope: scope.into() }
    }
}

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(scope = %self.scope, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(scope = %self.scope, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(scope = %self.scope, "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Collects messages in memory, for tests and for summaries
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: RefCell<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Messages logged at the given level
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_levels() {
        let reporter = MemoryReporter::new();
        reporter.info("a");
        reporter.warn("b");
        reporter.error("c");
        reporter.warn("d");

        assert_eq!(reporter.entries().len(), 4);
        assert_eq!(reporter.messages(Level::Warn), vec!["b", "d"]);
        assert_eq!(reporter.messages(Level::Error), vec!["c"]);
    }
}
