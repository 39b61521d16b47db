//! Leveled diagnostics
//!
//! The resolver reports what it is probing through a sink so the CLI can
//! route messages to stderr and tests can capture them. This is a side
//! channel: nothing in the functional contract depends on it.

use serde::{Deserialize, Serialize};

/// How much the resolver says while searching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Silent,
    Info,
    Verbose,
}

/// Destination for diagnostic lines
pub trait LogSink {
    fn emit(&self, line: &str);
}

/// Writes diagnostic lines to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn emit(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Leveled reporter the resolver carries
pub struct Reporter {
    level: LogLevel,
    sink: Box<dyn LogSink + Send + Sync>,
}

impl Reporter {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            sink: Box::new(StderrSink),
        }
    }

    #[allow(dead_code)]
    pub fn with_sink(level: LogLevel, sink: Box<dyn LogSink + Send + Sync>) -> Self {
        Self { level, sink }
    }

    /// Emit at info level (shown unless silent)
    pub fn info(&self, line: &str) {
        if matches!(self.level, LogLevel::Info | LogLevel::Verbose) {
            self.sink.emit(line);
        }
    }

    /// Emit at verbose level (shown only when verbose)
    pub fn verbose(&self, line: &str) {
        if self.level == LogLevel::Verbose {
            self.sink.emit(line);
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Collects emitted lines for assertions
    struct CaptureSink(Arc<Mutex<Vec<String>>>);

    impl LogSink for CaptureSink {
        fn emit(&self, line: &str) {
            self.0.lock().unwrap().push(line.to_string());
        }
    }

    fn capture(level: LogLevel) -> (Reporter, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let reporter = Reporter::with_sink(level, Box::new(CaptureSink(lines.clone())));
        (reporter, lines)
    }

    #[test]
    fn test_silent_emits_nothing() {
        let (reporter, lines) = capture(LogLevel::Silent);
        reporter.info("a");
        reporter.verbose("b");
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_info_level_drops_verbose() {
        let (reporter, lines) = capture(LogLevel::Info);
        reporter.info("a");
        reporter.verbose("b");
        assert_eq!(*lines.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_verbose_level_emits_both() {
        let (reporter, lines) = capture(LogLevel::Verbose);
        reporter.info("a");
        reporter.verbose("b");
        assert_eq!(lines.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_level_serialization() {
        assert_eq!(serde_json::to_string(&LogLevel::Verbose).unwrap(), "\"verbose\"");
        let level: LogLevel = serde_json::from_str("\"silent\"").unwrap();
        assert_eq!(level, LogLevel::Silent);
    }
}
