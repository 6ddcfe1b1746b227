#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured logging sinks shared across the answerbot crates.

use std::{
    collections::VecDeque,
    fmt,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

impl LogLevel {
    /// Upper-case label used by the console format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Module emitting the log.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Nesting depth of the emitting step (tree walks indent by this).
    #[serde(default, skip_serializing_if = "is_top_level")]
    pub depth: usize,
    /// Arbitrary JSON payload for fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_top_level(depth: &usize) -> bool {
    *depth == 0
}

impl LogRecord {
    /// Creates a record with the provided info.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            depth: 0,
            metadata: serde_json::Map::new(),
        }
    }

    /// Sets the nesting depth.
    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    /// Writes one record.
    fn log(&self, record: &LogRecord) -> Result<()>;
}

/// Thread-safe JSON logger with append-only semantics.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    writer: Mutex<File>,
}

impl JsonLogger {
    /// Creates or opens a logger at the desired path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Returns the underlying file path (useful for tests).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonLogger {
    fn log(&self, record: &LogRecord) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Human-readable logger: `[HH:MM][LEVEL] <indent>message`.
pub struct ConsoleLogger {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger").finish_non_exhaustive()
    }
}

impl ConsoleLogger {
    /// Logger writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Logger writing to an arbitrary writer.
    #[must_use]
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Formats a record the way it appears on the console.
    #[must_use]
    pub fn format_line(record: &LogRecord) -> String {
        let stamp = record.timestamp.with_timezone(&Local).format("%H:%M");
        let indent = "  ".repeat(record.depth);
        let mut line = format!("[{stamp}][{}] {indent}{}", record.level, record.message);
        if !record.metadata.is_empty() {
            line.push(' ');
            line.push_str(&serde_json::Value::Object(record.metadata.clone()).to_string());
        }
        line
    }
}

impl LogSink for ConsoleLogger {
    fn log(&self, record: &LogRecord) -> Result<()> {
        let line = Self::format_line(record);
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

/// Bounded in-memory sink retaining the most recent records.
#[derive(Debug)]
pub struct MemoryLogger {
    capacity: usize,
    backlog: Mutex<VecDeque<LogRecord>>,
}

impl MemoryLogger {
    /// Creates a sink keeping at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            backlog: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Snapshot of retained records, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.backlog.lock().iter().cloned().collect()
    }
}

impl LogSink for MemoryLogger {
    fn log(&self, record: &LogRecord) -> Result<()> {
        let mut backlog = self.backlog.lock();
        if self.capacity == 0 {
            return Ok(());
        }
        if backlog.len() == self.capacity {
            backlog.pop_front();
        }
        backlog.push_back(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("logs/test.log")).unwrap();
        logger
            .log(&LogRecord::new("nlp", LogLevel::Info, "hello").with_depth(2))
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("\"message\":\"hello\""));
        assert!(content.contains("\"depth\":2"));
        assert!(content.contains("\"level\":\"INFO\""));
    }

    #[test]
    fn console_line_indents_by_depth() {
        let record = LogRecord::new("nlp", LogLevel::Warn, "reducing: Dad").with_depth(2);
        let line = ConsoleLogger::format_line(&record);
        assert!(line.ends_with("[WARNING]     reducing: Dad"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn memory_logger_drops_oldest() {
        let sink = MemoryLogger::new(2);
        for message in ["a", "b", "c"] {
            sink.log(&LogRecord::new("nlp", LogLevel::Debug, message))
                .unwrap();
        }
        let messages: Vec<_> = sink.snapshot().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
