use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{ConsoleLogger, JsonLogger, LogLevel, LogRecord, LogSink};

/// Builder for NLP telemetry sinks.
pub struct NlpTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    console: bool,
    min_level: LogLevel,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl NlpTelemetryBuilder {
    /// Creates the builder. Defaults to warnings and errors only.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            console: false,
            min_level: LogLevel::Warn,
            sinks: Vec::new(),
        }
    }

    /// Appends JSON lines to the given path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Mirrors records to stderr.
    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Debug mode lowers the threshold to `Debug`, otherwise `Warn`.
    #[must_use]
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.min_level = if enabled {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        };
        self
    }

    /// Sets the minimum level explicitly.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Adds an arbitrary sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<NlpTelemetry> {
        let mut sinks = self.sinks;
        if let Some(path) = self.log_path {
            sinks.push(Arc::new(JsonLogger::new(path)?));
        }
        if self.console {
            sinks.push(Arc::new(ConsoleLogger::stderr()));
        }
        Ok(NlpTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                min_level: self.min_level,
                sinks,
            }),
        })
    }
}

/// Telemetry handle shared across NLP components.
#[derive(Clone)]
pub struct NlpTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for NlpTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NlpTelemetry")
            .field("module", &self.inner.module)
            .field("min_level", &self.inner.min_level)
            .field("sinks", &self.inner.sinks.len())
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    min_level: LogLevel,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl NlpTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> NlpTelemetryBuilder {
        NlpTelemetryBuilder::new(module)
    }

    /// Whether records at `level` reach any sink.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.inner.min_level && !self.inner.sinks.is_empty()
    }

    /// Logs structured metadata at the top nesting level.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        self.log_nested(level, 0, message, metadata)
    }

    /// Logs structured metadata indented to `depth`.
    pub fn log_nested(
        &self,
        level: LogLevel,
        depth: usize,
        message: &str,
        metadata: Value,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let mut record = LogRecord::new(&self.inner.module, level, message).with_depth(depth);
        if let Value::Object(obj) = metadata {
            record.metadata = obj;
        }
        for sink in &self.inner.sinks {
            sink.log(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_logging::MemoryLogger;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_log_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nlp.log");
        let telemetry = NlpTelemetry::builder("nlp")
            .log_path(&path)
            .debug(true)
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "nlp.question.parsed", json!({ "queries": 1 }))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("nlp.question.parsed"));
        assert!(content.contains("\"queries\":1"));
    }

    #[test]
    fn quiet_mode_filters_debug_and_info() {
        let memory = Arc::new(MemoryLogger::new(8));
        let telemetry = NlpTelemetry::builder("nlp")
            .sink(memory.clone())
            .debug(false)
            .build()
            .unwrap();
        telemetry
            .log_nested(LogLevel::Debug, 3, "reducing: is", json!({}))
            .unwrap();
        telemetry
            .log(LogLevel::Info, "parsing question", json!({}))
            .unwrap();
        telemetry
            .log(LogLevel::Warn, "nlp.reducer.unknown_label", json!({ "label": "neg" }))
            .unwrap();
        let records = memory.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Warn);
        assert_eq!(records[0].metadata["label"], "neg");
    }

    #[test]
    fn nested_records_keep_depth() {
        let memory = Arc::new(MemoryLogger::new(8));
        let telemetry = NlpTelemetry::builder("nlp")
            .sink(memory.clone())
            .debug(true)
            .build()
            .unwrap();
        telemetry
            .log_nested(LogLevel::Debug, 2, "reducing: Obama", json!(null))
            .unwrap();
        let records = memory.snapshot();
        assert_eq!(records[0].depth, 2);
        assert!(records[0].metadata.is_empty());
    }
}
