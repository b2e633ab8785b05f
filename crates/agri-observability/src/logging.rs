//! Structured logging with page-session context.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::session::{now_ms, SessionId};

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Page session for correlation.
    pub session_id: String,
    /// Page path the logger was created on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Milliseconds since the logger was created.
    pub elapsed_ms: u64,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {} ({}ms)", self.level, self.message, self.elapsed_ms);

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(text) => format!("{}={}", k, text),
                    other => format!("{}={}", k, other),
                })
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }

    /// Value of a string field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (for log shipping).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

/// Captured entries, shared between a logger and the test inspecting it.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Rc<RefCell<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Entries at or above `level`.
    pub fn at_least(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level >= level)
            .cloned()
            .collect()
    }

    /// Whether any entry's message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn push(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }
}

/// Where formatted entries go.
#[derive(Debug, Clone)]
pub enum LogSink {
    /// `console.debug/info/warn/error` in the browser.
    #[cfg(target_arch = "wasm32")]
    Console,
    /// Standard error.
    Stderr,
    /// Forward to the `tracing` dispatcher.
    Tracing,
    /// Keep entries in memory.
    Memory(MemorySink),
}

impl Default for LogSink {
    #[cfg(target_arch = "wasm32")]
    fn default() -> Self {
        Self::Console
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn default() -> Self {
        Self::Stderr
    }
}

impl LogSink {
    fn write(&self, entry: LogEntry, format: LogFormat) {
        let render = |entry: &LogEntry| match format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        };

        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Console => {
                let line = wasm_bindgen::JsValue::from_str(&render(&entry));
                match entry.level {
                    LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
                    LogLevel::Info => web_sys::console::info_1(&line),
                    LogLevel::Warn => web_sys::console::warn_1(&line),
                    LogLevel::Error => web_sys::console::error_1(&line),
                }
            }
            Self::Stderr => eprintln!("{}", render(&entry)),
            Self::Tracing => {
                let line = render(&entry);
                match entry.level {
                    LogLevel::Trace => tracing::trace!(session = %entry.session_id, "{}", line),
                    LogLevel::Debug => tracing::debug!(session = %entry.session_id, "{}", line),
                    LogLevel::Info => tracing::info!(session = %entry.session_id, "{}", line),
                    LogLevel::Warn => tracing::warn!(session = %entry.session_id, "{}", line),
                    LogLevel::Error => tracing::error!(session = %entry.session_id, "{}", line),
                }
            }
            Self::Memory(sink) => sink.push(entry),
        }
    }
}

/// Structured logger with page-session context.
///
/// Cheap to clone; clones share the session and sink.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    session_id: SessionId,
    page: Option<String>,
    start_ms: f64,
    min_level: LogLevel,
    format: LogFormat,
    sink: LogSink,
}

impl StructuredLogger {
    /// Create a new logger for a page session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            page: None,
            start_ms: now_ms(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
            sink: LogSink::default(),
        }
    }

    /// A logger that captures into a fresh [`MemorySink`], returned alongside.
    pub fn memory() -> (Self, MemorySink) {
        let sink = MemorySink::new();
        let logger = Self::new(SessionId::from_string("test"))
            .with_min_level(LogLevel::Trace)
            .with_sink(LogSink::Memory(sink.clone()));
        (logger, sink)
    }

    /// Set the page path.
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the sink.
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    /// Log at trace level.
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message, BTreeMap::new());
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, BTreeMap::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, serde_json::Value>) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            session_id: self.session_id.to_string(),
            page: self.page.clone(),
            fields,
            elapsed_ms: self.elapsed_ms(),
        };

        self.sink.write(entry, self.format);
    }

    /// Get the session ID.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Get elapsed time since logger creation.
    pub fn elapsed_ms(&self) -> u64 {
        (now_ms() - self.start_ms).max(0.0) as u64
    }

    /// Start building a trace log entry.
    pub fn trace_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Trace, message)
    }

    /// Start building a debug log entry.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }

    /// Start building an info log entry.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building a warn log entry.
    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    /// Start building an error log entry.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a field from anything displayable (errors, ids).
    pub fn display(mut self, key: &str, value: &dyn fmt::Display) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.to_string()));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Filtering ===

    #[test]
    fn test_min_level_filters() {
        let (logger, sink) = StructuredLogger::memory();
        let logger = logger.with_min_level(LogLevel::Warn);

        logger.info("page ready");
        logger.warn("cart count unavailable");
        logger.error("add to cart failed");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(sink.at_least(LogLevel::Error).len(), 1);
    }

    // === Builder ===

    #[test]
    fn test_builder_fields() {
        let (logger, sink) = StructuredLogger::memory();
        logger
            .error_builder("request failed")
            .field("endpoint", "/add_to_cart")
            .field_i64("status", 500)
            .field_bool("retried", false)
            .emit();

        let entry = &sink.entries()[0];
        assert_eq!(entry.field("endpoint"), Some("/add_to_cart"));
        assert_eq!(entry.fields["status"], 500);
        assert_eq!(entry.session_id, "test");
        assert!(sink.contains("request failed"));
    }

    // === Formatting ===

    #[test]
    fn test_json_format_flattens_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("endpoint".to_string(), serde_json::json!("/send_offer"));
        let entry = LogEntry {
            level: LogLevel::Warn,
            message: "offer rejected".to_string(),
            session_id: "s1".to_string(),
            page: None,
            fields,
            elapsed_ms: 12,
        };

        let json: serde_json::Value = serde_json::from_str(&entry.to_json()).unwrap();
        assert_eq!(json["level"], "warn");
        assert_eq!(json["endpoint"], "/send_offer");
        assert!(json.get("page").is_none());
    }

    #[test]
    fn test_human_format() {
        let mut fields = BTreeMap::new();
        fields.insert("endpoint".to_string(), serde_json::json!("/api/cart_count"));
        let entry = LogEntry {
            level: LogLevel::Error,
            message: "fetch failed".to_string(),
            session_id: "s1".to_string(),
            page: Some("/cart".to_string()),
            fields,
            elapsed_ms: 3,
        };
        assert_eq!(
            entry.to_human(),
            "[ERROR] fetch failed (3ms) | endpoint=/api/cart_count"
        );
    }

    #[test]
    fn test_log_level_deserialize() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
        let format: LogFormat = serde_json::from_str("\"human\"").unwrap();
        assert_eq!(format, LogFormat::Human);
    }

    #[test]
    fn test_clear_memory_sink() {
        let (logger, sink) = StructuredLogger::memory();
        logger.with_page("/cart").debug("bound handlers");
        assert_eq!(sink.entries()[0].page.as_deref(), Some("/cart"));
        sink.clear();
        assert!(sink.entries().is_empty());
    }
}
