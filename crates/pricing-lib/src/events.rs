//! Append-only audit log for rejected inputs, auto-corrections and
//! prediction anomalies.
//!
//! Each record is written as one line with a single `write_all` under a
//! process-wide lock, so concurrent requests never interleave partial lines.
//! Write failures are counted and traced but never returned to the caller.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub field: String,
    pub value: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(
        severity: Severity,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | Field: {} | Value: '{}' | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            single_line(&self.field),
            single_line(&self.value),
            single_line(&self.message)
        )
    }
}

fn single_line(s: &str) -> String {
    s.replace('\r', "\\r").replace('\n', "\\n")
}

struct EventLoggerInner {
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
    warnings: AtomicU64,
    errors: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

/// Handle to the process-wide event log. Clones share the same target.
#[derive(Clone)]
pub struct EventLogger {
    inner: Arc<EventLoggerInner>,
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("path", &self.inner.path)
            .finish()
    }
}

impl EventLogger {
    /// Log to an append-only file, created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_target(Some(path.into()))
    }

    /// Logger that only mirrors entries to tracing
    pub fn disabled() -> Self {
        Self::with_target(None)
    }

    fn with_target(path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(EventLoggerInner {
                path,
                write_lock: Mutex::new(()),
                warnings: AtomicU64::new(0),
                errors: AtomicU64::new(0),
                written: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn warn(&self, field: &str, value: &str, message: impl Into<String>) {
        self.record(Severity::Warn, field, value, message);
    }

    pub fn error(&self, field: &str, value: &str, message: impl Into<String>) {
        self.record(Severity::Error, field, value, message);
    }

    /// Append one entry. Never fails from the caller's point of view.
    pub fn record(&self, severity: Severity, field: &str, value: &str, message: impl Into<String>) {
        let entry = LogEntry::new(severity, field, value, message);

        let counter = match severity {
            Severity::Warn => &self.inner.warnings,
            Severity::Error => &self.inner.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        match severity {
            Severity::Warn => warn!(
                event = "input_event",
                field = %entry.field,
                value = %entry.value,
                "{}", entry.message
            ),
            Severity::Error => error!(
                event = "input_event",
                field = %entry.field,
                value = %entry.value,
                "{}", entry.message
            ),
        }

        let Some(path) = self.inner.path.as_deref() else {
            return;
        };

        let line = format!("{}\n", entry);
        match self.append(path, line.as_bytes()) {
            Ok(()) => {
                self.inner.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.inner.failed.fetch_add(1, Ordering::Relaxed);
                debug!(path = %path.display(), error = %e, "Event log write failed");
            }
        }
    }

    fn append(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let _guard = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(bytes)
    }

    /// Whether the target can currently be opened for appending
    pub fn is_writable(&self) -> bool {
        let Some(path) = self.inner.path.as_deref() else {
            return false;
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if fs::create_dir_all(parent).is_err() {
                return false;
            }
        }
        OpenOptions::new().create(true).append(true).open(path).is_ok()
    }

    pub fn stats(&self) -> EventLogStats {
        EventLogStats {
            warnings: self.inner.warnings.load(Ordering::Relaxed),
            errors: self.inner.errors.load(Ordering::Relaxed),
            written: self.inner.written.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }
}

/// Entry and write counters for the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventLogStats {
    /// Warn entries recorded, whether or not they reached the file
    pub warnings: u64,
    pub errors: u64,
    pub written: u64,
    pub failed: u64,
}
