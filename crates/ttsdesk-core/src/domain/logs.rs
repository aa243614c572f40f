//! Server log lines and the bounded buffer that holds them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of retained log lines.
pub const LOG_BUFFER_CAPACITY: usize = 1000;

/// Lines evicted at once when the buffer overflows.
pub const LOG_EVICTION_BATCH: usize = 100;

/// Where a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
    /// Lifecycle messages emitted by the supervisor itself.
    Supervisor,
}

impl LogStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Supervisor => "supervisor",
        }
    }
}

/// A single captured log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub stream: LogStream,
    pub text: String,
}

impl LogLine {
    pub fn new(stream: LogStream, text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            stream,
            text: text.into(),
        }
    }

    pub fn supervisor(text: impl Into<String>) -> Self {
        Self::new(LogStream::Supervisor, text)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stream == LogStream::Stderr {
            write!(f, "[ERROR] {}", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

/// Ordered, bounded log buffer.
///
/// Overflow evicts a whole batch of the oldest lines at once, so a full
/// buffer shrinks to `capacity - batch + 1` lines rather than sliding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    lines: Vec<LogLine>,
    capacity: usize,
    batch: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self::with_limits(LOG_BUFFER_CAPACITY, LOG_EVICTION_BATCH)
    }

    pub const fn with_limits(capacity: usize, batch: usize) -> Self {
        Self {
            lines: Vec::new(),
            capacity,
            batch,
        }
    }

    pub fn push(&mut self, line: LogLine) {
        self.lines.push(line);
        if self.lines.len() > self.capacity {
            let evict = self.batch.min(self.lines.len());
            self.lines.drain(..evict);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines whose rendered text contains `needle`, ignoring case.
    ///
    /// An empty needle matches everything.
    pub fn filter<'a>(&'a self, needle: &str) -> impl Iterator<Item = &'a LogLine> + 'a {
        let needle = needle.to_lowercase();
        self.lines
            .iter()
            .filter(move |line| needle.is_empty() || line.to_string().to_lowercase().contains(&needle))
    }
}
