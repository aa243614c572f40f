//! Incremental printing of the coordinator's log buffer.

use ttsdesk_core::{LogBuffer, LogLine};

/// Remembers the last line shown so each state update prints only what
/// arrived since.
#[derive(Debug, Default)]
pub struct LogFollower {
    last: Option<LogLine>,
}

impl LogFollower {
    /// Lines of `logs` not yet returned by a previous call.
    ///
    /// If the last seen line has been evicted or cleared, the whole buffer
    /// counts as new.
    pub fn take_new<'a>(&mut self, logs: &'a LogBuffer) -> &'a [LogLine] {
        let lines = logs.lines();
        let start = self
            .last
            .as_ref()
            .and_then(|last| lines.iter().rposition(|line| line == last))
            .map_or(0, |i| i + 1);

        let fresh = &lines[start..];
        if let Some(line) = fresh.last() {
            self.last = Some(line.clone());
        }
        fresh
    }
}
