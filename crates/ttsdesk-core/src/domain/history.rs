//! Synthesis history.
//!
//! Items are kept newest-first. Truncation always drops from the tail,
//! so the retained items are the most recent ones.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One retained synthesis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: Uuid,
    pub text: String,
    pub audio: Bytes,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    /// Known once the audio has been decoded for playback.
    pub duration: Option<Duration>,
}

impl HistoryItem {
    pub fn new(
        text: impl Into<String>,
        model: impl Into<String>,
        audio: Bytes,
        duration: Option<Duration>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            audio,
            timestamp: Utc::now(),
            model: model.into(),
            duration,
        }
    }
}

/// Retention policy for new history items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    pub enabled: bool,
    pub max_items: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: crate::settings::DEFAULT_MAX_HISTORY_ITEMS,
        }
    }
}

/// Newest-first list of history items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    items: Vec<HistoryItem>,
}

impl History {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert `item` at the front, then trim the oldest items past the cap.
    ///
    /// Does nothing when the policy disables retention.
    pub fn record(&mut self, item: HistoryItem, policy: HistoryPolicy) {
        if !policy.enabled {
            return;
        }
        self.items.insert(0, item);
        self.items.truncate(policy.max_items);
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub const fn len(&self) -> usize {
        self.items.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> HistoryItem {
        HistoryItem::new(text, "model", Bytes::from_static(b"RIFF"), None)
    }

    const fn policy(max_items: usize) -> HistoryPolicy {
        HistoryPolicy {
            enabled: true,
            max_items,
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = History::new();
        history.record(item("one"), policy(10));
        history.record(item("two"), policy(10));
        let texts: Vec<_> = history.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "one"]);
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let mut history = History::new();
        for n in 0..8 {
            history.record(item(&n.to_string()), policy(3));
        }
        let texts: Vec<_> = history.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["7", "6", "5"]);
    }

    #[test]
    fn test_disabled_policy_leaves_items_alone() {
        let mut history = History::new();
        history.record(item("kept"), policy(5));
        history.record(
            item("dropped"),
            HistoryPolicy {
                enabled: false,
                max_items: 5,
            },
        );
        assert_eq!(history.len(), 1);
        assert_eq!(history.items()[0].text, "kept");
    }

    #[test]
    fn test_lookup_by_id() {
        let mut history = History::new();
        let first = item("first");
        let id = first.id;
        history.record(first, policy(5));
        history.record(item("second"), policy(5));
        assert_eq!(history.get(id).map(|i| i.text.as_str()), Some("first"));
        assert!(history.get(Uuid::new_v4()).is_none());
    }
}
