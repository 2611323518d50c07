//! Append-only log of successful bakes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One successful bake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Name of the recipe that was baked
    pub item: String,
    /// When the bake was committed
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(item: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            item: item.into(),
            timestamp,
        }
    }
}

/// Bake events in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub(crate) fn append(&mut self, entry: HistoryEntry) -> &HistoryEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Entry with the latest timestamp; on a tie the later insertion wins.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .fold(None, |best: Option<&HistoryEntry>, entry| match best {
                Some(b) if b.timestamp > entry.timestamp => Some(b),
                _ => Some(entry),
            })
    }
}

impl FromIterator<HistoryEntry> for HistoryLog {
    fn from_iter<T: IntoIterator<Item = HistoryEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
