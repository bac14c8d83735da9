use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::warn;

use crate::build::BuildResult;
use crate::Result;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;
pub const HISTORY_STORAGE_KEY: &str = "lol_rb_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub build: BuildResult,
}

/// Caller-supplied string store the history is persisted into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Bounded log of past builds, newest first.
///
/// Overflow evicts the oldest entry. Identical builds are kept as separate
/// entries.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, build: BuildResult) {
        self.record_at(build, Utc::now());
    }

    pub fn record_at(&mut self, build: BuildResult, timestamp: DateTime<Utc>) {
        self.entries.push_front(HistoryEntry { timestamp, build });
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read persisted history. Missing, unreadable or malformed data gives
    /// an empty history rather than an error.
    pub fn load(store: &dyn KeyValueStore, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);

        let raw = match store.get(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return history,
            Err(err) => {
                warn!(error = %err, "could not read persisted history");
                return history;
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => {
                history.entries = entries.into_iter().take(history.capacity).collect();
            }
            Err(err) => warn!(error = %err, "ignoring malformed persisted history"),
        }

        history
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        let data = serde_json::to_string(&entries)?;
        store.set(HISTORY_STORAGE_KEY, data)
    }
}
