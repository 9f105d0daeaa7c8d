use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    client::storage::{KeyValueStore, StorageResult},
    models::history::HistoryEntry,
};

pub const HISTORY_KEY: &str = "signHistory";

/// Append-only log of signing attempts, oldest first. Every append writes the
/// whole sequence back to the store.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Opens the history and loads whatever the store already holds.
    pub fn open(store: Arc<dyn KeyValueStore>) -> StorageResult<Self> {
        let entries = Self::read(store.as_ref())?;
        info!("Loaded {} history entries", entries.len());
        Ok(Self { store, entries })
    }

    /// Reads the persisted sequence. Missing data is an empty history and so is
    /// data that no longer parses; the next append replaces it.
    pub fn load(&self) -> StorageResult<Vec<HistoryEntry>> {
        Self::read(self.store.as_ref())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: HistoryEntry) -> StorageResult<()> {
        self.entries.push(entry);
        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self) -> StorageResult<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &serialized)
    }

    fn read(store: &dyn KeyValueStore) -> StorageResult<Vec<HistoryEntry>> {
        let Some(raw) = store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(error = %e, "Stored history is malformed, starting empty");
                Ok(Vec::new())
            }
        }
    }
}
