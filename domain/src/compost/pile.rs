//! Compost pile - keyed, insertion-ordered entry log

use super::entry::CompostEntry;
use crate::core::error::DomainError;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Entries in insertion order plus a key index into them.
///
/// Re-adding an existing key replaces the entry in place, keeping its
/// original position; ordering queries sort by timestamp with insertion
/// order breaking ties.
#[derive(Debug, Default)]
struct PileInner {
    index: HashMap<String, usize>,
    entries: Vec<CompostEntry>,
}

impl PileInner {
    /// Insert or replace by key without touching supersession state.
    fn upsert(&mut self, entry: CompostEntry) {
        match self.index.get(&entry.key) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

/// The shared knowledge substrate.
///
/// Mutators take the internal write lock and are mutually exclusive;
/// queries take the read lock and run concurrently. No method holds a lock
/// across an await point - every operation here is synchronous.
#[derive(Debug, Default)]
pub struct CompostPile {
    inner: RwLock<PileInner>,
}

impl CompostPile {
    pub fn new() -> Self {
        Self::default()
    }

    // Pile operations never panic while holding the lock, so a poisoned
    // guard still holds consistent data.
    fn read(&self) -> RwLockReadGuard<'_, PileInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PileInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an entry, upserting by key.
    ///
    /// If the entry declares `supersedes` and that key currently exists,
    /// the superseded entry is marked stale first. Superseding the entry's
    /// own key therefore degrades to a plain replacement.
    pub fn add(&self, entry: CompostEntry) {
        let mut inner = self.write();
        if let Some(target) = &entry.supersedes
            && let Some(&pos) = inner.index.get(target)
        {
            inner.entries[pos].stale = true;
        }
        inner.upsert(entry);
    }

    /// Replace the content of an existing entry and refresh its timestamp.
    ///
    /// Stale entries can be updated; the key only has to be present.
    pub fn update(&self, key: &str, content: impl Into<String>) -> Result<(), DomainError> {
        let mut inner = self.write();
        let Some(&pos) = inner.index.get(key) else {
            return Err(DomainError::KeyNotFound {
                key: key.to_string(),
            });
        };
        let entry = &mut inner.entries[pos];
        entry.content = content.into();
        entry.timestamp = chrono::Utc::now();
        Ok(())
    }

    /// Mark the entry under `key` stale. Silently does nothing when the key
    /// is absent.
    pub fn remove(&self, key: &str) {
        let mut inner = self.write();
        if let Some(&pos) = inner.index.get(key) {
            inner.entries[pos].stale = true;
        }
    }

    /// Fetch the entry under `key` if it exists and is not stale.
    pub fn get(&self, key: &str) -> Option<CompostEntry> {
        let inner = self.read();
        let &pos = inner.index.get(key)?;
        let entry = &inner.entries[pos];
        if entry.stale { None } else { Some(entry.clone()) }
    }

    /// Entries filtered by author and staleness, ordered by timestamp
    /// ascending (ties keep insertion order).
    pub fn query(&self, author: Option<&str>, include_stale: bool) -> Vec<CompostEntry> {
        let inner = self.read();
        let mut entries: Vec<CompostEntry> = inner
            .entries
            .iter()
            .filter(|e| include_stale || !e.stale)
            .filter(|e| author.is_none_or(|a| e.author == a))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        entries
    }

    /// All non-stale entries in timestamp order.
    pub fn active_entries(&self) -> Vec<CompostEntry> {
        self.query(None, false)
    }

    /// Every entry including stale ones, in timestamp order.
    pub fn all_entries(&self) -> Vec<CompostEntry> {
        self.query(None, true)
    }

    /// Number of entries, stale included.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Serialize every entry (stale included) in insertion order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let inner = self.read();
        serde_json::to_string_pretty(&inner.entries)
    }

    /// Rebuild a pile from [`CompostPile::to_json`] output.
    ///
    /// Stale flags and supersession links are restored as recorded; no
    /// supersession logic is re-applied. When the data holds the same key
    /// twice the later element wins, as repeated adds would.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let pile = Self::new();
        pile.load_json(json)?;
        Ok(pile)
    }

    /// Replace this pile's contents with entries parsed from `json`.
    pub fn load_json(&self, json: &str) -> serde_json::Result<()> {
        let entries: Vec<CompostEntry> = serde_json::from_str(json)?;
        let mut inner = self.write();
        inner.index.clear();
        inner.entries.clear();
        for entry in entries {
            inner.upsert(entry);
        }
        Ok(())
    }
}
