//! Compost entry - a single keyed record in the pile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single record in the compost pile.
///
/// Entries are immutable once added except for two fields the pile itself
/// manages: `content`/`timestamp` (via update) and `stale` (via removal or
/// supersession). The `_stale` JSON name is part of the persisted format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompostEntry {
    /// Unique key within the pile, e.g. `echo:last_input`
    pub key: String,
    /// Payload text
    pub content: String,
    /// Who wrote the entry (an agent name, `beat`, or a host label)
    pub author: String,
    /// Creation time, refreshed on update
    pub timestamp: DateTime<Utc>,
    /// Key of an entry this one replaces; that entry is marked stale on add
    #[serde(default)]
    pub supersedes: Option<String>,
    /// Soft-deletion marker; stale entries stay visible in history views
    #[serde(rename = "_stale", default)]
    pub stale: bool,
}

impl CompostEntry {
    pub fn new(key: impl Into<String>, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            author: author.into(),
            timestamp: Utc::now(),
            supersedes: None,
            stale: false,
        }
    }

    /// Declare that this entry replaces the current entry under `key`.
    pub fn with_supersedes(mut self, key: impl Into<String>) -> Self {
        self.supersedes = Some(key.into());
        self
    }

    /// Override the creation timestamp (hosts replaying history, tests).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
