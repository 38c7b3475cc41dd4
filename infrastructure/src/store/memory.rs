//! In-memory artifact store
//!
//! For tests, demos, and hosts that embed a rhizome without a git work
//! tree. Checkpoints are sequence numbers, not snapshots: only the latest
//! state is kept, and every write counts as a change even when the content
//! is identical.

use async_trait::async_trait;
use rhizome_application::ports::artifact_store::{ArtifactStore, StoreError};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

const COMPOST_PATH: &str = ".rhizome/compost.json";

#[derive(Default)]
pub struct InMemoryStore {
    files: RwLock<HashMap<String, String>>,
    changed: RwLock<BTreeSet<String>>,
    commits: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, String>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn files_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, String>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_changed(&self, path: &str) {
        self.changed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string());
    }
}

#[async_trait]
impl ArtifactStore for InMemoryStore {
    async fn read_file(&self, path: &str) -> Result<Option<String>, StoreError> {
        Ok(self.files().get(path).cloned())
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), StoreError> {
        self.files_mut().insert(path.to_string(), content.to_string());
        self.mark_changed(path);
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<(), StoreError> {
        if self.files_mut().remove(path).is_some() {
            self.mark_changed(path);
        }
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let mut files: Vec<String> = self.files().keys().cloned().collect();
        files.sort();
        Ok(files)
    }

    async fn commit(&self, _message: &str) -> Result<Option<String>, StoreError> {
        let mut changed = self
            .changed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if changed.is_empty() {
            return Ok(None);
        }
        changed.clear();
        let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(format!("mem-{n}")))
    }

    async fn diff(&self) -> Result<String, StoreError> {
        let changed = self
            .changed
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(changed
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn compost_path(&self) -> &str {
        COMPOST_PATH
    }
}
