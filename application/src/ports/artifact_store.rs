//! Artifact store port
//!
//! The workspace where agents build their artifact: a file tree with
//! checkpoint commits. The compost pile is persisted into the same store at
//! the end of every beat, so a commit captures artifact and pile together.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Versioned file workspace for agent artifacts.
///
/// Paths are store-relative, forward-slash strings. Implementations live in
/// the infrastructure layer (git work tree, in-memory map).
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read a file's content, `None` if the path does not exist.
    async fn read_file(&self, path: &str) -> Result<Option<String>, StoreError>;

    /// Write a file, creating parent directories as needed.
    async fn write_file(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// Delete a file. Silently does nothing when the path does not exist.
    async fn delete_file(&self, path: &str) -> Result<(), StoreError>;

    /// All tracked file paths, in the store's stable order.
    async fn list_files(&self) -> Result<Vec<String>, StoreError>;

    /// Checkpoint the current state. Returns the new checkpoint id, or
    /// `None` when nothing changed since the last checkpoint.
    async fn commit(&self, message: &str) -> Result<Option<String>, StoreError>;

    /// Uncommitted changes in a human-readable form.
    async fn diff(&self) -> Result<String, StoreError>;

    /// Store-relative path where the compost pile is persisted.
    fn compost_path(&self) -> &str;
}
