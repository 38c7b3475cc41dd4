//! Runtime configuration for a rhizome instance

use std::path::PathBuf;

/// Host-facing configuration.
///
/// `root` is where the artifact store lives; `concurrency` bounds how many
/// agent actions run simultaneously during a beat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhizomeConfig {
    pub root: PathBuf,
    pub concurrency: usize,
}

impl RhizomeConfig {
    pub const DEFAULT_CONCURRENCY: usize = 4;

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }

    /// Override the execution bound. Zero is treated as one; a beat must
    /// always be able to run at least one action.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}
