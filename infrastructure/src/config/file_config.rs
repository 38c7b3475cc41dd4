//! Raw TOML configuration data types
//!
//! This struct represents the exact structure of `rhizome.toml`. Every
//! field has a default so a partial file (or no file at all) works.

use rhizome_application::RhizomeConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Workspace root for the artifact store
    pub root: Option<PathBuf>,
    /// How many agent actions may run simultaneously during a beat
    pub concurrency: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            root: None,
            concurrency: RhizomeConfig::DEFAULT_CONCURRENCY,
        }
    }
}

impl FileConfig {
    /// Resolve into a runtime config. `fallback_root` is used when neither
    /// the file nor the environment named a root.
    pub fn into_rhizome_config(self, fallback_root: impl Into<PathBuf>) -> RhizomeConfig {
        let root = self.root.unwrap_or_else(|| fallback_root.into());
        RhizomeConfig::new(root).with_concurrency(self.concurrency)
    }
}
