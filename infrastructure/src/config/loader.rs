//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::Path;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. `RHIZOME_*` environment variables
    /// 3. Project root: `./rhizome.toml` or `./.rhizome.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Project-level config files (check both names)
        for filename in &["rhizome.toml", ".rhizome.toml"] {
            let path = Path::new(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(path));
                break;
            }
        }

        figment = figment.merge(Env::prefixed("RHIZOME_"));

        // Explicit config path (highest priority)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for hosts that skip file discovery)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }
}
