//! Configuration file loading for rhizome
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `RHIZOME_*` environment variables
//! 3. Project root: `./rhizome.toml` or `./.rhizome.toml`
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::FileConfig;
pub use loader::ConfigLoader;
