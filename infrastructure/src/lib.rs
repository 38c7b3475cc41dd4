//! Infrastructure layer for rhizome
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod store;

// Re-export commonly used types
pub use backend::StubBackend;
pub use config::{ConfigLoader, FileConfig};
pub use store::{GitWorkspace, InMemoryStore};
