//! Artifact store adapters

mod git;
mod memory;

pub use git::GitWorkspace;
pub use memory::InMemoryStore;
