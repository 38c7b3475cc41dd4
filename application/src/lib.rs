//! Application layer for rhizome
//!
//! This crate contains the beat scheduler, port definitions, agent runtime
//! types, and the snapshot views. It depends only on the domain layer.

pub mod agent;
pub mod config;
pub mod ports;
pub mod use_cases;
pub mod views;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use agent::{Agent, AgentContext, AgentError, AgentHandle, AgentProgram, HandleId};
pub use config::RhizomeConfig;
pub use ports::{
    artifact_store::{ArtifactStore, StoreError},
    backend::{Backend, BackendError},
    requirement::{PredicateRequirement, Requirement, RequirementError, ValidationResult},
};
pub use use_cases::beat::BeatError;
pub use use_cases::gardener::Gardener;
pub use use_cases::rhizome::{InitializeError, Rhizome};
