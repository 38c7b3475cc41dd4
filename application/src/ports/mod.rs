//! Port definitions (interfaces for external adapters)
//!
//! Ports are the seams through which the scheduler reaches the outside
//! world. Implementations live in the infrastructure layer; the core never
//! constructs one itself.

pub mod artifact_store;
pub mod backend;
pub mod requirement;

pub use artifact_store::{ArtifactStore, StoreError};
pub use backend::{Backend, BackendError};
pub use requirement::{PredicateRequirement, Requirement, RequirementError, ValidationResult};
