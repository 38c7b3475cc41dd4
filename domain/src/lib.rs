//! Domain layer for rhizome
//!
//! This crate contains the core entities and value objects of the rhizome
//! scheduler. It has no dependencies on infrastructure or host concerns.
//!
//! # Core Concepts
//!
//! ## Compost Pile
//!
//! The shared knowledge substrate: an append-mostly log of keyed entries.
//! Entries are never physically deleted during normal operation; they decay
//! by being marked *stale*, either explicitly or by a newer entry that
//! supersedes them.
//!
//! ## Agent Lifecycle
//!
//! Agents move through a strict state machine:
//!
//! - **Dormant**: registered, waiting for preconditions
//! - **Pending**: preconditions satisfied, scheduled for execution
//! - **Running**: action in flight
//! - **Completed / Failed / Killed**: terminal
//!
//! All status changes are validated against the transition table; an illegal
//! edge is rejected without modifying the current status.

pub mod agent;
pub mod beat;
pub mod compost;
pub mod core;
pub mod human;
pub mod snapshot;
pub mod util;

// Re-export commonly used types
pub use agent::status::AgentStatus;
pub use beat::BeatRecord;
pub use compost::{CompostEntry, CompostPile};
pub use core::error::DomainError;
pub use human::HumanInput;
pub use snapshot::{SnapshotBlock, SnapshotSection, StateSnapshot};
