//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod beat;
pub mod gardener;
pub mod rhizome;
