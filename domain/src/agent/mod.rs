//! Agent domain module
//!
//! Contains the agent lifecycle state machine. The runtime agent types
//! (definitions, handles, programs) live in the application layer, where
//! they can see the scheduler; the domain only owns the transition rules.

pub mod status;

pub use status::AgentStatus;
