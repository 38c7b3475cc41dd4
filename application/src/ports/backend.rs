//! Generative backend port
//!
//! Defines the interface for text generation. The scheduler itself never
//! generates anything; the backend is threaded through to agent actions and
//! requirement validators, which may use it or ignore it.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Text-generation capability handed to agents and requirements.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}
