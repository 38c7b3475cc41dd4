//! Fixed-reply generative backend

use async_trait::async_trait;
use rhizome_application::ports::backend::{Backend, BackendError};

/// Backend that answers every prompt with the same canned reply.
///
/// Enough for rhizomes whose requirements are all predicate-based; the
/// scheduler itself never generates anything.
pub struct StubBackend {
    reply: String,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            reply: "stub".to_string(),
        }
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        Ok(self.reply.clone())
    }
}
