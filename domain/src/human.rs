//! Human input records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message injected by a human operator.
///
/// Inputs accumulate in arrival order and are never removed; the scheduler
/// tracks how far it has processed with a cursor rather than draining the
/// log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanInput {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl HumanInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_content_and_time() {
        let input = HumanInput::new("ship it");
        assert_eq!(input.content, "ship it");
        assert!(input.timestamp <= Utc::now());
    }
}
