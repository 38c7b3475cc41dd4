//! Beat records - per-cycle scheduler outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything that happened during one scheduler beat.
///
/// Names are agent names, recorded in the order events occurred within
/// their phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatRecord {
    pub beat_number: u64,
    pub timestamp: DateTime<Utc>,
    /// Agents killed by a human interrupt
    pub killed: Vec<String>,
    /// Agents whose preconditions were satisfied this beat
    pub activated: Vec<String>,
    /// Agents whose actions returned normally
    pub completed: Vec<String>,
    /// Agents whose actions raised an error
    pub failed: Vec<String>,
    /// Advisory postcondition findings, one line each
    pub postcondition_warnings: Vec<String>,
    /// Identifier of the persistence commit, when anything changed
    pub commit_id: Option<String>,
}

impl BeatRecord {
    pub fn new(beat_number: u64) -> Self {
        Self {
            beat_number,
            timestamp: Utc::now(),
            killed: Vec::new(),
            activated: Vec::new(),
            completed: Vec::new(),
            failed: Vec::new(),
            postcondition_warnings: Vec::new(),
            commit_id: None,
        }
    }

    /// Whether this beat moved any agent through its lifecycle.
    ///
    /// Failures are not activity: a run whose only remaining events are
    /// failures has settled.
    pub fn has_activity(&self) -> bool {
        !self.killed.is_empty() || !self.activated.is_empty() || !self.completed.is_empty()
    }
}
