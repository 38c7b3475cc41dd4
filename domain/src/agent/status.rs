//! Agent lifecycle status and transition rules

use serde::{Deserialize, Serialize};

/// Lifecycle status of an agent handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Registered, waiting for preconditions to be satisfied
    #[default]
    Dormant,
    /// Preconditions satisfied, scheduled for execution
    Pending,
    /// Action currently in flight
    Running,
    /// Action returned normally
    Completed,
    /// Action raised an error
    Failed,
    /// Terminated by a human interrupt before or during execution
    Killed,
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Dormant => "dormant",
            AgentStatus::Pending => "pending",
            AgentStatus::Running => "running",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
            AgentStatus::Killed => "killed",
        }
    }

    /// The complete set of statuses reachable from this one.
    ///
    /// Terminal statuses have no outgoing edges; once an agent is
    /// completed, failed, or killed its status never changes again.
    pub fn allowed_targets(&self) -> &'static [AgentStatus] {
        match self {
            AgentStatus::Dormant => &[AgentStatus::Pending, AgentStatus::Killed],
            AgentStatus::Pending => &[AgentStatus::Running, AgentStatus::Killed],
            AgentStatus::Running => &[
                AgentStatus::Completed,
                AgentStatus::Failed,
                AgentStatus::Killed,
            ],
            AgentStatus::Completed | AgentStatus::Failed | AgentStatus::Killed => &[],
        }
    }

    pub fn can_transition(&self, to: AgentStatus) -> bool {
        self.allowed_targets().contains(&to)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentStatus::Completed | AgentStatus::Failed | AgentStatus::Killed
        )
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AgentStatus; 6] = [
        AgentStatus::Dormant,
        AgentStatus::Pending,
        AgentStatus::Running,
        AgentStatus::Completed,
        AgentStatus::Failed,
        AgentStatus::Killed,
    ];

    #[test]
    fn test_dormant_edges() {
        assert!(AgentStatus::Dormant.can_transition(AgentStatus::Pending));
        assert!(AgentStatus::Dormant.can_transition(AgentStatus::Killed));
        assert!(!AgentStatus::Dormant.can_transition(AgentStatus::Running));
        assert!(!AgentStatus::Dormant.can_transition(AgentStatus::Completed));
        assert!(!AgentStatus::Dormant.can_transition(AgentStatus::Failed));
        assert!(!AgentStatus::Dormant.can_transition(AgentStatus::Dormant));
    }

    #[test]
    fn test_pending_edges() {
        assert!(AgentStatus::Pending.can_transition(AgentStatus::Running));
        assert!(AgentStatus::Pending.can_transition(AgentStatus::Killed));
        assert!(!AgentStatus::Pending.can_transition(AgentStatus::Completed));
        assert!(!AgentStatus::Pending.can_transition(AgentStatus::Dormant));
    }

    #[test]
    fn test_running_edges() {
        assert!(AgentStatus::Running.can_transition(AgentStatus::Completed));
        assert!(AgentStatus::Running.can_transition(AgentStatus::Failed));
        assert!(AgentStatus::Running.can_transition(AgentStatus::Killed));
        assert!(!AgentStatus::Running.can_transition(AgentStatus::Pending));
        assert!(!AgentStatus::Running.can_transition(AgentStatus::Dormant));
    }

    #[test]
    fn test_terminal_statuses_have_no_edges() {
        for terminal in [
            AgentStatus::Completed,
            AgentStatus::Failed,
            AgentStatus::Killed,
        ] {
            assert!(terminal.is_terminal());
            for target in ALL {
                assert!(
                    !terminal.can_transition(target),
                    "{terminal} should not reach {target}"
                );
            }
        }
    }

    #[test]
    fn test_non_terminal_statuses() {
        assert!(!AgentStatus::Dormant.is_terminal());
        assert!(!AgentStatus::Pending.is_terminal());
        assert!(!AgentStatus::Running.is_terminal());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&AgentStatus::Dormant).unwrap();
        assert_eq!(json, "\"dormant\"");
        let back: AgentStatus = serde_json::from_str("\"killed\"").unwrap();
        assert_eq!(back, AgentStatus::Killed);
    }
}
