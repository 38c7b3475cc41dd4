//! Gardener - mechanical precondition evaluation
//!
//! The Gardener does not decide whether an agent should run; that decision
//! was made at registration, encoded as the agent's needs. It only checks
//! whether those needs are currently satisfied.

use crate::agent::AgentHandle;
use crate::use_cases::beat::BeatError;
use crate::use_cases::rhizome::Rhizome;
use crate::views;
use rhizome_domain::AgentStatus;
use std::sync::Arc;
use tracing::debug;

/// Stateless need-checker run once per beat.
pub struct Gardener;

impl Gardener {
    /// Check every dormant agent's needs against one shared evaluation
    /// snapshot, in registration order. Returns the handles that moved to
    /// [`AgentStatus::Pending`].
    ///
    /// Needs are validated in declaration order and evaluation stops at
    /// the first unsatisfied one. A need that *fails to evaluate* is not
    /// treated as unsatisfied: activation is undecidable at that point, so
    /// the error aborts the whole beat.
    pub async fn evaluate(&self, rhizome: &Rhizome) -> Result<Vec<Arc<AgentHandle>>, BeatError> {
        let snapshot = views::evaluation(rhizome).await;
        let mut activated = Vec::new();

        let dormant: Vec<Arc<AgentHandle>> = rhizome
            .handles()
            .into_iter()
            .filter(|h| h.status() == AgentStatus::Dormant)
            .collect();

        for handle in dormant {
            if handle.agent.needs.is_empty() {
                // No preconditions, activate immediately
                handle.transition(AgentStatus::Pending)?;
                debug!("Agent '{}' activated (no needs)", handle.name());
                activated.push(handle);
                continue;
            }

            let mut all_satisfied = true;
            for need in &handle.agent.needs {
                let result = need
                    .validate(rhizome.backend(), &snapshot)
                    .await
                    .map_err(|source| BeatError::PreconditionEvaluation {
                        agent: handle.name().to_string(),
                        requirement: need.description().to_string(),
                        source,
                    })?;
                if !result.satisfied {
                    debug!(
                        "Agent '{}' need unsatisfied: {}",
                        handle.name(),
                        need.description()
                    );
                    all_satisfied = false;
                    break;
                }
            }

            if all_satisfied {
                handle.transition(AgentStatus::Pending)?;
                debug!("Agent '{}' activated (all needs satisfied)", handle.name());
                activated.push(handle);
            }
        }

        Ok(activated)
    }
}
