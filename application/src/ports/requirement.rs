//! Requirement port - declarative conditions over scheduler state
//!
//! Requirements serve two roles: as an agent's *needs* (preconditions the
//! Gardener checks before activation) and as its *abilities* (advisory
//! postconditions checked after completion). The same trait covers both.

use async_trait::async_trait;
use rhizome_domain::StateSnapshot;
use thiserror::Error;

use super::backend::Backend;

/// Failure while *evaluating* a requirement (as opposed to the requirement
/// being unsatisfied, which [`ValidationResult`] expresses).
///
/// Evaluation failures are never swallowed by the scheduler: a requirement
/// that cannot be checked makes activation undecidable, so the error
/// propagates out of the beat.
#[derive(Error, Debug)]
#[error("Requirement evaluation failed: {0}")]
pub struct RequirementError(pub String);

/// Outcome of checking one requirement against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub satisfied: bool,
    /// Optional explanation, mostly useful when unsatisfied
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            reason: None,
        }
    }

    pub fn unsatisfied(reason: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            reason: Some(reason.into()),
        }
    }
}

/// A condition over scheduler state.
///
/// `validate` receives a read-only snapshot plus the generative backend, so
/// implementations range from cheap predicates to judge-style checks that
/// call the backend. Returning `Err` means the check itself could not run.
#[async_trait]
pub trait Requirement: Send + Sync {
    /// Human-readable statement of the condition, used in warnings.
    fn description(&self) -> &str;

    async fn validate(
        &self,
        backend: &dyn Backend,
        snapshot: &StateSnapshot,
    ) -> Result<ValidationResult, RequirementError>;
}

/// Requirement backed by a synchronous predicate over the snapshot.
///
/// Covers the common case where a condition is a structural check (a
/// compost key exists, human input is present) and needs no backend.
pub struct PredicateRequirement<F>
where
    F: Fn(&StateSnapshot) -> ValidationResult + Send + Sync,
{
    description: String,
    predicate: F,
}

impl<F> PredicateRequirement<F>
where
    F: Fn(&StateSnapshot) -> ValidationResult + Send + Sync,
{
    pub fn new(description: impl Into<String>, predicate: F) -> Self {
        Self {
            description: description.into(),
            predicate,
        }
    }
}

#[async_trait]
impl<F> Requirement for PredicateRequirement<F>
where
    F: Fn(&StateSnapshot) -> ValidationResult + Send + Sync,
{
    fn description(&self) -> &str {
        &self.description
    }

    async fn validate(
        &self,
        _backend: &dyn Backend,
        snapshot: &StateSnapshot,
    ) -> Result<ValidationResult, RequirementError> {
        Ok((self.predicate)(snapshot))
    }
}
