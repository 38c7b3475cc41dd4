//! Runtime agent types - definitions, handles, and action programs
//!
//! An [`Agent`] is an immutable definition: what it needs, what it promises,
//! and the action it runs. An [`AgentHandle`] is the mutable runtime
//! instance tracking one agent's position in the lifecycle state machine.
//! The split keeps registration data frozen while statuses move.

use crate::ports::backend::Backend;
use crate::ports::requirement::Requirement;
use crate::use_cases::rhizome::Rhizome;
use async_trait::async_trait;
use rhizome_domain::{AgentStatus, DomainError, StateSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

/// Open error type for agent action bodies.
///
/// Whatever an action returns here becomes data: the scheduler renders the
/// error chain into the handle and the compost pile, never propagating it.
pub type AgentError = Box<dyn std::error::Error + Send + Sync>;

/// Unique identifier for an agent handle.
///
/// Twelve lowercase hex characters, stable for the handle's lifetime and
/// embedded in the compost keys the scheduler writes about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(String);

impl HandleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id from nanosecond time mixed with a process-local
    /// counter, so rapid successive handles never collide.
    pub fn generate() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mixed = nanos ^ count.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self(format!("{:012x}", mixed & 0xffff_ffff_ffff))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only context handed to an action when it starts.
#[derive(Debug, Clone)]
pub struct AgentContext {
    /// Situational view of the rhizome at invocation time
    pub snapshot: StateSnapshot,
    /// Fires when the host is shutting down; long actions should watch it
    pub cancellation: CancellationToken,
}

/// The executable body of an agent.
///
/// Actions receive the rhizome for compost and store access, the backend
/// for generation, and a point-in-time context. They must not touch agent
/// statuses - lifecycle bookkeeping belongs to the scheduler alone.
#[async_trait]
pub trait AgentProgram: Send + Sync {
    async fn run(
        &self,
        rhizome: &Rhizome,
        backend: &dyn Backend,
        ctx: AgentContext,
    ) -> Result<(), AgentError>;
}

/// Immutable agent definition.
///
/// Built once with the `with_*` methods and never mutated after
/// registration; all runtime state lives on the [`AgentHandle`].
pub struct Agent {
    pub name: String,
    /// Preconditions the Gardener must see satisfied before activation
    pub needs: Vec<Arc<dyn Requirement>>,
    /// Advisory postconditions checked after completion
    pub abilities: Vec<Arc<dyn Requirement>>,
    /// The action to execute
    pub program: Arc<dyn AgentProgram>,
    /// Background agents skip need evaluation and run at the start of
    /// every beat while dormant; they are exempt from interrupts
    pub background: bool,
}

impl Agent {
    pub fn new(name: impl Into<String>, program: Arc<dyn AgentProgram>) -> Self {
        Self {
            name: name.into(),
            needs: Vec::new(),
            abilities: Vec::new(),
            program,
            background: false,
        }
    }

    pub fn with_need(mut self, requirement: Arc<dyn Requirement>) -> Self {
        self.needs.push(requirement);
        self
    }

    pub fn with_ability(mut self, requirement: Arc<dyn Requirement>) -> Self {
        self.abilities.push(requirement);
        self
    }

    /// Mark this agent as a background agent.
    ///
    /// Background handles are one-shot: dispatched on the first beat after
    /// registration, and never re-armed once terminal.
    pub fn as_background(mut self) -> Self {
        self.background = true;
        self
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("needs", &self.needs.len())
            .field("abilities", &self.abilities.len())
            .field("background", &self.background)
            .finish()
    }
}

/// Mutable runtime instance of a registered agent.
///
/// Status starts at [`AgentStatus::Dormant`] and only moves along edges the
/// transition table allows. Only the scheduler and the Gardener call
/// [`AgentHandle::transition`]; each handle is driven by at most one task
/// at a time, and views read statuses concurrently.
pub struct AgentHandle {
    pub agent: Arc<Agent>,
    id: HandleId,
    status: RwLock<AgentStatus>,
    error: RwLock<Option<String>>,
}

impl AgentHandle {
    pub fn new(agent: Arc<Agent>) -> Self {
        Self {
            agent,
            id: HandleId::generate(),
            status: RwLock::new(AgentStatus::Dormant),
            error: RwLock::new(None),
        }
    }

    pub fn id(&self) -> &HandleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.agent.name
    }

    pub fn status(&self) -> AgentStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Rendered error chain of the last failed run, if any.
    pub fn error(&self) -> Option<String> {
        self.error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_error(&self, text: impl Into<String>) {
        *self.error.write().unwrap_or_else(PoisonError::into_inner) = Some(text.into());
    }

    /// Move the handle to `to`, enforcing the lifecycle transition table.
    ///
    /// The check and the write happen under one lock, so an illegal edge
    /// never leaves a partial change: on error the status is untouched.
    pub fn transition(&self, to: AgentStatus) -> Result<(), DomainError> {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if !status.can_transition(to) {
            return Err(DomainError::InvalidTransition {
                agent: self.agent.name.clone(),
                from: *status,
                to,
            });
        }
        *status = to;
        Ok(())
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("agent", &self.agent.name)
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}
