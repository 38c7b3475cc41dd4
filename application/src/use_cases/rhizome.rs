//! Rhizome - the aggregate holding all shared state
//!
//! The rhizome is not a scheduler; it holds the compost pile, the agent
//! handles, and the human input log, and hands them to the beat cycle. All
//! activation decisions happen mechanically in the Gardener and the beat
//! phases based on precondition satisfaction.

use crate::agent::{Agent, AgentHandle};
use crate::config::RhizomeConfig;
use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::backend::Backend;
use crate::use_cases::beat::{BeatError, run_beat};
use rhizome_domain::{BeatRecord, CompostPile, HumanInput};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors from loading persisted state at startup.
#[derive(Error, Debug)]
pub enum InitializeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Corrupt compost data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Shared substrate for multi-agent orchestration.
///
/// Owns every piece of runtime state; nothing here is global. All methods
/// take `&self`: internal locks are scoped to single fields, beats are
/// serialized by an internal gate, and reads stay lock-free where a beat
/// may be in flight.
pub struct Rhizome {
    config: RhizomeConfig,
    backend: Arc<dyn Backend>,
    store: Arc<dyn ArtifactStore>,
    compost: CompostPile,
    handles: RwLock<Vec<Arc<AgentHandle>>>,
    humanity: RwLock<Vec<HumanInput>>,
    beat_count: AtomicU64,
    human_cursor: AtomicUsize,
    // Held for the duration of a beat so beats never overlap
    beat_gate: tokio::sync::Mutex<()>,
    cancellation: CancellationToken,
}

impl Rhizome {
    pub fn new(
        config: RhizomeConfig,
        backend: Arc<dyn Backend>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            backend,
            store,
            compost: CompostPile::new(),
            handles: RwLock::new(Vec::new()),
            humanity: RwLock::new(Vec::new()),
            beat_count: AtomicU64::new(0),
            human_cursor: AtomicUsize::new(0),
            beat_gate: tokio::sync::Mutex::new(()),
            cancellation: CancellationToken::new(),
        }
    }

    /// Load the persisted compost pile if the store has one.
    pub async fn initialize(&self) -> Result<(), InitializeError> {
        if let Some(json) = self.store.read_file(self.store.compost_path()).await? {
            self.compost.load_json(&json)?;
            info!("Loaded {} persisted compost entries", self.compost.len());
        }
        Ok(())
    }

    /// Register an agent and return its handle. Registration order is the
    /// order the beat phases walk agents in.
    pub fn register(&self, agent: Agent) -> Arc<AgentHandle> {
        let handle = Arc::new(AgentHandle::new(Arc::new(agent)));
        info!(
            "Registered agent '{}' as {}{}",
            handle.name(),
            handle.id(),
            if handle.agent.background {
                " (background)"
            } else {
                ""
            }
        );
        self.handles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&handle));
        handle
    }

    /// Record human input. The next beat's interrupt phase will see it.
    pub fn human_input(&self, content: impl Into<String>) -> HumanInput {
        let input = HumanInput::new(content);
        debug!("Human input recorded: {}", input.content);
        self.humanity
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(input.clone());
        input
    }

    /// Whether input arrived since the last beat processed the log.
    pub fn has_unprocessed_human_input(&self) -> bool {
        self.human_cursor.load(Ordering::Acquire) < self.humanity_len()
    }

    /// Advance the cursor past everything currently in the log.
    pub fn mark_human_input_processed(&self) {
        self.human_cursor.store(self.humanity_len(), Ordering::Release);
    }

    /// Run one beat. Beats are serialized: a second caller waits for the
    /// first beat to finish.
    pub async fn beat(&self) -> Result<BeatRecord, BeatError> {
        let _gate = self.beat_gate.lock().await;
        run_beat(self, self.config.concurrency).await
    }

    /// Run beats until quiescence or `max_beats`.
    ///
    /// Quiescent means the beat just run killed, activated, and completed
    /// nothing, and no unprocessed human input is waiting. Failures alone
    /// do not keep the loop alive.
    pub async fn run(&self, max_beats: Option<usize>) -> Result<Vec<BeatRecord>, BeatError> {
        let mut records = Vec::new();

        while max_beats.is_none_or(|max| records.len() < max) {
            let record = self.beat().await?;
            let quiescent = !record.has_activity() && !self.has_unprocessed_human_input();
            records.push(record);
            if quiescent {
                break;
            }
        }

        Ok(records)
    }

    pub fn config(&self) -> &RhizomeConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn store(&self) -> &dyn ArtifactStore {
        self.store.as_ref()
    }

    pub fn compost(&self) -> &CompostPile {
        &self.compost
    }

    /// Current handles in registration order.
    pub fn handles(&self) -> Vec<Arc<AgentHandle>> {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy of the human input log in arrival order.
    pub fn humanity_snapshot(&self) -> Vec<HumanInput> {
        self.humanity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of the next beat to run.
    pub fn beat_count(&self) -> u64 {
        self.beat_count.load(Ordering::Acquire)
    }

    pub(crate) fn increment_beat_count(&self) {
        self.beat_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Host shutdown signal. Cancelling it makes the next phase boundary
    /// abort with [`BeatError::Cancelled`] and is forwarded to actions as
    /// a child token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    fn humanity_len(&self) -> usize {
        self.humanity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for Rhizome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rhizome")
            .field("config", &self.config)
            .field("agents", &self.handles().len())
            .field("beat_count", &self.beat_count())
            .finish()
    }
}
