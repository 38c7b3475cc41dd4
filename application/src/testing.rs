//! Shared test doubles
//!
//! Compiled only under `cfg(test)`. The structs here stand in for the
//! infrastructure adapters so use-case tests run entirely in memory.

use crate::agent::{Agent, AgentContext, AgentError, AgentProgram};
use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::backend::{Backend, BackendError};
use crate::ports::requirement::{
    PredicateRequirement, Requirement, RequirementError, ValidationResult,
};
use crate::use_cases::rhizome::Rhizome;
use async_trait::async_trait;
use rhizome_domain::{CompostEntry, SnapshotSection, StateSnapshot};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Backend that answers every prompt with an empty string.
#[derive(Default)]
pub struct NullBackend;

#[async_trait]
impl Backend for NullBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        Ok(String::new())
    }
}

/// In-memory artifact store with a dirty flag standing in for a working
/// tree. Commits hand out sequential `mem-<n>` ids.
pub struct ScratchStore {
    files: Mutex<BTreeMap<String, String>>,
    dirty: AtomicBool,
    commits: AtomicUsize,
}

impl ScratchStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            dirty: AtomicBool::new(false),
            commits: AtomicUsize::new(0),
        }
    }

    /// Place a file without dirtying the store, as if it was committed
    /// before the test began.
    pub fn seed_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }
}

#[async_trait]
impl ArtifactStore for ScratchStore {
    async fn read_file(&self, path: &str) -> Result<Option<String>, StoreError> {
        Ok(self.files.lock().unwrap().get(path).cloned())
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), StoreError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<(), StoreError> {
        if self.files.lock().unwrap().remove(path).is_some() {
            self.dirty.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }

    async fn commit(&self, _message: &str) -> Result<Option<String>, StoreError> {
        if self.dirty.swap(false, Ordering::SeqCst) {
            let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Some(format!("mem-{n}")))
        } else {
            Ok(None)
        }
    }

    async fn diff(&self) -> Result<String, StoreError> {
        if self.dirty.load(Ordering::SeqCst) {
            Ok("uncommitted changes".to_string())
        } else {
            Ok(String::new())
        }
    }

    fn compost_path(&self) -> &str {
        ".rhizome/compost.json"
    }
}

/// Action that returns immediately.
pub struct NoopProgram;

#[async_trait]
impl AgentProgram for NoopProgram {
    async fn run(
        &self,
        _rhizome: &Rhizome,
        _backend: &dyn Backend,
        _ctx: AgentContext,
    ) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Action that always fails with the given message.
pub struct FailingProgram {
    message: String,
}

impl FailingProgram {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl AgentProgram for FailingProgram {
    async fn run(
        &self,
        _rhizome: &Rhizome,
        _backend: &dyn Backend,
        _ctx: AgentContext,
    ) -> Result<(), AgentError> {
        Err(self.message.clone().into())
    }
}

/// Action that records how many copies of itself ran at the same time.
pub struct CountingProgram {
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

impl CountingProgram {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        }
    }

    pub fn high_water(&self) -> &AtomicUsize {
        &self.high_water
    }
}

#[async_trait]
impl AgentProgram for CountingProgram {
    async fn run(
        &self,
        _rhizome: &Rhizome,
        _backend: &dyn Backend,
        _ctx: AgentContext,
    ) -> Result<(), AgentError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        // Long enough that overlapping runs actually overlap
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Action that drops one entry into the compost pile.
pub struct PileWriterProgram {
    key: String,
    content: String,
}

impl PileWriterProgram {
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl AgentProgram for PileWriterProgram {
    async fn run(
        &self,
        rhizome: &Rhizome,
        _backend: &dyn Backend,
        _ctx: AgentContext,
    ) -> Result<(), AgentError> {
        rhizome
            .compost()
            .add(CompostEntry::new(&self.key, &self.content, "test"));
        Ok(())
    }
}

/// Requirement whose evaluation always fails.
pub struct ErroringRequirement {
    message: String,
}

impl ErroringRequirement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Requirement for ErroringRequirement {
    fn description(&self) -> &str {
        "erroring check"
    }

    async fn validate(
        &self,
        _backend: &dyn Backend,
        _snapshot: &StateSnapshot,
    ) -> Result<ValidationResult, RequirementError> {
        Err(RequirementError(self.message.clone()))
    }
}

pub fn noop_agent(name: impl Into<String>) -> Agent {
    Agent::new(name, Arc::new(NoopProgram))
}

pub fn agent_with_needs(name: impl Into<String>, needs: Vec<Arc<dyn Requirement>>) -> Agent {
    let mut agent = Agent::new(name, Arc::new(NoopProgram));
    for need in needs {
        agent = agent.with_need(need);
    }
    agent
}

/// Requirement satisfied once an active compost entry with `key` exists,
/// judged against the snapshot text the way a real validator would see it.
pub fn requires_compost_key(key: impl Into<String>) -> Arc<dyn Requirement> {
    let key = key.into();
    let description = format!("compost entry '{key}' exists");
    Arc::new(PredicateRequirement::new(description, move |snapshot| {
        let needle = format!("] {key}: ");
        match snapshot.section(SnapshotSection::Compost) {
            Some(text) if text.contains(&needle) => ValidationResult::satisfied(),
            _ => ValidationResult::unsatisfied(format!("no compost entry '{key}'")),
        }
    }))
}
