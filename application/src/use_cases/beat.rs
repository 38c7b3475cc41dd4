//! Beat scheduler - one deterministic pass through the rhizome
//!
//! Every beat runs six phases in a fixed order:
//!
//! 1. Interrupt: unprocessed human input kills runnable foreground agents
//! 2. Background dispatch: dormant background agents run, needs unchecked
//! 3. Gardener evaluation: dormant agents with satisfied needs activate
//! 4. Bounded execution: pending agents run, at most `concurrency` at once
//! 5. Postcondition assertion: advisory checks on agents completed this beat
//! 6. Persist: summary entry, pile snapshot to the store, checkpoint commit
//!
//! Action failures are data (the agent fails, the beat continues).
//! Precondition *evaluation* failures are errors (the beat aborts). Killing
//! is cooperative: a kill marks the handle and the scheduler stops awaiting
//! it, but an in-flight action body is never preempted.

use crate::agent::{AgentContext, AgentHandle};
use crate::ports::artifact_store::StoreError;
use crate::ports::requirement::RequirementError;
use crate::use_cases::gardener::Gardener;
use crate::use_cases::rhizome::Rhizome;
use crate::views;
use futures::StreamExt;
use futures::stream;
use rhizome_domain::{AgentStatus, BeatRecord, CompostEntry, DomainError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a beat.
#[derive(Error, Debug)]
pub enum BeatError {
    /// A need could not be evaluated. Activation is undecidable, so this
    /// propagates instead of being recorded as an agent failure.
    #[error("Precondition evaluation failed for agent '{agent}' ({requirement})")]
    PreconditionEvaluation {
        agent: String,
        requirement: String,
        #[source]
        source: RequirementError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Compost persistence error: {0}")]
    Persistence(#[from] serde_json::Error),

    #[error("Lifecycle violation: {0}")]
    Transition(#[from] DomainError),

    #[error("Beat cancelled")]
    Cancelled,
}

/// What one agent run produced, applied to the record at the join point.
enum RunOutcome {
    Completed(Arc<AgentHandle>),
    Failed(Arc<AgentHandle>),
}

fn check_cancelled(rhizome: &Rhizome) -> Result<(), BeatError> {
    if rhizome.cancellation_token().is_cancelled() {
        return Err(BeatError::Cancelled);
    }
    Ok(())
}

/// Execute one beat. The caller (the rhizome aggregate) guarantees beats
/// never overlap.
pub async fn run_beat(rhizome: &Rhizome, concurrency: usize) -> Result<BeatRecord, BeatError> {
    let mut record = BeatRecord::new(rhizome.beat_count());
    let has_new_human_input = rhizome.has_unprocessed_human_input();
    debug!("Beat {} starting", record.beat_number);
    check_cancelled(rhizome)?;

    // Phase 1: Interrupt
    if has_new_human_input {
        for handle in rhizome.handles() {
            if matches!(handle.status(), AgentStatus::Running | AgentStatus::Pending)
                && !handle.agent.background
            {
                handle.transition(AgentStatus::Killed)?;
                warn!("Agent '{}' killed by human interrupt", handle.name());
                record.killed.push(handle.name().to_string());
                rhizome.compost().add(CompostEntry::new(
                    format!("beat:{}:killed:{}", record.beat_number, handle.id()),
                    format!("Agent '{}' killed by human interrupt", handle.name()),
                    "beat",
                ));
            }
        }
    }
    // The cursor advances whether or not anything was killed: one
    // interrupt drains all input accumulated since the last beat.
    rhizome.mark_human_input_processed();
    check_cancelled(rhizome)?;

    let mut completed_this_beat: Vec<Arc<AgentHandle>> = Vec::new();

    // Phase 2: Background agents, sequential, needs never evaluated
    let background: Vec<Arc<AgentHandle>> = rhizome
        .handles()
        .into_iter()
        .filter(|h| h.agent.background && h.status() == AgentStatus::Dormant)
        .collect();
    for handle in &background {
        handle.transition(AgentStatus::Pending)?;
    }
    for handle in &background {
        let outcome = run_agent(rhizome, handle).await?;
        apply_outcome(outcome, &mut record, &mut completed_this_beat);
    }
    check_cancelled(rhizome)?;

    // Phase 3: Gardener evaluation
    let activated = Gardener.evaluate(rhizome).await?;
    for handle in &activated {
        record.activated.push(handle.name().to_string());
    }
    check_cancelled(rhizome)?;

    // Phase 4: Bounded concurrent execution
    let pending: Vec<Arc<AgentHandle>> = rhizome
        .handles()
        .into_iter()
        .filter(|h| h.status() == AgentStatus::Pending)
        .collect();
    if !pending.is_empty() {
        debug!(
            "Beat {} running {} pending agents (bound {})",
            record.beat_number,
            pending.len(),
            concurrency
        );
        let runs = pending.iter().map(|handle| run_agent(rhizome, handle));
        // Drain every run before touching the results: a lifecycle
        // violation must not cancel sibling actions mid-flight.
        let results: Vec<Result<RunOutcome, BeatError>> = stream::iter(runs)
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
        for result in results {
            apply_outcome(result?, &mut record, &mut completed_this_beat);
        }
    }
    check_cancelled(rhizome)?;

    // Phase 5: Postcondition assertion, advisory only
    for handle in &completed_this_beat {
        if handle.agent.abilities.is_empty() {
            continue;
        }
        let snapshot = views::evaluation(rhizome).await;
        for ability in &handle.agent.abilities {
            match ability.validate(rhizome.backend(), &snapshot).await {
                Ok(result) if !result.satisfied => {
                    let description = if ability.description().is_empty() {
                        "unnamed requirement"
                    } else {
                        ability.description()
                    };
                    let warning = format!(
                        "Postcondition not met for '{}': {}",
                        handle.name(),
                        description
                    );
                    warn!("{}", warning);
                    record.postcondition_warnings.push(warning.clone());
                    rhizome.compost().add(CompostEntry::new(
                        format!(
                            "beat:{}:postcondition_warning:{}",
                            record.beat_number,
                            handle.id()
                        ),
                        warning,
                        "beat",
                    ));
                }
                Ok(_) => {}
                Err(err) => {
                    let warning =
                        format!("Postcondition check failed for '{}': {}", handle.name(), err);
                    warn!("{}", warning);
                    record.postcondition_warnings.push(warning);
                }
            }
        }
    }
    check_cancelled(rhizome)?;

    // Phase 6: Persist
    let mut summary_lines = vec![format!("Beat {} summary:", record.beat_number)];
    if !record.killed.is_empty() {
        summary_lines.push(format!("  Killed: {}", record.killed.join(", ")));
    }
    if !record.activated.is_empty() {
        summary_lines.push(format!("  Activated: {}", record.activated.join(", ")));
    }
    if !record.completed.is_empty() {
        summary_lines.push(format!("  Completed: {}", record.completed.join(", ")));
    }
    if !record.failed.is_empty() {
        summary_lines.push(format!("  Failed: {}", record.failed.join(", ")));
    }
    if !record.postcondition_warnings.is_empty() {
        summary_lines.push(format!(
            "  Postcondition warnings: {}",
            record.postcondition_warnings.len()
        ));
    }
    rhizome.compost().add(CompostEntry::new(
        format!("beat:{}:summary", record.beat_number),
        summary_lines.join("\n"),
        "beat",
    ));

    let pile_json = rhizome.compost().to_json()?;
    let store = rhizome.store();
    store.write_file(store.compost_path(), &pile_json).await?;
    record.commit_id = store
        .commit(&format!("beat {}", record.beat_number))
        .await?;

    rhizome.increment_beat_count();
    info!(
        "Beat {} done: {} killed, {} activated, {} completed, {} failed",
        record.beat_number,
        record.killed.len(),
        record.activated.len(),
        record.completed.len(),
        record.failed.len()
    );
    Ok(record)
}

fn apply_outcome(
    outcome: RunOutcome,
    record: &mut BeatRecord,
    completed_this_beat: &mut Vec<Arc<AgentHandle>>,
) {
    match outcome {
        RunOutcome::Completed(handle) => {
            record.completed.push(handle.name().to_string());
            completed_this_beat.push(handle);
        }
        RunOutcome::Failed(handle) => record.failed.push(handle.name().to_string()),
    }
}

/// Run one agent's action, converting any body failure into data.
///
/// The only fallible path out of here is a lifecycle violation, which can
/// only mean something outside the scheduler corrupted the state machine.
async fn run_agent(
    rhizome: &Rhizome,
    handle: &Arc<AgentHandle>,
) -> Result<RunOutcome, BeatError> {
    handle.transition(AgentStatus::Running)?;
    debug!("Agent '{}' running", handle.name());

    let ctx = AgentContext {
        snapshot: views::situational(rhizome).await,
        cancellation: rhizome.cancellation_token().child_token(),
    };

    match handle
        .agent
        .program
        .run(rhizome, rhizome.backend(), ctx)
        .await
    {
        Ok(()) => {
            handle.transition(AgentStatus::Completed)?;
            debug!("Agent '{}' completed", handle.name());
            Ok(RunOutcome::Completed(Arc::clone(handle)))
        }
        Err(err) => {
            let rendered = render_error_chain(err.as_ref());
            warn!("Agent '{}' failed: {}", handle.name(), rendered);
            handle.set_error(&rendered);
            handle.transition(AgentStatus::Failed)?;
            rhizome.compost().add(CompostEntry::new(
                format!("agent:{}:error", handle.id()),
                format!("Agent '{}' failed: {}", handle.name(), rendered),
                handle.name(),
            ));
            Ok(RunOutcome::Failed(Arc::clone(handle)))
        }
    }
}

/// Render an error and its source chain, one cause per line.
fn render_error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
