//! Snapshot builders - the read models handed to agents and requirements
//!
//! Three views over the same state, each shaped for its consumer:
//!
//! - [`situational`]: compact summary for running actions
//! - [`evaluation`]: full active state for requirement validation
//! - [`anthology`]: complete history including superseded entries
//!
//! Every view copies data out of the live structures; nothing a consumer
//! does with a snapshot feeds back into the scheduler.

use crate::use_cases::rhizome::Rhizome;
use chrono::{DateTime, SecondsFormat, Utc};
use rhizome_domain::util::truncate_chars;
use rhizome_domain::{AgentStatus, SnapshotSection, StateSnapshot};

fn format_ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Compact summary view: agent counts, recent compost, recent human input,
/// tracked-file count. This is what an action sees when it starts.
pub async fn situational(rhizome: &Rhizome) -> StateSnapshot {
    let mut snapshot = StateSnapshot::new();

    let handles = rhizome.handles();
    let active = handles.iter().filter(|h| !h.is_terminal()).count();
    let dormant = handles
        .iter()
        .filter(|h| h.status() == AgentStatus::Dormant)
        .count();
    let running = handles
        .iter()
        .filter(|h| h.status() == AgentStatus::Running)
        .count();
    snapshot.push(
        SnapshotSection::Agents,
        format!(
            "Agents: {} total, {} active, {} dormant, {} running",
            handles.len(),
            active,
            dormant,
            running
        ),
    );

    let entries = rhizome.compost().active_entries();
    if !entries.is_empty() {
        let start = entries.len().saturating_sub(10);
        let mut lines = vec!["Recent compost entries:".to_string()];
        for e in &entries[start..] {
            lines.push(format!(
                "  [{}] {}: {}",
                e.author,
                e.key,
                truncate_chars(&e.content, 200)
            ));
        }
        snapshot.push(SnapshotSection::Compost, lines.join("\n"));
    }

    let humanity = rhizome.humanity_snapshot();
    if !humanity.is_empty() {
        let start = humanity.len().saturating_sub(5);
        let mut lines = vec!["Recent human inputs:".to_string()];
        for h in &humanity[start..] {
            lines.push(format!("  [{}] {}", format_ts(&h.timestamp), h.content));
        }
        snapshot.push(SnapshotSection::Human, lines.join("\n"));
    }

    match rhizome.store().list_files().await {
        Ok(files) => snapshot.push(
            SnapshotSection::Files,
            format!("Environment: {} tracked files", files.len()),
        ),
        Err(_) => snapshot.push(SnapshotSection::Note, "Environment: not initialized"),
    }

    snapshot
}

/// Full-state view for requirement validation: every active compost entry,
/// the whole human input history, up to 50 tracked files, and each agent's
/// status. The Gardener builds one per beat; postcondition checks build a
/// fresh one per completed handle.
pub async fn evaluation(rhizome: &Rhizome) -> StateSnapshot {
    let mut snapshot = StateSnapshot::new();

    let entries = rhizome.compost().active_entries();
    if !entries.is_empty() {
        let mut lines = vec!["=== Compost Pile ===".to_string()];
        for e in &entries {
            lines.push(format!("[{}] {}: {}", e.author, e.key, e.content));
        }
        snapshot.push(SnapshotSection::Compost, lines.join("\n"));
    }

    let humanity = rhizome.humanity_snapshot();
    if !humanity.is_empty() {
        let mut lines = vec!["=== Human Inputs ===".to_string()];
        for h in &humanity {
            lines.push(format!("[{}] {}", format_ts(&h.timestamp), h.content));
        }
        snapshot.push(SnapshotSection::Human, lines.join("\n"));
    }

    // A store that cannot list files is simply absent from this view
    if let Ok(files) = rhizome.store().list_files().await
        && !files.is_empty()
    {
        let mut lines = vec![format!("=== Environment ({} files) ===", files.len())];
        for f in files.iter().take(50) {
            lines.push(format!("  {f}"));
        }
        snapshot.push(SnapshotSection::Files, lines.join("\n"));
    }

    let mut lines = vec!["=== Agents ===".to_string()];
    for h in rhizome.handles() {
        lines.push(format!("  {} [{}]", h.name(), h.status()));
    }
    snapshot.push(SnapshotSection::Agents, lines.join("\n"));

    snapshot
}

/// Complete pile history in chronological order, one block per entry,
/// superseded entries marked. For hosts inspecting what happened.
pub fn anthology(rhizome: &Rhizome) -> StateSnapshot {
    let mut snapshot = StateSnapshot::new();
    for entry in rhizome.compost().all_entries() {
        let stale_marker = if entry.stale { " [superseded]" } else { "" };
        snapshot.push(
            SnapshotSection::Compost,
            format!(
                "[{}] {} -> {}{}\n{}",
                format_ts(&entry.timestamp),
                entry.author,
                entry.key,
                stale_marker,
                entry.content
            ),
        );
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RhizomeConfig;
    use crate::testing::{NullBackend, ScratchStore, noop_agent};
    use rhizome_domain::CompostEntry;
    use std::sync::Arc;

    fn rhizome_with_store(store: Arc<ScratchStore>) -> Rhizome {
        Rhizome::new(
            RhizomeConfig::new("."),
            Arc::new(NullBackend::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_situational_summarizes_counts_and_recent_entries() {
        let store = Arc::new(ScratchStore::new());
        let rhizome = rhizome_with_store(store);
        rhizome.register(noop_agent("alpha"));
        rhizome.register(noop_agent("beta"));
        rhizome.compost().add(CompostEntry::new("k", "v", "alpha"));
        rhizome.human_input("hello");

        let snapshot = situational(&rhizome).await;
        let agents = snapshot.section(SnapshotSection::Agents).unwrap();
        assert_eq!(agents, "Agents: 2 total, 2 active, 2 dormant, 0 running");

        let compost = snapshot.section(SnapshotSection::Compost).unwrap();
        assert!(compost.contains("[alpha] k: v"));

        let human = snapshot.section(SnapshotSection::Human).unwrap();
        assert!(human.contains("hello"));

        let files = snapshot.section(SnapshotSection::Files).unwrap();
        assert!(files.contains("0 tracked files"));
    }

    #[tokio::test]
    async fn test_situational_truncates_long_content() {
        let store = Arc::new(ScratchStore::new());
        let rhizome = rhizome_with_store(store);
        let long = "x".repeat(500);
        rhizome.compost().add(CompostEntry::new("big", long, "a"));

        let snapshot = situational(&rhizome).await;
        let compost = snapshot.section(SnapshotSection::Compost).unwrap();
        assert!(!compost.contains(&"x".repeat(201)));
        assert!(compost.contains(&"x".repeat(200)));
    }

    #[tokio::test]
    async fn test_evaluation_includes_full_state() {
        let store = Arc::new(ScratchStore::new());
        store.seed_file("notes.md", "hi");
        let rhizome = rhizome_with_store(store);
        rhizome.register(noop_agent("alpha"));
        rhizome.compost().add(CompostEntry::new("k", "v", "alpha"));
        rhizome.human_input("first");
        rhizome.human_input("second");

        let snapshot = evaluation(&rhizome).await;
        assert!(
            snapshot
                .section(SnapshotSection::Compost)
                .unwrap()
                .starts_with("=== Compost Pile ===")
        );
        let human = snapshot.section(SnapshotSection::Human).unwrap();
        assert!(human.contains("first") && human.contains("second"));
        assert!(
            snapshot
                .section(SnapshotSection::Files)
                .unwrap()
                .contains("notes.md")
        );
        assert!(
            snapshot
                .section(SnapshotSection::Agents)
                .unwrap()
                .contains("alpha [dormant]")
        );
    }

    #[tokio::test]
    async fn test_evaluation_omits_human_section_when_empty() {
        let store = Arc::new(ScratchStore::new());
        let rhizome = rhizome_with_store(store);
        let snapshot = evaluation(&rhizome).await;
        assert!(snapshot.section(SnapshotSection::Human).is_none());
        // Agent roster is always present, even when empty
        assert!(snapshot.section(SnapshotSection::Agents).is_some());
    }

    #[tokio::test]
    async fn test_anthology_marks_superseded_entries() {
        let store = Arc::new(ScratchStore::new());
        let rhizome = rhizome_with_store(store);
        rhizome.compost().add(CompostEntry::new("v1", "draft", "a"));
        rhizome
            .compost()
            .add(CompostEntry::new("v2", "final", "a").with_supersedes("v1"));

        let snapshot = anthology(&rhizome);
        assert_eq!(snapshot.blocks().len(), 2);
        let rendered = snapshot.render();
        assert!(rendered.contains("v1 [superseded]"));
        assert!(!rendered.contains("v2 [superseded]"));
    }
}
