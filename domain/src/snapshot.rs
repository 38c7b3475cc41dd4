//! State snapshots - read-only views handed to agents and requirements

use serde::{Deserialize, Serialize};

/// Category of information a snapshot block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSection {
    /// Compost pile contents
    Compost,
    /// Human input history
    Human,
    /// Agent roster and statuses
    Agents,
    /// Workspace file listing or count
    Files,
    /// Anything else (diagnostics, degraded-store notices)
    Note,
}

/// One rendered block of snapshot text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBlock {
    pub section: SnapshotSection,
    pub text: String,
}

/// A read-only, point-in-time rendering of scheduler state.
///
/// Snapshots are plain data: building one never blocks a live structure,
/// and nothing an agent does to a snapshot feeds back into the scheduler.
/// Precondition evaluation and action execution receive differently shaped
/// snapshots built from the same sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    blocks: Vec<SnapshotBlock>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: SnapshotSection, text: impl Into<String>) {
        self.blocks.push(SnapshotBlock {
            section,
            text: text.into(),
        });
    }

    pub fn blocks(&self) -> &[SnapshotBlock] {
        &self.blocks
    }

    /// Text of the first block in the given section, if any.
    pub fn section(&self, section: SnapshotSection) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.section == section)
            .map(|b| b.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Join all blocks into one text, blank line between blocks.
    pub fn render(&self) -> String {
        if self.blocks.is_empty() {
            return "(empty rhizome)".to_string();
        }
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl std::fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_renders_placeholder() {
        let snapshot = StateSnapshot::new();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.render(), "(empty rhizome)");
    }

    #[test]
    fn section_lookup_finds_first_block() {
        let mut snapshot = StateSnapshot::new();
        snapshot.push(SnapshotSection::Agents, "Agents: 2 total");
        snapshot.push(SnapshotSection::Human, "Recent human inputs:\n  hi");

        assert_eq!(snapshot.section(SnapshotSection::Agents), Some("Agents: 2 total"));
        assert!(snapshot.section(SnapshotSection::Compost).is_none());
    }

    #[test]
    fn render_joins_blocks_with_blank_lines() {
        let mut snapshot = StateSnapshot::new();
        snapshot.push(SnapshotSection::Compost, "=== Compost Pile ===");
        snapshot.push(SnapshotSection::Agents, "=== Agents ===");
        assert_eq!(snapshot.render(), "=== Compost Pile ===\n\n=== Agents ===");
    }
}
