//! Result of comparing two versions of a bill.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingChangeKind {
    Added,
    Removed,
}

/// A dollar amount found on an added or removed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingChange {
    #[serde(rename = "type")]
    pub kind: SpendingChangeKind,
    pub amount: String,
    pub amount_numeric: Option<f64>,
    /// The changed line, trimmed and truncated for display.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionChangeKind {
    Added,
    Removed,
    Modified,
    /// Matched by caption similarity after the heading was renumbered.
    Renamed,
}

impl SectionChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Renamed => "renamed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionChange {
    pub section: String,
    #[serde(rename = "type")]
    pub kind: SectionChangeKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Insert,
    Delete,
    Replace,
}

/// A maximal run of changed lines between two unchanged regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffBlock {
    pub kind: BlockKind,
    /// First line index in version A.
    pub a_start: usize,
    pub a_len: usize,
    /// First line index in version B.
    pub b_start: usize,
    pub b_len: usize,
    /// `2 * matched_chars / (len_a + len_b)` over the block's text.
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Lines present only in version B.
    pub additions_count: usize,
    /// Lines present only in version A.
    pub removals_count: usize,
    pub matched_section_pairs: usize,
    /// Character-level similarity of the two texts, 1.0 for identical.
    pub similarity_ratio: f64,
    pub spending_diff: Vec<SpendingChange>,
    pub changes: Vec<SectionChange>,
    pub blocks: Vec<DiffBlock>,
    /// Added lines for display; capped, unlike `additions_count`.
    pub added_lines: Vec<String>,
    /// Removed lines for display; capped, unlike `removals_count`.
    pub removed_lines: Vec<String>,
    pub funding_total_a: f64,
    pub funding_total_b: f64,
}

impl Comparison {
    pub fn spending_added(&self) -> impl Iterator<Item = &SpendingChange> {
        self.spending_diff
            .iter()
            .filter(|s| s.kind == SpendingChangeKind::Added)
    }

    pub fn spending_removed(&self) -> impl Iterator<Item = &SpendingChange> {
        self.spending_diff
            .iter()
            .filter(|s| s.kind == SpendingChangeKind::Removed)
    }

    /// Net change in parsed funding from A to B.
    pub fn funding_delta(&self) -> f64 {
        self.funding_total_b - self.funding_total_a
    }

    pub fn is_identical(&self) -> bool {
        self.additions_count == 0 && self.removals_count == 0
    }
}
