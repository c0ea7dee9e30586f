//! Version-to-version comparison of a bill.
//!
//! Both versions are rebuilt from their chunks and diffed line by line. Changed
//! runs become [`DiffBlock`]s, dollar amounts on changed lines become the
//! spending diff, and chunks are grouped into sections by structural key so
//! that section-level changes can be reported alongside the line counts.

use std::collections::HashMap;

use porkchop_core::heading::heading_caption;
use porkchop_core::{
    BlockKind, Chunk, Comparison, DiffBlock, DocumentFacts, SectionChange, SectionChangeKind,
    SpendingChange, SpendingChangeKind,
};
use porkchop_extract::find_amounts;
use tracing::info;

use crate::changelog::{format_delta, format_dollars};
use crate::similarity::token_similarity;

/// Added/removed lines kept for display. Counts are never capped.
pub const DISPLAY_LINE_CAP: usize = 100;
/// Characters of a changed line kept as spending context.
pub const SPENDING_CONTEXT_CHARS: usize = 200;
/// Largest block (both sides, in chars) given a character-level ratio.
pub const BLOCK_CHAR_LIMIT: usize = 4_000;
/// Minimum caption similarity for pairing renumbered sections.
pub const RENAME_SIMILARITY: f64 = 0.6;

/// Lines of the heading region searched for a caption.
const CAPTION_SCAN_LINES: usize = 5;

/// Compare version A of a bill against version B.
pub fn compare(
    chunks_a: &[Chunk],
    facts_a: &DocumentFacts,
    chunks_b: &[Chunk],
    facts_b: &DocumentFacts,
) -> Comparison {
    let text_a = reconstruct(chunks_a);
    let text_b = reconstruct(chunks_b);
    let lines_a: Vec<&str> = text_a.lines().collect();
    let lines_b: Vec<&str> = text_b.lines().collect();

    let mut comparison = Comparison {
        funding_total_a: facts_a.funding_total(),
        funding_total_b: facts_b.funding_total(),
        ..Default::default()
    };

    let (mut matched_chars, blocks) = diff_lines(&mut comparison, &lines_a, &lines_b);
    for block in blocks {
        let a = &lines_a[block.a_start..block.a_start + block.a_len];
        let b = &lines_b[block.b_start..block.b_start + block.b_len];
        let (block_ratio, matched) = block_similarity(a, b);
        matched_chars += matched;
        comparison.blocks.push(DiffBlock {
            ratio: block_ratio,
            ..block
        });
    }
    comparison.similarity_ratio = ratio(matched_chars, char_len(&lines_a), char_len(&lines_b));

    let sections_a = sections(chunks_a, facts_a);
    let sections_b = sections(chunks_b, facts_b);
    let (matched_pairs, changes) = align_sections(&sections_a, &sections_b);
    comparison.matched_section_pairs = matched_pairs;
    comparison.changes = changes;

    info!(
        additions = comparison.additions_count,
        removals = comparison.removals_count,
        blocks = comparison.blocks.len(),
        matched_sections = comparison.matched_section_pairs,
        section_changes = comparison.changes.len(),
        similarity = comparison.similarity_ratio,
        "compared bill versions"
    );
    comparison
}

/// Document text in read order. Chunks partition the cleaned text, so this is
/// the cleaned text itself.
fn reconstruct(chunks: &[Chunk]) -> String {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.position);
    ordered.iter().map(|c| c.text.as_str()).collect()
}

fn char_len(lines: &[&str]) -> usize {
    lines.iter().map(|l| l.chars().count()).sum()
}

fn record_line(comparison: &mut Comparison, kind: SpendingChangeKind, line: &str) {
    let (count, shown) = match kind {
        SpendingChangeKind::Added => (&mut comparison.additions_count, &mut comparison.added_lines),
        SpendingChangeKind::Removed => (&mut comparison.removals_count, &mut comparison.removed_lines),
    };
    *count += 1;
    if shown.len() < DISPLAY_LINE_CAP {
        shown.push(line.to_string());
    }

    let context: String = line.trim().chars().take(SPENDING_CONTEXT_CHARS).collect();
    for amount in find_amounts(line) {
        comparison.spending_diff.push(SpendingChange {
            kind,
            amount: amount.text,
            amount_numeric: amount.numeric,
            text: context.clone(),
        });
    }
}

/// Line diff of the two versions.
///
/// Every added and removed line is recorded on `comparison`. Returns the
/// characters on unchanged lines and the maximal runs of changed lines;
/// block ratios are left for the caller.
fn diff_lines(
    comparison: &mut Comparison,
    lines_a: &[&str],
    lines_b: &[&str],
) -> (usize, Vec<DiffBlock>) {
    let mut matched_chars = 0;
    let mut blocks = Vec::new();
    let mut open: Option<DiffBlock> = None;
    let (mut a_idx, mut b_idx) = (0, 0);

    for step in diff::slice(lines_a, lines_b) {
        match step {
            diff::Result::Both(line, _) => {
                matched_chars += line.chars().count();
                blocks.extend(open.take());
                a_idx += 1;
                b_idx += 1;
            }
            diff::Result::Left(line) => {
                record_line(comparison, SpendingChangeKind::Removed, line);
                open_block(&mut open, a_idx, b_idx).a_len += 1;
                a_idx += 1;
            }
            diff::Result::Right(line) => {
                record_line(comparison, SpendingChangeKind::Added, line);
                open_block(&mut open, a_idx, b_idx).b_len += 1;
                b_idx += 1;
            }
        }
    }
    blocks.extend(open);

    for block in &mut blocks {
        block.kind = match (block.a_len > 0, block.b_len > 0) {
            (true, true) => BlockKind::Replace,
            (false, _) => BlockKind::Insert,
            (true, false) => BlockKind::Delete,
        };
    }
    (matched_chars, blocks)
}

fn open_block(open: &mut Option<DiffBlock>, a_start: usize, b_start: usize) -> &mut DiffBlock {
    open.get_or_insert(DiffBlock {
        kind: BlockKind::Replace,
        a_start,
        a_len: 0,
        b_start,
        b_len: 0,
        ratio: 0.0,
    })
}

/// Character-level ratio of a changed block and the characters it matched.
///
/// Pure insertions and deletions score 0. Blocks larger than
/// [`BLOCK_CHAR_LIMIT`] keep the line-level view, where nothing matched.
fn block_similarity(a: &[&str], b: &[&str]) -> (f64, usize) {
    if a.is_empty() || b.is_empty() {
        return (0.0, 0);
    }
    let a: Vec<char> = a.iter().flat_map(|l| l.chars()).collect();
    let b: Vec<char> = b.iter().flat_map(|l| l.chars()).collect();
    if a.len() + b.len() > BLOCK_CHAR_LIMIT {
        return (0.0, 0);
    }
    let matched = diff::slice(&a, &b)
        .iter()
        .filter(|step| matches!(step, diff::Result::Both(..)))
        .count();
    (ratio(matched, a.len(), b.len()), matched)
}

/// `2 * matched / (len_a + len_b)`, or 1.0 when both sides are empty.
fn ratio(matched: usize, len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    2.0 * matched as f64 / total as f64
}

// ── Sections ──

/// All chunks of one structural key, merged.
#[derive(Debug)]
struct Section {
    key: String,
    caption: Option<String>,
    text: String,
    funding_items: usize,
    funding: f64,
}

fn sections(chunks: &[Chunk], facts: &DocumentFacts) -> Vec<Section> {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.position);

    let mut sections: Vec<Section> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut by_chunk: HashMap<&str, usize> = HashMap::new();

    for chunk in ordered {
        let key = chunk.section_key();
        let idx = *by_key.entry(key.clone()).or_insert_with(|| {
            sections.push(Section {
                key,
                caption: None,
                text: String::new(),
                funding_items: 0,
                funding: 0.0,
            });
            sections.len() - 1
        });
        let section = &mut sections[idx];
        if section.caption.is_none() {
            section.caption = caption_of(&chunk.text);
        }
        section.text.push_str(&chunk.text);
        by_chunk.insert(chunk.id.as_str(), idx);
    }

    for item in &facts.funding {
        if let Some(&idx) = by_chunk.get(item.source_chunk_id.as_str()) {
            sections[idx].funding_items += 1;
            sections[idx].funding += item.amount_numeric.unwrap_or(0.0);
        }
    }
    sections
}

/// Caption of the innermost heading among the chunk's first lines.
fn caption_of(text: &str) -> Option<String> {
    text.lines()
        .take(CAPTION_SCAN_LINES)
        .filter_map(heading_caption)
        .last()
}

/// Pair sections across versions and describe what changed.
///
/// Exact key matches pair first. Remaining sections with captions are then
/// paired greedily in A order with the most similar unpaired B caption
/// (first wins on ties). Everything left is added or removed.
fn align_sections(a: &[Section], b: &[Section]) -> (usize, Vec<SectionChange>) {
    let b_index: HashMap<&str, usize> = b.iter().enumerate().map(|(j, s)| (s.key.as_str(), j)).collect();
    let mut pairs: Vec<Option<(usize, bool)>> = vec![None; a.len()];
    let mut b_taken = vec![false; b.len()];

    for (i, section) in a.iter().enumerate() {
        if let Some(&j) = b_index.get(section.key.as_str()) {
            pairs[i] = Some((j, false));
            b_taken[j] = true;
        }
    }

    for (i, section) in a.iter().enumerate() {
        if pairs[i].is_some() {
            continue;
        }
        let Some(caption) = section.caption.as_deref() else {
            continue;
        };
        let mut best: Option<(usize, f64)> = None;
        for (j, candidate) in b.iter().enumerate() {
            if b_taken[j] {
                continue;
            }
            let Some(other) = candidate.caption.as_deref() else {
                continue;
            };
            let sim = token_similarity(caption, other);
            if sim >= RENAME_SIMILARITY && best.is_none_or(|(_, s)| sim > s) {
                best = Some((j, sim));
            }
        }
        if let Some((j, _)) = best {
            pairs[i] = Some((j, true));
            b_taken[j] = true;
        }
    }

    let mut changes = Vec::new();
    let mut matched = 0;
    for (i, section) in a.iter().enumerate() {
        match pairs[i] {
            Some((j, renamed)) => {
                matched += 1;
                let other = &b[j];
                if renamed {
                    let mut detail = format!("renumbered from {}", section.key);
                    if let Some(caption) = other.caption.as_deref() {
                        detail.push_str(&format!(" ({caption})"));
                    }
                    if section.text != other.text {
                        detail.push_str("; ");
                        detail.push_str(&modification_detail(section, other));
                    }
                    changes.push(SectionChange {
                        section: other.key.clone(),
                        kind: SectionChangeKind::Renamed,
                        detail,
                    });
                } else if section.text != other.text {
                    changes.push(SectionChange {
                        section: other.key.clone(),
                        kind: SectionChangeKind::Modified,
                        detail: modification_detail(section, other),
                    });
                }
            }
            None => changes.push(SectionChange {
                section: section.key.clone(),
                kind: SectionChangeKind::Removed,
                detail: presence_detail("section removed", section),
            }),
        }
    }
    for (j, section) in b.iter().enumerate() {
        if !b_taken[j] {
            changes.push(SectionChange {
                section: section.key.clone(),
                kind: SectionChangeKind::Added,
                detail: presence_detail("section added", section),
            });
        }
    }
    (matched, changes)
}

fn modification_detail(a: &Section, b: &Section) -> String {
    let lines_a: Vec<&str> = a.text.lines().collect();
    let lines_b: Vec<&str> = b.text.lines().collect();
    let (added, removed) = diff::slice(&lines_a, &lines_b)
        .iter()
        .fold((0, 0), |(ins, del), step| match step {
            diff::Result::Right(_) => (ins + 1, del),
            diff::Result::Left(_) => (ins, del + 1),
            diff::Result::Both(..) => (ins, del),
        });
    let mut detail = format!("{added} lines added, {removed} removed");
    if a.funding != b.funding {
        detail.push_str(&format!(
            "; funding {} -> {} ({})",
            format_dollars(a.funding),
            format_dollars(b.funding),
            format_delta(b.funding - a.funding)
        ));
    }
    detail
}

fn presence_detail(what: &str, section: &Section) -> String {
    let mut detail = what.to_string();
    if let Some(caption) = section.caption.as_deref() {
        detail.push_str(&format!(": {caption}"));
    }
    if section.funding_items > 0 {
        detail.push_str(&format!(
            " ({} funding items, {})",
            section.funding_items,
            format_dollars(section.funding)
        ));
    }
    detail
}
