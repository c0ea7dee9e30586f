//! Splits cleaned bill text into ordered, labelled chunks.
//!
//! The structural strategy opens a new chunk at every `DIVISION X` or
//! `TITLE N` heading line, carrying the current division down into its
//! titles. Units larger than the size limit are sub-split at paragraph or
//! line boundaries. Chunks are exact slices of the input, so concatenating
//! them in position order reproduces it.

use once_cell::sync::Lazy;
use porkchop_core::chunk::make_id;
use porkchop_core::heading::is_title_enumerator;
use porkchop_core::{Chunk, ChunkConfig, ChunkStrategy, ConfigError};
use regex::Regex;
use tracing::{debug, warn};

static DIVISION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^DIVISION\s+([A-Z]{1,3})\b").expect("division marker"));

static TITLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^TITLE\s+([A-Z]+)\b").expect("title marker"));

/// Where a sub-split prefers to cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Line,
}

/// Chunk `text` according to `config`.
///
/// Empty text yields no chunks. An invalid size limit is rejected before any
/// text is examined.
pub fn chunk(text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>, ConfigError> {
    config.validate()?;
    let chunks = match config.strategy {
        ChunkStrategy::Structural => chunk_by_structure(text, config.max_chunk_chars),
        ChunkStrategy::FixedSize => chunk_by_size(text, config.max_chunk_chars),
    };
    debug!(
        strategy = %config.strategy,
        max_chunk_chars = config.max_chunk_chars,
        chunks = chunks.len(),
        "chunked bill text"
    );
    Ok(chunks)
}

/// True when structural chunking found no markers and fell back to a single
/// unlabelled chunk. Callers may retry with [`ChunkStrategy::FixedSize`].
pub fn is_degraded(chunks: &[Chunk]) -> bool {
    chunks.len() == 1 && !chunks[0].is_labelled()
}

// ── Structural ──

struct Unit {
    start: usize,
    division: Option<String>,
    title: Option<String>,
}

fn chunk_by_structure(text: &str, max_chars: usize) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut units = structural_units(text);
    if units.is_empty() {
        warn!(
            chars = text.chars().count(),
            "no DIVISION or TITLE markers found, returning a single chunk"
        );
        return vec![Chunk::new(0, text.to_string(), None, None)];
    }
    if units[0].start > 0 {
        units.insert(
            0,
            Unit {
                start: 0,
                division: None,
                title: None,
            },
        );
    }

    let mut chunks = Vec::with_capacity(units.len());
    for (i, unit) in units.iter().enumerate() {
        let end = units.get(i + 1).map_or(text.len(), |next| next.start);
        push_unit(&mut chunks, &text[unit.start..end], unit, max_chars);
    }
    chunks
}

/// Byte offsets of heading lines, with the labels in force from each.
fn structural_units(text: &str) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut division: Option<String> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(caps) = DIVISION_MARKER.captures(trimmed) {
            division = Some(caps[1].to_string());
            units.push(Unit {
                start: offset,
                division: division.clone(),
                title: None,
            });
        } else if let Some(caps) = TITLE_MARKER.captures(trimmed)
            && is_title_enumerator(&caps[1])
        {
            units.push(Unit {
                start: offset,
                division: division.clone(),
                title: Some(caps[1].to_string()),
            });
        }
        offset += line.len();
    }
    units
}

fn push_unit(chunks: &mut Vec<Chunk>, text: &str, unit: &Unit, max_chars: usize) {
    let pieces = split_pieces(text, max_chars, Boundary::Paragraph);
    if pieces.len() <= 1 {
        chunks.push(Chunk::new(
            chunks.len(),
            text.to_string(),
            unit.division.clone(),
            unit.title.clone(),
        ));
        return;
    }

    let parent_id = make_id(
        chunks.len(),
        unit.division.as_deref(),
        unit.title.as_deref(),
        None,
    );
    debug!(parent = %parent_id, parts = pieces.len(), "sub-split oversized unit");
    for (i, piece) in pieces.into_iter().enumerate() {
        chunks.push(Chunk::part_of(
            chunks.len(),
            piece.to_string(),
            unit.division.clone(),
            unit.title.clone(),
            &parent_id,
            i as u32 + 1,
        ));
    }
}

// ── Fixed size ──

fn chunk_by_size(text: &str, max_chars: usize) -> Vec<Chunk> {
    split_pieces(text, max_chars, Boundary::Line)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| Chunk::new(i, piece.to_string(), None, None))
        .collect()
}

// ── Splitting ──

/// Cut `text` into consecutive pieces of at most `max_chars` characters.
fn split_pieces(text: &str, max_chars: usize, prefer: Boundary) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(limit) = byte_index_of_char(rest, max_chars) {
        let cut = cut_point(&rest[..limit], prefer).unwrap_or(limit);
        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

/// Byte offset of the `n`th character, or `None` if `s` has at most `n` chars.
fn byte_index_of_char(s: &str, n: usize) -> Option<usize> {
    s.char_indices().nth(n).map(|(i, _)| i)
}

/// Best cut inside `window`; the piece ends just after the returned offset's
/// newline(s). A paragraph break in the first half of the window is passed
/// over for a later line break.
fn cut_point(window: &str, prefer: Boundary) -> Option<usize> {
    let paragraph = window.rfind("\n\n").map(|i| i + 2);
    let line = window.rfind('\n').map(|i| i + 1);
    match prefer {
        Boundary::Paragraph => match paragraph {
            Some(p) if p >= window.len() / 2 => Some(p),
            _ => line.or(paragraph),
        },
        Boundary::Line => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(strategy: ChunkStrategy, max: usize) -> ChunkConfig {
        ChunkConfig::new(strategy, max).unwrap()
    }

    fn concat(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    const BILL: &str = "Preamble text before any division.\n\
DIVISION A—FURTHER CONTINUING APPROPRIATIONS\n\
SEC. 101. Amounts are provided.\n\
TITLE I—DEPARTMENT OF DEFENSE\n\
SEC. 102. The Secretary shall report.\n\
TITLE II—HOMELAND SECURITY\n\
SEC. 201. More text.\n\
DIVISION B—DISASTER RELIEF\n\
TITLE I—FEMA\n\
SEC. 301. Relief funds.\n";

    #[test]
    fn structural_labels_and_order() {
        let chunks = chunk(BILL, &config(ChunkStrategy::Structural, 20_000)).unwrap();
        let labels: Vec<(Option<&str>, Option<&str>)> = chunks
            .iter()
            .map(|c| (c.division.as_deref(), c.title.as_deref()))
            .collect();
        assert_eq!(
            labels,
            vec![
                (None, None),
                (Some("A"), None),
                (Some("A"), Some("I")),
                (Some("A"), Some("II")),
                (Some("B"), None),
                (Some("B"), Some("I")),
            ]
        );
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.position, i);
        }
        assert_eq!(chunks[2].id, "002_div_a_title_i");
        assert!(chunks[2].text.starts_with("TITLE I—DEPARTMENT OF DEFENSE"));
        assert_eq!(concat(&chunks), BILL);
        assert!(!is_degraded(&chunks));
    }

    #[test]
    fn no_preamble_when_marker_first() {
        let text = "DIVISION A\nbody\n";
        let chunks = chunk(text, &ChunkConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].division.as_deref(), Some("A"));
    }

    #[test]
    fn title_requires_valid_enumerator() {
        let text = "DIVISION A\nTITLE DIM lights\nTITLE IV—ENERGY\n";
        let chunks = chunk(text, &ChunkConfig::default()).unwrap();
        let titles: Vec<_> = chunks.iter().map(|c| c.title.as_deref()).collect();
        assert_eq!(titles, vec![None, Some("IV")]);
    }

    #[test]
    fn lowercase_markers_ignored() {
        let text = "Division A of this Act\ntitle I applies\n";
        let chunks = chunk(text, &ChunkConfig::default()).unwrap();
        assert!(is_degraded(&chunks));
    }

    #[test]
    fn markerless_text_is_single_degraded_chunk() {
        let text = "Some plain text without headings.\nAnother line.";
        let chunks = chunk(text, &ChunkConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].id, "000");
        assert!(is_degraded(&chunks));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk("", &ChunkConfig::default()).unwrap().is_empty());
        assert!(
            chunk("", &config(ChunkStrategy::FixedSize, 10))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn zero_limit_rejected() {
        let bad = ChunkConfig {
            strategy: ChunkStrategy::Structural,
            max_chunk_chars: 0,
        };
        assert!(matches!(chunk(BILL, &bad), Err(ConfigError::InvalidChunkSize(0))));
    }

    #[test]
    fn oversized_unit_split_into_parts() {
        let body = "alpha beta gamma\n".repeat(20);
        let text = format!("DIVISION A\n{body}");
        let chunks = chunk(&text, &config(ChunkStrategy::Structural, 60)).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.char_count <= 60, "chunk {} has {} chars", c.id, c.char_count);
            assert_eq!(c.division.as_deref(), Some("A"));
            assert_eq!(c.parent_id.as_deref(), Some("000_div_a"));
            assert!(c.text.ends_with('\n'), "cut mid-line: {:?}", c.text);
        }
        assert_eq!(chunks[0].part, Some(1));
        assert_eq!(chunks[1].id, "001_div_a_part2");
        assert_eq!(concat(&chunks), text);
    }

    #[test]
    fn paragraph_break_preferred() {
        let text = "DIVISION A\nfirst paragraph line\n\nsecond paragraph x\nmore\n";
        let chunks = chunk(text, &config(ChunkStrategy::Structural, 45)).unwrap();
        assert!(chunks[0].text.ends_with("\n\n"));
        assert_eq!(concat(&chunks), text);
    }

    #[test]
    fn long_line_hard_split_on_char_boundary() {
        let text = "é".repeat(25);
        let chunks = chunk(&text, &config(ChunkStrategy::FixedSize, 10)).unwrap();
        let counts: Vec<_> = chunks.iter().map(|c| c.char_count).collect();
        assert_eq!(counts, vec![10, 10, 5]);
        assert_eq!(concat(&chunks), text);
    }

    #[test]
    fn fixed_size_prefers_line_breaks() {
        let text = "0123456789\n0123456789\n0123\n";
        let chunks = chunk(text, &config(ChunkStrategy::FixedSize, 15)).unwrap();
        assert_eq!(chunks[0].text, "0123456789\n");
        assert!(chunks.iter().all(|c| !c.is_labelled()));
        assert_eq!(concat(&chunks), text);
    }

    proptest! {
        #[test]
        fn structural_chunks_partition_input(
            text in "(DIVISION [A-C]\n|TITLE [IVX]{1,3}\n|[a-z ]{0,30}\n|\n){0,30}",
            max in 1usize..80,
        ) {
            let chunks = chunk(&text, &config(ChunkStrategy::Structural, max)).unwrap();
            prop_assert_eq!(concat(&chunks), text.clone());
            for (i, c) in chunks.iter().enumerate() {
                prop_assert_eq!(c.position, i);
            }
            if !is_degraded(&chunks) {
                for c in &chunks {
                    prop_assert!(c.char_count <= max);
                }
            }
        }

        #[test]
        fn fixed_chunks_partition_input(text in "[a-z\n é]{0,200}", max in 1usize..50) {
            let chunks = chunk(&text, &config(ChunkStrategy::FixedSize, max)).unwrap();
            prop_assert_eq!(concat(&chunks), text.clone());
            prop_assert!(chunks.iter().all(|c| c.char_count <= max && c.char_count > 0));
        }
    }
}
