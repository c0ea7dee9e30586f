use serde::{Deserialize, Serialize};

use crate::heading::section_key;

/// One ordered, labelled slice of cleaned bill text.
///
/// The chunks of a document partition its cleaned text: concatenating `text`
/// in `position` order reproduces the input exactly. Chunks are never mutated
/// after the chunker emits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    /// Division letter, e.g. `"A"` for `DIVISION A`.
    pub division: Option<String>,
    /// Title enumerator, e.g. `"IV"` for `TITLE IV`.
    pub title: Option<String>,
    /// Read order; gap-free from 0 within a document.
    pub position: usize,
    pub char_count: usize,
    /// Id the chunk would have had if it had not been split for size.
    pub parent_id: Option<String>,
    /// 1-based part number within `parent_id`.
    pub part: Option<u32>,
}

impl Chunk {
    pub fn new(
        position: usize,
        text: String,
        division: Option<String>,
        title: Option<String>,
    ) -> Self {
        let id = make_id(position, division.as_deref(), title.as_deref(), None);
        let char_count = text.chars().count();
        Self {
            id,
            text,
            division,
            title,
            position,
            char_count,
            parent_id: None,
            part: None,
        }
    }

    /// A piece of an oversized structural unit. Keeps the parent's labels.
    pub fn part_of(
        position: usize,
        text: String,
        division: Option<String>,
        title: Option<String>,
        parent_id: &str,
        part: u32,
    ) -> Self {
        let mut chunk = Self::new(position, text, division, title);
        chunk.id = make_id(
            position,
            chunk.division.as_deref(),
            chunk.title.as_deref(),
            Some(part),
        );
        chunk.parent_id = Some(parent_id.to_string());
        chunk.part = Some(part);
        chunk
    }

    /// Whether the chunk carries a division or title label.
    pub fn is_labelled(&self) -> bool {
        self.division.is_some() || self.title.is_some()
    }

    /// Structural alignment key, e.g. `"DIVISION A / TITLE I"`.
    pub fn section_key(&self) -> String {
        section_key(self.division.as_deref(), self.title.as_deref())
    }
}

/// `003_div_a_title_iv_part2`
pub fn make_id(
    position: usize,
    division: Option<&str>,
    title: Option<&str>,
    part: Option<u32>,
) -> String {
    let mut id = format!("{position:03}");
    if let Some(d) = division {
        id.push_str("_div_");
        id.push_str(&d.to_ascii_lowercase());
    }
    if let Some(t) = title {
        id.push_str("_title_");
        id.push_str(&t.to_ascii_lowercase());
    }
    if let Some(p) = part {
        id.push_str(&format!("_part{p}"));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_labels() {
        assert_eq!(make_id(0, None, None, None), "000");
        assert_eq!(make_id(3, Some("A"), None, None), "003_div_a");
        assert_eq!(make_id(12, Some("B"), Some("IV"), Some(2)), "012_div_b_title_iv_part2");
    }

    #[test]
    fn char_count_counts_chars_not_bytes() {
        let chunk = Chunk::new(0, "TITLE I—DEFENSE".into(), None, Some("I".into()));
        assert_eq!(chunk.char_count, 15);
        assert!(chunk.text.len() > chunk.char_count);
    }

    #[test]
    fn parts_keep_parent_labels() {
        let chunk = Chunk::part_of(4, "text".into(), Some("A".into()), None, "003_div_a", 2);
        assert_eq!(chunk.id, "004_div_a_part2");
        assert_eq!(chunk.parent_id.as_deref(), Some("003_div_a"));
        assert_eq!(chunk.part, Some(2));
        assert_eq!(chunk.section_key(), "DIVISION A");
        assert!(chunk.is_labelled());
    }
}
