//! `<official or agency> shall|may|must <action>` statements.

use once_cell::sync::Lazy;
use porkchop_core::{Duty, Modal};
use regex::Regex;

use super::context::{sentence_end, squash};

/// Officials and bodies that can hold a duty, optionally qualified by
/// `of <Capitalised Name>`.
pub(crate) const DUTY_SUBJECT: &str = r"(?:[Tt]he\s+)?(?P<entity>(?:[A-Z][a-z]+\s+){0,3}(?:Secretary|Administrator|Comptroller\s+General|Director|Commissioner|Attorney\s+General|Inspector\s+General|Chairman|Chairperson|President|Department|Office|Bureau|Agency|Administration|Commission)(?:\s+of\s+(?:the\s+)?[A-Z][\w&]*(?:\s+(?:and\s+)?[A-Z][\w&]*){0,4})?)";

static DUTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{DUTY_SUBJECT}\s+(?P<modal>(?i:shall|may|must))\b"))
        .expect("duty")
});

/// Longest action taken after the modal verb.
const MAX_ACTION_BYTES: usize = 300;
const MIN_ACTION_CHARS: usize = 10;

/// Every duty statement in `text`, in order of appearance.
pub fn extract_duties(text: &str, chunk_id: &str) -> Vec<Duty> {
    DUTY.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let modal = Modal::from_word(&caps["modal"])?;
            let end = sentence_end(text, whole.end(), MAX_ACTION_BYTES);
            let action = squash(&text[whole.end()..end]);
            let action = action.trim_end_matches(['.', ';']).to_string();
            if action.chars().count() < MIN_ACTION_CHARS {
                return None;
            }
            Some(Duty {
                entity: squash(&caps["entity"]),
                modal,
                action,
                source_chunk_id: chunk_id.to_string(),
            })
        })
        .collect()
}
