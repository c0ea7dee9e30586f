//! "not later than" deadlines.
//!
//! The action is always read *forward* from the date, never from text before
//! the trigger. Forward text that is punctuation, a `Provided, That` proviso
//! or a section-heading fragment yields no action at all.

use once_cell::sync::Lazy;
use porkchop_core::Deadline;
use regex::Regex;

use super::context::{sentence_end, sentence_start, squash};
use super::dates::{MONTHS, parse_date};
use super::duties::DUTY_SUBJECT;

static NOT_LATER_THAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bnot\s+later\s+than\s+(?:(?P<date>(?:{MONTHS})\s+\d{{1,2}},\s*\d{{4}})|(?P<relative>\d+\s+(?:calendar\s+|business\s+)?days?\s+after\s+[^,;.]{{1,100}}))"
    ))
    .expect("not later than")
});

static PROVISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^provided,?\s+(?:further,?\s+)?that\b").expect("proviso"));

static HEADING_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:SEC\.|SECTION\s+\d|TITLE\s+[IVXLC]+\b|DIVISION\s+[A-Z]{1,3}\b|SUBTITLE\b|CHAPTER\s+\d)")
        .expect("heading fragment")
});

static LEADING_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{DUTY_SUBJECT}\s+(?i:shall|may|must)\b")).expect("leading subject")
});

static ANY_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{DUTY_SUBJECT}\s+(?i:shall|may|must)\b")).expect("any subject")
});

const MAX_ACTION_BYTES: usize = 300;
const CONTEXT_BYTES: usize = 300;

/// Every deadline in `text`, in order of appearance.
pub fn extract_deadlines(text: &str, chunk_id: &str) -> Vec<Deadline> {
    NOT_LATER_THAN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (date_text, due_date) = match caps.name("date") {
                Some(date) => {
                    let date_text = squash(date.as_str());
                    let due = parse_date(&date_text);
                    (date_text, due)
                }
                None => (squash(caps.name("relative")?.as_str()), None),
            };

            let action = forward_action(text, whole.end());
            let responsible_entity = action
                .as_deref()
                .and_then(leading_subject)
                .or_else(|| preceding_subject(text, whole.start()));

            let start = sentence_start(text, whole.start(), CONTEXT_BYTES);
            let end = sentence_end(text, whole.end(), CONTEXT_BYTES);
            Some(Deadline {
                date_text,
                due_date,
                action,
                responsible_entity,
                source_text: squash(&text[start..end]),
                source_chunk_id: chunk_id.to_string(),
            })
        })
        .collect()
}

/// The clause after the date: skip whitespace and at most one comma, then
/// read to the end of the sentence.
fn forward_action(text: &str, from: usize) -> Option<String> {
    let rest = text[from..].trim_start();
    let rest = rest.strip_prefix(',').map_or(rest, str::trim_start);
    let offset = text.len() - rest.len();
    let end = sentence_end(text, offset, MAX_ACTION_BYTES);
    let action = squash(&text[offset..end]);
    let action = action.trim_end_matches(['.', ';']).trim_end().to_string();
    is_plausible_action(&action).then_some(action)
}

fn is_plausible_action(action: &str) -> bool {
    let Some(first) = action.chars().next() else {
        return false;
    };
    if first.is_ascii_punctuation() || matches!(first, '—' | '–') {
        return false;
    }
    if PROVISO.is_match(action) || HEADING_FRAGMENT.is_match(action) {
        return false;
    }
    // An all-caps run is a heading that followed the date, not an action.
    action.chars().any(char::is_lowercase)
}

fn leading_subject(action: &str) -> Option<String> {
    LEADING_SUBJECT
        .captures(action)
        .map(|caps| squash(&caps["entity"]))
}

/// Subject of the last duty statement in the sentence leading up to the trigger.
fn preceding_subject(text: &str, trigger_start: usize) -> Option<String> {
    let start = sentence_start(text, trigger_start, CONTEXT_BYTES);
    ANY_SUBJECT
        .captures_iter(&text[start..trigger_start])
        .last()
        .map(|caps| squash(&caps["entity"]))
}
