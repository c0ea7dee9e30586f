//! Purpose attribution for funding amounts.
//!
//! Each strategy is a pure function over a window of text near the amount.
//! Strategies run in priority order and the first acceptable candidate wins.
//! In a forward window the earliest match is taken, in a backward window the
//! one nearest the amount.

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::squash;

/// Which side of the amount a window lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

type Strategy = fn(&str, Direction) -> Option<String>;

const STRATEGIES: [(&str, Strategy); 5] = [
    ("necessary_expenses", necessary_expenses),
    ("additional_amount", additional_amount),
    ("made_available", made_available),
    ("verb_led", verb_led),
    ("generic_for", generic_for),
];

const MAX_PURPOSE_CHARS: usize = 200;
const MIN_PURPOSE_CHARS: usize = 10;

static NECESSARY_EXPENSES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bnecessary\s+expenses\s+(?:of|for|to)\s+").expect("necessary expenses"));

static ADDITIONAL_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\badditional\s+amount\s+for\s+(?:fiscal\s+year\s+\d{4},?\s*(?:for\s+)?)?")
        .expect("additional amount")
});

static MADE_AVAILABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:made|be|is|are)\s+available\s+for\s+").expect("made available")
});

static VERB_LED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bto\s+(?P<lead>carry\s+out|conduct|provide|make|fund)\s+").expect("verb led")
});

static GENERIC_FOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfor\s+").expect("generic for"));

/// Up to the next clause delimiter, sentence end or end of window.
static TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<p>[^,;:()$]{1,400}?)(?:[,;:()$]|\.(?:\s|$)|$)").expect("purpose tail")
});

/// Phrases that end a purpose even without punctuation.
const STOP_PHRASES: &[&str] = &[
    "\n\n",
    " to remain available",
    " to remain",
    " until ",
    " of which ",
    " which shall",
    " provided that",
    " notwithstanding",
    " shall be ",
];

/// Any stop phrase, case-insensitive. Offsets are in the searched text itself.
static STOP_PHRASE: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = STOP_PHRASES.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!("(?i){}", alternatives.join("|"))).expect("stop phrase")
});

static JUNK: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(?:the\s+)?(?:current\s+)?fiscal\s+years?\s+\d{4}(?:\s*(?:,|and|through|to|-|–)\s*\d{4})*$",
        r"(?i)\bsuch\s+purposes?\b",
        r"(?i)^(?:this|such|that|the|said)\s+(?:section|subsection|paragraph|chapter|subchapter|title|subtitle|heading|division|act)\b",
        r"(?i)^(?:to\s+)?the\s+secretary(?:\s+of\s+(?:the\s+)?[a-z]+(?:\s+[a-z]+)?)?$",
        r"(?i)^(?:(?:and|other|necessary)\s+)*related\s+expenses\b",
        r"(?i)\bemergency\s+requirement\b",
        r"(?i)\bsection\s+251\(b\)",
        r"^\$\s?\d",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("junk purpose"))
    .collect()
});

/// First acceptable purpose in `window`, trying strategies in priority order.
pub(crate) fn purpose_in_window(window: &str, direction: Direction) -> Option<String> {
    STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(window, direction))
}

/// Whether a candidate purpose is boilerplate that names no spending goal.
pub fn is_junk_purpose(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    trimmed.chars().count() < MIN_PURPOSE_CHARS || JUNK.iter().any(|p| p.is_match(trimmed))
}

/// Normalise a candidate: strip quote marks, collapse whitespace, drop
/// trailing connectors and punctuation, cap the length.
pub(crate) fn normalize_purpose(raw: &str) -> String {
    let unquoted = raw.replace("''", " ").replace(['"', '`', '“', '”', '‘', '’'], " ");
    let mut purpose = squash(&unquoted);
    loop {
        let trimmed = purpose
            .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_string();
        let without_connector = ["and", "or", "of", "for", "the", "to", "in", "on", "by"]
            .iter()
            .find_map(|w| trimmed.strip_suffix(w).filter(|rest| rest.ends_with(' ')))
            .map(|rest| rest.trim_end().to_string());
        match without_connector {
            Some(shorter) => purpose = shorter,
            None => {
                purpose = trimmed;
                break;
            }
        }
    }
    if purpose.chars().count() > MAX_PURPOSE_CHARS {
        purpose = purpose.chars().take(MAX_PURPOSE_CHARS).collect();
    }
    purpose
}

// ── Strategies ──

fn necessary_expenses(window: &str, direction: Direction) -> Option<String> {
    capture_after(&NECESSARY_EXPENSES, window, direction, &[])
}

fn additional_amount(window: &str, direction: Direction) -> Option<String> {
    capture_after(&ADDITIONAL_AMOUNT, window, direction, &[])
}

fn made_available(window: &str, direction: Direction) -> Option<String> {
    capture_after(
        &MADE_AVAILABLE,
        window,
        direction,
        &["obligation", "expenditure", "fiscal year", "such purpose", "the period"],
    )
}

fn verb_led(window: &str, direction: Direction) -> Option<String> {
    capture_after(&VERB_LED, window, direction, &["available", "such "])
}

fn generic_for(window: &str, direction: Direction) -> Option<String> {
    capture_after(
        &GENERIC_FOR,
        window,
        direction,
        &[
            "fiscal year",
            "the fiscal year",
            "each of fiscal years",
            "such purpose",
            "the purpose",
            "this purpose",
            "that purpose",
            "any purpose",
            "other purposes",
            "an additional amount",
            "the period",
            "a period",
            "obligation",
        ],
    )
}

/// Capture the phrase following each `trigger` match, skipping matches whose
/// phrase starts with one of `excluded` (case-insensitive). When the trigger
/// has a `lead` group its text is kept as the start of the phrase.
fn capture_after(
    trigger: &Regex,
    window: &str,
    direction: Direction,
    excluded: &[&str],
) -> Option<String> {
    let mut matches: Vec<_> = trigger.captures_iter(window).collect();
    if direction == Direction::Backward {
        matches.reverse();
    }
    matches.into_iter().find_map(|caps| {
        let whole = caps.get(0)?;
        let tail = &window[whole.end()..];
        let lower = tail.to_lowercase();
        if excluded.iter().any(|e| lower.starts_with(e)) {
            return None;
        }
        let phrase = cut_at_stop_phrase(TAIL.captures(tail)?.name("p")?.as_str());
        let candidate = match caps.name("lead") {
            Some(lead) => format!("{} {}", lead.as_str(), phrase),
            None => phrase.to_string(),
        };
        let purpose = normalize_purpose(&candidate);
        (!is_junk_purpose(&purpose)).then_some(purpose)
    })
}

fn cut_at_stop_phrase(phrase: &str) -> &str {
    match STOP_PHRASE.find(phrase) {
        Some(m) => &phrase[..m.start()],
        None => phrase,
    }
}
