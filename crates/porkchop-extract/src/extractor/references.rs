//! Legal citations: U.S. Code sections, Public Laws and named Acts.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use porkchop_core::{LegalReference, RefType};
use regex::Regex;

use super::context::squash;

static US_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<title>\d{1,2})\s*(?i:U\.\s?S\.\s?C)\.?(?:\s*§+)?\s*(?P<section>\d+[A-Za-z0-9\-–]*(?:\([A-Za-z0-9]+\))*)?",
    )
    .expect("us code")
});

static PUBLIC_LAW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:Public\s+Law|Pub\.\s*L\.)\s+(?P<congress>\d{2,3})\s*[-–—]\s*(?P<number>\d+)",
    )
    .expect("public law")
});

static ACT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Z][\w.'’-]*(?:\s+(?:[A-Z][\w.'’-]*|of|and|the|for|on|to|in|&)){0,12}?\s+(?:Act|Code)\b",
    )
    .expect("act name")
});

/// Words that open a sentence or clause rather than a statute name.
const LEADING_NOISE: &[&str] = &[
    "Notwithstanding",
    "Pursuant",
    "Under",
    "Provided",
    "Except",
    "Subject",
    "The",
    "This",
    "That",
    "Such",
    "Any",
    "Each",
    "In",
    "Of",
    "For",
    "And",
    "As",
    "By",
    "See",
    "Section",
    "Sec.",
    "of",
    "and",
    "the",
    "for",
    "on",
    "to",
    "in",
    "&",
];

/// Names too generic to identify a statute.
const GENERIC_ACTS: &[&str] = &["Appropriations Act", "Authorization Act", "United States Code"];

const MIN_ACT_NAME_CHARS: usize = 10;

/// All references in `text`, deduplicated by `(type, text)` in order of first appearance.
pub fn extract_references(text: &str, chunk_id: &str) -> Vec<LegalReference> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    let mut push = |ref_type: RefType, ref_text: String| {
        if seen.insert((ref_type, ref_text.clone())) {
            refs.push(LegalReference {
                ref_type,
                ref_text,
                source_chunk_id: chunk_id.to_string(),
            });
        }
    };

    for caps in US_CODE.captures_iter(text) {
        let title = &caps["title"];
        let ref_text = match caps.name("section") {
            Some(section) => {
                let section = section.as_str().trim_end_matches(['-', '–']);
                format!("{title} U.S.C. {section}")
            }
            None => format!("{title} U.S.C."),
        };
        push(RefType::UsCode, ref_text);
    }

    for caps in PUBLIC_LAW.captures_iter(text) {
        push(
            RefType::PublicLaw,
            format!("Public Law {}-{}", &caps["congress"], &caps["number"]),
        );
    }

    for m in ACT_NAME.find_iter(text) {
        if let Some(name) = act_name(m.as_str()) {
            push(RefType::Act, name);
        }
    }

    refs
}

fn act_name(raw: &str) -> Option<String> {
    let squashed = squash(raw);
    let words: Vec<&str> = squashed.split(' ').collect();
    let start = words
        .iter()
        .position(|w| !LEADING_NOISE.contains(w))
        .unwrap_or(words.len());
    let name = words[start..].join(" ");
    let meaningful = name.chars().count() > MIN_ACT_NAME_CHARS
        && words.len() - start >= 2
        && !GENERIC_ACTS.contains(&name.as_str());
    meaningful.then_some(name)
}
