//! Named government bodies.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use porkchop_core::{Duty, Entity, FundingItem, normalize_entity_name};
use regex::Regex;

use super::context::squash;

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:[A-Z][a-z]+\s+){0,4}(?P<head>Department|Office|Bureau|Agency|Administration|Commission)(?:\s+of\s+(?:the\s+)?[A-Z][a-z]+(?:\s+(?:and\s+)?[A-Z][a-z]+){0,3})?|\b(?P<official>Inspector\s+General)\b",
    )
    .expect("entity")
});

const DETERMINERS: &[&str] = &[
    "The", "Each", "Such", "Any", "Every", "That", "This", "An", "A", "Provided", "Notwithstanding",
];

pub const ROLE_DUTY_HOLDER: &str = "duty holder";
pub const ROLE_FUNDING_RECIPIENT: &str = "funding recipient";

/// Government bodies named in `text`, deduplicated by normalised name.
///
/// Bodies that hold one of `duties` get the `duty holder` role; otherwise
/// bodies receiving one of `funding` get `funding recipient`.
pub fn extract_entities(text: &str, duties: &[Duty], funding: &[FundingItem]) -> Vec<Entity> {
    let duty_holders: HashSet<String> = duties
        .iter()
        .map(|d| normalize_entity_name(&d.entity))
        .collect();
    let recipients: HashSet<String> = funding
        .iter()
        .filter_map(|f| f.recipient.as_deref())
        .map(normalize_entity_name)
        .collect();

    let mut seen = HashSet::new();
    let mut entities = Vec::new();
    for caps in ENTITY.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(name) = strip_determiners(&squash(whole.as_str())) else {
            continue;
        };
        let key = normalize_entity_name(&name);
        if !seen.insert(key.clone()) {
            continue;
        }
        let entity_type = match (caps.name("head"), caps.name("official")) {
            (Some(head), _) => Some(head.as_str().to_ascii_lowercase()),
            (None, Some(_)) => Some("official".to_string()),
            (None, None) => None,
        };
        let role = if duty_holders.contains(&key) {
            Some(ROLE_DUTY_HOLDER.to_string())
        } else if recipients.contains(&key) {
            Some(ROLE_FUNDING_RECIPIENT.to_string())
        } else {
            None
        };
        entities.push(Entity {
            name,
            entity_type,
            role,
        });
    }
    entities
}

/// Drop leading determiners; single-word results name nothing specific.
fn strip_determiners(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split(' ').collect();
    let start = words
        .iter()
        .position(|w| !DETERMINERS.contains(w))
        .unwrap_or(words.len());
    let kept = &words[start..];
    (kept.len() >= 2).then(|| kept.join(" "))
}
