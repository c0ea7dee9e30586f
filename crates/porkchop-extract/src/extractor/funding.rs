//! Funding items: one per dollar amount, with the purpose, recipient and
//! availability found around it.

use once_cell::sync::Lazy;
use porkchop_core::heading::{heading_caption, normalize_heading};
use porkchop_core::{Chunk, FundingItem};
use regex::Regex;

use super::context::{ceil_boundary, floor_boundary, sentence_end, sentence_start, squash};
use super::dates::{MONTHS, fiscal_years};
use super::purpose::{Direction, is_junk_purpose, normalize_purpose, purpose_in_window};
use crate::amount::{AmountMatch, find_amounts};

/// Bytes searched after an amount for its purpose, recipient and availability.
const FORWARD_WINDOW: usize = 300;
/// Bytes searched before an amount.
const BACKWARD_WINDOW: usize = 300;

const ORG_NAME: &str = r"[A-Z][\w&'.-]*(?:\s+(?:and\s+|of\s+(?:the\s+)?)?[A-Z][\w&'.-]*){0,4}";

static RECIPIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"\btransferred\s+to\s+(?:the\s+)?(?P<r>{ORG_NAME})"),
        format!(r"\bto\s+the\s+(?P<r>Secretary\s+of\s+(?:the\s+)?{ORG_NAME})"),
        format!(r"\bto\s+the\s+(?P<r>Department\s+of\s+(?:the\s+)?{ORG_NAME})"),
        format!(
            r"\b(?:to|for|by)\s+the\s+(?P<r>(?:[A-Z][\w&'-]*\s+){{0,5}}(?:Administration|Agency|Bureau|Office|Service|Commission|Corporation|Institute|Foundation|Authority|Board|Council)(?:\s+of\s+(?:the\s+)?{ORG_NAME})?)"
        ),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("recipient pattern"))
    .collect()
});

static AVAILABILITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:until|through)\s+(?:expended\b|(?:{MONTHS})\s+\d{{1,2}},\s*\d{{4}}|(?:the\s+end\s+of\s+)?fiscal\s+year\s+\d{{4}})"
    ))
    .expect("availability")
});

/// Uppercase subheading lines that are structural markers, not captions.
static STRUCTURAL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:DIVISION|TITLE|SEC\.|SECTION|SUBTITLE|CHAPTER)\b").expect("structural line"));

/// Extract every funding item in `chunk`, in order of appearance.
pub fn extract_funding(chunk: &Chunk) -> Vec<FundingItem> {
    let text = chunk.text.as_str();
    let amounts = find_amounts(text);
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let prev_end = i.checked_sub(1).map_or(0, |p| amounts[p].end);
            let next_start = amounts.get(i + 1).map_or(text.len(), |n| n.start);
            funding_item(chunk, amount, prev_end, next_start)
        })
        .collect()
}

fn funding_item(chunk: &Chunk, amount: &AmountMatch, prev_end: usize, next_start: usize) -> FundingItem {
    let text = chunk.text.as_str();
    let forward_end = floor_boundary(text, amount.end + FORWARD_WINDOW).min(next_start);
    let backward_start = ceil_boundary(text, amount.start.saturating_sub(BACKWARD_WINDOW)).max(prev_end);
    let forward = &text[amount.end..forward_end.max(amount.end)];
    let backward = &text[backward_start.min(amount.start)..amount.start];

    let span_start = sentence_start(text, amount.start, BACKWARD_WINDOW);
    let span_end = sentence_end(text, amount.end, FORWARD_WINDOW);
    let sentence = &text[span_start..span_end];

    let purpose = purpose_in_window(forward, Direction::Forward)
        .or_else(|| purpose_in_window(backward, Direction::Backward))
        .or_else(|| subheading_before(text, amount.start))
        .or_else(|| structural_heading(chunk, amount.start));

    FundingItem {
        amount_text: amount.text.clone(),
        amount_numeric: amount.numeric,
        purpose,
        recipient: recipient(forward, backward),
        availability: availability(forward, backward),
        fiscal_years: fiscal_years(sentence),
        source_text: squash(sentence),
        source_chunk_id: chunk.id.clone(),
    }
}

/// First recipient by pattern priority; forward before backward, and the
/// nearest backward match.
fn recipient(forward: &str, backward: &str) -> Option<String> {
    RECIPIENT_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern
            .captures(forward)
            .or_else(|| pattern.captures_iter(backward).last())?;
        let name = trim_trailing_connectors(&squash(&caps["r"]));
        (name.split(' ').count() >= 2).then_some(name)
    })
}

fn trim_trailing_connectors(name: &str) -> String {
    let mut words: Vec<&str> = name.split(' ').collect();
    while let Some(last) = words.last() {
        let bare = last.trim_end_matches(|c: char| c.is_ascii_punctuation());
        if bare.is_empty() || matches!(bare, "of" | "and" | "the" | "for" | "on" | "to") {
            words.pop();
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_end_matches(|c: char| c == ',' || c == '.' || c == ';')
        .to_string()
}

fn availability(forward: &str, backward: &str) -> Option<String> {
    AVAILABILITY
        .find(forward)
        .or_else(|| AVAILABILITY.find_iter(backward).last())
        .map(|m| {
            let phrase = squash(m.as_str());
            let mut chars = phrase.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => phrase,
            }
        })
}

/// Nearest all-uppercase subheading line before `pos`, such as
/// `OPERATIONS AND SUPPORT`.
fn subheading_before(text: &str, pos: usize) -> Option<String> {
    text[..pos]
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| is_subheading(line))
        .map(normalize_purpose)
        .filter(|p| !is_junk_purpose(p))
}

fn is_subheading(line: &str) -> bool {
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 4
        && !line.chars().any(char::is_lowercase)
        && !line.contains('$')
        && !STRUCTURAL_LINE.is_match(line)
}

/// Caption of the nearest DIVISION / TITLE heading before `pos`, falling back
/// to the chunk's structural label.
fn structural_heading(chunk: &Chunk, pos: usize) -> Option<String> {
    chunk.text[..pos]
        .lines()
        .rev()
        .find_map(heading_caption)
        .or_else(|| chunk.is_labelled().then(|| chunk.section_key()))
        .map(|h| normalize_heading(&h))
        .filter(|p| !is_junk_purpose(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk::new(0, text.to_string(), Some("A".into()), Some("I".into()))
    }

    #[test]
    fn amount_purpose_and_availability() {
        let items = extract_funding(&chunk(
            "The bill provides $100,000,000 for disaster relief efforts in the affected region, to remain available until expended.",
        ));
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.amount_text, "$100,000,000");
        assert_eq!(item.amount_numeric, Some(100_000_000.0));
        assert!(item.purpose.as_deref().unwrap().contains("disaster relief"));
        assert_eq!(item.availability.as_deref(), Some("until expended"));
        assert_eq!(item.source_chunk_id, "000_div_a_title_i");
    }

    #[test]
    fn dated_availability() {
        let items = extract_funding(&chunk(
            "authorizes $500,000,000 for FEMA operations until September 30, 2025.",
        ));
        assert_eq!(items[0].purpose.as_deref(), Some("FEMA operations"));
        assert_eq!(items[0].availability.as_deref(), Some("until September 30, 2025"));
    }

    #[test]
    fn purpose_found_before_amount() {
        let items = extract_funding(&chunk(
            "For necessary expenses of the Wildland Fire Management program, $25,000,000, to remain available until expended.",
        ));
        assert_eq!(
            items[0].purpose.as_deref(),
            Some("the Wildland Fire Management program")
        );
    }

    #[test]
    fn recipient_patterns() {
        let items = extract_funding(&chunk(
            "$10,000,000 shall be transferred to the Department of Energy for grid research.",
        ));
        assert_eq!(items[0].recipient.as_deref(), Some("Department of Energy"));

        let items = extract_funding(&chunk(
            "$3,000,000 for grants awarded by the Federal Emergency Management Agency.",
        ));
        assert_eq!(
            items[0].recipient.as_deref(),
            Some("Federal Emergency Management Agency")
        );
    }

    #[test]
    fn fiscal_years_from_sentence() {
        let items = extract_funding(&chunk(
            "For fiscal years 2025 through 2027, $40,000,000 for wastewater upgrades in Lake County.",
        ));
        assert_eq!(items[0].fiscal_years, vec![2025, 2026, 2027]);
    }

    #[test]
    fn uppercase_subheading_used_when_no_phrase() {
        let items = extract_funding(&chunk("OPERATIONS AND SUPPORT\n$7,000,000, of which\n"));
        assert_eq!(items[0].purpose.as_deref(), Some("OPERATIONS AND SUPPORT"));
    }

    #[test]
    fn structural_caption_last_resort() {
        let items = extract_funding(&chunk("TITLE I—DEPARTMENT OF DEFENSE\n$7,000,000.\n"));
        assert_eq!(items[0].purpose.as_deref(), Some("DEPARTMENT OF DEFENSE"));
    }

    #[test]
    fn unlabelled_chunk_without_context_has_no_purpose() {
        let chunk = Chunk::new(0, "Total: $7,000,000.".into(), None, None);
        let items = extract_funding(&chunk);
        assert_eq!(items[0].purpose, None);
        assert_eq!(items[0].recipient, None);
    }

    #[test]
    fn adjacent_amounts_do_not_share_context() {
        let items = extract_funding(&chunk(
            "$5,000,000 for highway safety programs, and $2,000,000 for transit research grants.",
        ));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].purpose.as_deref(), Some("highway safety programs"));
        assert_eq!(items[1].purpose.as_deref(), Some("transit research grants"));
    }

    #[test]
    fn malformed_amount_kept_without_numeric() {
        let items = extract_funding(&chunk("$1.000.000 for something strange here."));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount_numeric, None);
    }

    #[test]
    fn case_folding_characters_in_purpose() {
        let items = extract_funding(&chunk(
            "$5,000,000 for \u{212A} until \u{130}\u{130} and more text here.",
        ));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount_numeric, Some(5_000_000.0));
    }
}
