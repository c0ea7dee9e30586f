//! Removes GPO publishing artifacts from raw bill text.
//!
//! Three phases, applied line by line:
//!
//! 1. Drop lines carrying publisher artifacts (VerDate headers, Jkt job
//!    tickets, file paths, XML references, timestamps, page numbers).
//! 2. Strip leading line numbers and repair OCR-split words
//!    (`strate2 gies` → `strategies`).
//! 3. Normalise whitespace: single spaces within a line, at most one blank
//!    line between paragraphs.
//!
//! `clean` is idempotent: a second pass over its own output changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A line is dropped if any of these match anywhere on it.
static ARTIFACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // GPO revision header: "VerDate Nov 24 2008 17:46 Dec 17, 2024 Jkt ..."
        r"VerDate",
        // Job ticket
        r"\bJkt\b",
        // Drive-letter paths: C:\USERS\..., I:\FY25\..., l:\v7\...
        r"\b[A-Za-z]:\\",
        // XML file references
        r"(?i)\.xml\b",
        // Pipe notation: (955033|8)
        r"\(\d+\|\d+\)",
        // "December 17, 2024 (5:46 p.m.)"
        r"\w+\s+\d{1,2},\s+\d{4}\s*\(\d{1,2}:\d{2}\s*[ap]\.m\.\)",
        // Bare clock timestamp
        r"^\s*\(?\d{1,2}:\d{2}(?::\d{2})?\s*(?:[ap]\.?m\.?)?\)?\s*$",
        // Standalone page numbers, possibly comma-separated
        r"^\s*\d+(?:\s*,\s*\d+)*\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("artifact pattern"))
    .collect()
});

/// One- or two-digit GPO line number at the start of a line.
static LINE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}\s+").expect("line number"));

/// A number followed by one of these is a citation, not a line number.
static CITATION_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:U\.\s?S\.\s?C\b|U\.S\.\s|Stat\.|C\.F\.R\b|CFR\b|USC\b)").expect("citation tail")
});

/// `strate2 gies`: digits wedged between two lowercase fragments.
static OCR_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])\d+\s+([a-z])").expect("ocr split"));

/// Clean raw bill text. Deterministic and side-effect free.
pub fn clean(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;
    let mut removed = 0usize;

    for line in raw.lines() {
        if line.trim().is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        match clean_line(line) {
            Some(cleaned) => {
                if pending_blank {
                    lines.push(String::new());
                    pending_blank = false;
                }
                lines.push(cleaned);
            }
            None => removed += 1,
        }
    }

    let out = lines.join("\n");
    debug!(
        input_bytes = raw.len(),
        output_bytes = out.len(),
        removed_lines = removed,
        "cleaned bill text"
    );
    out
}

/// Whether a line carries a publisher artifact and should be dropped whole.
pub fn is_artifact_line(line: &str) -> bool {
    ARTIFACT_PATTERNS.iter().any(|p| p.is_match(line))
}

fn clean_line(line: &str) -> Option<String> {
    if is_artifact_line(line) {
        return None;
    }
    let collapsed = collapse_whitespace(line);
    let stripped = strip_line_numbers(&collapsed);
    let repaired = repair_ocr_splits(stripped);
    // Stripping can expose a bare page number ("3 45" → "45").
    if repaired.is_empty() || is_artifact_line(&repaired) {
        return None;
    }
    Some(repaired)
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip repeated leading line numbers, stopping before a citation number.
fn strip_line_numbers(line: &str) -> &str {
    let mut rest = line;
    while let Some(m) = LINE_NUMBER.find(rest) {
        let tail = &rest[m.end()..];
        if tail.is_empty() || CITATION_TAIL.is_match(tail) {
            break;
        }
        rest = tail;
    }
    rest
}

/// Rejoin OCR-split words until no split remains.
///
/// Only lowercase–digits–space–lowercase is repaired, so `42 U.S.C. 3030a`
/// and other uppercase-adjacent numbers are left alone.
pub fn repair_ocr_splits(line: &str) -> String {
    let mut current = line.to_string();
    while OCR_SPLIT.is_match(&current) {
        current = OCR_SPLIT.replace_all(&current, "${1}${2}").into_owned();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE_RAW: &str = "VerDate Nov 24 2008 17:46 Dec 17, 2024 Jkt 000000 PO 00000 Frm 00001 Fmt 6652 Sfmt 6211
C:\\USERS\\KSALMON\\APPDATA\\ROAMING\\SOFTQUAD\\XMETAL\\11.0\\GEN\\C\\D121724.03
December 17, 2024 (5:46 p.m.)
I:\\FY25\\SUPPS\\D121724.038.XML
l:\\v7\\121724\\7121724.012.xml (955033|8)
1 DIVISION A—FURTHER CONTINUING
2 APPROPRIATIONS ACT, 2025
3 SEC. 101. (a) Such amounts as may be nec-
4 essary, at a rate for operations as provided in
11 TITLE I—DEPARTMENT OF DEFENSE
12 SEC. 102. The Secretary of Defense shall submit a report
13 to Congress not later than January 15, 2025.
14 $100,000,000 for disaster relief operations.
15 The Department of Homeland Security shall coordinate with
16 the Office of Management and Budget.
17 Pursuant to 42 U.S.C. 3030a and Public Law 118-42,
18 the Robert T. Stafford Disaster Relief and Emergency Assistance Act
19 authorizes $500,000,000 for FEMA operations until September 30, 2025.
";

    #[test]
    fn removes_publisher_artifacts() {
        let out = clean(SAMPLE_RAW);
        assert!(!out.contains("VerDate"));
        assert!(!out.contains("Jkt"));
        assert!(!out.contains("C:\\USERS"));
        assert!(!out.contains("I:\\FY25"));
        assert!(!out.contains(".xml"));
        assert!(!out.contains("(955033|8)"));
        assert!(!out.contains("(5:46 p.m.)"));
    }

    #[test]
    fn strips_line_numbers_but_keeps_content() {
        let out = clean(SAMPLE_RAW);
        let first = out.lines().next().unwrap();
        assert_eq!(first, "DIVISION A—FURTHER CONTINUING");
        assert!(out.contains("TITLE I—DEPARTMENT OF DEFENSE"));
        assert!(out.contains("$100,000,000 for disaster relief operations."));
        assert!(out.contains("$500,000,000"));
        assert!(out.contains("Public Law 118-42"));
        assert!(out.contains("Department of Homeland Security"));
        assert!(out.contains("Office of Management and Budget"));
        assert!(out.contains("Stafford Disaster Relief"));
        for line in out.lines() {
            assert!(
                !LINE_NUMBER.is_match(line) || line.starts_with("42 U.S.C."),
                "line number survived: {line:?}"
            );
        }
    }

    #[test]
    fn citation_number_at_line_start_kept() {
        assert_eq!(clean("7 42 U.S.C. 3030a is amended"), "42 U.S.C. 3030a is amended");
        assert_eq!(clean("42 U.S.C. 3030a"), "42 U.S.C. 3030a");
    }

    #[test]
    fn repairs_ocr_split_words() {
        assert_eq!(clean("strate2 gies"), "strategies");
        assert_eq!(repair_ocr_splits("the strate2 gies and poli3 cies"), "the strategies and policies");
    }

    #[test]
    fn ocr_repair_reaches_fixpoint() {
        // Adjacent splits share a letter; a single replace_all pass leaves one behind.
        assert_eq!(repair_ocr_splits("ab1 c2 d"), "abcd");
    }

    #[test]
    fn uppercase_adjacent_digits_untouched() {
        assert_eq!(repair_ocr_splits("Title 42 U.S.C. 3030a and H2 program"), "Title 42 U.S.C. 3030a and H2 program");
    }

    #[test]
    fn artifacts_matched_anywhere_on_line() {
        assert_eq!(clean("   text before VerDate stamp\nkept"), "kept");
        assert_eq!(clean("    12   \nkept"), "kept");
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(clean("too    many \t  spaces   here  "), "too many spaces here");
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(clean("line one\n\n\n\n\nline two"), "line one\n\nline two");
        assert_eq!(clean("\n\n\nline one\n\n"), "line one");
    }

    #[test]
    fn removed_lines_leave_no_blank() {
        assert_eq!(clean("alpha\nVerDate 2024\nbeta"), "alpha\nbeta");
        assert_eq!(clean("alpha\n\nVerDate 2024\n\nbeta"), "alpha\n\nbeta");
    }

    #[test]
    fn exposed_page_number_dropped() {
        assert_eq!(clean("3 45\nkept"), "kept");
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("\n \n\t\n"), "");
    }

    #[test]
    fn sample_is_idempotent() {
        let once = clean(SAMPLE_RAW);
        assert_eq!(clean(&once), once);
    }

    proptest! {
        #[test]
        fn clean_is_idempotent(raw in "[a-zA-Z0-9 ,.$:|()\\\\\n\t-]{0,300}") {
            let once = clean(&raw);
            prop_assert_eq!(clean(&once), once);
        }

        #[test]
        fn clean_is_idempotent_on_bill_like_lines(
            lines in proptest::collection::vec(
                "([0-9]{1,2} )?(SEC\\. [0-9]{3}\\. |[0-9]{1,2} U\\.S\\.C\\. )?[a-z]{1,8}[0-9]? [a-z]{1,8}( \\$[0-9,]{1,11})?",
                0..20,
            )
        ) {
            let raw = lines.join("\n");
            let once = clean(&raw);
            prop_assert_eq!(clean(&once), once);
        }
    }
}
