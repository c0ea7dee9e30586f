//! Normalisation for US bill structural headings.
//!
//! Omnibus bills are organised as `DIVISION A`, `DIVISION B`, ... each holding
//! `TITLE I`, `TITLE II`, ... Headings arrive with inconsistent casing, dash
//! styles (`—`, `--`, `-`) and trailing captions, so every comparison between
//! two versions goes through the helpers here.
//!
//! # Conventions
//!
//! - Division labels: one to three uppercase letters (`A`, `B`, ..., `AA`)
//! - Title enumerators: Roman numerals in canonical form (`I`, `IV`, `XIV`),
//!   occasionally a single letter in smaller bills
//! - Captions follow the enumerator after a dash: `TITLE I—DEPARTMENT OF DEFENSE`

/// Key used for sections that precede the first structural marker.
pub const PREAMBLE_KEY: &str = "PREAMBLE";

const ROMAN_DIGITS: &[(u32, &str)] = &[
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Value of a Roman numeral, accepting only the canonical spelling.
///
/// `"IV"` → 4, `"XIV"` → 14, but `"IIII"`, `"VX"` and `"DIM"` are rejected so
/// that ordinary uppercase words are not mistaken for title enumerators.
pub fn roman_value(s: &str) -> Option<u32> {
    let upper = s.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }

    let mut value = 0u32;
    let mut rest = upper.as_str();
    for &(n, digits) in ROMAN_DIGITS {
        while let Some(tail) = rest.strip_prefix(digits) {
            value += n;
            rest = tail;
        }
    }
    if !rest.is_empty() || value == 0 || value > 3999 {
        return None;
    }

    // Greedy parsing accepts some non-canonical forms ("IIII"); round-trip to reject them.
    (to_roman(value) == upper).then_some(value)
}

/// Canonical Roman spelling of `n` (1..=3999).
pub fn to_roman(mut n: u32) -> String {
    let mut out = String::new();
    for &(value, digits) in ROMAN_DIGITS {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Whether `s` is a valid title enumerator: a canonical Roman numeral or a single letter.
pub fn is_title_enumerator(s: &str) -> bool {
    let s = s.trim();
    roman_value(s).is_some() || (s.len() == 1 && s.chars().all(|c| c.is_ascii_uppercase()))
}

/// Alignment key for a chunk's structural position.
///
/// `(Some("A"), Some("IV"))` → `"DIVISION A / TITLE IV"`; no labels → [`PREAMBLE_KEY`].
pub fn section_key(division: Option<&str>, title: Option<&str>) -> String {
    let division = division.map(|d| d.trim().to_ascii_uppercase());
    let title = title.map(|t| t.trim().to_ascii_uppercase());
    match (division, title) {
        (None, None) => PREAMBLE_KEY.to_string(),
        (Some(d), None) => format!("DIVISION {d}"),
        (None, Some(t)) => format!("TITLE {t}"),
        (Some(d), Some(t)) => format!("DIVISION {d} / TITLE {t}"),
    }
}

/// Uppercase a heading line, unify dash styles and collapse whitespace.
///
/// `"Title  I -- Department of Defense."` → `"TITLE I - DEPARTMENT OF DEFENSE"`
pub fn normalize_heading(line: &str) -> String {
    let unified = line
        .replace(['—', '–'], " - ")
        .replace("--", " - ")
        .to_uppercase();
    let collapsed = unified.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == '.' || c == ',' || c == ';' || c == ':')
        .trim()
        .to_string()
}

/// Caption text following the structural enumerator, if any.
///
/// `"TITLE I—DEPARTMENT OF DEFENSE"` → `Some("DEPARTMENT OF DEFENSE")`,
/// `"DIVISION A"` → `None`.
pub fn heading_caption(line: &str) -> Option<String> {
    let normalized = normalize_heading(line);
    let mut words = normalized.split(' ');
    let marker = words.next()?;
    if marker != "DIVISION" && marker != "TITLE" {
        return None;
    }
    words.next()?;
    let caption = words
        .skip_while(|w| *w == "-")
        .collect::<Vec<_>>()
        .join(" ");
    (!caption.is_empty()).then_some(caption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_exact_values() {
        assert_eq!(roman_value("I"), Some(1));
        assert_eq!(roman_value("IV"), Some(4));
        assert_eq!(roman_value("ix"), Some(9));
        assert_eq!(roman_value("XIV"), Some(14));
        assert_eq!(roman_value("XL"), Some(40));
        assert_eq!(roman_value("MCMXCIV"), Some(1994));
    }

    #[test]
    fn roman_rejects_non_canonical() {
        assert_eq!(roman_value(""), None);
        assert_eq!(roman_value("IIII"), None);
        assert_eq!(roman_value("VX"), None);
        assert_eq!(roman_value("DIM"), None);
        assert_eq!(roman_value("MIX2"), None);
    }

    #[test]
    fn roman_round_trips_title_range() {
        for n in 1..=50 {
            assert_eq!(roman_value(&to_roman(n)), Some(n), "round trip failed for {n}");
        }
    }

    #[test]
    fn title_enumerators() {
        assert!(is_title_enumerator("IV"));
        assert!(is_title_enumerator("B"));
        assert!(!is_title_enumerator("DIM"));
        assert!(!is_title_enumerator("AB"));
    }

    #[test]
    fn section_keys() {
        assert_eq!(section_key(None, None), PREAMBLE_KEY);
        assert_eq!(section_key(Some("a"), None), "DIVISION A");
        assert_eq!(section_key(None, Some("iv")), "TITLE IV");
        assert_eq!(section_key(Some("B"), Some("II")), "DIVISION B / TITLE II");
    }

    #[test]
    fn normalize_unifies_dashes_and_case() {
        assert_eq!(
            normalize_heading("Title  I -- Department of Defense."),
            "TITLE I - DEPARTMENT OF DEFENSE"
        );
        assert_eq!(
            normalize_heading("TITLE I—DEPARTMENT OF DEFENSE"),
            "TITLE I - DEPARTMENT OF DEFENSE"
        );
    }

    #[test]
    fn captions() {
        assert_eq!(
            heading_caption("TITLE I—DEPARTMENT OF DEFENSE").as_deref(),
            Some("DEPARTMENT OF DEFENSE")
        );
        assert_eq!(
            heading_caption("DIVISION B--Energy and Water").as_deref(),
            Some("ENERGY AND WATER")
        );
        assert_eq!(heading_caption("DIVISION A"), None);
        assert_eq!(heading_caption("SEC. 101. SHORT TITLE"), None);
    }
}
