//! Dollar amounts: `$100,000,000`, `$1.5 billion`.

use once_cell::sync::Lazy;
use regex::Regex;

static DOLLAR_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$\s?(?P<amount>\d[\d,.]*)(?:\s+(?P<scale>thousand|million|billion|trillion)\b)?",
    )
    .expect("dollar amount")
});

/// One dollar amount located in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMatch {
    /// Byte offset of the `$`.
    pub start: usize,
    /// Byte offset just past the amount (and scale word, if any).
    pub end: usize,
    /// Normalised display text, e.g. `"$1.5 billion"`.
    pub text: String,
    /// `None` when the digits are malformed (`$1.000.000`).
    pub numeric: Option<f64>,
}

/// All dollar amounts in `text`, in order of appearance.
pub fn find_amounts(text: &str) -> Vec<AmountMatch> {
    DOLLAR_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let raw = caps.name("amount")?;
            let digits = raw.as_str().trim_end_matches([',', '.']);
            let scale = caps.name("scale").map(|s| s.as_str().to_ascii_lowercase());
            let end = if caps.name("scale").is_some() {
                whole.end()
            } else {
                raw.start() + digits.len()
            };
            let text = match &scale {
                Some(s) => format!("${digits} {s}"),
                None => format!("${digits}"),
            };
            Some(AmountMatch {
                start: whole.start(),
                end,
                numeric: parse_amount(digits, scale.as_deref()),
                text,
            })
        })
        .collect()
}

/// Parse digits with thousands separators and an optional scale word.
///
/// Returns `None` for anything that is not a single well-formed number.
pub fn parse_amount(digits: &str, scale: Option<&str>) -> Option<f64> {
    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_end_matches('.');
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    let multiplier = match scale.map(str::to_ascii_lowercase).as_deref() {
        Some("thousand") => 1e3,
        Some("million") => 1e6,
        Some("billion") => 1e9,
        Some("trillion") => 1e12,
        _ => 1.0,
    };
    let amount = value * multiplier;
    amount.is_finite().then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_amount() {
        let found = find_amounts("provided $100,000,000 for relief.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "$100,000,000");
        assert_eq!(found[0].numeric, Some(100_000_000.0));
    }

    #[test]
    fn trailing_punctuation_not_part_of_amount() {
        let text = "a total of $5,000,000.";
        let found = find_amounts(text);
        assert_eq!(found[0].text, "$5,000,000");
        assert_eq!(&text[found[0].start..found[0].end], "$5,000,000");
    }

    #[test]
    fn scale_words() {
        let found = find_amounts("$1.5 billion and $500 Million and $2 thousand");
        let values: Vec<_> = found.iter().map(|a| a.numeric).collect();
        assert_eq!(values, vec![Some(1.5e9), Some(5e8), Some(2e3)]);
        assert_eq!(found[0].text, "$1.5 billion");
        assert_eq!(found[1].text, "$500 million");
    }

    #[test]
    fn space_after_sign_normalised() {
        let found = find_amounts("$ 250,000 for grants");
        assert_eq!(found[0].text, "$250,000");
        assert_eq!(found[0].numeric, Some(250_000.0));
    }

    #[test]
    fn malformed_amount_has_no_numeric() {
        let found = find_amounts("$1.000.000 for something");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].numeric, None);
        assert_eq!(parse_amount("not-a-number", None), None);
        assert_eq!(parse_amount("", None), None);
    }

    #[test]
    fn no_amounts() {
        assert!(find_amounts("no money here, $ alone").is_empty());
    }
}
