//! Calendar dates and fiscal years.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::context::squash;

pub(crate) const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?P<month>{MONTHS})\s+(?P<day>\d{{1,2}}),\s*(?P<year>\d{{4}})\b"))
        .expect("date")
});

static FISCAL_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bfiscal\s+years?\s+\d{4}(?:\s*(?:,|and|through|to|–|-)\s*(?:and\s+)?(?:fiscal\s+year\s+)?\d{4})*")
        .expect("fiscal years")
});

static FY_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bFY\s?(?P<year>\d{4})\b").expect("fy short"));

static YEAR_OR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d{4}|through|to|–|-").expect("year or range"));

/// Longest range expanded into individual years.
const MAX_RANGE_YEARS: i32 = 20;

/// Every `Month D, YYYY` date in `text`, normalised and in order of appearance.
pub fn find_dates(text: &str) -> Vec<String> {
    DATE.find_iter(text).map(|m| squash(m.as_str())).collect()
}

/// Parse `Month D, YYYY`, rejecting impossible days.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE.captures(text)?;
    let month = month_number(&caps["month"])?;
    let day: u32 = caps["day"].parse().ok()?;
    let year: i32 = caps["year"].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTHS
        .split('|')
        .position(|m| m.eq_ignore_ascii_case(&lower))
        .map(|i| i as u32 + 1)
}

/// Fiscal years referenced in `text`, sorted and unique.
///
/// `fiscal years 2024 through 2026` expands to 2024, 2025, 2026;
/// `FY2025` is recognised too.
pub fn fiscal_years(text: &str) -> Vec<i32> {
    let mut years = BTreeSet::new();
    for m in FISCAL_YEARS.find_iter(text) {
        let mut previous: Option<i32> = None;
        let mut pending_range = false;
        for token in YEAR_OR_RANGE.find_iter(m.as_str()) {
            let Ok(year) = token.as_str().parse::<i32>() else {
                pending_range = previous.is_some();
                continue;
            };
            match previous {
                Some(from) if pending_range && year > from && year - from <= MAX_RANGE_YEARS => {
                    years.extend(from..=year);
                }
                _ => {
                    years.insert(year);
                }
            }
            previous = Some(year);
            pending_range = false;
        }
    }
    for caps in FY_SHORT.captures_iter(text) {
        if let Ok(year) = caps["year"].parse::<i32>() {
            years.insert(year);
        }
    }
    years.into_iter().collect()
}
