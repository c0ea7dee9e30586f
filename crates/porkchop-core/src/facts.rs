//! Fact records extracted from bill text.
//!
//! Every record is a plain value: optional fields are `None` when the
//! extractor found nothing, which is a valid, queryable state rather than an
//! error.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dollar amount with whatever purpose, recipient and availability could
/// be attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingItem {
    /// Amount as written, e.g. `"$100,000,000"` or `"$1.5 billion"`.
    pub amount_text: String,
    /// Dollars after scale-word resolution. `None` only when the amount text
    /// does not parse; such items are kept so totals can report them.
    pub amount_numeric: Option<f64>,
    pub purpose: Option<String>,
    pub recipient: Option<String>,
    pub availability: Option<String>,
    pub fiscal_years: Vec<i32>,
    pub source_text: String,
    pub source_chunk_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    UsCode,
    PublicLaw,
    Act,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsCode => "us_code",
            Self::PublicLaw => "public_law",
            Self::Act => "act",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "us_code" => Some(Self::UsCode),
            "public_law" => Some(Self::PublicLaw),
            "act" => Some(Self::Act),
            _ => None,
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citation to the US Code, a Public Law, or a named Act/Code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalReference {
    pub ref_type: RefType,
    pub ref_text: String,
    pub source_chunk_id: String,
}

impl LegalReference {
    /// Document-level identity: the same citation from two chunks is one reference.
    pub fn dedup_key(&self) -> (RefType, &str) {
        (self.ref_type, self.ref_text.as_str())
    }
}

/// A "not later than" requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    /// `"January 15, 2025"` or `"90 days after the date of enactment of this Act"`.
    pub date_text: String,
    /// Parsed form of an absolute `date_text`.
    pub due_date: Option<NaiveDate>,
    /// Required action, always taken from text after the date.
    pub action: Option<String>,
    pub responsible_entity: Option<String>,
    pub source_text: String,
    pub source_chunk_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modal {
    Shall,
    May,
    Must,
}

impl Modal {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "shall" => Some(Self::Shall),
            "may" => Some(Self::May),
            "must" => Some(Self::Must),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shall => "shall",
            Self::May => "may",
            Self::Must => "must",
        }
    }
}

/// `<Entity> shall|may|must <action>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
    pub entity: String,
    pub modal: Modal,
    pub action: String,
    pub source_chunk_id: String,
}

/// A named government body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Head noun: `department`, `office`, `agency`, ...
    pub entity_type: Option<String>,
    pub role: Option<String>,
}

impl Entity {
    pub fn normalized_name(&self) -> String {
        normalize_entity_name(&self.name)
    }
}

/// Case- and whitespace-insensitive identity for entity names.
///
/// `"The  Department of DEFENSE"` → `"department of defense"`
pub fn normalize_entity_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let words = match words.first() {
        Some(&"the") if words.len() > 1 => &words[1..],
        _ => &words[..],
    };
    words.join(" ")
}

/// Everything extracted from one chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkFacts {
    pub chunk_id: String,
    pub position: usize,
    pub funding: Vec<FundingItem>,
    pub references: Vec<LegalReference>,
    pub deadlines: Vec<Deadline>,
    pub duties: Vec<Duty>,
    pub entities: Vec<Entity>,
    /// Every `Month D, YYYY` date, in order of first appearance.
    pub dates: Vec<String>,
    /// Every fiscal year mentioned, ascending.
    pub fiscal_years: Vec<i32>,
}

/// Facts aggregated over a whole document, in chunk order, with references
/// and entities deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFacts {
    pub funding: Vec<FundingItem>,
    pub references: Vec<LegalReference>,
    pub deadlines: Vec<Deadline>,
    pub duties: Vec<Duty>,
    pub entities: Vec<Entity>,
    pub dates: Vec<String>,
    pub fiscal_years: Vec<i32>,
}

impl DocumentFacts {
    /// Sum of all parsed amounts. Items without a numeric value are skipped;
    /// see [`uncomputed_funding`](Self::uncomputed_funding).
    pub fn funding_total(&self) -> f64 {
        self.funding.iter().filter_map(|f| f.amount_numeric).sum()
    }

    /// Number of funding items whose amount could not be parsed.
    pub fn uncomputed_funding(&self) -> usize {
        self.funding
            .iter()
            .filter(|f| f.amount_numeric.is_none())
            .count()
    }

    pub fn references_of(&self, ref_type: RefType) -> impl Iterator<Item = &LegalReference> {
        self.references
            .iter()
            .filter(move |r| r.ref_type == ref_type)
    }
}
