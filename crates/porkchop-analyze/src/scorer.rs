//! Pork-likelihood scoring for funding items.
//!
//! The heuristic adds fixed points for each signal it finds in an item's
//! purpose, recipient, availability and source text, then clamps to
//! `[0, 100]`. Every signal that fires is listed in the score's `flags` and
//! `reasons`.
//!
//! | signal                  | points            |
//! |-------------------------|-------------------|
//! | earmark phrasing        | 15 each, max 45   |
//! | geographic specificity  | 20                |
//! | named institution       | 15                |
//! | small amount            | 10                |
//! | unrelated to the bill   | 15                |
//! | open-ended availability | 5                 |
//!
//! An external [`SemanticJudge`] may add a second opinion, blended with
//! [`porkchop_core::score::blend`].

use std::collections::HashSet;

use arrow::record_batch::RecordBatch;
use once_cell::sync::Lazy;
use porkchop_core::schema::pork_scores_batch;
use porkchop_core::score::{AI_REVIEW_THRESHOLD, PORK_THRESHOLD, clamp_score};
use porkchop_core::{FundingItem, PorkScore, RecordError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::similarity::content_tokens;

pub const EARMARK_WEIGHT: f64 = 15.0;
pub const EARMARK_MAX: f64 = 45.0;
pub const GEOGRAPHIC_WEIGHT: f64 = 20.0;
pub const NAMED_ENTITY_WEIGHT: f64 = 15.0;
pub const SMALL_AMOUNT_WEIGHT: f64 = 10.0;
pub const UNRELATED_WEIGHT: f64 = 15.0;
pub const OPEN_ENDED_WEIGHT: f64 = 5.0;

/// Smallness line for bills with too few amounts for a percentile.
pub const ABSOLUTE_SMALL_AMOUNT: f64 = 10_000_000.0;
/// Percentile of the bill's amounts below which an item counts as small.
pub const SMALL_PERCENTILE: f64 = 0.25;
/// Parsed amounts needed before the percentile is used.
pub const PERCENTILE_MIN_ITEMS: usize = 4;

pub const FLAG_EARMARK: &str = "earmark_language";
pub const FLAG_GEOGRAPHIC: &str = "geographic_specificity";
pub const FLAG_NAMED_ENTITY: &str = "named_entity";
pub const FLAG_SMALL_AMOUNT: &str = "small_amount";
pub const FLAG_UNRELATED: &str = "potentially_unrelated";
pub const FLAG_OPEN_ENDED: &str = "open_ended_availability";

const JUDGE_FAILED_REASON: &str = "semantic review failed; heuristic score only";

const EARMARK_SIGNALS: &[&str] = &[
    "located in",
    "city of",
    "county of",
    "state of",
    "the university of",
    "the college of",
    "named after",
    "in honor of",
    "for the benefit of",
    "specific to",
    "exclusively for",
    "memorial",
    "institute",
    "foundation",
    "museum",
    "center for",
    "bridge",
    "highway",
    "road",
    "airport",
    "port",
    "harbor",
];

const GEOGRAPHIC_TERMS: &[&str] = &["county", "district", "parish", "township", "borough"];

const NAMED_ENTITY_TERMS: &[&str] = &[
    "university",
    "college",
    "hospital",
    "museum",
    "foundation",
    "institute",
];

/// Words too common in bill titles to say anything about the topic.
const GENERIC_TITLE_WORDS: &[&str] = &[
    "act",
    "acts",
    "additional",
    "appropriation",
    "appropriations",
    "authorization",
    "bill",
    "consolidated",
    "continuing",
    "emergency",
    "federal",
    "fiscal",
    "further",
    "national",
    "omnibus",
    "other",
    "purposes",
    "states",
    "supplemental",
    "united",
    "year",
];

static EARMARK_PATTERNS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| word_patterns(EARMARK_SIGNALS));
static GEOGRAPHIC_PATTERNS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| word_patterns(GEOGRAPHIC_TERMS));
static NAMED_ENTITY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| word_patterns(NAMED_ENTITY_TERMS));

fn word_patterns(terms: &[&'static str]) -> Vec<(&'static str, Regex)> {
    terms
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            (*term, Regex::new(&pattern).expect("static term pattern"))
        })
        .collect()
}

fn matching<'p>(patterns: &'p [(&'static str, Regex)], text: &str) -> Vec<&'p str> {
    patterns
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(term, _)| *term)
        .collect()
}

fn topic_tokens(text: &str) -> HashSet<String> {
    content_tokens(text, GENERIC_TITLE_WORDS)
        .into_iter()
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

// ── Bill context ──

/// What an item is judged against: the bill's stated topic and its full
/// funding set.
#[derive(Debug, Clone)]
pub struct BillContext<'a> {
    pub title: String,
    pub purpose: Option<String>,
    pub funding: &'a [FundingItem],
    topic: HashSet<String>,
    small_amount_cutoff: f64,
}

impl<'a> BillContext<'a> {
    pub fn new(
        title: impl Into<String>,
        purpose: Option<String>,
        funding: &'a [FundingItem],
    ) -> Self {
        let title = title.into();
        let mut topic = topic_tokens(&title);
        if let Some(purpose) = purpose.as_deref() {
            topic.extend(topic_tokens(purpose));
        }
        Self {
            small_amount_cutoff: small_amount_cutoff(funding),
            title,
            purpose,
            funding,
            topic,
        }
    }

    /// Amounts strictly below this count as small.
    pub fn small_amount_cutoff(&self) -> f64 {
        self.small_amount_cutoff
    }
}

/// 25th percentile (linear interpolation) of the parsed positive amounts, or
/// [`ABSOLUTE_SMALL_AMOUNT`] when there are fewer than [`PERCENTILE_MIN_ITEMS`].
fn small_amount_cutoff(funding: &[FundingItem]) -> f64 {
    let mut amounts: Vec<f64> = funding
        .iter()
        .filter_map(|f| f.amount_numeric)
        .filter(|a| *a > 0.0)
        .collect();
    if amounts.len() < PERCENTILE_MIN_ITEMS {
        return ABSOLUTE_SMALL_AMOUNT;
    }
    amounts.sort_by(f64::total_cmp);
    let rank = SMALL_PERCENTILE * (amounts.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    amounts[lower] + (amounts[upper] - amounts[lower]) * (rank - lower as f64)
}

// ── Heuristic ──

/// Heuristic result with its explanation. `score` is already clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Heuristic {
    pub score: f64,
    pub flags: Vec<String>,
    pub reasons: Vec<String>,
}

impl Heuristic {
    fn add(&mut self, points: f64, flag: &str, reason: String) {
        self.score += points;
        self.flags.push(flag.to_string());
        self.reasons.push(reason);
    }
}

/// Score one item on textual signals alone.
pub fn heuristic_score(item: &FundingItem, ctx: &BillContext<'_>) -> Heuristic {
    let mut h = Heuristic {
        score: 0.0,
        flags: Vec::new(),
        reasons: Vec::new(),
    };
    let combined = [
        item.purpose.as_deref(),
        item.recipient.as_deref(),
        item.availability.as_deref(),
        Some(item.source_text.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    let earmarks = matching(&EARMARK_PATTERNS, &combined);
    if !earmarks.is_empty() {
        let points = (earmarks.len() as f64 * EARMARK_WEIGHT).min(EARMARK_MAX);
        h.add(
            points,
            FLAG_EARMARK,
            format!("earmark phrasing: {}", earmarks.join(", ")),
        );
    }

    let places = matching(&GEOGRAPHIC_PATTERNS, &combined);
    if !places.is_empty() {
        h.add(
            GEOGRAPHIC_WEIGHT,
            FLAG_GEOGRAPHIC,
            format!("names a specific locality ({})", places.join(", ")),
        );
    }

    let institutions = matching(&NAMED_ENTITY_PATTERNS, &combined);
    if !institutions.is_empty() {
        h.add(
            NAMED_ENTITY_WEIGHT,
            FLAG_NAMED_ENTITY,
            format!("directed at a named institution ({})", institutions.join(", ")),
        );
    }

    if let Some(amount) = item.amount_numeric
        && amount > 0.0
        && amount < ctx.small_amount_cutoff
    {
        h.add(
            SMALL_AMOUNT_WEIGHT,
            FLAG_SMALL_AMOUNT,
            format!(
                "small amount ({}) relative to the bill",
                crate::changelog::format_dollars(amount)
            ),
        );
    }

    if let Some(purpose) = item.purpose.as_deref()
        && !ctx.topic.is_empty()
    {
        let words = topic_tokens(purpose);
        if !words.is_empty() && words.is_disjoint(&ctx.topic) {
            h.add(
                UNRELATED_WEIGHT,
                FLAG_UNRELATED,
                "purpose shares no topic words with the bill".to_string(),
            );
        }
    }

    let lower = combined.to_lowercase();
    if lower.contains("until expended")
        && item.fiscal_years.is_empty()
        && !lower.contains("fiscal year")
    {
        h.add(
            OPEN_ENDED_WEIGHT,
            FLAG_OPEN_ENDED,
            "available until expended with no fiscal year limit".to_string(),
        );
    }

    h.score = clamp_score(h.score);
    h
}

// ── Semantic review ──

/// A second opinion on one item from an external reviewer, typically an LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiJudgment {
    pub score: f64,
    #[serde(default, alias = "reasoning")]
    pub rationale: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl AiJudgment {
    /// Parse a reviewer's JSON reply: `{"score": 72, "rationale": "..."}`.
    /// `reasoning` is accepted in place of `rationale`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Source of [`AiJudgment`]s. Implementations live outside the core; errors
/// are opaque and degrade scoring to heuristic-only.
pub trait SemanticJudge {
    fn judge(&self, item: &FundingItem, ctx: &BillContext<'_>) -> anyhow::Result<AiJudgment>;
}

/// Heuristic-only score.
pub fn score(item_id: usize, item: &FundingItem, ctx: &BillContext<'_>) -> PorkScore {
    score_with_judgment(item_id, item, ctx, None)
}

/// Score with an optional, already obtained, semantic judgment.
pub fn score_with_judgment(
    item_id: usize,
    item: &FundingItem,
    ctx: &BillContext<'_>,
    judgment: Option<&AiJudgment>,
) -> PorkScore {
    combine(item_id, heuristic_score(item, ctx), judgment)
}

fn combine(item_id: usize, h: Heuristic, judgment: Option<&AiJudgment>) -> PorkScore {
    let Heuristic {
        score,
        mut flags,
        mut reasons,
    } = h;
    let ai = judgment.map(|j| {
        for flag in &j.flags {
            if !flags.contains(flag) {
                flags.push(flag.clone());
            }
        }
        if !j.rationale.is_empty() {
            reasons.push(format!("semantic review: {}", j.rationale));
        }
        j.score
    });
    PorkScore::new(item_id, score, ai, flags, reasons)
}

// ── Bill report ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillScoreReport {
    pub title: String,
    pub items_scored: usize,
    pub avg_score: f64,
    pub max_score: f64,
    /// Items with blended score ≥ 60, highest first, ties by item id.
    pub high_pork: Vec<PorkScore>,
    /// Every item's score, in funding order.
    pub scores: Vec<PorkScore>,
}

impl BillScoreReport {
    fn new(title: String, scores: Vec<PorkScore>) -> Self {
        let items_scored = scores.len();
        let (avg_score, max_score) = if scores.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = scores.iter().map(|s| s.blended_score).sum();
            let max = scores
                .iter()
                .map(|s| s.blended_score)
                .fold(f64::MIN, f64::max);
            (sum / items_scored as f64, max)
        };
        let mut high_pork: Vec<PorkScore> = scores
            .iter()
            .filter(|s| s.blended_score >= PORK_THRESHOLD)
            .cloned()
            .collect();
        high_pork.sort_by(|a, b| {
            b.blended_score
                .total_cmp(&a.blended_score)
                .then(a.funding_item_id.cmp(&b.funding_item_id))
        });
        Self {
            title,
            items_scored,
            avg_score,
            max_score,
            high_pork,
            scores,
        }
    }

    /// `pork_scores` rows for the storage layer.
    pub fn record_batch(&self) -> Result<RecordBatch, RecordError> {
        pork_scores_batch(&self.scores)
    }
}

/// Score every funding item of a bill.
///
/// With a judge, only items whose heuristic score reaches
/// [`AI_REVIEW_THRESHOLD`] are sent for review.
pub fn score_bill(ctx: &BillContext<'_>, judge: Option<&dyn SemanticJudge>) -> BillScoreReport {
    let mut scores = Vec::with_capacity(ctx.funding.len());
    for (id, item) in ctx.funding.iter().enumerate() {
        let h = heuristic_score(item, ctx);
        let mut judge_failed = false;
        let judgment = match judge {
            Some(judge) if h.score >= AI_REVIEW_THRESHOLD => match judge.judge(item, ctx) {
                Ok(judgment) => Some(judgment),
                Err(err) => {
                    warn!(item = id, error = %err, "semantic review failed, using heuristic score");
                    judge_failed = true;
                    None
                }
            },
            _ => None,
        };
        let mut score = combine(id, h, judgment.as_ref());
        if judge_failed {
            score.reasons.push(JUDGE_FAILED_REASON.to_string());
        }
        scores.push(score);
    }

    let report = BillScoreReport::new(ctx.title.clone(), scores);
    info!(
        title = %report.title,
        items = report.items_scored,
        avg = report.avg_score,
        max = report.max_score,
        high_pork = report.high_pork.len(),
        "scored bill"
    );
    report
}
