//! Token-set similarity for short texts (captions, purposes, titles).

use std::collections::HashSet;
use std::hash::Hash;

/// Words that carry no topic on their own.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it", "of",
    "on", "or", "such", "that", "the", "this", "to", "under", "with",
];

/// Jaccard similarity |A ∩ B| / |A ∪ B|. Two empty sets are identical.
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Lowercase alphanumeric words of `text`, minus stopwords and anything in `extra_stop`.
pub fn content_tokens(text: &str, extra_stop: &[&str]) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()) && !extra_stop.contains(&w.as_str()))
        .collect()
}

/// Jaccard similarity of the content words of two texts.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    jaccard_similarity(&content_tokens(a, &[]), &content_tokens(b, &[]))
}
