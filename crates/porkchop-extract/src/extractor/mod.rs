//! Per-chunk fact extraction.
//!
//! [`extract`] is a pure function of one chunk, so chunks can be processed
//! in any order or in parallel; see [`crate::aggregate`] for merging.

mod context;
pub mod dates;
pub mod deadlines;
pub mod duties;
pub mod entities;
pub mod funding;
pub mod purpose;
pub mod references;

use porkchop_core::{Chunk, ChunkFacts};
use tracing::debug;

pub use dates::{find_dates, fiscal_years, parse_date};
pub use deadlines::extract_deadlines;
pub use duties::extract_duties;
pub use entities::extract_entities;
pub use funding::extract_funding;
pub use purpose::is_junk_purpose;
pub use references::extract_references;

/// Extract every fact from one chunk.
pub fn extract(chunk: &Chunk) -> ChunkFacts {
    let text = chunk.text.as_str();
    let funding = extract_funding(chunk);
    let references = extract_references(text, &chunk.id);
    let deadlines = extract_deadlines(text, &chunk.id);
    let duties = extract_duties(text, &chunk.id);
    let entities = extract_entities(text, &duties, &funding);

    let mut dates = Vec::new();
    for date in find_dates(text) {
        if !dates.contains(&date) {
            dates.push(date);
        }
    }

    debug!(
        chunk = %chunk.id,
        funding = funding.len(),
        references = references.len(),
        deadlines = deadlines.len(),
        duties = duties.len(),
        entities = entities.len(),
        "extracted chunk"
    );

    ChunkFacts {
        chunk_id: chunk.id.clone(),
        position: chunk.position,
        funding,
        references,
        deadlines,
        duties,
        entities,
        dates,
        fiscal_years: fiscal_years(text),
    }
}
