//! Merge per-chunk facts into document facts.
//!
//! Chunks may be extracted in any order; results are sorted by chunk
//! position before merging so the document view is always in read order.

use std::collections::{BTreeSet, HashMap, HashSet};

use porkchop_core::{Chunk, ChunkFacts, DocumentFacts, RefType, normalize_entity_name};
use rayon::prelude::*;
use tracing::info;

use crate::extractor::extract;

/// Extract every chunk, in parallel when asked, returning facts in position order.
pub fn extract_all(chunks: &[Chunk], parallel: bool) -> Vec<ChunkFacts> {
    let mut facts: Vec<ChunkFacts> = if parallel {
        chunks.par_iter().map(extract).collect()
    } else {
        chunks.iter().map(extract).collect()
    };
    facts.sort_by_key(|f| f.position);
    facts
}

/// Extract and merge a whole document.
pub fn extract_document(chunks: &[Chunk], parallel: bool) -> DocumentFacts {
    merge(&extract_all(chunks, parallel))
}

/// Merge already-extracted chunk facts, in the order given.
pub fn merge(chunk_facts: &[ChunkFacts]) -> DocumentFacts {
    let mut acc = DocumentAccumulator::new();
    for facts in chunk_facts {
        acc.add(facts);
    }
    acc.finish()
}

/// Running merge of chunk facts.
///
/// Funding items, deadlines and duties are concatenated. References are
/// deduplicated on `(type, text)` and entities on their normalised name,
/// keeping the first occurrence; a later occurrence can still supply a
/// role the first one lacked. Only the records kept are cloned.
#[derive(Debug, Default)]
pub struct DocumentAccumulator {
    facts: DocumentFacts,
    seen_refs: HashSet<(RefType, String)>,
    entity_index: HashMap<String, usize>,
    seen_dates: HashSet<String>,
    fiscal_years: BTreeSet<i32>,
    chunks: usize,
}

impl DocumentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chunk: &ChunkFacts) {
        self.chunks += 1;
        self.facts.funding.extend_from_slice(&chunk.funding);
        self.facts.deadlines.extend_from_slice(&chunk.deadlines);
        self.facts.duties.extend_from_slice(&chunk.duties);

        for reference in &chunk.references {
            if self
                .seen_refs
                .insert((reference.ref_type, reference.ref_text.clone()))
            {
                self.facts.references.push(reference.clone());
            }
        }

        for entity in &chunk.entities {
            let key = normalize_entity_name(&entity.name);
            match self.entity_index.get(&key).copied() {
                Some(i) => {
                    let existing = &mut self.facts.entities[i];
                    if existing.role.is_none() {
                        existing.role.clone_from(&entity.role);
                    }
                }
                None => {
                    self.entity_index.insert(key, self.facts.entities.len());
                    self.facts.entities.push(entity.clone());
                }
            }
        }

        for date in &chunk.dates {
            if !self.seen_dates.contains(date) {
                self.seen_dates.insert(date.clone());
                self.facts.dates.push(date.clone());
            }
        }
        self.fiscal_years.extend(chunk.fiscal_years.iter().copied());
    }

    pub fn finish(mut self) -> DocumentFacts {
        self.facts.fiscal_years = self.fiscal_years.into_iter().collect();
        info!(
            chunks = self.chunks,
            funding = self.facts.funding.len(),
            references = self.facts.references.len(),
            deadlines = self.facts.deadlines.len(),
            duties = self.facts.duties.len(),
            entities = self.facts.entities.len(),
            "aggregated document facts"
        );
        self.facts
    }
}
