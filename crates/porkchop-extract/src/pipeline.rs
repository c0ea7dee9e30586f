//! clean → chunk → extract, as one call.

use arrow::record_batch::RecordBatch;
use porkchop_core::schema::{deadlines_batch, funding_items_batch, legal_references_batch};
use porkchop_core::{Chunk, ChunkFacts, ConfigError, DocumentFacts, PipelineConfig, RecordError};
use tracing::{info, warn};

use crate::aggregate::{extract_all, merge};
use crate::chunker::{chunk, is_degraded};
use crate::cleaner::clean;

/// Everything produced for one bill version.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub cleaned: String,
    pub chunks: Vec<Chunk>,
    pub chunk_facts: Vec<ChunkFacts>,
    pub facts: DocumentFacts,
    /// Structural chunking found no markers; see [`is_degraded`].
    pub degraded: bool,
}

/// Arrow batches ready for the storage layer.
#[derive(Debug, Clone)]
pub struct RecordBatches {
    pub funding_items: RecordBatch,
    pub legal_references: RecordBatch,
    pub deadlines: RecordBatch,
}

impl ProcessedDocument {
    pub fn record_batches(&self) -> Result<RecordBatches, RecordError> {
        Ok(RecordBatches {
            funding_items: funding_items_batch(&self.facts.funding)?,
            legal_references: legal_references_batch(&self.facts.references)?,
            deadlines: deadlines_batch(&self.facts.deadlines)?,
        })
    }
}

/// Run the extraction pipeline over raw bill text.
pub fn process(raw: &str, config: &PipelineConfig) -> Result<ProcessedDocument, ConfigError> {
    config.validate()?;

    let cleaned = clean(raw);
    let chunks = chunk(&cleaned, &config.chunk)?;
    let degraded = is_degraded(&chunks);
    if degraded {
        warn!(chars = cleaned.chars().count(), "document has no structural markers");
    }

    let chunk_facts = extract_all(&chunks, config.parallel);
    let facts = merge(&chunk_facts);

    info!(
        raw_bytes = raw.len(),
        cleaned_bytes = cleaned.len(),
        chunks = chunks.len(),
        funding = facts.funding.len(),
        total = facts.funding_total(),
        degraded,
        "processed bill"
    );

    Ok(ProcessedDocument {
        cleaned,
        chunks,
        chunk_facts,
        facts,
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use porkchop_core::{ChunkConfig, ChunkStrategy};

    const RAW: &str = "VerDate Nov 24 2008 17:46 Dec 17, 2024 Jkt 000000 PO 00000 Frm 00001 Fmt 6652 Sfmt 6211
1 DIVISION A—FURTHER CONTINUING
2 APPROPRIATIONS ACT, 2025
11 TITLE I—DEPARTMENT OF DEFENSE
12 SEC. 102. The Secretary of Defense shall submit a report
13 to Congress not later than January 15, 2025.
14 $100,000,000 for disaster relief operations.
";

    #[test]
    fn end_to_end_on_small_bill() {
        let doc = process(RAW, &PipelineConfig::default()).unwrap();
        assert!(!doc.cleaned.contains("VerDate"));
        assert!(!doc.degraded);
        assert_eq!(doc.chunks.len(), 2);
        assert_eq!(doc.chunk_facts.len(), doc.chunks.len());
        assert_eq!(doc.facts, crate::aggregate::merge(&doc.chunk_facts));
        assert_eq!(doc.facts.funding.len(), 1);
        assert_eq!(doc.facts.funding_total(), 100_000_000.0);
        assert_eq!(doc.facts.deadlines.len(), 1);

        let batches = doc.record_batches().unwrap();
        assert_eq!(batches.funding_items.num_rows(), 1);
        assert_eq!(batches.deadlines.num_rows(), 1);
    }

    #[test]
    fn unstructured_text_flagged_degraded() {
        let doc = process("just a sentence with $5 for nothing much.", &PipelineConfig::default()).unwrap();
        assert!(doc.degraded);
        assert_eq!(doc.chunks.len(), 1);
    }

    #[test]
    fn invalid_config_rejected_before_work() {
        let config = PipelineConfig {
            chunk: ChunkConfig {
                strategy: ChunkStrategy::FixedSize,
                max_chunk_chars: 0,
            },
            parallel: false,
        };
        assert!(matches!(process(RAW, &config), Err(ConfigError::InvalidChunkSize(0))));
    }
}
