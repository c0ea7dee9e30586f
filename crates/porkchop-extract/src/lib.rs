//! Bill text extraction: clean raw GPO text, chunk it by structure, and pull
//! out funding, legal references, deadlines, duties and entities.

pub mod aggregate;
pub mod amount;
pub mod chunker;
pub mod cleaner;
pub mod extractor;
pub mod pipeline;

pub use aggregate::{DocumentAccumulator, extract_all, extract_document, merge};
pub use amount::{AmountMatch, find_amounts, parse_amount};
pub use chunker::{chunk, is_degraded};
pub use cleaner::clean;
pub use extractor::extract;
pub use pipeline::{ProcessedDocument, RecordBatches, process};
