//! Core record types, configuration, and Arrow schemas for porkchop.

pub mod chunk;
pub mod comparison;
pub mod config;
mod error;
pub mod facts;
pub mod heading;
pub mod schema;
pub mod score;

pub use chunk::Chunk;
pub use comparison::{
    BlockKind, Comparison, DiffBlock, SectionChange, SectionChangeKind, SpendingChange,
    SpendingChangeKind,
};
pub use config::{ChunkConfig, ChunkStrategy, PipelineConfig};
pub use error::{ConfigError, RecordError};
pub use facts::{
    ChunkFacts, Deadline, DocumentFacts, Duty, Entity, FundingItem, LegalReference, Modal,
    RefType, normalize_entity_name,
};
pub use score::{PorkScore, ScoreBand};
