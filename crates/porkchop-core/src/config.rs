//! Pipeline configuration.
//!
//! Configs deserialize from JSON with defaults for every field and are
//! validated before any text is touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

/// Default upper bound on chunk size, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 20_000;

/// How cleaned text is split into chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Split on DIVISION / TITLE headings, sub-splitting oversized units.
    #[default]
    Structural,
    /// Split at size boundaries, preferring line breaks.
    FixedSize,
}

impl ChunkStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::FixedSize => "fixed_size",
        }
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structure" | "structural" => Ok(Self::Structural),
            "size" | "fixed_size" | "fixed-size" => Ok(Self::FixedSize),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub strategy: ChunkStrategy,
    pub max_chunk_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Structural,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

impl ChunkConfig {
    pub fn new(strategy: ChunkStrategy, max_chunk_chars: usize) -> Result<Self, ConfigError> {
        let config = Self {
            strategy,
            max_chunk_chars,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_chars == 0 {
            return Err(ConfigError::InvalidChunkSize(self.max_chunk_chars));
        }
        Ok(())
    }
}

/// Settings for one run of clean → chunk → extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk: ChunkConfig,
    /// Extract chunks on the rayon pool instead of sequentially.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            strategy = %config.chunk.strategy,
            max_chunk_chars = config.chunk.max_chunk_chars,
            parallel = config.parallel,
            "loaded pipeline config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunk.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_structural_20k() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk.strategy, ChunkStrategy::Structural);
        assert_eq!(config.chunk.max_chunk_chars, 20_000);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = ChunkConfig::new(ChunkStrategy::FixedSize, 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChunkSize(0)));
    }

    #[test]
    fn strategy_aliases_parse() {
        assert_eq!("structure".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Structural);
        assert_eq!("Structural".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Structural);
        assert_eq!("size".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::FixedSize);
        assert_eq!("fixed_size".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::FixedSize);
        assert!(matches!(
            "paragraph".parse::<ChunkStrategy>(),
            Err(ConfigError::UnknownStrategy(s)) if s == "paragraph"
        ));
    }

    #[test]
    fn json_partial_fills_defaults() {
        let config = PipelineConfig::from_json(r#"{"chunk": {"strategy": "fixed_size"}}"#).unwrap();
        assert_eq!(config.chunk.strategy, ChunkStrategy::FixedSize);
        assert_eq!(config.chunk.max_chunk_chars, DEFAULT_MAX_CHUNK_CHARS);
        assert!(config.parallel);
    }

    #[test]
    fn json_invalid_size_rejected() {
        let err = PipelineConfig::from_json(r#"{"chunk": {"max_chunk_chars": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChunkSize(0)));
    }

    #[test]
    fn json_malformed_rejected() {
        let err = PipelineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
