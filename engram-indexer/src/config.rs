use engram_chunker::ChunkerConfig;
use engram_embeddings::{BreakerConfig, RetryConfig};

/// Fixed worker limit for concurrent embedding calls within one file.
pub const EMBED_CONCURRENCY: usize = 5;

/// Configuration for the indexing orchestrator.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Chunker configuration shared by both strategies.
    pub chunker: ChunkerConfig,

    /// Retry policy for embedding calls.
    pub retry: RetryConfig,

    /// Circuit breaker policy for the session.
    pub breaker: BreakerConfig,

    /// Records accumulated before a batch is flushed to the store.
    pub batch_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            retry: RetryConfig::default(),
            breaker: BreakerConfig::default(),
            batch_size: 50,
        }
    }
}

impl IndexerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be > 0".to_string());
        }
        self.chunker.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IndexerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = IndexerConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
