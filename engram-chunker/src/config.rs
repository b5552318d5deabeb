use serde::{Deserialize, Serialize};

/// Configuration for both chunking strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Estimated token budget per generic chunk (tokens ~ chars / 4).
    #[serde(default = "default_max_chunk_tokens")]
    pub max_chunk_tokens: usize,

    /// Trailing lines carried into the next generic chunk for continuity.
    #[serde(default = "default_overlap_lines")]
    pub overlap_lines: usize,

    /// Generic chunks below this line count are suppressed unless they end
    /// the file.
    #[serde(default = "default_min_chunk_lines")]
    pub min_chunk_lines: usize,

    /// Structural units larger than this character count are split by the
    /// generic strategy instead of emitted whole.
    #[serde(default = "default_max_unit_chars")]
    pub max_unit_chars: usize,
}

fn default_max_chunk_tokens() -> usize {
    400
}

fn default_overlap_lines() -> usize {
    3
}

fn default_min_chunk_lines() -> usize {
    3
}

fn default_max_unit_chars() -> usize {
    8_000
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: default_max_chunk_tokens(),
            overlap_lines: default_overlap_lines(),
            min_chunk_lines: default_min_chunk_lines(),
            max_unit_chars: default_max_unit_chars(),
        }
    }
}

impl ChunkerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_tokens == 0 {
            return Err("max_chunk_tokens must be > 0".into());
        }

        if self.min_chunk_lines == 0 {
            return Err("min_chunk_lines must be > 0".into());
        }

        if self.overlap_lines * 4 >= self.max_chunk_tokens {
            return Err("overlap_lines is too large for the token budget".into());
        }

        Ok(())
    }
}
