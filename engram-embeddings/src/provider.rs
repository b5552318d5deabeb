use crate::error::EmbeddingError;
use crate::TEST_EMBEDDING_DIM;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Contract shared by every embedding backend: text in, fixed-length
/// vector out.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider identifier (e.g. `"local"`, `"remote"`).
    fn name(&self) -> &str;

    /// Model identifier (e.g. `"nomic-embed-text-v1.5"`).
    fn model(&self) -> &str;

    /// Declared embedding dimensionality.
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Embed with a length check against the provider's declared
/// dimensionality. All engine code paths go through this function; a
/// mismatch is fatal, never truncated or padded away.
pub async fn embed_checked(
    provider: &dyn EmbeddingProvider,
    text: &str,
) -> Result<Vec<f32>, EmbeddingError> {
    let vector = provider.embed(text).await?;
    if vector.len() != provider.dimensions() {
        return Err(EmbeddingError::DimensionMismatch {
            provider: provider.name().to_string(),
            expected: provider.dimensions(),
            actual: vector.len(),
        });
    }
    Ok(vector)
}

/// Deterministic test substitute: a seeded pseudo-random vector derived
/// from a SHA-256 of the input text. Identical text always produces the
/// identical vector, with no network or model cost.
pub struct DeterministicProvider {
    dimensions: usize,
}

impl DeterministicProvider {
    pub fn new() -> Self {
        Self {
            dimensions: TEST_EMBEDDING_DIM,
        }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for DeterministicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicProvider {
    fn name(&self) -> &str {
        "deterministic"
    }

    fn model(&self) -> &str {
        "deterministic-test"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(seeded_vector(text, self.dimensions))
    }
}

/// Expand a SHA-256 of the text into `dimensions` floats in [-1, 1] by
/// hash chaining.
fn seeded_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = Vec::with_capacity(dimensions);
    let mut block = Sha256::digest(text.as_bytes());

    'outer: loop {
        for pair in block.chunks_exact(2) {
            let raw = u16::from_le_bytes([pair[0], pair[1]]);
            vector.push(raw as f32 / u16::MAX as f32 * 2.0 - 1.0);
            if vector.len() == dimensions {
                break 'outer;
            }
        }
        block = Sha256::digest(block);
    }

    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_deterministic_same_text_same_vector() {
        let provider = DeterministicProvider::new();
        let a = provider.embed("fn main() {}").await.unwrap();
        let b = provider.embed("fn main() {}").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_deterministic_different_text_different_vector() {
        let provider = DeterministicProvider::new();
        let a = provider.embed("alpha").await.unwrap();
        let b = provider.embed("beta").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_deterministic_length_matches_declared() {
        let provider = DeterministicProvider::with_dimensions(123);
        let v = embed_checked(&provider, "text").await.unwrap();
        assert_eq!(v.len(), 123);
    }

    #[tokio::test]
    async fn test_values_bounded() {
        let provider = DeterministicProvider::new();
        let v = provider.embed("bounded").await.unwrap();
        assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_fatal() {
        struct LyingProvider;

        #[async_trait]
        impl EmbeddingProvider for LyingProvider {
            fn name(&self) -> &str {
                "lying"
            }
            fn model(&self) -> &str {
                "lying-model"
            }
            fn dimensions(&self) -> usize {
                768
            }
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
                Ok(vec![0.5; 100])
            }
        }

        let err = embed_checked(&LyingProvider, "text").await.unwrap_err();
        match err {
            EmbeddingError::DimensionMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 768);
                assert_eq!(actual, 100);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }
}
