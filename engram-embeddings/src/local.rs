use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;
use crate::DEFAULT_EMBEDDING_DIM;
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use log::info;
use serde::{Deserialize, Serialize};

/// Supported local embedding models
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum LocalModel {
    /// Nomic-embed-text-v1.5 (recommended for code)
    NomicEmbedTextV15,
    /// All-MiniLM-L6-v2 (lightweight, faster)
    AllMiniLmL6V2,
}

impl LocalModel {
    fn to_fastembed_model(self) -> EmbeddingModel {
        match self {
            LocalModel::NomicEmbedTextV15 => EmbeddingModel::NomicEmbedTextV15,
            LocalModel::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
        }
    }

    fn model_id(self) -> &'static str {
        match self {
            LocalModel::NomicEmbedTextV15 => "nomic-embed-text-v1.5",
            LocalModel::AllMiniLmL6V2 => "all-minilm-l6-v2",
        }
    }

    /// Dimensionality declared by the model itself.
    fn dimensions(self) -> usize {
        match self {
            LocalModel::NomicEmbedTextV15 => DEFAULT_EMBEDDING_DIM,
            LocalModel::AllMiniLmL6V2 => 384,
        }
    }
}

/// In-process embedding provider backed by fastembed. The model is
/// downloaded on first use and cached; after that no network is needed.
pub struct LocalProvider {
    model: TextEmbedding,
    model_kind: LocalModel,
}

impl LocalProvider {
    /// Initialize the default local model.
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_model(LocalModel::NomicEmbedTextV15)
    }

    /// Initialize a specific local model.
    pub fn with_model(model_kind: LocalModel) -> Result<Self, EmbeddingError> {
        info!("Initializing local embedding model {:?}", model_kind);

        let init_options = InitOptions::new(model_kind.to_fastembed_model())
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(init_options).map_err(|e| {
            EmbeddingError::ModelInitialization(format!("Failed to initialize model: {e}"))
        })?;

        info!("Local embedding model initialized");

        Ok(Self { model, model_kind })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn model(&self) -> &str {
        self.model_kind.model_id()
    }

    fn dimensions(&self) -> usize {
        self.model_kind.dimensions()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self
            .model
            .embed(vec![text], None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;

        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Generation("No embedding generated".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::embed_checked;

    #[test]
    fn test_model_ids() {
        assert_eq!(LocalModel::NomicEmbedTextV15.model_id(), "nomic-embed-text-v1.5");
        assert_eq!(LocalModel::AllMiniLmL6V2.model_id(), "all-minilm-l6-v2");
    }

    #[test]
    fn test_declared_dimensions() {
        assert_eq!(LocalModel::NomicEmbedTextV15.dimensions(), 768);
        assert_eq!(LocalModel::AllMiniLmL6V2.dimensions(), 384);
    }

    #[tokio::test]
    #[ignore] // Requires embedding model download
    async fn test_local_embedding_length() {
        let provider = LocalProvider::new().unwrap();
        let v = embed_checked(&provider, "fn main() {}").await.unwrap();
        assert_eq!(v.len(), provider.dimensions());
    }

    #[tokio::test]
    #[ignore] // Requires embedding model download
    async fn test_similar_code_scores_higher() {
        use crate::similarity::cosine_similarity;

        let provider = LocalProvider::new().unwrap();
        let a = provider.embed("async fn process_data() {}").await.unwrap();
        let b = provider.embed("async function processData() {}").await.unwrap();
        let c = provider.embed("const CSS_COLOR = 'red';").await.unwrap();

        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }
}
