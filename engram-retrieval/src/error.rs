use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] engram_embeddings::EmbeddingError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] engram_vector_store::VectorStoreError),

    #[error("Catalog error: {0}")]
    Db(#[from] engram_db::DbError),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
