use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] engram_embeddings::EmbeddingError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] engram_vector_store::VectorStoreError),

    #[error("Catalog error: {0}")]
    Db(#[from] engram_db::DbError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The run was cancelled cooperatively; the in-flight batch was
    /// flushed best-effort before aborting.
    #[error("Indexing cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, IndexerError>;
