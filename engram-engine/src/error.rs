use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Indexing error: {0}")]
    Indexer(#[from] engram_indexer::IndexerError),

    #[error("Search error: {0}")]
    Retrieval(#[from] engram_retrieval::RetrievalError),

    #[error("Memory error: {0}")]
    Memory(#[from] engram_memory::MemoryError),

    #[error("Catalog error: {0}")]
    Db(#[from] engram_db::DbError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] engram_vector_store::VectorStoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
