/*!
# Engram Engine

The facade over the indexing and memory subsystems: one [`Engine`] object
owning the relational catalog, the injected embedding provider, and the
vector namespaces, exposing the operation surface a host layer calls.

```no_run
use engram_engine::{Engine, EngineConfig, IndexOptions, SearchOptions};
use engram_embeddings::DeterministicProvider;
use std::path::Path;
use std::sync::Arc;

# async fn run() -> Result<(), engram_engine::EngineError> {
let engine = Engine::new(
    Path::new("/var/lib/engram"),
    Arc::new(DeterministicProvider::new()),
    EngineConfig::default(),
)?;

let report = engine
    .index_project(Path::new("/src/my-project"), IndexOptions::default())
    .await?;
let hits = engine
    .search_code("retry backoff", &report.project_id, SearchOptions::default())
    .await?;
# Ok(())
# }
```

The commonly used types of the member crates are re-exported so a host
only depends on this crate.
*/

mod engine;
mod error;

pub use engine::{Engine, EngineConfig, IndexStats};
pub use error::{EngineError, Result};

pub use engram_db::EmbeddingConfigRow;
pub use engram_embeddings::{
    cosine_similarity, DeterministicProvider, EmbeddingProvider, LocalProvider, RemoteConfig,
    RemoteProvider,
};
pub use engram_indexer::{
    FileError, IndexOptions, IndexProgress, IndexReport, IndexerConfig, ProgressCallback,
    TempIndexReport,
};
pub use engram_memory::{
    classify_query_intent, effective_confidence, ConceptType, HeuristicMemory, MemoryFilter,
    MemoryStatus, NewMemory, QueryIntent, RestoreOutcome, SupersedeOutcome,
};
pub use engram_retrieval::{
    SearchFocus, SearchHit, SearchOptions, SearchResponse, SearchType,
};
