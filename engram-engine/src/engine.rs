use crate::error::Result;
use engram_db::EmbeddingConfigRow;
use engram_embeddings::EmbeddingProvider;
use engram_indexer::{
    hash_file, IndexOptions, IndexReport, Indexer, IndexerConfig, TempIndexReport,
};
use engram_memory::{
    classify_query_intent, HeuristicMemory, MemoryFilter, MemoryRepository, NewMemory,
    QueryIntent, RestoreOutcome, SupersedeOutcome,
};
use engram_retrieval::{SearchEngine, SearchOptions, SearchResponse};
use engram_vector_store::{VectorStore, PROJECT_NAMESPACE_PREFIX};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// File name of the relational catalog inside the data directory.
const CATALOG_FILE: &str = "catalog.db";

/// Engine-wide configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub indexer: IndexerConfig,
}

/// Aggregate index statistics for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Embedded chunks currently in the project's namespace.
    pub chunk_count: usize,

    /// Files recorded as indexed.
    pub file_count: usize,

    /// Recorded files whose on-disk content has since changed or
    /// disappeared.
    pub stale_count: usize,

    /// Unix seconds of the last successful run.
    pub last_indexed_at: Option<i64>,
}

/// The engine facade: one object owning the catalog, the injected
/// embedding provider, and the data directory, exposing the full
/// indexing / search / memory / config surface to the host layer.
///
/// The provider is chosen once, at construction, and injected everywhere;
/// there is no global switch.
pub struct Engine {
    db: Arc<Mutex<Connection>>,
    data_dir: PathBuf,
    indexer: Indexer,
    search: SearchEngine,
    memories: MemoryRepository,
}

impl Engine {
    /// Open (or create) an engine over `data_dir`, which holds the catalog
    /// database and one vector namespace file per project and temp path.
    pub fn new(
        data_dir: &Path,
        provider: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Result<Self> {
        let conn = engram_db::open(&data_dir.join(CATALOG_FILE))?;
        let db = Arc::new(Mutex::new(conn));

        let indexer = Indexer::new(
            db.clone(),
            provider.clone(),
            data_dir.to_path_buf(),
            config.indexer,
        )?;
        let search = SearchEngine::new(db.clone(), provider, data_dir.to_path_buf());
        let memories = MemoryRepository::new(db.clone());

        info!("engine opened at {}", data_dir.display());
        Ok(Self {
            db,
            data_dir: data_dir.to_path_buf(),
            indexer,
            search,
            memories,
        })
    }

    // ---- Indexing ----

    /// Incrementally index a project root. See [`Indexer::index_project`].
    pub async fn index_project(&self, root: &Path, options: IndexOptions) -> Result<IndexReport> {
        Ok(self.indexer.index_project(root, options).await?)
    }

    /// Index an arbitrary path into a throwaway namespace.
    pub async fn index_temp_path(&self, path: &Path) -> Result<TempIndexReport> {
        Ok(self.indexer.index_temp_path(path).await?)
    }

    /// Whether a temp namespace already exists for the path.
    pub fn temp_index_exists(&self, path: &Path) -> bool {
        engram_vector_store::temp_store_exists(&self.data_dir, path)
    }

    /// Remove the temp namespace for one path.
    pub fn cleanup_temp_path(&self, path: &Path) -> Result<bool> {
        Ok(engram_vector_store::cleanup_temp(&self.data_dir, path)?)
    }

    /// Remove every temp namespace. Returns how many were deleted.
    pub fn cleanup_all_temp(&self) -> Result<usize> {
        Ok(engram_vector_store::cleanup_all_temp(&self.data_dir)?)
    }

    /// Aggregate stats for a project, or `None` if the id is unknown.
    /// `stale_count` re-hashes the recorded files, so this touches disk.
    pub async fn get_index_stats(&self, project_id: &str) -> Result<Option<IndexStats>> {
        let (project, hashes) = {
            let conn = self.db.lock().await;
            let Some(project) = engram_db::get_project(&conn, project_id)? else {
                return Ok(None);
            };
            let hashes = engram_db::file_hashes_for_project(&conn, project_id)?;
            (project, hashes)
        };

        let store = VectorStore::open_vector_only(
            &self.data_dir,
            &format!("{PROJECT_NAMESPACE_PREFIX}{project_id}"),
        )
        .await?;

        let root = PathBuf::from(&project.root_path);
        let stale_count = hashes
            .iter()
            .filter(|(rel_path, stored)| {
                match hash_file(&root.join(rel_path)) {
                    Ok(current) => current != **stored,
                    // Unreadable or deleted counts as stale.
                    Err(_) => true,
                }
            })
            .count();

        Ok(Some(IndexStats {
            chunk_count: store.count().await,
            file_count: hashes.len(),
            stale_count,
            last_indexed_at: project.last_indexed_at,
        }))
    }

    // ---- Search ----

    /// Search a project's indexed code. Unknown project ids return an
    /// empty result list.
    pub async fn search_code(
        &self,
        query: &str,
        project_id: &str,
        options: SearchOptions,
    ) -> Result<SearchResponse> {
        Ok(self.search.search_code(query, project_id, options).await?)
    }

    /// Whether a query is asking for the history behind the code rather
    /// than the code itself. Hosts use this to show a supersede chain
    /// instead of plain results.
    pub fn classify_query_intent(&self, query: &str) -> QueryIntent {
        classify_query_intent(query)
    }

    // ---- Heuristic memories ----

    pub async fn add_memory(&self, new: NewMemory) -> Result<HeuristicMemory> {
        Ok(self.memories.add(new).await?)
    }

    pub async fn get_memory(&self, id: &str) -> Result<Option<HeuristicMemory>> {
        Ok(self.memories.get(id).await?)
    }

    pub async fn list_memories(&self, filter: &MemoryFilter) -> Result<Vec<HeuristicMemory>> {
        Ok(self.memories.list(filter).await?)
    }

    pub async fn validate_memory(&self, id: &str) -> Result<Option<HeuristicMemory>> {
        Ok(self.memories.validate(id).await?)
    }

    pub async fn violate_memory(&self, id: &str) -> Result<Option<HeuristicMemory>> {
        Ok(self.memories.violate(id).await?)
    }

    pub async fn supersede_memory(
        &self,
        old_id: &str,
        new_content: &str,
    ) -> Result<SupersedeOutcome> {
        Ok(self.memories.supersede(old_id, new_content).await?)
    }

    pub async fn get_memory_chain(&self, id: &str) -> Result<Vec<HeuristicMemory>> {
        Ok(self.memories.chain(id).await?)
    }

    pub async fn delete_memory(&self, id: &str) -> Result<bool> {
        Ok(self.memories.delete(id).await?)
    }

    pub async fn restore_memory(&self, id: &str) -> Result<RestoreOutcome> {
        Ok(self.memories.restore(id).await?)
    }

    // ---- Embedding configuration ----

    pub async fn save_embedding_config(
        &self,
        project_id: &str,
        config: &EmbeddingConfigRow,
    ) -> Result<()> {
        let conn = self.db.lock().await;
        Ok(engram_db::save_embedding_config(&conn, project_id, config)?)
    }

    pub async fn get_stored_embedding_config(
        &self,
        project_id: &str,
    ) -> Result<Option<EmbeddingConfigRow>> {
        let conn = self.db.lock().await;
        Ok(engram_db::get_embedding_config(&conn, project_id)?)
    }

    /// Compare the active provider's configuration against the project's
    /// stored snapshot. Drift is a fatal error until the operator forces a
    /// reindex.
    pub async fn validate_embedding_config(&self, project_id: &str) -> Result<()> {
        let conn = self.db.lock().await;
        Ok(engram_db::validate_embedding_config(
            &conn,
            project_id,
            &self.indexer.active_config_row(),
        )?)
    }

    /// Drop the stored snapshot; the explicit first step of a forced
    /// reindex.
    pub async fn delete_embedding_config(&self, project_id: &str) -> Result<bool> {
        let conn = self.db.lock().await;
        Ok(engram_db::delete_embedding_config(&conn, project_id)?)
    }
}
