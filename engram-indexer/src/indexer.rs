use crate::config::{IndexerConfig, EMBED_CONCURRENCY};
use crate::error::{IndexerError, Result};
use crate::hasher::hash_text;
use crate::walker::{walk_project, WalkedFile};
use engram_chunker::{chunk_generic, chunk_structural, Chunk, Language};
use engram_db::EmbeddingConfigRow;
use engram_embeddings::{embed_with_retry, CircuitBreaker, EmbeddingError, EmbeddingProvider};
use engram_vector_store::{EmbeddingRecord, VectorStore, PROJECT_NAMESPACE_PREFIX};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;

/// Progress callback for indexing operations
pub type ProgressCallback = Arc<dyn Fn(IndexProgress) + Send + Sync>;

/// Indexing progress information
#[derive(Debug, Clone)]
pub struct IndexProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub chunks_so_far: usize,
    pub current_file: Option<String>,
}

/// Options for one indexing run.
#[derive(Default)]
pub struct IndexOptions {
    /// Display name applied when the project is first registered.
    pub project_name: Option<String>,

    /// Cap on the number of files walked.
    pub max_files: Option<usize>,

    /// Observational progress channel.
    pub progress: Option<ProgressCallback>,

    /// Cooperative cancellation, checked at file boundaries.
    pub cancel: Option<CancellationToken>,
}

/// A per-file failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Summary of an indexing run.
#[derive(Debug)]
pub struct IndexReport {
    pub project_id: String,
    pub files_indexed: usize,
    pub chunks_created: usize,
    pub duration_ms: u64,
    pub errors: Vec<FileError>,
}

/// The indexing orchestrator. Owns the catalog handle, the injected
/// embedding provider, and the engine data directory; each run builds its
/// own circuit-breaker session.
pub struct Indexer {
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn EmbeddingProvider>,
    data_dir: PathBuf,
    config: IndexerConfig,
}

/// Chunks of one successfully embedded file, staged for the next batch
/// flush.
struct StagedFile {
    rel_path: String,
    content_hash: String,
    records: Vec<EmbeddingRecord>,
}

impl Indexer {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        provider: Arc<dyn EmbeddingProvider>,
        data_dir: PathBuf,
        config: IndexerConfig,
    ) -> Result<Self> {
        config.validate().map_err(IndexerError::InvalidConfig)?;

        Ok(Self {
            db,
            provider,
            data_dir,
            config,
        })
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub(crate) fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub(crate) fn db(&self) -> &Arc<Mutex<Connection>> {
        &self.db
    }

    /// The configuration snapshot the active provider would persist.
    pub fn active_config_row(&self) -> EmbeddingConfigRow {
        EmbeddingConfigRow {
            provider: self.provider.name().to_string(),
            model: self.provider.model().to_string(),
            dimensions: self.provider.dimensions(),
        }
    }

    /// Index a project root incrementally.
    pub async fn index_project(&self, root: &Path, options: IndexOptions) -> Result<IndexReport> {
        let started = Instant::now();

        let root = root
            .canonicalize()
            .map_err(|e| IndexerError::InvalidPath(format!("{}: {e}", root.display())))?;
        let root_str = root.to_string_lossy().replace('\\', "/");
        let default_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root_str.clone());
        let name = options.project_name.clone().unwrap_or(default_name);

        let (project, stored_hashes) = {
            let conn = self.db.lock().await;
            let project = engram_db::upsert_project(&conn, &root_str, &name)?;

            // Never mix embedding spaces: drift is fatal before any work.
            engram_db::validate_embedding_config(&conn, &project.id, &self.active_config_row())?;

            let hashes = engram_db::file_hashes_for_project(&conn, &project.id)?;
            (project, hashes)
        };

        let store = VectorStore::open(
            &self.data_dir,
            &format!("{PROJECT_NAMESPACE_PREFIX}{}", project.id),
        )
        .await?;

        let walk = walk_project(&root, options.max_files);
        let total_files = walk.files.len();
        info!(
            "indexing {} ({} files discovered)",
            root.display(),
            total_files
        );

        let breaker = CircuitBreaker::new(self.config.breaker.clone());

        let mut staged: Vec<StagedFile> = Vec::new();
        let mut staged_chunks = 0usize;
        let mut errors: Vec<FileError> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut files_indexed = 0usize;
        let mut chunks_created = 0usize;

        for (i, file) in walk.files.iter().enumerate() {
            if options.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                self.flush_best_effort(&store, &project.id, &mut staged).await;
                return Err(IndexerError::Cancelled);
            }

            report_progress(
                &options.progress,
                i,
                total_files,
                chunks_created,
                Some(file.rel_path.clone()),
            );

            seen.insert(file.rel_path.clone());

            let content = match std::fs::read_to_string(&file.abs_path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("skipping unreadable file {}: {e}", file.rel_path);
                    errors.push(FileError {
                        file: file.rel_path.clone(),
                        error: format!("read failed: {e}"),
                    });
                    continue;
                }
            };

            let content_hash = hash_text(&content);
            if stored_hashes.get(&file.rel_path) == Some(&content_hash) {
                debug!("unchanged, skipping {}", file.rel_path);
                continue;
            }

            let chunks = self.chunk_file(&content, file);

            match self.embed_file(&chunks, &breaker).await {
                Ok(vectors) => {
                    let records = build_records(file, &chunks, vectors);
                    let record_count = records.len();

                    staged_chunks += record_count;
                    chunks_created += record_count;
                    files_indexed += 1;
                    staged.push(StagedFile {
                        rel_path: file.rel_path.clone(),
                        content_hash,
                        records,
                    });

                    if staged_chunks >= self.config.batch_size {
                        self.flush(&store, &project.id, &mut staged).await?;
                        staged_chunks = 0;
                    }
                }
                Err(e) => {
                    // One chunk failing fails the whole file; its hash is
                    // not committed so the next run retries it.
                    errors.push(FileError {
                        file: file.rel_path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.flush(&store, &project.id, &mut staged).await?;

        if walk.truncated {
            // A capped walk cannot distinguish "deleted" from "beyond the
            // cap", so stale cleanup is skipped for this run.
            warn!("walk truncated by max_files; skipping stale-entry cleanup");
        } else {
            self.remove_stale_entries(&store, &project.id, &stored_hashes, &seen)
                .await?;
        }

        {
            let conn = self.db.lock().await;
            engram_db::touch_project(&conn, &project.id, store.count().await as i64)?;
            engram_db::save_embedding_config(&conn, &project.id, &self.active_config_row())?;
        }

        report_progress(&options.progress, total_files, total_files, chunks_created, None);

        let report = IndexReport {
            project_id: project.id,
            files_indexed,
            chunks_created,
            duration_ms: started.elapsed().as_millis() as u64,
            errors,
        };

        info!(
            "indexing finished: {} files, {} chunks, {} errors in {}ms",
            report.files_indexed,
            report.chunks_created,
            report.errors.len(),
            report.duration_ms
        );

        Ok(report)
    }

    /// Chunk one file: structural when the language supports it, generic
    /// otherwise. Chunks with no effective text are dropped.
    pub(crate) fn chunk_file(&self, content: &str, file: &WalkedFile) -> Vec<Chunk> {
        let language = Language::from_path(&file.abs_path);

        let mut chunks =
            chunk_structural(content, &file.rel_path, language, &self.config.chunker)
                .unwrap_or_else(|| chunk_generic(content, language, &self.config.chunker));

        chunks.retain(Chunk::has_effective_text);
        chunks
    }

    /// Embed all chunks of a file with bounded concurrency through the
    /// retry + breaker wrapper. All calls settle; the first failure fails
    /// the file.
    pub(crate) async fn embed_file(
        &self,
        chunks: &[Chunk],
        breaker: &CircuitBreaker,
    ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        let semaphore = Arc::new(Semaphore::new(EMBED_CONCURRENCY));

        let futures = chunks.iter().map(|chunk| {
            let semaphore = semaphore.clone();
            let provider = self.provider.clone();
            let retry = &self.config.retry;
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| EmbeddingError::Generation(format!("semaphore closed: {e}")))?;
                embed_with_retry(provider.as_ref(), breaker, retry, chunk.embedding_text()).await
            }
        });

        let settled = futures::future::join_all(futures).await;

        let mut vectors = Vec::with_capacity(settled.len());
        let mut first_error = None;
        for result in settled {
            match result {
                Ok(vector) => vectors.push(vector),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(_) => {}
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(vectors),
        }
    }

    /// Flush the staged batch: upsert vectors, then commit the batch's file
    /// hashes together.
    async fn flush(
        &self,
        store: &VectorStore,
        project_id: &str,
        staged: &mut Vec<StagedFile>,
    ) -> Result<()> {
        if staged.is_empty() {
            return Ok(());
        }

        let files: Vec<StagedFile> = staged.drain(..).collect();

        let records: Vec<EmbeddingRecord> =
            files.iter().flat_map(|f| f.records.iter().cloned()).collect();
        store.upsert(records).await?;

        let hashes: Vec<(String, String)> = files
            .into_iter()
            .map(|f| (f.rel_path, f.content_hash))
            .collect();

        let mut conn = self.db.lock().await;
        engram_db::commit_file_hashes(&mut conn, project_id, &hashes)?;

        debug!("flushed batch of {} files", hashes.len());
        Ok(())
    }

    async fn flush_best_effort(
        &self,
        store: &VectorStore,
        project_id: &str,
        staged: &mut Vec<StagedFile>,
    ) {
        if let Err(e) = self.flush(store, project_id, staged).await {
            warn!("best-effort flush on cancellation failed: {e}");
        }
    }

    /// Remove vectors and hash entries for files recorded in the catalog
    /// but absent from this run's walk.
    async fn remove_stale_entries(
        &self,
        store: &VectorStore,
        project_id: &str,
        stored_hashes: &std::collections::HashMap<String, String>,
        seen: &HashSet<String>,
    ) -> Result<()> {
        for rel_path in stored_hashes.keys() {
            if seen.contains(rel_path) {
                continue;
            }

            let removed = store.delete_file(rel_path).await?;
            let conn = self.db.lock().await;
            engram_db::delete_file_hash(&conn, project_id, rel_path)?;
            info!("removed stale file {rel_path} ({removed} chunks)");
        }
        Ok(())
    }
}

pub(crate) fn build_records(
    file: &WalkedFile,
    chunks: &[Chunk],
    vectors: Vec<Vec<f32>>,
) -> Vec<EmbeddingRecord> {
    chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, vector)| EmbeddingRecord {
            file_path: file.rel_path.clone(),
            chunk_index: chunk.chunk_index,
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            content: chunk.content.clone(),
            symbol: chunk.symbol.clone(),
            scope_chain: chunk.scope_chain.clone(),
            contextualized: chunk.contextualized.clone(),
            vector,
        })
        .collect()
}

fn report_progress(
    callback: &Option<ProgressCallback>,
    files_processed: usize,
    total_files: usize,
    chunks_so_far: usize,
    current_file: Option<String>,
) {
    if let Some(cb) = callback {
        cb(IndexProgress {
            files_processed,
            total_files,
            chunks_so_far,
            current_file,
        });
    }
}
