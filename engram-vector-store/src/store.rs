use crate::error::VectorStoreError;
use crate::fusion::reciprocal_rank_fusion;
use crate::lexical::LexicalIndex;
use crate::record::EmbeddingRecord;
use engram_embeddings::cosine_similarity;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Candidate pool drawn from each channel before fusion.
const CANDIDATE_POOL: usize = 50;

/// A record returned from search, with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: EmbeddingRecord,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub similarity: f32,
}

/// Result of a hybrid search, reporting whether the lexical index
/// participated.
#[derive(Debug)]
pub struct HybridSearchOutcome {
    pub results: Vec<ScoredRecord>,
    /// `false` when the lexical index was unavailable and the search
    /// degraded to vector-only.
    pub fts_indexed: bool,
}

/// One namespace of embedding records, persisted as a JSON file and held
/// in memory while open.
pub struct VectorStore {
    path: PathBuf,
    records: RwLock<Vec<EmbeddingRecord>>,
    lexical: RwLock<Option<LexicalIndex>>,
    lexical_enabled: bool,
}

impl VectorStore {
    /// Open (or create) a namespace with the lexical index built alongside.
    pub async fn open(data_dir: &Path, namespace: &str) -> Result<Self, VectorStoreError> {
        Self::open_inner(data_dir, namespace, true).await
    }

    /// Open a namespace without a lexical index; hybrid searches degrade to
    /// vector-only and report it.
    pub async fn open_vector_only(
        data_dir: &Path,
        namespace: &str,
    ) -> Result<Self, VectorStoreError> {
        Self::open_inner(data_dir, namespace, false).await
    }

    async fn open_inner(
        data_dir: &Path,
        namespace: &str,
        lexical_enabled: bool,
    ) -> Result<Self, VectorStoreError> {
        let path = Self::namespace_path(data_dir, namespace);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let records: Vec<EmbeddingRecord> = if path.exists() {
            let content = tokio::fs::read(&path).await?;
            match serde_json::from_slice(&content) {
                Ok(data) => data,
                Err(e) => {
                    debug!("Could not load existing data: {e}, starting fresh");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let lexical = if lexical_enabled {
            Some(LexicalIndex::build(&records))
        } else {
            None
        };

        info!(
            "Vector store '{namespace}' opened with {} records",
            records.len()
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
            lexical: RwLock::new(lexical),
            lexical_enabled,
        })
    }

    /// File backing a namespace under the data directory.
    pub fn namespace_path(data_dir: &Path, namespace: &str) -> PathBuf {
        data_dir.join(format!("{namespace}.json"))
    }

    /// Upsert a batch of records, keyed by `(file_path, chunk_index)`.
    /// Existing records with the same key are replaced.
    pub async fn upsert(&self, batch: Vec<EmbeddingRecord>) -> Result<(), VectorStoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        {
            let mut records = self.records.write().await;
            for incoming in batch {
                match records.iter_mut().find(|r| r.key() == incoming.key()) {
                    Some(existing) => *existing = incoming,
                    None => records.push(incoming),
                }
            }
        }

        self.rebuild_lexical().await;
        self.save().await
    }

    /// Delete every record for a file path. Returns how many were removed.
    pub async fn delete_file(&self, file_path: &str) -> Result<usize, VectorStoreError> {
        let removed = {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|r| r.file_path != file_path);
            before - records.len()
        };

        if removed > 0 {
            self.rebuild_lexical().await;
            self.save().await?;
        }

        Ok(removed)
    }

    /// Remove every record in the namespace.
    pub async fn clear(&self) -> Result<(), VectorStoreError> {
        self.records.write().await.clear();
        self.rebuild_lexical().await;
        self.save().await
    }

    /// Total records in the namespace.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Distinct file paths in the namespace.
    pub async fn file_paths(&self) -> Vec<String> {
        let records = self.records.read().await;
        let mut paths: Vec<String> = records.iter().map(|r| r.file_path.clone()).collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Pure vector nearest-neighbor search.
    pub async fn search_vector(&self, query: &[f32], limit: usize) -> Vec<ScoredRecord> {
        let records = self.records.read().await;
        let ranked = rank_by_similarity(&records, query);

        ranked
            .into_iter()
            .take(limit)
            .map(|(idx, similarity)| ScoredRecord {
                record: records[idx].clone(),
                similarity,
            })
            .collect()
    }

    /// Hybrid search: vector ranking fused with a lexical ranking over the
    /// expanded query terms. Degrades to vector-only (and says so) when the
    /// lexical index is unavailable.
    pub async fn search_hybrid(
        &self,
        query: &[f32],
        lexical_terms: &[String],
        limit: usize,
    ) -> HybridSearchOutcome {
        let pool = CANDIDATE_POOL.max(limit);

        // Lock order matches rebuild_lexical: records, then lexical.
        let records = self.records.read().await;
        let ranked = rank_by_similarity(&records, query);

        let mut lexical_guard = self.lexical.write().await;
        let Some(lexical) = lexical_guard.as_mut() else {
            let results = ranked
                .into_iter()
                .take(limit)
                .map(|(idx, similarity)| ScoredRecord {
                    record: records[idx].clone(),
                    similarity,
                })
                .collect();
            return HybridSearchOutcome {
                results,
                fts_indexed: false,
            };
        };

        let vector_ranked: Vec<usize> = ranked.iter().take(pool).map(|(idx, _)| *idx).collect();
        let lexical_ranked = lexical.search(lexical_terms, pool);
        let fused = reciprocal_rank_fusion(&vector_ranked, &lexical_ranked);

        let results = fused
            .into_iter()
            .take(limit)
            .map(|idx| ScoredRecord {
                similarity: cosine_similarity(query, &records[idx].vector),
                record: records[idx].clone(),
            })
            .collect();

        HybridSearchOutcome {
            results,
            fts_indexed: true,
        }
    }

    async fn rebuild_lexical(&self) {
        if !self.lexical_enabled {
            return;
        }
        let records = self.records.read().await;
        let mut lexical = self.lexical.write().await;
        *lexical = Some(LexicalIndex::build(&records));
    }

    async fn save(&self) -> Result<(), VectorStoreError> {
        let records = self.records.read().await;
        let content = serde_json::to_vec(&*records)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// All record indices ranked by cosine similarity to the query, best first.
fn rank_by_similarity(records: &[EmbeddingRecord], query: &[f32]) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| (idx, cosine_similarity(query, &r.vector)))
        .collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    ranked
}
