use crate::error::Result;
use crate::focus::{promote_focus, SearchFocus};
use crate::synonyms::expand_query;
use engram_embeddings::{embed_checked, EmbeddingProvider};
use engram_vector_store::{ScoredRecord, VectorStore, PROJECT_NAMESPACE_PREFIX};
use log::{debug, info};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Options for one search call.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum results returned; defaults to 10.
    pub limit: Option<usize>,

    /// Optional path-category promotion.
    pub focus: Option<SearchFocus>,
}

const DEFAULT_LIMIT: usize = 10;

/// Which retrieval mode actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchType {
    Hybrid,
    VectorOnly,
}

/// One search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Stable id: `file_path:chunk_index`.
    pub id: String,
    pub file_path: String,
    pub chunk_start: usize,
    pub chunk_end: usize,
    pub content: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub similarity: f32,
}

/// Search results plus how they were produced.
#[derive(Debug)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub search_type: SearchType,
    pub fts_indexed: bool,
}

impl SearchResponse {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            search_type: SearchType::VectorOnly,
            fts_indexed: false,
        }
    }
}

/// Read-only search engine over indexed projects.
pub struct SearchEngine {
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn EmbeddingProvider>,
    data_dir: PathBuf,
}

impl SearchEngine {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        provider: Arc<dyn EmbeddingProvider>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            provider,
            data_dir,
        }
    }

    /// Search a project. An unknown project id returns an empty result
    /// list rather than an error.
    pub async fn search_code(
        &self,
        query: &str,
        project_id: &str,
        options: SearchOptions,
    ) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Ok(SearchResponse::empty());
        }

        let known = {
            let conn = self.db.lock().await;
            engram_db::get_project(&conn, project_id)?.is_some()
        };
        if !known {
            debug!("search against unknown project {project_id}");
            return Ok(SearchResponse::empty());
        }

        // Synonyms widen the lexical branch; the vector branch embeds the
        // original query untouched.
        let lexical_terms = expand_query(query);
        let query_vector = embed_checked(self.provider.as_ref(), query).await?;

        let store = VectorStore::open(
            &self.data_dir,
            &format!("{PROJECT_NAMESPACE_PREFIX}{project_id}"),
        )
        .await?;

        let limit = options.limit.unwrap_or(DEFAULT_LIMIT);
        let outcome = store
            .search_hybrid(&query_vector, &lexical_terms, limit)
            .await;

        let search_type = if outcome.fts_indexed {
            SearchType::Hybrid
        } else {
            SearchType::VectorOnly
        };

        let mut hits: Vec<SearchHit> = outcome.results.into_iter().map(to_hit).collect();

        if let Some(focus) = options.focus {
            hits = promote_focus(hits, focus, |hit| hit.file_path.as_str());
        }

        info!(
            "search '{query}' on {project_id}: {} results ({search_type:?})",
            hits.len()
        );

        Ok(SearchResponse {
            results: hits,
            search_type,
            fts_indexed: outcome.fts_indexed,
        })
    }
}

fn to_hit(scored: ScoredRecord) -> SearchHit {
    SearchHit {
        id: format!("{}:{}", scored.record.file_path, scored.record.chunk_index),
        file_path: scored.record.file_path,
        chunk_start: scored.record.start_line,
        chunk_end: scored.record.end_line,
        content: scored.record.content,
        similarity: scored.similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_embeddings::DeterministicProvider;
    use engram_vector_store::EmbeddingRecord;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn seeded_engine(
        dir: &TempDir,
        records: Vec<EmbeddingRecord>,
    ) -> (SearchEngine, String) {
        let conn = engram_db::open_in_memory().unwrap();
        let project = engram_db::upsert_project(&conn, "/repo", "repo").unwrap();

        let store = VectorStore::open(
            dir.path(),
            &format!("{PROJECT_NAMESPACE_PREFIX}{}", project.id),
        )
        .await
        .unwrap();
        store.upsert(records).await.unwrap();

        let engine = SearchEngine::new(
            Arc::new(Mutex::new(conn)),
            Arc::new(DeterministicProvider::new()),
            dir.path().to_path_buf(),
        );
        (engine, project.id)
    }

    async fn embedded_record(path: &str, index: usize, content: &str) -> EmbeddingRecord {
        let provider = DeterministicProvider::new();
        let vector = embed_checked(&provider, content).await.unwrap();
        EmbeddingRecord {
            file_path: path.to_string(),
            chunk_index: index,
            start_line: 1,
            end_line: 10,
            content: content.to_string(),
            symbol: None,
            scope_chain: None,
            contextualized: None,
            vector,
        }
    }

    #[tokio::test]
    async fn test_unknown_project_returns_empty() {
        let dir = TempDir::new().unwrap();
        let (engine, _) = seeded_engine(&dir, vec![]).await;

        let response = engine
            .search_code("anything", "no-such-project", SearchOptions::default())
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_empty() {
        let dir = TempDir::new().unwrap();
        let (engine, project_id) = seeded_engine(&dir, vec![]).await;

        let response = engine
            .search_code("   ", &project_id, SearchOptions::default())
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_hits_with_similarity() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            embedded_record("src/auth.rs", 0, "fn authenticate(token: &str) {}").await,
            embedded_record("src/db.rs", 0, "fn connect_database() {}").await,
        ];
        let (engine, project_id) = seeded_engine(&dir, records).await;

        let response = engine
            .search_code("authenticate", &project_id, SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(response.search_type, SearchType::Hybrid);
        assert!(response.fts_indexed);
        assert_eq!(response.results.len(), 2);
        assert!(response.results.iter().all(|h| h.similarity <= 1.0));
        assert!(response.results[0].id.contains(':'));
    }

    #[tokio::test]
    async fn test_focus_tests_promotes_test_files() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            embedded_record("src/validator.ts", 0, "export function validate(input) {}").await,
            embedded_record(
                "src/validator.test.ts",
                0,
                "test('validate rejects bad input', () => {})",
            )
            .await,
        ];
        let (engine, project_id) = seeded_engine(&dir, records).await;

        let tests_first = engine
            .search_code(
                "validate test",
                &project_id,
                SearchOptions {
                    focus: Some(SearchFocus::Tests),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(tests_first.results[0].file_path, "src/validator.test.ts");

        let code_first = engine
            .search_code(
                "validate test",
                &project_id,
                SearchOptions {
                    focus: Some(SearchFocus::Code),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(code_first.results[0].file_path, "src/validator.ts");
    }

    #[tokio::test]
    async fn test_limit_respected() {
        let dir = TempDir::new().unwrap();
        let mut records = Vec::new();
        for i in 0..8 {
            records.push(
                embedded_record(&format!("src/mod_{i}.rs"), 0, &format!("fn handler_{i}() {{}}"))
                    .await,
            );
        }
        let (engine, project_id) = seeded_engine(&dir, records).await;

        let response = engine
            .search_code(
                "handler",
                &project_id,
                SearchOptions {
                    limit: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(response.results.len(), 3);
    }

    #[tokio::test]
    async fn test_project_with_no_index_returns_empty() {
        let dir = TempDir::new().unwrap();
        let (engine, project_id) = seeded_engine(&dir, vec![]).await;

        let response = engine
            .search_code("query", &project_id, SearchOptions::default())
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }
}
