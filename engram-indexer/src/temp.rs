use crate::error::Result;
use crate::indexer::{FileError, Indexer};
use crate::walker::walk_project;
use engram_embeddings::CircuitBreaker;
use engram_vector_store::{temp_namespace, VectorStore};
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

/// Summary of an ephemeral indexing run.
#[derive(Debug)]
pub struct TempIndexReport {
    /// Namespace id derived from the path hash.
    pub temp_id: String,
    pub files_indexed: usize,
    pub chunks_created: usize,
    pub duration_ms: u64,
    pub errors: Vec<FileError>,
}

impl Indexer {
    /// Run the chunk/embed pipeline against an arbitrary path, writing
    /// into a throwaway namespace outside the project registry. No change
    /// detection: the namespace is rebuilt from scratch each time.
    pub async fn index_temp_path(&self, path: &Path) -> Result<TempIndexReport> {
        let started = Instant::now();

        let temp_id = temp_namespace(path);
        let store = VectorStore::open(self.data_dir(), &temp_id).await?;
        store.clear().await?;

        let walk = walk_project(path, None);
        info!(
            "temp-indexing {} into {temp_id} ({} files)",
            path.display(),
            walk.files.len()
        );

        let breaker = CircuitBreaker::new(self.config().breaker.clone());

        let mut errors = Vec::new();
        let mut files_indexed = 0usize;
        let mut chunks_created = 0usize;

        for file in &walk.files {
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

            let chunks = self.chunk_file(&content, file);

            match self.embed_file(&chunks, &breaker).await {
                Ok(vectors) => {
                    let records = crate::indexer::build_records(file, &chunks, vectors);
                    chunks_created += records.len();
                    files_indexed += 1;
                    store.upsert(records).await?;
                }
                Err(e) => {
                    errors.push(FileError {
                        file: file.rel_path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(TempIndexReport {
            temp_id,
            files_indexed,
            chunks_created,
            duration_ms: started.elapsed().as_millis() as u64,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexerConfig;
    use crate::indexer::IndexOptions;
    use engram_embeddings::DeterministicProvider;
    use engram_vector_store::{cleanup_all_temp, cleanup_temp, temp_store_exists};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    fn indexer(data_dir: &Path) -> Indexer {
        let conn = engram_db::open_in_memory().unwrap();
        Indexer::new(
            Arc::new(Mutex::new(conn)),
            Arc::new(DeterministicProvider::new()),
            data_dir.to_path_buf(),
            IndexerConfig::default(),
        )
        .unwrap()
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_temp_index_builds_namespace() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(target.path(), "src/dep.rs", "fn dependency_entry() {}\n");

        let indexer = indexer(data.path());
        let report = indexer.index_temp_path(target.path()).await.unwrap();

        assert_eq!(report.files_indexed, 1);
        assert!(report.chunks_created > 0);
        assert!(report.errors.is_empty());
        assert!(temp_store_exists(data.path(), target.path()));
    }

    #[tokio::test]
    async fn test_temp_index_outside_project_registry() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(target.path(), "src/dep.rs", "fn x() {}\n");

        let indexer = indexer(data.path());
        indexer.index_temp_path(target.path()).await.unwrap();

        let conn = indexer.db().lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "temp indexing must not register a project");
    }

    #[tokio::test]
    async fn test_temp_reindex_rebuilds_from_scratch() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write(target.path(), "src/a.rs", "fn a() {}\n");
        write(target.path(), "src/b.rs", "fn b() {}\n");

        let indexer = indexer(data.path());
        indexer.index_temp_path(target.path()).await.unwrap();

        fs::remove_file(target.path().join("src/b.rs")).unwrap();
        let report = indexer.index_temp_path(target.path()).await.unwrap();
        assert_eq!(report.files_indexed, 1);

        let store = VectorStore::open(data.path(), &report.temp_id).await.unwrap();
        assert_eq!(store.file_paths().await, vec!["src/a.rs".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_temp_namespaces() {
        let data = TempDir::new().unwrap();
        let target_a = TempDir::new().unwrap();
        let target_b = TempDir::new().unwrap();
        write(target_a.path(), "a.rs", "fn a() {}\n");
        write(target_b.path(), "b.rs", "fn b() {}\n");

        let indexer = indexer(data.path());
        indexer.index_temp_path(target_a.path()).await.unwrap();
        indexer.index_temp_path(target_b.path()).await.unwrap();

        assert!(cleanup_temp(data.path(), target_a.path()).unwrap());
        assert!(!temp_store_exists(data.path(), target_a.path()));
        assert!(temp_store_exists(data.path(), target_b.path()));

        assert_eq!(cleanup_all_temp(data.path()).unwrap(), 1);
        assert!(!temp_store_exists(data.path(), target_b.path()));
    }

    #[tokio::test]
    async fn test_temp_and_project_indexing_coexist() {
        let data = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let dep = TempDir::new().unwrap();
        write(project.path(), "src/app.rs", "fn app() {}\n");
        write(dep.path(), "src/dep.rs", "fn dep() {}\n");

        let indexer = indexer(data.path());
        let project_report = indexer
            .index_project(project.path(), IndexOptions::default())
            .await
            .unwrap();
        let temp_report = indexer.index_temp_path(dep.path()).await.unwrap();

        assert_ne!(project_report.project_id, temp_report.temp_id);
        assert_eq!(cleanup_all_temp(data.path()).unwrap(), 1);
    }
}
