//! # Engram DB
//!
//! The relational catalog behind the indexing engine: project registry,
//! per-file content hashes for change detection, per-project embedding
//! configuration snapshots, and the heuristic memory rows.
//!
//! Vectors live elsewhere (one namespace file per project); this crate only
//! tracks what was indexed, with what configuration, and what has been
//! learned about it.

mod catalog;
mod config_guard;
mod error;
pub mod schema;

pub use catalog::{
    commit_file_hashes, delete_file_hash, file_hashes_for_project, find_project_by_root,
    get_project, touch_project, upsert_project, Project,
};
pub use config_guard::{
    delete_embedding_config, get_embedding_config, save_embedding_config,
    validate_embedding_config, EmbeddingConfigRow,
};
pub use error::DbError;

use rusqlite::Connection;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Open (or create) the catalog database and initialize its schema.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;
    Ok(conn)
}

/// In-memory catalog for tests.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;
    Ok(conn)
}

/// Current unix time in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_db_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("catalog.db");
        let _conn = open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_now_secs_is_positive() {
        assert!(now_secs() > 0);
    }
}
