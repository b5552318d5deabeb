//! SQL DDL for the catalog tables.
//!
//! Defines `projects`, `file_hashes`, `embedding_configs`, and
//! `heuristic_memories`. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- Project registry
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    root_path TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    chunk_count INTEGER NOT NULL DEFAULT 0,
    last_indexed_at INTEGER
);

-- Per-file content fingerprints for change detection.
-- A row is present and current iff all chunks of the file were embedded
-- and committed in the most recent successful batch.
CREATE TABLE IF NOT EXISTS file_hashes (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    rel_path TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    indexed_at INTEGER NOT NULL,
    PRIMARY KEY (project_id, rel_path)
);

-- Embedding configuration last used to produce a project's stored vectors
CREATE TABLE IF NOT EXISTS embedding_configs (
    project_id TEXT PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Heuristic memory records
CREATE TABLE IF NOT EXISTS heuristic_memories (
    id TEXT PRIMARY KEY,
    concept TEXT NOT NULL CHECK(concept IN ('pattern','rule','constraint','decision','context','learning')),
    content TEXT NOT NULL,
    domain TEXT,
    confidence REAL NOT NULL DEFAULT 0.5 CHECK(confidence >= 0.0 AND confidence <= 1.0),
    golden INTEGER NOT NULL DEFAULT 0,
    validated_count INTEGER NOT NULL DEFAULT 0,
    violated_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'current' CHECK(status IN ('current','superseded','archived')),
    project_id TEXT,
    evolved_from TEXT,
    superseded_by TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    last_validated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_file_hashes_project ON file_hashes(project_id);
CREATE INDEX IF NOT EXISTS idx_memories_status ON heuristic_memories(status);
CREATE INDEX IF NOT EXISTS idx_memories_project ON heuristic_memories(project_id);
CREATE INDEX IF NOT EXISTS idx_memories_concept ON heuristic_memories(concept);
"#;

/// Initialize all catalog tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"projects".to_string()));
        assert!(tables.contains(&"file_hashes".to_string()));
        assert!(tables.contains(&"embedding_configs".to_string()));
        assert!(tables.contains(&"heuristic_memories".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
