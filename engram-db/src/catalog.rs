use crate::error::DbError;
use crate::now_secs;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered project, keyed by its canonical root path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub root_path: String,
    pub name: String,
    pub chunk_count: i64,
    pub last_indexed_at: Option<i64>,
}

fn map_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        root_path: row.get(1)?,
        name: row.get(2)?,
        chunk_count: row.get(3)?,
        last_indexed_at: row.get(4)?,
    })
}

/// Look up a project by id.
pub fn get_project(conn: &Connection, project_id: &str) -> Result<Option<Project>, DbError> {
    let project = conn
        .query_row(
            "SELECT id, root_path, name, chunk_count, last_indexed_at \
             FROM projects WHERE id = ?1",
            params![project_id],
            map_project,
        )
        .optional()?;
    Ok(project)
}

/// Look up a project by its root path.
pub fn find_project_by_root(conn: &Connection, root_path: &str) -> Result<Option<Project>, DbError> {
    let project = conn
        .query_row(
            "SELECT id, root_path, name, chunk_count, last_indexed_at \
             FROM projects WHERE root_path = ?1",
            params![root_path],
            map_project,
        )
        .optional()?;
    Ok(project)
}

/// Register a project for a root path, or return the existing one.
/// `name` is only applied on creation.
pub fn upsert_project(
    conn: &Connection,
    root_path: &str,
    name: &str,
) -> Result<Project, DbError> {
    if let Some(existing) = find_project_by_root(conn, root_path)? {
        return Ok(existing);
    }

    let project = Project {
        id: uuid::Uuid::new_v4().to_string(),
        root_path: root_path.to_string(),
        name: name.to_string(),
        chunk_count: 0,
        last_indexed_at: None,
    };

    conn.execute(
        "INSERT INTO projects (id, root_path, name, chunk_count) VALUES (?1, ?2, ?3, 0)",
        params![project.id, project.root_path, project.name],
    )?;

    debug!("registered project {} at {}", project.id, root_path);
    Ok(project)
}

/// Update a project's chunk count and last-indexed timestamp after a
/// successful run.
pub fn touch_project(
    conn: &Connection,
    project_id: &str,
    chunk_count: i64,
) -> Result<(), DbError> {
    conn.execute(
        "UPDATE projects SET chunk_count = ?1, last_indexed_at = ?2 WHERE id = ?3",
        params![chunk_count, now_secs(), project_id],
    )?;
    Ok(())
}

/// All recorded file hashes for a project: rel_path -> content_hash.
pub fn file_hashes_for_project(
    conn: &Connection,
    project_id: &str,
) -> Result<HashMap<String, String>, DbError> {
    let mut stmt =
        conn.prepare("SELECT rel_path, content_hash FROM file_hashes WHERE project_id = ?1")?;
    let rows = stmt.query_map(params![project_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut hashes = HashMap::new();
    for row in rows {
        let (path, hash) = row?;
        hashes.insert(path, hash);
    }
    Ok(hashes)
}

/// Commit the hashes for a batch of fully-successful files in one
/// transaction, so a batch's files become "indexed" together.
pub fn commit_file_hashes(
    conn: &mut Connection,
    project_id: &str,
    hashes: &[(String, String)],
) -> Result<(), DbError> {
    if hashes.is_empty() {
        return Ok(());
    }

    let now = now_secs();
    let tx = conn.transaction()?;
    for (rel_path, content_hash) in hashes {
        tx.execute(
            "INSERT INTO file_hashes (project_id, rel_path, content_hash, indexed_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(project_id, rel_path) DO UPDATE SET \
                 content_hash = excluded.content_hash, \
                 indexed_at = excluded.indexed_at",
            params![project_id, rel_path, content_hash, now],
        )?;
    }
    tx.commit()?;

    debug!("committed {} file hashes for {}", hashes.len(), project_id);
    Ok(())
}

/// Drop the hash entry for a file (stale-file cleanup).
pub fn delete_file_hash(
    conn: &Connection,
    project_id: &str,
    rel_path: &str,
) -> Result<bool, DbError> {
    let rows = conn.execute(
        "DELETE FROM file_hashes WHERE project_id = ?1 AND rel_path = ?2",
        params![project_id, rel_path],
    )?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_in_memory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_upsert_project_creates_then_reuses() {
        let conn = open_in_memory().unwrap();

        let a = upsert_project(&conn, "/repo/app", "app").unwrap();
        let b = upsert_project(&conn, "/repo/app", "renamed").unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(b.name, "app");
    }

    #[test]
    fn test_get_project_unknown_is_none() {
        let conn = open_in_memory().unwrap();
        assert!(get_project(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_touch_project_updates_stats() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo/app", "app").unwrap();

        touch_project(&conn, &project.id, 42).unwrap();

        let fetched = get_project(&conn, &project.id).unwrap().unwrap();
        assert_eq!(fetched.chunk_count, 42);
        assert!(fetched.last_indexed_at.is_some());
    }

    #[test]
    fn test_commit_and_read_file_hashes() {
        let mut conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo/app", "app").unwrap();

        commit_file_hashes(
            &mut conn,
            &project.id,
            &[
                ("src/lib.rs".to_string(), "abc".to_string()),
                ("src/main.rs".to_string(), "def".to_string()),
            ],
        )
        .unwrap();

        let hashes = file_hashes_for_project(&conn, &project.id).unwrap();
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes.get("src/lib.rs").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_commit_overwrites_existing_hash() {
        let mut conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo/app", "app").unwrap();

        commit_file_hashes(
            &mut conn,
            &project.id,
            &[("src/lib.rs".to_string(), "old".to_string())],
        )
        .unwrap();
        commit_file_hashes(
            &mut conn,
            &project.id,
            &[("src/lib.rs".to_string(), "new".to_string())],
        )
        .unwrap();

        let hashes = file_hashes_for_project(&conn, &project.id).unwrap();
        assert_eq!(hashes.get("src/lib.rs").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_delete_file_hash() {
        let mut conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo/app", "app").unwrap();

        commit_file_hashes(
            &mut conn,
            &project.id,
            &[("src/gone.rs".to_string(), "x".to_string())],
        )
        .unwrap();

        assert!(delete_file_hash(&conn, &project.id, "src/gone.rs").unwrap());
        assert!(!delete_file_hash(&conn, &project.id, "src/gone.rs").unwrap());
        assert!(file_hashes_for_project(&conn, &project.id).unwrap().is_empty());
    }
}
