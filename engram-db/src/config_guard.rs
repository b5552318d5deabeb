use crate::error::DbError;
use crate::now_secs;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Snapshot of the embedding configuration a project's vectors were
/// produced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfigRow {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl std::fmt::Display for EmbeddingConfigRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(provider={}, model={}, dimensions={})",
            self.provider, self.model, self.dimensions
        )
    }
}

/// Persist the active configuration for a project, replacing any prior
/// snapshot.
pub fn save_embedding_config(
    conn: &Connection,
    project_id: &str,
    config: &EmbeddingConfigRow,
) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO embedding_configs (project_id, provider, model, dimensions, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(project_id) DO UPDATE SET \
             provider = excluded.provider, \
             model = excluded.model, \
             dimensions = excluded.dimensions, \
             updated_at = excluded.updated_at",
        params![
            project_id,
            config.provider,
            config.model,
            config.dimensions as i64,
            now_secs(),
        ],
    )?;
    Ok(())
}

/// The stored configuration snapshot for a project, if any.
pub fn get_embedding_config(
    conn: &Connection,
    project_id: &str,
) -> Result<Option<EmbeddingConfigRow>, DbError> {
    let row = conn
        .query_row(
            "SELECT provider, model, dimensions FROM embedding_configs WHERE project_id = ?1",
            params![project_id],
            |row| {
                Ok(EmbeddingConfigRow {
                    provider: row.get(0)?,
                    model: row.get(1)?,
                    dimensions: row.get::<_, i64>(2)? as usize,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Remove the stored snapshot. This is the explicit first step of a forced
/// reindex.
pub fn delete_embedding_config(conn: &Connection, project_id: &str) -> Result<bool, DbError> {
    let rows = conn.execute(
        "DELETE FROM embedding_configs WHERE project_id = ?1",
        params![project_id],
    )?;
    if rows > 0 {
        info!("deleted stored embedding config for project {project_id}");
    }
    Ok(rows > 0)
}

/// Compare the active configuration against the stored snapshot.
///
/// No stored snapshot means no conflict (first run). Any mismatch in
/// provider, model, or dimensions is a [`DbError::ConfigDrift`]; vectors
/// from different embedding spaces must never be mixed in one project.
pub fn validate_embedding_config(
    conn: &Connection,
    project_id: &str,
    active: &EmbeddingConfigRow,
) -> Result<(), DbError> {
    let Some(stored) = get_embedding_config(conn, project_id)? else {
        return Ok(());
    };

    if stored != *active {
        return Err(DbError::ConfigDrift {
            project_id: project_id.to_string(),
            stored,
            active: active.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::upsert_project;
    use crate::open_in_memory;
    use pretty_assertions::assert_eq;

    fn config(model: &str, dimensions: usize) -> EmbeddingConfigRow {
        EmbeddingConfigRow {
            provider: "local".to_string(),
            model: model.to_string(),
            dimensions,
        }
    }

    #[test]
    fn test_first_run_has_no_conflict() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        validate_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        let cfg = config("nomic", 768);
        save_embedding_config(&conn, &project.id, &cfg).unwrap();

        let stored = get_embedding_config(&conn, &project.id).unwrap().unwrap();
        assert_eq!(stored, cfg);
    }

    #[test]
    fn test_matching_config_passes() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        save_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
        validate_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
    }

    #[test]
    fn test_drift_in_model_is_fatal() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        save_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
        let err = validate_embedding_config(&conn, &project.id, &config("minilm", 768)).unwrap_err();

        match err {
            DbError::ConfigDrift { stored, active, .. } => {
                assert_eq!(stored.model, "nomic");
                assert_eq!(active.model, "minilm");
            }
            other => panic!("expected ConfigDrift, got {other:?}"),
        }
    }

    #[test]
    fn test_drift_in_dimensions_is_fatal() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        save_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
        assert!(validate_embedding_config(&conn, &project.id, &config("nomic", 384)).is_err());
    }

    #[test]
    fn test_drift_error_message_names_both_configs() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        save_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
        let err = validate_embedding_config(&conn, &project.id, &config("minilm", 384)).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("nomic"));
        assert!(message.contains("minilm"));
        assert!(message.contains("reindex"));
    }

    #[test]
    fn test_delete_then_resave_resolves_drift() {
        let conn = open_in_memory().unwrap();
        let project = upsert_project(&conn, "/repo", "repo").unwrap();

        save_embedding_config(&conn, &project.id, &config("nomic", 768)).unwrap();
        assert!(delete_embedding_config(&conn, &project.id).unwrap());
        assert!(!delete_embedding_config(&conn, &project.id).unwrap());

        // After the forced delete the new configuration is acceptable.
        validate_embedding_config(&conn, &project.id, &config("minilm", 384)).unwrap();
        save_embedding_config(&conn, &project.id, &config("minilm", 384)).unwrap();
    }
}
