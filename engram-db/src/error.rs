use crate::config_guard::EmbeddingConfigRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The active embedding configuration does not match the one the
    /// project's stored vectors were produced with. Mixing embedding
    /// spaces silently would corrupt search, so this is fatal until the
    /// operator forces a reindex.
    #[error(
        "Embedding configuration drift for project {project_id}: stored vectors were produced \
         with {stored} but the active configuration is {active}. Delete the stored embedding \
         config and reindex the project to switch embedding spaces."
    )]
    ConfigDrift {
        project_id: String,
        stored: EmbeddingConfigRow,
        active: EmbeddingConfigRow,
    },
}
