use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Catalog error: {0}")]
    Db(#[from] engram_db::DbError),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
