use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Required field missing: {0}")]
    MissingField(&'static str),
    #[error("Invalid table name: {0}")]
    InvalidTable(String),
    #[error("Store lock poisoned")]
    LockPoisoned,
}
