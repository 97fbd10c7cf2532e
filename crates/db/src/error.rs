use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors raised by collections and the database handle.
#[derive(Debug, Error)]
pub enum DbError {
    /// A write would give two documents the same value for a unique index.
    #[error("duplicate key in {collection}.{field}: {value}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: Value,
    },

    #[error("storage i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("collection {collection} holds malformed data: {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DbError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, DbError::DuplicateKey { .. })
    }
}
