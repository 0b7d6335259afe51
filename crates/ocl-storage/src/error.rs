//! Storage error types for ocl-storage.
//!
//! [`StorageError`] covers all anticipated failure modes in the storage layer:
//! SQLite and migration failures, serialization of JSON columns, missing
//! records addressed by id, and uniqueness violations among active records.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite returned an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON serialization or deserialization of a column failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A source with the given ID was not found.
    #[error("source not found: {0}")]
    SourceNotFound(i64),

    /// A source version with the given ID was not found.
    #[error("source version not found: {0}")]
    VersionNotFound(i64),

    /// An active source with the same owner and mnemonic already exists.
    #[error("source '{mnemonic}' already exists for {owner}")]
    DuplicateSource { owner: String, mnemonic: String },

    /// An active version with the same mnemonic already exists in the source.
    #[error("version '{mnemonic}' already exists in source {source_id}")]
    DuplicateVersion { source_id: i64, mnemonic: String },

    /// A stored value could not be decoded into the domain model.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },
}

impl From<ocl_core::CoreError> for StorageError {
    fn from(err: ocl_core::CoreError) -> Self {
        StorageError::IntegrityError {
            reason: err.to_string(),
        }
    }
}
