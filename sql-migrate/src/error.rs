//! Error types for the migration engine and client manager.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the migration engine (C8) and client manager (C9).
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tokenize(#[from] sql_core::TokenizeError),

    #[error("failed to parse migration file {path}: {message}")]
    MigrationParse { path: PathBuf, message: String },

    #[error("migration {name} not found in {migrations_dir}")]
    MigrationNotFound { name: String, migrations_dir: PathBuf },

    #[error("{count} migration file(s) recorded as applied are missing on disk: {names:?}")]
    SomeFilesNotFound { count: usize, names: Vec<String> },

    #[error("migration {name} has no down section and cannot be rolled back")]
    NotReversible { name: String },

    #[error("{} migration(s) failed to apply: {failed:?}", failed.len())]
    AggregateFailure { failed: Vec<String> },

    #[error("invalid migrations directory: {0}")]
    MigrationsDirNotFound(PathBuf),

    #[error("no connection registered under name {0:?}")]
    UnknownConnection(String),

    #[error("unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("invalid engine state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MigrateError>;
