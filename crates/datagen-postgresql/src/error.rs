//! Error types for the PostgreSQL collaborator.

use thiserror::Error;

/// Errors that can occur while provisioning, populating or importing.
#[derive(Error, Debug)]
pub enum PostgreSQLError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Catalog file could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is missing from the catalog file header.
    #[error("Catalog file is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
