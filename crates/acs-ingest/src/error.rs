//! Error types for ACS ingestion
//!
//! Every variant is fatal to the run: nothing is retried and a table is
//! either committed whole or not at all.

use std::path::PathBuf;

use acs_common::AcsError;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// PostgreSQL SQLSTATE for `duplicate_table`
pub(crate) const DUPLICATE_TABLE_SQLSTATE: &str = "42P07";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Common(#[from] AcsError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed delimited file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Catalog line {line}: {message}")]
    Catalog { line: u64, message: String },

    #[error("Catalog line {line}: table {table_id} has no preceding header row")]
    CatalogOrdering { table_id: String, line: u64 },

    #[error("Table {table} defines {columns} columns but its cell range yields {indices} fields")]
    SchemaMismatch {
        table: String,
        columns: usize,
        indices: usize,
    },

    #[error("Sequence file not found: {0}")]
    MissingSequenceFile(PathBuf),

    #[error("{path} line {line}: field {index} requested but row has {found} fields")]
    ShortRow {
        path: PathBuf,
        line: u64,
        index: usize,
        found: usize,
    },

    #[error("{path} line {line}: unexpected token '{token}' for column {column}")]
    UnexpectedToken {
        path: PathBuf,
        line: u64,
        column: String,
        token: String,
    },

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Cannot quote comment for {target}: {reason}")]
    Comment { target: String, reason: String },

    #[error("Table {0} already exists; recreate the schema before loading")]
    DuplicateTable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
