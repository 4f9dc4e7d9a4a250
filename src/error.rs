use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("limit must be <= {max}: got {limit}")]
    InvalidLimit { limit: usize, max: usize },

    #[error("entrez request failed: {0}")]
    EntrezHttp(String),

    #[error("entrez returned status {status}: {message}")]
    EntrezStatus { status: u16, message: String },

    #[error("uniprot request failed: {0}")]
    UniprotHttp(String),

    #[error("uniprot returned status {status}: {message}")]
    UniprotStatus { status: u16, message: String },

    #[error("failed to parse esearch response: {0}")]
    SearchParse(String),

    #[error("fetched {actual} records for {expected} requested ids")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}
