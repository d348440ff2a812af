//! Domain errors for the download client store.

use thiserror::Error;

/// Domain-level errors returned by download client operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("no download client configured with id {0}")]
    DownloadClientNotFound(i32),

    #[error("{operation} {id}: no rows affected")]
    NoRowsAffected { operation: &'static str, id: i32 },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{operation}{} timed out after {timeout_ms}ms", id_suffix(.id))]
    Timeout {
        operation: &'static str,
        id: Option<i32>,
        timeout_ms: u64,
    },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Wrap a storage failure with the operation that produced it.
    pub fn database(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::DatabaseError(format!("{context}: {err}"))
    }

    /// Wrap an encode/decode failure with the operation that produced it.
    pub fn serialization(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::SerializationError(format!("{context}: {err}"))
    }

    /// True for the conditions a caller can act on as "that id does not exist".
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::DownloadClientNotFound(_) | Self::NoRowsAffected { .. })
    }
}

fn id_suffix(id: &Option<i32>) -> String {
    id.map(|id| format!(" {id}")).unwrap_or_default()
}
