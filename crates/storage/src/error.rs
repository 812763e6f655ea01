/// All errors that can be returned by a ReportStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Optimistic concurrency conflict: another writer replaced the report
    /// since the caller read it.
    #[error(
        "concurrent conflict on report {id}: expected version {expected_version}, found {actual_version}"
    )]
    ConcurrentConflict {
        id: String,
        expected_version: u64,
        actual_version: u64,
    },

    /// No report with the given id.
    #[error("report not found: {id}")]
    NotFound { id: String },

    /// Insert of an id that is already stored.
    #[error("report already exists: {id}")]
    AlreadyExists { id: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Backend(format!("serialization: {e}"))
    }
}
