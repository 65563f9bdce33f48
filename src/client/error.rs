//! Errors raised by the client's local storage.

/// The errors that may occur while using the local offline queue.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The queue's SQLite database could not be opened, read or written.
    #[error("local queue storage failed: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A queued record could not be converted to or from JSON.
    #[error("could not serialize queued record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not acquire the queue's database lock
    #[error("could not acquire the queue lock")]
    LockError,
}
