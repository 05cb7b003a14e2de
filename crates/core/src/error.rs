//! Unified error types for waylay.
//!
//! One taxonomy for the whole engine: store I/O, transport failures, and
//! lifecycle failures all surface here so executors can decide what is
//! recoverable (cache I/O, a lost network) and what is not.

use tokio_rusqlite::rusqlite;

/// Unified error types for the waylay engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored entry could not be decoded (e.g. corrupt header record).
    #[error("STORE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Connection-level network failure. HTTP error statuses are not
    /// network failures; they are responses.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Response body exceeded the configured size limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Installation failed at the store level; activation must not proceed.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// A control or push payload could not be parsed.
    #[error("BAD_MESSAGE: {0}")]
    BadMessage(String),

    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    /// Whether this error is a genuine network failure, i.e. the class of
    /// failure the fallback chain (cache, then synthetic response) exists
    /// to recover from.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::FetchTooLarge(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
