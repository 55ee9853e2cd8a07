//! Error types for the Tend session manager.

use thiserror::Error;

use crate::SessionId;

/// Main error type for Tend operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Untagged data arrived while more than one session was live
    #[error("Ambiguous legacy data: {live} live sessions, no target id")]
    AmbiguousLegacyRouting {
        /// Number of live sessions at the time of arrival
        live: usize,
    },

    /// The transport connection is gone
    #[error("Transport closed")]
    TransportClosed,

    /// A wire message could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Host never acknowledged the backing process
    #[error("Session {id} not ready after {waited_ms}ms")]
    SpawnTimeout {
        /// Session that timed out
        id: SessionId,
        /// How long the session waited
        waited_ms: u64,
    },

    /// Invalid terminal dimensions
    #[error("Invalid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Number of rows
        rows: u16,
        /// Number of columns
        cols: u16,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
