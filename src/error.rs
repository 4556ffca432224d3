//! Error types for the Chipmunk client
//!
//! Provides a unified error type for all operations.

use std::io;

use thiserror::Error;

/// Result type alias using ChipmunkError
pub type Result<T> = std::result::Result<T, ChipmunkError>;

/// Unified error type for Chipmunk client operations
#[derive(Debug, Error)]
pub enum ChipmunkError {
    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    /// Invalid host/port, or a key/value/identifier containing a delimiter
    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    // -------------------------------------------------------------------------
    // Decoding Errors
    // -------------------------------------------------------------------------
    /// Response bytes do not have the shape expected for the command issued
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The payload codec failed to encode or decode a value
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ChipmunkError {
    /// Classify an I/O failure: timeouts become `Timeout`, the rest `Connection`
    pub fn from_io(context: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                ChipmunkError::Timeout(format!("{}: {}", context, err))
            }
            _ => ChipmunkError::Connection(format!("{}: {}", context, err)),
        }
    }

    /// True for errors raised by the time bounds on connect/read
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChipmunkError::Timeout(_))
    }
}
