//! Error types for pmrcon
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

/// Result type alias using RconError
pub type Result<T> = std::result::Result<T, RconError>;

/// Unified error type for RCON client operations
#[derive(Debug, Error)]
pub enum RconError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Failed to connect to {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out: {0}")]
    Timeout(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Framing error: {0}")]
    Framing(String),

    #[error("Request ids exhausted for this session")]
    RequestIdsExhausted,

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Session is no longer usable; connect a new session")]
    SessionFailed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RconError {
    /// Returns true for errors raised while waiting on a silent peer
    pub fn is_timeout(&self) -> bool {
        matches!(self, RconError::Timeout(_))
    }
}
