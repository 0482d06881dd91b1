//! Error types for arspawn
//!
//! Lifecycle no-ops (unknown identities, updates for inactive objects) are
//! never errors. Only configuration and provider I/O fail.

use thiserror::Error;

/// Main error type for arspawn
#[derive(Error, Debug)]
pub enum ArspawnError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Tracking provider errors (manual, replay, UDP)
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("A listener is already attached to this provider")]
    ListenerAlreadyAttached,

    #[error("Failed to read replay file: {0}")]
    ReplayRead(String),

    #[error("Replay parse error on line {line}: {message}")]
    ReplayParse { line: usize, message: String },

    #[error("Failed to bind UDP socket: {0}")]
    UdpBind(String),

    #[error("UDP receive error: {0}")]
    UdpReceive(String),
}

/// Result type alias for arspawn operations
pub type Result<T> = std::result::Result<T, ArspawnError>;
