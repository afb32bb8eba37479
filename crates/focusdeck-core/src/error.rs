//! Core error types for focusdeck-core.
//!
//! This module defines the error hierarchy using thiserror. Remote write
//! failures on non-strict transitions are logged and swallowed by the
//! engine rather than surfaced through these types; strict transitions
//! (hand-off, defer) propagate `RemoteError`.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::TimerState;

/// Top-level error type for focusdeck-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Local durable cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Remote collaborator errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transition attempted from a state that does not allow it
    #[error("Invalid transition: cannot {action} while {from:?}")]
    InvalidTransition {
        from: TimerState,
        action: &'static str,
    },

    /// The queue has no active item to operate on
    #[error("Queue is empty: no active item")]
    QueueEmpty,

    /// Hand-off target is not in the roster
    #[error("Unknown hand-off target: {0}")]
    UnknownTarget(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local durable cache errors.
///
/// A corrupt or unreadable slot is NOT an error -- reads treat it as
/// absent. These cover failures to persist.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to write timer cache at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clear timer cache at {path}: {source}")]
    ClearFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode timer cache record: {0}")]
    EncodeFailed(#[from] serde_json::Error),
}

/// Remote task collaborator errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote API error: HTTP {status} for {operation}")]
    Api { status: u16, operation: String },

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Malformed remote response: {0}")]
    MalformedResponse(String),

    #[error("Remote base URL is invalid: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Failed to start IO runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
