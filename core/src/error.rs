//! Error types for the portpilot-core library.

use thiserror::Error;

/// Result type alias for portpilot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port scanning and process management.
///
/// Per-line parse failures and per-PID enrichment misses never surface here:
/// they are absorbed where they happen.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// The diagnostic tool produced no usable output.
    #[error("Scan failed: {0}")]
    ScanFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// No process with this PID exists.
    #[error("Process {0} not found")]
    ProcessNotFound(u32),

    /// Failed to deliver a signal to a process.
    #[error("Failed to signal process {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },

    /// Unrecognized signal name or number.
    #[error("Unknown signal: {0}")]
    InvalidSignal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}
