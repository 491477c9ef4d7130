//! Error types for pdf-press
//!
//! This module defines the error hierarchy for the pipeline:
//! - Tracking store load/save errors
//! - External compressor invocation errors
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Per-file failures are data (worker outcomes), never propagated errors;
//!   only store-level and configuration failures surface as `Err`
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the pdf-press application
#[derive(Error, Debug)]
pub enum PressError {
    /// Tracking store errors
    #[error("Tracking store error: {0}")]
    Tracking(#[from] TrackingError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tracking store errors
///
/// Load failures are soft by default (the store starts fresh); a save
/// failure is the only fatal condition in the core.
#[derive(Error, Debug)]
pub enum TrackingError {
    /// Tracking file exists but cannot be parsed (strict mode only)
    #[error("Tracking file '{path}' is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Failed to read the tracking file
    #[error("Failed to read tracking file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the tracking file
    #[error("Failed to write tracking file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Record serialization failed
    #[error("Failed to serialize tracking data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// External compressor invocation errors
///
/// These never escape a worker: they are converted into `Outcome::Failed`
/// and recorded per file.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The compressor binary could not be launched
    #[error("Failed to launch compressor '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Waiting on the compressor process failed
    #[error("Failed waiting on compressor '{program}': {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },

    /// The compressor ran but returned a non-zero status
    #[error("Compressor '{program}' failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The compressor exceeded the configured time limit and was killed
    #[error("Compressor '{program}' timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },
}

impl ToolError {
    /// Check if this error is a timeout kill
    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolError::Timeout { .. })
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid minimum savings percentage
    #[error("Invalid minimum savings {percent}%: must be between 0 and 100")]
    InvalidMinSavings { percent: f64 },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// Tracking file path error
    #[error("Invalid tracking file path '{path}': {reason}")]
    InvalidTrackingPath { path: PathBuf, reason: String },

    /// Empty file extension
    #[error("File extension must not be empty")]
    EmptyExtension,
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },

    /// Worker initialization failed
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Task dispatch failed (all workers terminated early)
    #[error("Failed to dispatch task: all workers have terminated")]
    QueueSendFailed,
}

/// Result type alias for PressError
pub type Result<T> = std::result::Result<T, PressError>;

/// Result type alias for TrackingError
pub type TrackingResult<T> = std::result::Result<T, TrackingError>;

/// Result type alias for ToolError
pub type ToolResult<T> = std::result::Result<T, ToolError>;
