//! # Error Module
//!
//! Error types for the cleanup run.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every error names the path it concerns
//! - **Contain per-file failures** - only environment-level errors abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprinting error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Relocation error: {0}")]
    Relocate(#[from] RelocateError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while walking the target folder
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid path: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting a single file
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to resize image {path}: {reason}")]
    Resize { path: PathBuf, reason: String },
}

/// Errors that occur with the fingerprint cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not open cache file {path} for writing: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache state is poisoned at {path}")]
    Poisoned { path: PathBuf },
}

/// Errors that occur while moving or renaming files
#[derive(Error, Debug)]
pub enum RelocateError {
    #[error("Could not create '{path}' folder: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A file named '{path}' exists and it is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy verification failed for {from}: source {source_size} bytes, destination {dest_size} bytes")]
    CopyVerification {
        from: PathBuf,
        source_size: u64,
        dest_size: u64,
    },
}

impl RelocateError {
    /// Whether this failure should abort the whole run.
    ///
    /// Folder creation problems are environment-level; everything else is
    /// contained to the file being moved.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RelocateError::CreateDirectory { .. } | RelocateError::NotADirectory { .. }
        )
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CleanupError>;
