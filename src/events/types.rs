//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the cleanup pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Fingerprinting phase events
    Fingerprint(FingerprintEvent),
    /// Grouping phase events
    Group(GroupEvent),
    /// Relocation phase events
    Relocate(RelocateEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A directory is about to be scanned
    DirectoryEntered { path: PathBuf },
    /// A candidate file was found
    FileFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Why a file had to be fingerprinted from scratch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputeReason {
    /// The path was not in the cache
    New,
    /// The cached mtime no longer matches the file
    Stale,
}

/// Events during the fingerprinting phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FingerprintEvent {
    /// Fingerprinting has started
    Started { total_files: usize },
    /// Progress update
    Progress(FingerprintProgress),
    /// Attributes were reused from the cache
    CacheHit { path: PathBuf },
    /// Attributes were computed
    Computed { path: PathBuf, reason: ComputeReason },
    /// An error occurred but fingerprinting continues
    Error { path: PathBuf, message: String },
    /// Fingerprinting completed
    Completed { computed: usize, cache_hits: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintProgress {
    /// Number of files handled so far
    pub completed: usize,
    /// Total number of files to handle
    pub total: usize,
    /// Current file
    pub current_path: PathBuf,
    /// Number of cache hits
    pub cache_hits: usize,
}

/// Events during the grouping phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    /// Grouping has started
    Started { total_files: usize },
    /// A duplicate group was found
    GroupFound { master: PathBuf, member_count: usize },
    /// Grouping completed
    Completed {
        total_groups: usize,
        total_duplicates: usize,
    },
}

/// Events during the relocation phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelocateEvent {
    /// A file was moved or renamed
    Moved { from: PathBuf, to: PathBuf },
    /// The requested destination was taken; a free one was chosen instead
    Collision { requested: PathBuf, actual: PathBuf },
    /// A too-small image was moved to the junk folder
    Junked { from: PathBuf, to: PathBuf },
    /// A move failed; the file stays where it was
    Error { path: PathBuf, message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// The fingerprint cache was written to disk
    CacheSaved { entries: usize },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Grouping,
    Relocating,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total files fingerprinted
    pub total_files: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Number of files moved or renamed
    pub relocated: usize,
    /// Number of too-small images moved to junk
    pub junked: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Relocating => write!(f, "Relocating"),
        }
    }
}
