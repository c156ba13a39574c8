//! # Core Module
//!
//! The UI-agnostic cleanup engine.
//!
//! ## Modules
//! - `scanner` - Discovers files in the target folder
//! - `hasher` - Computes checksums and perceptual hashes
//! - `cache` - Persists fingerprints to avoid recomputation
//! - `comparator` - Partitions records into duplicate groups
//! - `relocator` - Moves duplicates without overwriting anything
//! - `pipeline` - Orchestrates the full workflow

pub mod cache;
pub mod comparator;
pub mod hasher;
pub mod pipeline;
pub mod record;
pub mod relocator;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{DetectionMode, DuplicateGroup};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineResult};
pub use record::{Dimensions, FileRecord};
pub use relocator::{Relocation, RelocationMode};
