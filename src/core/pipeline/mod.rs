//! # Pipeline Module
//!
//! Orchestrates the full cleanup workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover files, moving too-small images to `[Junk]`
//! 2. **Fingerprint** - Checksums and perceptual hashes (with caching)
//! 3. **Checkpoint** - Save the cache before any file moves
//! 4. **Group** - Partition records into duplicate groups
//! 5. **Relocate** - Rename or quarantine the duplicates
//! 6. **Checkpoint** - Save the cache with the final paths
//!
//! Work is strictly sequential. A run that is interrupted can simply be
//! repeated: unchanged files come back from the cache and moves never
//! overwrite.

mod executor;

pub use executor::{
    Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, DEFAULT_MIN_HEIGHT,
    DEFAULT_MIN_WIDTH,
};
