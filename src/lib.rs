//! # Photo Cleanup
//!
//! Finds duplicate and near-duplicate files inside a folder and moves the
//! inferior copies out of the way. Nothing is ever deleted or overwritten.
//!
//! ## Detection modes
//! - **Image content** (default) - perceptual DCT hash, Hamming distance
//! - **Filename** - identical file names anywhere in the tree
//! - **Checksum** - identical CRC-32 of the file contents
//!
//! ## Architecture
//! - `core` - fingerprinting, cache, grouping and relocation
//! - `events` - Event-driven progress reporting
//! - `error` - Error types naming the offending paths

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CleanupError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` takes precedence; otherwise `default_level` is used.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
