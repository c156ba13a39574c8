//! Types for the relocator module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Folder that receives suspected duplicates in quarantine mode
pub const DUPES_FOLDER: &str = "[Dupes]";

/// Folder that receives images below the minimum size
pub const JUNK_FOLDER: &str = "[Junk]";

/// What happens to the members of a duplicate group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelocationMode {
    /// Leave the master in place and rename the others next to it
    #[default]
    RenameInPlace,
    /// Move the whole group under `[Dupes]`
    Quarantine,
}

/// A completed move, with paths relative to the target folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
    /// The requested destination was taken and `to` is a disambiguated name
    pub collided: bool,
}

/// A move that failed; the file stayed where it was
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocationFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of relocating one duplicate group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupRelocation {
    pub moved: Vec<Relocation>,
    pub failed: Vec<RelocationFailure>,
}
