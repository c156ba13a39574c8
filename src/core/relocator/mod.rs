//! File relocation module.
//!
//! Moves the non-master members of each duplicate group, either renaming
//! them next to the master or quarantining the whole group under `[Dupes]`.
//! A destination that already exists is never replaced: a `-0`, `-1`, ...
//! counter is inserted before the extension until a free name is found.

mod executor;
mod types;

pub use executor::FileRelocator;
pub use types::*;
