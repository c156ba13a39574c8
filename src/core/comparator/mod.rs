//! # Comparator Module
//!
//! Partitions the scanned records into duplicate groups.
//!
//! ## Detection Modes
//! | Mode      | Key                         | Master              |
//! |-----------|-----------------------------|---------------------|
//! | Filename  | final path component        | first seen          |
//! | Checksum  | CRC-32                      | first seen          |
//! | Image     | perceptual hash, transitive | largest pixel area  |
//!
//! In image mode two images are linked when their hashes differ in fewer
//! than `threshold` bits, and groups are the connected components of that
//! graph.

mod grouper;
mod traits;

pub use grouper::{KeyGrouper, SimilarityGraph, TransitiveGrouper};
pub use traits::{ComparisonStrategy, ThresholdStrategy, DEFAULT_THRESHOLD};

use crate::core::record::FileRecord;
use crate::events::{Event, EventSender, GroupEvent};
use serde::{Deserialize, Serialize};

/// How duplicates are recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Visually similar images
    #[default]
    Image,
    /// Identical file names anywhere in the tree
    Filename,
    /// Identical CRC-32 checksums
    Checksum,
}

impl DetectionMode {
    /// Resolve the mode from command-line switches.
    ///
    /// Filename wins over checksum, which wins over image content.
    pub fn from_flags(by_name: bool, by_checksum: bool) -> Self {
        if by_name {
            DetectionMode::Filename
        } else if by_checksum {
            DetectionMode::Checksum
        } else {
            DetectionMode::Image
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMode::Image => write!(f, "image content"),
            DetectionMode::Filename => write!(f, "file name"),
            DetectionMode::Checksum => write!(f, "checksum"),
        }
    }
}

/// A set of two or more records considered duplicates of each other
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Ordered members; the first one is the master
    members: Vec<FileRecord>,
}

impl DuplicateGroup {
    pub fn new(members: Vec<FileRecord>) -> Self {
        debug_assert!(members.len() > 1, "a duplicate group needs two members");
        Self { members }
    }

    /// The copy that is kept as the reference
    pub fn master(&self) -> &FileRecord {
        &self.members[0]
    }

    /// Everything except the master, in order
    pub fn duplicates(&self) -> &[FileRecord] {
        &self.members[1..]
    }

    pub fn members(&self) -> &[FileRecord] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Get the number of duplicates (excluding the master)
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }
}

/// Group `records` according to `mode`.
///
/// `threshold` only matters in image mode.
pub fn find_groups(records: &[FileRecord], mode: DetectionMode, threshold: u32) -> Vec<DuplicateGroup> {
    match mode {
        DetectionMode::Filename => KeyGrouper::group(records, |r| r.file_name()),
        DetectionMode::Checksum => KeyGrouper::group(records, |r| r.checksum.clone()),
        DetectionMode::Image => {
            TransitiveGrouper::new(ThresholdStrategy::new(threshold)).group(records)
        }
    }
}

/// Group `records`, reporting each group found
pub fn find_groups_with_events(
    records: &[FileRecord],
    mode: DetectionMode,
    threshold: u32,
    events: &EventSender,
) -> Vec<DuplicateGroup> {
    events.send(Event::Group(GroupEvent::Started {
        total_files: records.len(),
    }));

    let groups = find_groups(records, mode, threshold);

    for group in &groups {
        events.send(Event::Group(GroupEvent::GroupFound {
            master: group.master().path.clone(),
            member_count: group.len(),
        }));
    }

    events.send(Event::Group(GroupEvent::Completed {
        total_groups: groups.len(),
        total_duplicates: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
    }));

    groups
}
