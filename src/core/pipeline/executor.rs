//! Pipeline execution implementation.

use crate::core::cache::{
    entries_for_save, lookup_or_compute, CacheBackend, CacheOutcome, TextFileCache,
    CACHE_FILE_NAME,
};
use crate::core::comparator::{find_groups_with_events, DetectionMode, DuplicateGroup, DEFAULT_THRESHOLD};
use crate::core::hasher::Fingerprinter;
use crate::core::record::{Dimensions, FileRecord};
use crate::core::relocator::{FileRelocator, Relocation, RelocationMode, DUPES_FOLDER, JUNK_FOLDER};
use crate::core::scanner::{is_too_small, FileScanner, ScanConfig, WalkDirScanner};
use crate::error::{Result, ScanError};
use crate::events::{
    null_sender, Event, EventSender, FingerprintEvent, FingerprintProgress, PipelineEvent,
    PipelinePhase, PipelineSummary,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Default minimum width for the too-small filter
pub const DEFAULT_MIN_WIDTH: u32 = 1200;
/// Default minimum height for the too-small filter (16:9 of the width)
pub const DEFAULT_MIN_HEIGHT: u32 = 675;

/// Result of pipeline execution
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    /// Records as persisted by the final cache save
    pub records: Vec<FileRecord>,
    /// All duplicate groups found, as they were before relocation
    pub groups: Vec<DuplicateGroup>,
    /// Moves and renames performed for the groups
    pub relocations: Vec<Relocation>,
    /// Too-small images moved to `[Junk]`
    pub junked: Vec<Relocation>,
    /// Total files scanned (after the too-small filter)
    pub total_files: usize,
    /// Number of cache hits
    pub cache_hits: usize,
    /// Number of errors encountered (non-fatal)
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder to clean up
    pub root: PathBuf,
    /// Walk subfolders
    pub recursive: bool,
    /// How duplicates are recognised
    pub mode: DetectionMode,
    /// What happens to duplicates
    pub relocation: RelocationMode,
    /// Move images below `min_dimensions` to `[Junk]`
    pub remove_small: bool,
    pub min_dimensions: Dimensions,
    /// Hamming distance below which images are duplicates
    pub threshold: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            recursive: false,
            mode: DetectionMode::default(),
            relocation: RelocationMode::default(),
            remove_small: false,
            min_dimensions: Dimensions::new(DEFAULT_MIN_WIDTH, DEFAULT_MIN_HEIGHT),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    cache: Option<Box<dyn CacheBackend>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            cache: None,
        }
    }

    /// Set the folder to clean up
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    /// Set the detection mode
    pub fn mode(mut self, mode: DetectionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the relocation mode
    pub fn relocation(mut self, relocation: RelocationMode) -> Self {
        self.config.relocation = relocation;
        self
    }

    /// Move images smaller than the minimum dimensions to `[Junk]`
    pub fn remove_small(mut self, remove_small: bool) -> Self {
        self.config.remove_small = remove_small;
        self
    }

    pub fn min_dimensions(mut self, width: u32, height: u32) -> Self {
        self.config.min_dimensions = Dimensions::new(width, height);
        self
    }

    /// Set the comparison threshold
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the cache backend (default: `fingerprint.db` in the root)
    pub fn cache(mut self, cache: Box<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the pipeline, loading the default cache if none was given
    pub fn build(self) -> Pipeline {
        let cache = match self.cache {
            Some(cache) => cache,
            None => Box::new(TextFileCache::load(&self.config.root.join(CACHE_FILE_NAME))),
        };

        Pipeline {
            config: self.config,
            cache,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The cleanup pipeline
pub struct Pipeline {
    config: PipelineConfig,
    cache: Box<dyn CacheBackend>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult> {
        let result = self.execute(events);
        if let Err(e) = &result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let root = self.config.root.as_path();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            }
            .into());
        }
        info!("Cleaning up {} by {}", root.display(), self.config.mode);

        let relocator = FileRelocator::new(root);
        if self.config.remove_small {
            relocator.ensure_folder(JUNK_FOLDER)?;
        }
        if self.config.relocation == RelocationMode::Quarantine {
            relocator.ensure_folder(DUPES_FOLDER)?;
        }

        // Phase 1: Scanning
        self.phase(PipelinePhase::Scanning, events);

        let scanner = WalkDirScanner::new(ScanConfig {
            recursive: self.config.recursive,
            images_only: self.config.mode == DetectionMode::Image,
        });
        let scan_result = scanner.scan_with_events(root, events)?;
        errors.extend(scan_result.errors.iter().map(|e| e.to_string()));

        let mut junked = Vec::new();
        let mut files = Vec::with_capacity(scan_result.files.len());
        for file in scan_result.files {
            if !self.config.remove_small || !is_too_small(&root.join(&file), self.config.min_dimensions) {
                files.push(file);
                continue;
            }

            match relocator.junk(&file, events) {
                Ok(relocation) => {
                    info!("Moved {} to junk as it is too small", file.display());
                    junked.push(relocation);
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!("Failed to move {}: {}", file.display(), e);
                    errors.push(e.to_string());
                }
            }
        }

        // Phase 2: Fingerprinting
        self.phase(PipelinePhase::Fingerprinting, events);

        let (mut records, cache_hits) = self.fingerprint_all(root, &files, events, &mut errors);
        let total_files = records.len();
        info!("Finished scanning {} files in {}", total_files, root.display());

        self.checkpoint(root, &records, events)?;

        // Phase 3: Grouping
        self.phase(PipelinePhase::Grouping, events);

        let groups = find_groups_with_events(&records, self.config.mode, self.config.threshold, events);

        // Phase 4: Relocating
        self.phase(PipelinePhase::Relocating, events);

        let mut relocations = Vec::new();
        for group in &groups {
            let outcome = relocator.relocate_group(group, self.config.relocation, events)?;
            errors.extend(outcome.failed.iter().map(|f| f.message.clone()));
            relocations.extend(outcome.moved);
        }

        apply_relocations(&mut records, &relocations, self.config.relocation);
        self.checkpoint(root, &records, events)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files,
                duplicate_groups: groups.len(),
                relocated: relocations.len(),
                junked: junked.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            records,
            groups,
            relocations,
            junked,
            total_files,
            cache_hits,
            errors,
            duration_ms,
        })
    }

    fn phase(&self, phase: PipelinePhase, events: &EventSender) {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    /// Build a record for every file, reusing cached attributes where valid.
    ///
    /// Files that cannot be read are reported and left out of the run.
    fn fingerprint_all(
        &self,
        root: &Path,
        files: &[PathBuf],
        events: &EventSender,
        errors: &mut Vec<String>,
    ) -> (Vec<FileRecord>, usize) {
        let total = files.len();
        events.send(Event::Fingerprint(FingerprintEvent::Started { total_files: total }));

        let mut fingerprinter = Fingerprinter::new();
        let mut records = Vec::with_capacity(total);
        let mut cache_hits = 0;
        let mut computed = 0;

        for (i, file) in files.iter().enumerate() {
            match lookup_or_compute(self.cache.as_ref(), &mut fingerprinter, root, file) {
                Ok((record, CacheOutcome::Hit)) => {
                    cache_hits += 1;
                    events.send(Event::Fingerprint(FingerprintEvent::CacheHit { path: file.clone() }));
                    records.push(record);
                }
                Ok((record, CacheOutcome::Computed(reason))) => {
                    computed += 1;
                    events.send(Event::Fingerprint(FingerprintEvent::Computed {
                        path: file.clone(),
                        reason,
                    }));
                    records.push(record);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    events.send(Event::Fingerprint(FingerprintEvent::Error {
                        path: file.clone(),
                        message: e.to_string(),
                    }));
                    errors.push(e.to_string());
                }
            }

            events.send(Event::Fingerprint(FingerprintEvent::Progress(FingerprintProgress {
                completed: i + 1,
                total,
                current_path: file.clone(),
                cache_hits,
            })));
        }

        events.send(Event::Fingerprint(FingerprintEvent::Completed {
            computed,
            cache_hits,
        }));

        (records, cache_hits)
    }

    /// Rewrite the cache from `records`. An empty record list leaves the
    /// existing cache untouched.
    fn checkpoint(&self, root: &Path, records: &[FileRecord], events: &EventSender) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let entries = entries_for_save(root, records);
        let count = entries.len();
        self.cache.replace_all(entries)?;

        info!("Saved {} fingerprints", count);
        events.send(Event::Pipeline(PipelineEvent::CacheSaved { entries: count }));
        Ok(())
    }
}

/// Bring records in line with the files that moved.
///
/// Quarantined files leave the run; renamed files keep their record under
/// the new path.
fn apply_relocations(records: &mut Vec<FileRecord>, relocations: &[Relocation], mode: RelocationMode) {
    let moved: HashMap<&Path, &Path> = relocations
        .iter()
        .map(|r| (r.from.as_path(), r.to.as_path()))
        .collect();

    match mode {
        RelocationMode::Quarantine => records.retain(|r| !moved.contains_key(r.path.as_path())),
        RelocationMode::RenameInPlace => {
            for record in records.iter_mut() {
                if let Some(to) = moved.get(record.path.as_path()) {
                    record.path = to.to_path_buf();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{file_mtime, CacheEntry, CacheLookup, InMemoryCache};
    use crate::error::CleanupError;
    use crate::events::{EventChannel, RelocateEvent};
    use std::fs;
    use tempfile::TempDir;

    fn record(path: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            perceptual_hash: None,
            dimensions: None,
            checksum: "00000000".to_string(),
        }
    }

    fn relocation(from: &str, to: &str) -> Relocation {
        Relocation {
            from: PathBuf::from(from),
            to: PathBuf::from(to),
            collided: false,
        }
    }

    #[test]
    fn pipeline_builder_creates_pipeline() {
        let pipeline = Pipeline::builder()
            .root("/photos")
            .mode(DetectionMode::Checksum)
            .threshold(5)
            .min_dimensions(800, 600)
            .cache(Box::new(InMemoryCache::new()))
            .build();

        assert_eq!(pipeline.config().threshold, 5);
        assert_eq!(pipeline.config().mode, DetectionMode::Checksum);
        assert_eq!(pipeline.config().min_dimensions, Dimensions::new(800, 600));
    }

    #[test]
    fn defaults_match_the_command_line() {
        let config = PipelineConfig::default();

        assert_eq!(config.threshold, 8);
        assert_eq!(config.min_dimensions, Dimensions::new(1200, 675));
        assert_eq!(config.mode, DetectionMode::Image);
        assert_eq!(config.relocation, RelocationMode::RenameInPlace);
        assert!(!config.recursive);
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let result = Pipeline::builder().root(temp_dir.path()).build().run().unwrap();

        assert_eq!(result.total_files, 0);
        assert!(result.groups.is_empty());
        assert!(!temp_dir.path().join(CACHE_FILE_NAME).exists());
    }

    #[test]
    fn invalid_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();

        let result = Pipeline::builder()
            .root(temp_dir.path().join("missing"))
            .build()
            .run();

        assert!(matches!(
            result,
            Err(CleanupError::Scan(ScanError::DirectoryNotFound { .. }))
        ));
    }

    #[test]
    fn checksum_duplicates_are_renamed_and_cached() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"same").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"same").unwrap();

        let result = Pipeline::builder()
            .root(temp_dir.path())
            .mode(DetectionMode::Checksum)
            .cache(Box::new(InMemoryCache::new()))
            .build()
            .run()
            .unwrap();

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.relocations, vec![relocation("b.txt", "a_v1.txt")]);
        assert!(temp_dir.path().join("a_v1.txt").exists());
        assert!(result.records.iter().any(|r| r.path == PathBuf::from("a_v1.txt")));
    }

    #[test]
    fn second_run_hits_the_cache() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();

        let first = Pipeline::builder()
            .root(temp_dir.path())
            .mode(DetectionMode::Checksum)
            .build()
            .run()
            .unwrap();
        let second = Pipeline::builder()
            .root(temp_dir.path())
            .mode(DetectionMode::Checksum)
            .build()
            .run()
            .unwrap();

        assert_eq!(first.cache_hits, 0);
        assert_eq!(second.cache_hits, 1);
    }

    #[test]
    fn injected_cache_is_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("kept.txt"), b"x").unwrap();
        let stale = CacheEntry {
            path: "gone.txt".to_string(),
            mtime: 1,
            perceptual_hash: None,
            dimensions: None,
            checksum: "00000000".to_string(),
        };

        let pipeline = Pipeline::builder()
            .root(temp_dir.path())
            .mode(DetectionMode::Filename)
            .cache(Box::new(InMemoryCache::with_entries(vec![stale])))
            .build();
        pipeline.run().unwrap();

        assert_eq!(pipeline.cache.get("gone.txt", 1).unwrap(), CacheLookup::Miss);
        let mtime = file_mtime(&temp_dir.path().join("kept.txt")).unwrap();
        assert!(matches!(
            pipeline.cache.get("kept.txt", mtime).unwrap(),
            CacheLookup::Hit(_)
        ));
    }

    #[test]
    fn quarantine_name_taken_by_file_aborts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(DUPES_FOLDER), b"oops").unwrap();

        let (sender, receiver) = EventChannel::new();
        let result = Pipeline::builder()
            .root(temp_dir.path())
            .relocation(RelocationMode::Quarantine)
            .cache(Box::new(InMemoryCache::new()))
            .build()
            .run_with_events(&sender);
        drop(sender);

        assert!(matches!(result, Err(CleanupError::Relocate(_))));
        assert!(receiver
            .iter()
            .any(|e| matches!(e, Event::Pipeline(PipelineEvent::Error { .. }))));
    }

    #[test]
    fn filename_mode_emits_move_events() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a")).unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();
        fs::write(temp_dir.path().join("a/x.txt"), b"1").unwrap();
        fs::write(temp_dir.path().join("b/x.txt"), b"2").unwrap();

        let (sender, receiver) = EventChannel::new();
        Pipeline::builder()
            .root(temp_dir.path())
            .recursive(true)
            .mode(DetectionMode::Filename)
            .cache(Box::new(InMemoryCache::new()))
            .build()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let moves: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Relocate(RelocateEvent::Moved { from, to }) => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![(PathBuf::from("b/x.txt"), PathBuf::from("a/x_v1.txt"))]);
    }

    #[test]
    fn quarantined_records_leave_the_run() {
        let mut records = vec![record("a.jpg"), record("b.jpg"), record("c.jpg")];

        apply_relocations(
            &mut records,
            &[relocation("a.jpg", "[Dupes]/a.jpg"), relocation("b.jpg", "[Dupes]/a_v1.jpg")],
            RelocationMode::Quarantine,
        );

        assert_eq!(records, vec![record("c.jpg")]);
    }

    #[test]
    fn renamed_records_follow_their_file() {
        let mut records = vec![record("a.jpg"), record("b.jpg")];

        apply_relocations(
            &mut records,
            &[relocation("b.jpg", "a_v1-0.jpg")],
            RelocationMode::RenameInPlace,
        );

        assert_eq!(records, vec![record("a.jpg"), record("a_v1-0.jpg")]);
    }
}
