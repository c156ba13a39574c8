//! Directory walking implementation using walkdir.

use super::{filter::EntryFilter, FileScanner, ScanResult};
use crate::core::cache::CACHE_FILE_NAME;
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Walk subfolders too (default: top level only)
    pub recursive: bool,
    /// Only report files with a supported image extension
    pub images_only: bool,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: EntryFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = EntryFilter::new()
            .with_skipped_file(CACHE_FILE_NAME)
            .with_images_only(config.images_only);

        Self { config, filter }
    }
}

impl FileScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    fn scan_with_events(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name();
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let entries = walker
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_type().is_dir() || self.filter.should_descend(e.file_name())
            });

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };

            if entry.file_type().is_dir() {
                events.send(Event::Scan(ScanEvent::DirectoryEntered {
                    path: relative.to_path_buf(),
                }));
                continue;
            }

            // A read on a FIFO can block forever
            if !is_regular_file(&entry) {
                continue;
            }

            if !self.filter.should_include(relative) {
                continue;
            }

            events.send(Event::Scan(ScanEvent::FileFound {
                path: relative.to_path_buf(),
            }));
            files.push(relative.to_path_buf());
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, errors })
    }
}

/// Regular files, and links that resolve to one
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, relative: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn scan(dir: &TempDir, config: ScanConfig) -> Vec<PathBuf> {
        WalkDirScanner::new(config).scan(dir.path()).unwrap().files
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();

        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();

        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn top_level_only_by_default() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.jpg");
        touch(&dir, "sub/b.jpg");

        assert_eq!(scan(&dir, ScanConfig::default()), vec![PathBuf::from("a.jpg")]);
    }

    #[test]
    fn recursive_scan_returns_relative_paths_in_name_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "b.jpg");
        touch(&dir, "a/z.jpg");
        touch(&dir, "a/y.jpg");

        let files = scan(
            &dir,
            ScanConfig {
                recursive: true,
                ..Default::default()
            },
        );

        assert_eq!(
            files,
            vec![
                PathBuf::from("a/y.jpg"),
                PathBuf::from("a/z.jpg"),
                PathBuf::from("b.jpg"),
            ]
        );
    }

    #[test]
    fn excluded_folders_and_cache_file_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "keep.jpg");
        touch(&dir, "fingerprint.db");
        touch(&dir, "[Junk]/small.jpg");
        touch(&dir, "[Dupes]/copy.jpg");
        touch(&dir, "nested/.Trash/old.jpg");

        let files = scan(
            &dir,
            ScanConfig {
                recursive: true,
                ..Default::default()
            },
        );

        assert_eq!(files, vec![PathBuf::from("keep.jpg")]);
    }

    #[test]
    fn images_only_scan() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.png");
        touch(&dir, "b.txt");

        let files = scan(
            &dir,
            ScanConfig {
                images_only: true,
                ..Default::default()
            },
        );

        assert_eq!(files, vec![PathBuf::from("a.png")]);
    }

    #[cfg(unix)]
    #[test]
    fn special_files_are_skipped() {
        use std::os::unix::net::UnixListener;

        let dir = TempDir::new().unwrap();
        touch(&dir, "a.txt");
        let _listener = UnixListener::bind(dir.path().join("b.sock")).unwrap();

        assert_eq!(scan(&dir, ScanConfig::default()), vec![PathBuf::from("a.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn links_to_files_are_kept_and_dangling_links_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.txt");
        std::os::unix::fs::symlink(dir.path().join("a.txt"), dir.path().join("b.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("c.txt")).unwrap();

        assert_eq!(
            scan(&dir, ScanConfig::default()),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = WalkDirScanner::new(ScanConfig::default()).scan(&dir.path().join("nope"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn file_as_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "file.txt");

        let result = WalkDirScanner::new(ScanConfig::default()).scan(&dir.path().join("file.txt"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
