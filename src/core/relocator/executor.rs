//! Moves files without ever replacing an existing path.

use super::types::*;
use crate::core::comparator::DuplicateGroup;
use crate::error::RelocateError;
use crate::events::{Event, EventSender, RelocateEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Moves and renames files under a target folder
pub struct FileRelocator {
    root: PathBuf,
}

impl FileRelocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Make sure `name` under the root is a directory, creating it if needed.
    pub fn ensure_folder(&self, name: &str) -> Result<(), RelocateError> {
        let path = self.root.join(name);
        if path.exists() && !path.is_dir() {
            return Err(RelocateError::NotADirectory { path });
        }
        fs::create_dir_all(&path).map_err(|source| RelocateError::CreateDirectory { path, source })
    }

    /// First free variant of `requested`: the path itself, then `stem-0.ext`,
    /// `stem-1.ext`, ... in the same directory.
    pub fn free_destination(&self, requested: &Path) -> PathBuf {
        if !self.occupied(requested) {
            return requested.to_path_buf();
        }

        let parent = requested.parent().unwrap_or(Path::new(""));
        let stem = requested
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = extension_suffix(requested);

        (0u64..)
            .map(|n| parent.join(format!("{}-{}{}", stem, n, ext)))
            .find(|candidate| !self.occupied(candidate))
            .unwrap_or_else(|| requested.to_path_buf())
    }

    fn occupied(&self, relative: &Path) -> bool {
        fs::symlink_metadata(self.root.join(relative)).is_ok()
    }

    /// Move `from` to the first free variant of `requested`.
    ///
    /// Both paths are relative to the root. Missing parent directories are
    /// created; failing to create them is fatal for the run.
    pub fn move_file(
        &self,
        from: &Path,
        requested: &Path,
        events: &EventSender,
    ) -> Result<Relocation, RelocateError> {
        let to = self.free_destination(requested);
        let collided = to != requested;
        if collided {
            info!(
                "{} already exists, using {} instead",
                requested.display(),
                to.display()
            );
            events.send(Event::Relocate(RelocateEvent::Collision {
                requested: requested.to_path_buf(),
                actual: to.clone(),
            }));
        }

        let source = self.root.join(from);
        let dest = self.root.join(&to);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| RelocateError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        move_or_copy(&source, &dest).map_err(|e| match e {
            MoveFailure::Io(source) => RelocateError::Move {
                from: from.to_path_buf(),
                to: to.clone(),
                source,
            },
            MoveFailure::SizeMismatch {
                source_size,
                dest_size,
            } => RelocateError::CopyVerification {
                from: from.to_path_buf(),
                source_size,
                dest_size,
            },
        })?;

        debug!("Moved {} to {}", from.display(), to.display());
        events.send(Event::Relocate(RelocateEvent::Moved {
            from: from.to_path_buf(),
            to: to.clone(),
        }));

        Ok(Relocation {
            from: from.to_path_buf(),
            to,
            collided,
        })
    }

    /// Move a too-small image to `[Junk]/<relative path>`.
    pub fn junk(&self, relative: &Path, events: &EventSender) -> Result<Relocation, RelocateError> {
        let relocation = self.move_file(relative, &Path::new(JUNK_FOLDER).join(relative), events)?;
        events.send(Event::Relocate(RelocateEvent::Junked {
            from: relocation.from.clone(),
            to: relocation.to.clone(),
        }));
        Ok(relocation)
    }

    /// Move or rename the non-master members of `group`.
    ///
    /// Per-file failures are recorded and the file stays put. If the master
    /// cannot be quarantined the rest of the group is left alone. Only fatal
    /// errors are returned.
    pub fn relocate_group(
        &self,
        group: &DuplicateGroup,
        mode: RelocationMode,
        events: &EventSender,
    ) -> Result<GroupRelocation, RelocateError> {
        let mut outcome = GroupRelocation::default();
        let master = group.master();

        let base = match mode {
            RelocationMode::RenameInPlace => master.path.clone(),
            RelocationMode::Quarantine => {
                let requested = Path::new(DUPES_FOLDER).join(&master.path);
                match self.move_file(&master.path, &requested, events) {
                    Ok(relocation) => {
                        let to = relocation.to.clone();
                        outcome.moved.push(relocation);
                        to
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        outcome.failed.push(self.contain(&master.path, e, events));
                        return Ok(outcome);
                    }
                }
            }
        };

        let parent = base.parent().unwrap_or(Path::new(""));
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        for (i, member) in group.duplicates().iter().enumerate() {
            let requested = parent.join(format!(
                "{}_v{}{}",
                stem,
                i + 1,
                extension_suffix(&member.path)
            ));

            // Already carries its name from an earlier run
            if requested == member.path {
                continue;
            }

            match self.move_file(&member.path, &requested, events) {
                Ok(relocation) => outcome.moved.push(relocation),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => outcome.failed.push(self.contain(&member.path, e, events)),
            }
        }

        Ok(outcome)
    }

    fn contain(&self, path: &Path, error: RelocateError, events: &EventSender) -> RelocationFailure {
        warn!("Leaving {} in place: {}", path.display(), error);
        let message = error.to_string();
        events.send(Event::Relocate(RelocateEvent::Error {
            path: path.to_path_buf(),
            message: message.clone(),
        }));
        RelocationFailure {
            path: path.to_path_buf(),
            message,
        }
    }
}

/// `.ext` including the dot, or empty
fn extension_suffix(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

enum MoveFailure {
    Io(io::Error),
    SizeMismatch { source_size: u64, dest_size: u64 },
}

impl From<io::Error> for MoveFailure {
    fn from(e: io::Error) -> Self {
        MoveFailure::Io(e)
    }
}

/// Rename, falling back to copy + verify + delete when the rename crossed
/// filesystems.
fn move_or_copy(source: &Path, dest: &Path) -> Result<(), MoveFailure> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => recover_rename(source, dest, e),
    }
}

/// Only a cross-device rename is retried as a copy; anything else leaves the
/// source untouched and reports the rename error.
fn recover_rename(source: &Path, dest: &Path, rename_error: io::Error) -> Result<(), MoveFailure> {
    if rename_error.kind() != io::ErrorKind::CrossesDevices {
        return Err(MoveFailure::Io(rename_error));
    }

    let source_size = match fs::metadata(source) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => return Err(MoveFailure::Io(rename_error)),
    };
    debug!(
        "Rename of {} crossed filesystems, copying instead",
        source.display()
    );

    fs::copy(source, dest)?;
    verify_copy(dest, source_size)?;

    if let Err(e) = fs::remove_file(source) {
        // Keep exactly one copy
        let _ = fs::remove_file(dest);
        return Err(MoveFailure::Io(e));
    }
    Ok(())
}

/// Check the copy landed whole; a short copy is removed again.
fn verify_copy(dest: &Path, source_size: u64) -> Result<(), MoveFailure> {
    let dest_size = fs::metadata(dest)?.len();
    if dest_size != source_size {
        let _ = fs::remove_file(dest);
        return Err(MoveFailure::SizeMismatch {
            source_size,
            dest_size,
        });
    }
    Ok(())
}
