//! Guarded, confirmed deletion of orphaned artifacts.

use crate::confirm::Confirmer;
use crate::error::{CleanError, Result};
use crate::vcs::{is_vcs_internal, VcsRootFinder};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of one category pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub orphans: usize,
    /// Orphans listed in dry-run mode without asking.
    pub listed: usize,
    pub deleted: usize,
    pub kept: usize,
    pub failed: usize,
    pub bytes_freed: u64,
    pub pruned_dirs: usize,
}

/// Deletes orphans one confirmation at a time, inside a VCS working tree only.
pub struct SafeDeleter<'a> {
    vcs: &'a dyn VcsRootFinder,
    confirmer: &'a mut dyn Confirmer,
    dry_run: bool,
}

impl<'a> SafeDeleter<'a> {
    pub fn new(vcs: &'a dyn VcsRootFinder, confirmer: &'a mut dyn Confirmer) -> Self {
        SafeDeleter {
            vcs,
            confirmer,
            dry_run: false,
        }
    }

    /// List orphans instead of prompting, and leave the filesystem alone.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Ask about every orphan in order, delete the confirmed ones, then prune
    /// directories left empty under `root`.
    ///
    /// Fails with [`CleanError::VcsRootNotFound`] before asking anything when
    /// `root` is not inside a working tree. Individual delete failures are
    /// logged and counted, and the pass moves on.
    pub fn confirm_and_delete(&mut self, orphans: &[PathBuf], root: &Path) -> Result<PassReport> {
        let mut report = PassReport {
            orphans: orphans.len(),
            ..PassReport::default()
        };

        if orphans.is_empty() && !root.exists() {
            debug!("{} does not exist, nothing to clean", root.display());
            return Ok(report);
        }

        let vcs_root = self
            .vcs
            .find_root(root)
            .ok_or_else(|| CleanError::VcsRootNotFound(root.to_path_buf()))?;
        debug!("{} is inside working tree {}", root.display(), vcs_root.display());

        for path in orphans {
            if self.dry_run {
                println!("Would remove: {}", path.display());
                report.listed += 1;
                continue;
            }

            if !self.confirmer.ask(path)? {
                debug!("Keeping {}", path.display());
                report.kept += 1;
                continue;
            }

            let size = artifact_size(path);
            match remove_path(path) {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    report.deleted += 1;
                    report.bytes_freed += size;
                }
                Err(err) => {
                    warn!("Error removing {}: {}. Skipping.", path.display(), err);
                    report.failed += 1;
                }
            }
        }

        if !self.dry_run {
            report.pruned_dirs = prune_empty_dirs(root);
        }

        Ok(report)
    }
}

/// Remove a file, symlink or directory tree. A path that is already gone
/// counts as removed.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Remove every empty directory below `root`, deepest first, and return how
/// many were removed. `root` itself and VCS internals are kept; symlinks are
/// not followed.
pub fn prune_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    prune_dir(root, &mut removed);
    removed
}

/// Returns true when `dir` is empty once its empty subdirectories are gone.
fn prune_dir(dir: &Path, removed: &mut usize) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Cannot read {} while pruning: {}", dir.display(), err);
            return false;
        }
    };

    let mut empty = true;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => {
                empty = false;
                continue;
            }
        };

        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir && !is_vcs_internal(&path) && prune_dir(&path, removed) {
            match fs::remove_dir(&path) {
                Ok(()) => {
                    debug!("Pruned empty directory {}", path.display());
                    *removed += 1;
                    continue;
                }
                Err(err) => debug!("Could not prune {}: {}", path.display(), err),
            }
        }
        empty = false;
    }

    empty
}

/// Total size of an artifact (all regular files, symlinks not followed).
fn artifact_size(path: &Path) -> u64 {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return 0,
    };
    if metadata.is_file() {
        return metadata.len();
    }
    if !metadata.is_dir() {
        return 0;
    }

    let mut total = 0u64;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            total += artifact_size(&entry.path());
        }
    }
    total
}
