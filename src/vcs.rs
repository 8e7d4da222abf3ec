//! Version-control root detection for Git and Jujutsu working trees.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// VCS internal directories that are never traversed, pruned or removed.
pub const VCS_INTERNALS: &[&str] = &[
    ".git", ".jj", ".svn", ".hg", ".bzr", "_darcs", ".pijul", "CVS", ".fossil",
];

/// VCS type detected in the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsType {
    Git,
    Jujutsu,
    None,
}

/// Locates the working tree that encloses a path.
///
/// Deleting artifacts is only allowed below a root returned by this trait,
/// so that whatever gets removed can be restored from version control.
pub trait VcsRootFinder {
    fn find_root(&self, path: &Path) -> Option<PathBuf>;
}

/// Asks `git rev-parse --show-toplevel` from inside the path.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRootFinder;

impl VcsRootFinder for GitRootFinder {
    fn find_root(&self, path: &Path) -> Option<PathBuf> {
        let output = Command::new("git")
            .arg("rev-parse")
            .arg("--show-toplevel")
            .current_dir(path)
            .output();

        match output {
            Ok(output) if output.status.success() => {
                let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if root.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(root))
                }
            }
            Ok(output) => {
                debug!(
                    "git rev-parse failed in {}: {}",
                    path.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                None
            }
            Err(err) => {
                debug!("Could not run git in {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// Walks up from the path looking for `.jj` or `.git` entries.
/// Works without any VCS binary installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerRootFinder;

impl VcsRootFinder for MarkerRootFinder {
    fn find_root(&self, path: &Path) -> Option<PathBuf> {
        detect_vcs(path).1
    }
}

/// Detect which VCS is in use for a given path by walking up to find .jj or .git
/// Prefers Jujutsu if both .jj and .git exist (colocated repositories)
pub fn detect_vcs(path: &Path) -> (VcsType, Option<PathBuf>) {
    let start = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    for ancestor in start.ancestors() {
        if ancestor.join(".jj").exists() {
            return (VcsType::Jujutsu, Some(ancestor.to_path_buf()));
        }
        if ancestor.join(".git").exists() {
            return (VcsType::Git, Some(ancestor.to_path_buf()));
        }
    }
    (VcsType::None, None)
}

/// True when the last component of `path` is a VCS internal directory.
pub fn is_vcs_internal(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| VCS_INTERNALS.contains(&name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_detect_vcs_finds_git_in_ancestor() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("Prebuilt/Sub");
        fs::create_dir_all(&nested).unwrap();

        let (vcs, root) = detect_vcs(&nested);
        assert_eq!(vcs, VcsType::Git);
        assert_eq!(root.unwrap(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_detect_vcs_prefers_jujutsu() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join(".jj")).unwrap();

        let (vcs, _) = detect_vcs(dir.path());
        assert_eq!(vcs, VcsType::Jujutsu);
    }

    #[test]
    fn test_marker_finder_uses_nearest_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("vendor/checkout");
        fs::create_dir_all(inner.join(".git")).unwrap();

        let root = MarkerRootFinder.find_root(&inner.join("."));
        assert_eq!(root.unwrap(), inner.canonicalize().unwrap());
    }

    /// Run `git init` in `dir`; false when git is not installed.
    fn git_init(dir: &Path) -> bool {
        Command::new("git")
            .arg("init")
            .arg("--quiet")
            .current_dir(dir)
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_git_finder_returns_top_level_of_repository() {
        let dir = tempdir().unwrap();
        if !git_init(dir.path()) {
            eprintln!("git is not available, skipping");
            return;
        }
        let prebuilt = dir.path().join("Prebuilt/Firebase");
        fs::create_dir_all(&prebuilt).unwrap();

        let root = GitRootFinder.find_root(&prebuilt).unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_git_finder_fails_on_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(GitRootFinder.find_root(&missing).is_none());
    }

    #[test]
    fn test_is_vcs_internal() {
        assert!(is_vcs_internal(Path::new("/repo/.git")));
        assert!(is_vcs_internal(Path::new(".jj")));
        assert!(!is_vcs_internal(Path::new("/repo/Prebuilt")));
        assert!(!is_vcs_internal(Path::new("/repo/.github")));
    }
}
