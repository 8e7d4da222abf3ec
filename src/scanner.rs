//! Artifact discovery below a category root.

use crate::patterns::ScanPattern;
use crate::vcs::is_vcs_internal;

use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// An artifact found on disk, keyed by its path relative to the category root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub rel_path: String,
    pub path: PathBuf,
}

/// Render a relative path as the `/`-joined string used for live-set lookups.
///
/// `./Foo.framework/` and `Foo.framework` both become `Foo.framework`.
/// Returns `None` for paths that leave the root (`..`) or are absolute.
pub fn normalize_rel_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

/// Enumerate every entry under `root` whose name matches `pattern`.
///
/// A missing root yields nothing. Results are in lexical path order. A
/// matched entry is not descended into, hidden entries and VCS internals
/// are skipped, gitignore rules are not applied and symlinks are not
/// followed.
pub fn index(root: &Path, pattern: &ScanPattern) -> Vec<Candidate> {
    if !root.is_dir() {
        debug!("Scan root {} does not exist, nothing to index", root.display());
        return Vec::new();
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_vcs_internal(entry.path()));
    if !pattern.is_recursive() {
        builder.max_depth(Some(1));
    }

    let mut candidates = Vec::new();
    let mut inside_match: Option<PathBuf> = None;

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Failed to access entry under {}: {}", root.display(), err);
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();

        // Bundles nested in a matched bundle go away with their parent.
        if let Some(matched) = &inside_match {
            if path.starts_with(matched) {
                continue;
            }
            inside_match = None;
        }

        let name = entry.file_name().to_string_lossy();
        if !pattern.matches(&name) {
            continue;
        }

        let rel_path = match path.strip_prefix(root).ok().and_then(normalize_rel_path) {
            Some(rel) => rel,
            None => {
                warn!("{} is not below {}, skipping", path.display(), root.display());
                continue;
            }
        };

        debug!("Indexed {} ({})", rel_path, path.display());
        inside_match = Some(path.to_path_buf());
        candidates.push(Candidate {
            rel_path,
            path: path.to_path_buf(),
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn rel_paths(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.rel_path.as_str()).collect()
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempdir().unwrap();
        let found = index(
            &dir.path().join("dSYM/iphoneos"),
            &ScanPattern::recursive(".dSYM"),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_recursive_index_reports_relative_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Alamofire.framework/Headers")).unwrap();
        fs::create_dir_all(root.join("Firebase/Core.framework")).unwrap();
        fs::create_dir_all(root.join("Firebase/Docs")).unwrap();
        fs::write(root.join("README.md"), "notes").unwrap();

        let found = index(root, &ScanPattern::recursive(".framework"));
        assert_eq!(
            rel_paths(&found),
            vec!["Alamofire.framework", "Firebase/Core.framework"]
        );
        assert_eq!(found[0].path, root.join("Alamofire.framework"));
    }

    #[test]
    fn test_matched_bundle_is_not_descended() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Outer.framework/Frameworks/Inner.framework")).unwrap();
        fs::create_dir_all(root.join("Outer.frameworkish")).unwrap();

        let found = index(root, &ScanPattern::recursive(".framework"));
        assert_eq!(rel_paths(&found), vec!["Outer.framework"]);
    }

    #[test]
    fn test_one_level_index_ignores_nested_entries() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Alamofire/Source")).unwrap();
        fs::create_dir_all(root.join("SnapKit")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();

        let found = index(root, &ScanPattern::one_level(""));
        assert_eq!(rel_paths(&found), vec!["Alamofire", "SnapKit"]);
    }

    #[test]
    fn test_hidden_and_vcs_dirs_are_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".cache/Stale.framework")).unwrap();
        fs::create_dir_all(root.join("CVS/Old.framework")).unwrap();
        fs::create_dir_all(root.join("Live.framework")).unwrap();

        let found = index(root, &ScanPattern::recursive(".framework"));
        assert_eq!(rel_paths(&found), vec!["Live.framework"]);
    }

    #[test]
    fn test_gitignored_artifacts_are_still_indexed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "*.framework\n").unwrap();
        fs::create_dir_all(root.join("Ignored.framework")).unwrap();

        let found = index(root, &ScanPattern::recursive(".framework"));
        assert_eq!(rel_paths(&found), vec!["Ignored.framework"]);
    }

    #[test]
    fn test_normalize_rel_path() {
        assert_eq!(
            normalize_rel_path(Path::new("./Foo.framework/")).as_deref(),
            Some("Foo.framework")
        );
        assert_eq!(
            normalize_rel_path(Path::new("a/b/C.framework")).as_deref(),
            Some("a/b/C.framework")
        );
        assert_eq!(normalize_rel_path(Path::new("")).as_deref(), Some(""));
    }

    #[test]
    fn test_normalize_rejects_paths_leaving_the_root() {
        assert_eq!(normalize_rel_path(Path::new("../X/Foo.framework")), None);
        assert_eq!(normalize_rel_path(Path::new("X/../../Foo.framework")), None);
        assert_eq!(normalize_rel_path(Path::new("/abs/Foo.framework")), None);
    }
}
