//! The live set: what the current build still needs on disk.
//!
//! Working out which items a build uses belongs to the dependency resolver.
//! This module only receives its answer through [`LiveSetResolver`] and
//! derives the per-category lookup sets from it.

use crate::error::{CleanError, Result};
use crate::scanner::normalize_rel_path;

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One buildable item as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildableItem {
    /// Artifact identifier, also the name of its source checkout.
    #[serde(rename = "name")]
    pub identifier: String,
    /// Storage path of the prebuilt artifact, relative to the prebuilt root.
    #[serde(rename = "path")]
    pub storage_path: String,
    /// Vendored frameworks shipped with the item. Only basenames are used.
    #[serde(rename = "vendored", default)]
    pub vendored_paths: Vec<String>,
}

/// Supplies the items whose artifacts must be kept.
pub trait LiveSetResolver {
    fn resolve(&self) -> Result<Vec<BuildableItem>>;
}

impl LiveSetResolver for Vec<BuildableItem> {
    fn resolve(&self) -> Result<Vec<BuildableItem>> {
        Ok(self.clone())
    }
}

/// Reads the item list the resolver handed over as a TOML file:
///
/// ```toml
/// [[item]]
/// name = "Alamofire"
/// path = "Alamofire.framework"
/// vendored = ["Vendor/Crashlytics.framework"]
/// ```
#[derive(Debug, Clone)]
pub struct ItemsFile {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ItemsDocument {
    #[serde(default)]
    item: Vec<BuildableItem>,
}

impl ItemsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ItemsFile { path: path.into() }
    }

    pub fn parse(content: &str) -> Result<Vec<BuildableItem>> {
        let document: ItemsDocument = toml::from_str(content)
            .map_err(|e| CleanError::Resolve(format!("invalid item list: {}", e)))?;
        Ok(document.item)
    }
}

impl LiveSetResolver for ItemsFile {
    fn resolve(&self) -> Result<Vec<BuildableItem>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            CleanError::Resolve(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// Immutable set of normalised relative paths (or identifiers) to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSet {
    entries: BTreeSet<String>,
}

impl LiveSet {
    /// Storage paths plus vendored framework basenames.
    pub fn primary(items: &[BuildableItem]) -> Self {
        let storage = items.iter().filter_map(|item| {
            let normalized = normalize_rel_path(Path::new(&item.storage_path));
            if normalized.is_none() {
                warn!(
                    "Ignoring storage path `{}` of {}: it is not below the prebuilt root",
                    item.storage_path, item.identifier
                );
            }
            normalized
        });
        let vendored = items
            .iter()
            .flat_map(|item| item.vendored_paths.iter())
            .filter_map(|path| Path::new(path).file_name())
            .map(|name| name.to_string_lossy().into_owned());

        LiveSet {
            entries: storage.chain(vendored).filter(|e| !e.is_empty()).collect(),
        }
    }

    /// Debug symbols live next to their framework's relative path with a
    /// fixed suffix, so the set is derived from the primary one.
    pub fn debug_symbols(primary: &LiveSet, suffix: &str) -> Self {
        LiveSet {
            entries: primary
                .entries
                .iter()
                .map(|entry| format!("{}{}", entry, suffix))
                .collect(),
        }
    }

    /// Source checkouts are named after the artifact identifier.
    pub fn sources(items: &[BuildableItem]) -> Self {
        LiveSet {
            entries: items.iter().map(|item| item.identifier.clone()).collect(),
        }
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.entries.contains(rel_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LiveSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        LiveSet {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
