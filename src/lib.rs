//! prebuilt-clean - Stale Prebuilt Artifact Remover
//!
//! Compares the artifacts stored on disk (prebuilt frameworks, their
//! per-platform dSYMs and source checkouts) with the items the current build
//! still uses, and offers to delete every artifact nothing refers to anymore.
//!
//! ## Flow
//!
//! 1. A [`LiveSetResolver`] reports the buildable items, once per run.
//! 2. For each category, [`scanner::index`] lists the artifacts under the
//!    category root and [`reconcile::orphans`] keeps those missing from the
//!    category's [`LiveSet`].
//! 3. [`SafeDeleter`] refuses to touch a root outside a VCS working tree,
//!    asks a [`Confirmer`] about each orphan, deletes the confirmed ones and
//!    prunes the empty directories they leave behind.
//!
//! [`Cleaner`] runs the categories in order and stops at the first fatal error.

pub mod clean;
pub mod config;
pub mod confirm;
pub mod delete;
pub mod error;
pub mod live;
pub mod patterns;
pub mod reconcile;
pub mod scanner;
pub mod vcs;

// Re-export commonly used items
pub use clean::{CategoryReport, Cleaner, RunSummary, ScanCategory};
pub use config::{CategoryLayout, Layout};
pub use confirm::{is_affirmative, Confirmer, ScriptedConfirmer, TerminalConfirmer};
pub use delete::{prune_empty_dirs, remove_path, PassReport, SafeDeleter};
pub use error::CleanError;
pub use live::{BuildableItem, ItemsFile, LiveSet, LiveSetResolver};
pub use patterns::ScanPattern;
pub use reconcile::orphans;
pub use scanner::{index, normalize_rel_path, Candidate};
pub use vcs::{detect_vcs, GitRootFinder, MarkerRootFinder, VcsRootFinder, VcsType};
