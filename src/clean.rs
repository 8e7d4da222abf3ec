//! The clean run: one reconciliation pass per artifact category.

use crate::config::Layout;
use crate::confirm::Confirmer;
use crate::delete::{PassReport, SafeDeleter};
use crate::error::Result;
use crate::live::{LiveSet, LiveSetResolver};
use crate::patterns::ScanPattern;
use crate::reconcile::orphans;
use crate::scanner::index;
use crate::vcs::VcsRootFinder;

use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One independently scanned kind of artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCategory {
    PrimaryArtifact,
    DebugSymbols(String),
    SourceCheckout,
}

impl fmt::Display for ScanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanCategory::PrimaryArtifact => write!(f, "frameworks"),
            ScanCategory::DebugSymbols(platform) => write!(f, "{} dSYMs", platform),
            ScanCategory::SourceCheckout => write!(f, "sources"),
        }
    }
}

impl ScanCategory {
    /// Line announcing the pass to the operator.
    pub fn headline(&self) -> String {
        match self {
            ScanCategory::DebugSymbols(platform) => {
                format!("Looking for {} unused dSYMs", platform)
            }
            other => format!("Looking for unused {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: ScanCategory,
    pub root: PathBuf,
    pub report: PassReport,
}

/// Result of a complete run, one entry per category in the order scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub categories: Vec<CategoryReport>,
}

impl RunSummary {
    pub fn orphans(&self) -> usize {
        self.categories.iter().map(|c| c.report.orphans).sum()
    }

    pub fn deleted(&self) -> usize {
        self.categories.iter().map(|c| c.report.deleted).sum()
    }

    pub fn failed(&self) -> usize {
        self.categories.iter().map(|c| c.report.failed).sum()
    }

    pub fn bytes_freed(&self) -> u64 {
        self.categories.iter().map(|c| c.report.bytes_freed).sum()
    }
}

/// Drives the passes for every category against one base directory.
pub struct Cleaner<'a> {
    layout: &'a Layout,
    vcs: &'a dyn VcsRootFinder,
    confirmer: &'a mut dyn Confirmer,
    dry_run: bool,
}

impl<'a> Cleaner<'a> {
    pub fn new(
        layout: &'a Layout,
        vcs: &'a dyn VcsRootFinder,
        confirmer: &'a mut dyn Confirmer,
    ) -> Self {
        Cleaner {
            layout,
            vcs,
            confirmer,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolve the live items once, then reconcile frameworks, the dSYMs of
    /// every platform and the source checkouts, in that order.
    ///
    /// A category outside a version-controlled tree aborts the whole run;
    /// categories after it are not scanned.
    pub fn run(&mut self, resolver: &dyn LiveSetResolver, base: &Path) -> Result<RunSummary> {
        let items = resolver.resolve()?;
        debug!("Resolved {} live items", items.len());

        let layout = self.layout;
        let mut summary = RunSummary::default();

        let primary = LiveSet::primary(&items);
        summary.categories.push(self.pass(
            ScanCategory::PrimaryArtifact,
            &layout.prebuilt_root(base),
            &layout.prebuilt.pattern,
            &primary,
        )?);

        let symbols = LiveSet::debug_symbols(&primary, &layout.symbol_suffix);
        for platform in &layout.platforms {
            summary.categories.push(self.pass(
                ScanCategory::DebugSymbols(platform.clone()),
                &layout.dsym_root(base, platform),
                &layout.dsym.pattern,
                &symbols,
            )?);
        }

        let sources = LiveSet::sources(&items);
        summary.categories.push(self.pass(
            ScanCategory::SourceCheckout,
            &layout.sources_root(base),
            &layout.sources.pattern,
            &sources,
        )?);

        Ok(summary)
    }

    fn pass(
        &mut self,
        category: ScanCategory,
        root: &Path,
        pattern: &ScanPattern,
        live: &LiveSet,
    ) -> Result<CategoryReport> {
        println!("{}", category.headline().yellow());

        let candidates = index(root, pattern);
        let stale = orphans(&candidates, live);
        debug!(
            "{}: {} candidates under {} ({}), {} unused",
            category,
            candidates.len(),
            root.display(),
            pattern,
            stale.len()
        );

        let report = SafeDeleter::new(self.vcs, &mut *self.confirmer)
            .dry_run(self.dry_run)
            .confirm_and_delete(&stale, root)?;

        Ok(CategoryReport {
            category,
            root: root.to_path_buf(),
            report,
        })
    }
}
