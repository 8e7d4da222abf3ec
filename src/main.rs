use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use humansize::{format_size, BINARY};
use prebuilt_clean::{
    Cleaner, GitRootFinder, ItemsFile, Layout, MarkerRootFinder, RunSummary, TerminalConfirmer,
    VcsRootFinder,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// How the working tree around a category root is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Probe {
    /// Ask `git rev-parse --show-toplevel`
    Git,
    /// Look for .git or .jj entries in parent directories
    Markers,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find prebuilt artifacts the build no longer uses and delete them after confirmation",
    long_about = None
)]
struct Args {
    /// Base directory holding the Prebuilt, dSYM and Sources trees
    #[arg(long, short, default_value = ".")]
    base: PathBuf,

    /// Live item list written by the dependency resolver (TOML)
    #[arg(long, short)]
    items: PathBuf,

    /// Layout file overriding parts of the built-in layout
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Platform whose dSYM tree is scanned; repeat to scan several (replaces the layout's list)
    #[arg(long = "platform", short)]
    platforms: Vec<String>,

    /// Working tree detection used before anything is deleted
    #[arg(long, value_enum, default_value_t = Probe::Git)]
    probe: Probe,

    /// List unused artifacts without asking or deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Show debug output on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(summary: &RunSummary, verbose: bool, dry_run: bool) {
    println!();
    println!("========================================");

    if verbose {
        for entry in &summary.categories {
            let outcome = if dry_run {
                format!("{} listed", entry.report.listed)
            } else {
                format!(
                    "{} removed, {} kept",
                    entry.report.deleted, entry.report.kept
                )
            };
            println!(
                "  - {}: {} unused, {} ({})",
                entry.category,
                entry.report.orphans,
                outcome,
                entry.root.display()
            );
        }
    }

    println!("Unused artifacts found: {}", summary.orphans());
    if dry_run {
        println!("Dry run mode: No files were deleted.");
        return;
    }

    println!(
        "Removed: {} ({})",
        summary.deleted(),
        format_size(summary.bytes_freed(), BINARY).bold()
    );
    if summary.failed() > 0 {
        println!(
            "{}",
            format!("Failed to remove: {}", summary.failed()).red()
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut layout = match &args.config {
        Some(path) => Layout::load(path)
            .with_context(|| format!("Failed to load layout from {}", path.display()))?,
        None => Layout::builtin().context("Failed to load built-in layout")?,
    };
    if !args.platforms.is_empty() {
        layout = layout.with_platforms(args.platforms.clone())?;
    }

    let vcs: Box<dyn VcsRootFinder> = match args.probe {
        Probe::Git => Box::new(GitRootFinder),
        Probe::Markers => Box::new(MarkerRootFinder),
    };
    let resolver = ItemsFile::new(args.items.clone());
    let mut confirmer = TerminalConfirmer::stdio();

    let summary = Cleaner::new(&layout, vcs.as_ref(), &mut confirmer)
        .dry_run(args.dry_run)
        .run(&resolver, &args.base)
        .with_context(|| format!("Cleaning {} failed", args.base.display()))?;

    print_summary(&summary, args.verbose, args.dry_run);
    println!("{}", "\n\n🎉 done!\n".green());

    Ok(())
}
