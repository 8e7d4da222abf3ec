//! Error types shared by every cleaning pass.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    /// The category root is not inside a version-controlled working tree.
    /// Deleting there could not be undone, so the whole run stops.
    #[error("No version control repository found at `{}`", .0.display())]
    VcsRootNotFound(PathBuf),

    #[error("Failed to resolve live items: {0}")]
    Resolve(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read answer for `{}`: {source}", .path.display())]
    Prompt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CleanError>;
