//! Glob patterns used to discover artifacts below a category root.

use crate::error::{CleanError, Result};
use serde::Deserialize;
use std::fmt;

/// A glob restricted to a name suffix, e.g. `**/*.framework` or `*`.
///
/// Only two shapes are understood: an optional `**/` prefix (match at any
/// depth) followed by `*<suffix>` (match any non-hidden name ending in the
/// suffix). Anything richer is rejected when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ScanPattern {
    suffix: String,
    recursive: bool,
}

impl ScanPattern {
    /// Match `*<suffix>` at any depth.
    pub fn recursive(suffix: &str) -> Self {
        ScanPattern {
            suffix: suffix.to_string(),
            recursive: true,
        }
    }

    /// Match `*<suffix>` among the immediate children only.
    pub fn one_level(suffix: &str) -> Self {
        ScanPattern {
            suffix: suffix.to_string(),
            recursive: false,
        }
    }

    pub fn parse(glob: &str) -> Result<Self> {
        let (recursive, rest) = match glob.strip_prefix("**/") {
            Some(rest) => (true, rest),
            None => (false, glob),
        };

        let suffix = rest.strip_prefix('*').ok_or_else(|| {
            CleanError::Config(format!(
                "pattern `{}` must look like `*<suffix>` or `**/*<suffix>`",
                glob
            ))
        })?;

        if suffix.contains(['*', '?', '[', ']', '{', '}', '/', '\\']) {
            return Err(CleanError::Config(format!(
                "pattern `{}` uses unsupported glob syntax",
                glob
            )));
        }

        Ok(ScanPattern {
            suffix: suffix.to_string(),
            recursive,
        })
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Check a single file or directory name against the pattern.
    /// Hidden names never match, like a shell glob.
    pub fn matches(&self, name: &str) -> bool {
        !name.is_empty() && !name.starts_with('.') && name.ends_with(&self.suffix)
    }
}

impl TryFrom<String> for ScanPattern {
    type Error = CleanError;

    fn try_from(value: String) -> Result<Self> {
        ScanPattern::parse(&value)
    }
}

impl fmt::Display for ScanPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.recursive {
            write!(f, "**/*{}", self.suffix)
        } else {
            write!(f, "*{}", self.suffix)
        }
    }
}
