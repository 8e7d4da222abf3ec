//! Layout of the artifact tree: category directories, patterns, platforms.

use crate::error::{CleanError, Result};
use crate::patterns::ScanPattern;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use toml::Table;

// Embed the default layout directly in the binary at compile time
const LAYOUT_TOML: &str = include_str!("../layout.toml");

/// Where one category lives below the base path and how to find its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryLayout {
    pub dir: PathBuf,
    pub pattern: ScanPattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub symbol_suffix: String,
    pub platforms: Vec<String>,
    pub prebuilt: CategoryLayout,
    pub dsym: CategoryLayout,
    pub sources: CategoryLayout,
}

impl Layout {
    /// The layout shipped with the tool.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(LAYOUT_TOML)
    }

    /// Parse a complete layout document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let layout: Layout = toml::from_str(content)
            .map_err(|e| CleanError::Config(format!("invalid layout: {}", e)))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Parse a layout document whose keys override the built-in defaults.
    /// Keys absent from `content` keep their default value.
    pub fn from_toml_over_builtin(content: &str) -> Result<Self> {
        let mut merged = parse_table(LAYOUT_TOML)?;
        merge_tables(&mut merged, parse_table(content)?);

        let layout: Layout = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| CleanError::Config(format!("invalid layout: {}", e)))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load an override file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CleanError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_over_builtin(&content)
    }

    /// Replace the platform list, e.g. from the command line.
    pub fn with_platforms(mut self, platforms: Vec<String>) -> Result<Self> {
        self.platforms = platforms;
        self.validate()?;
        Ok(self)
    }

    pub fn prebuilt_root(&self, base: &Path) -> PathBuf {
        base.join(&self.prebuilt.dir)
    }

    pub fn dsym_root(&self, base: &Path, platform: &str) -> PathBuf {
        base.join(&self.dsym.dir).join(platform)
    }

    pub fn sources_root(&self, base: &Path) -> PathBuf {
        base.join(&self.sources.dir)
    }

    fn validate(&self) -> Result<()> {
        if self.symbol_suffix.is_empty() {
            return Err(CleanError::Config(
                "symbol_suffix must not be empty".to_string(),
            ));
        }
        if let Some(platform) = self
            .platforms
            .iter()
            .find(|p| matches!(p.as_str(), "" | "." | "..") || p.contains(['/', '\\']))
        {
            return Err(CleanError::Config(format!(
                "platform `{}` is not a plain directory name",
                platform
            )));
        }
        Ok(())
    }
}

fn parse_table(content: &str) -> Result<Table> {
    content
        .parse::<Table>()
        .map_err(|e| CleanError::Config(format!("invalid layout: {}", e)))
}

/// Recursively overlay `overlay` onto `base`. Nested tables merge, every
/// other value replaces.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(nested) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, nested);
                continue;
            }
            base.insert(key, toml::Value::Table(nested));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layout() {
        let layout = Layout::builtin().unwrap();
        let base = Path::new("/project/PodBuilder");

        assert_eq!(layout.symbol_suffix, ".dSYM");
        assert_eq!(layout.platforms, vec!["iphoneos", "iphonesimulator"]);
        assert_eq!(layout.prebuilt_root(base), base.join("Prebuilt"));
        assert_eq!(layout.dsym_root(base, "iphoneos"), base.join("dSYM/iphoneos"));
        assert_eq!(layout.sources_root(base), base.join("Sources"));
        assert_eq!(layout.prebuilt.pattern, ScanPattern::recursive(".framework"));
        assert_eq!(layout.dsym.pattern, ScanPattern::recursive(".dSYM"));
        assert_eq!(layout.sources.pattern, ScanPattern::one_level(""));
    }

    #[test]
    fn test_override_keeps_unspecified_keys() {
        let layout = Layout::from_toml_over_builtin(
            r#"
            platforms = ["appletvos"]

            [prebuilt]
            pattern = "**/*.xcframework"
            "#,
        )
        .unwrap();

        assert_eq!(layout.platforms, vec!["appletvos"]);
        assert_eq!(layout.prebuilt.dir, PathBuf::from("Prebuilt"));
        assert_eq!(layout.prebuilt.pattern, ScanPattern::recursive(".xcframework"));
        assert_eq!(layout.sources.dir, PathBuf::from("Sources"));
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let err = Layout::from_toml_over_builtin("[dsym]\npattern = \"dSYM\"\n").unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Layout::from_toml_over_builtin("frameworks = \"Prebuilt\"\n").unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));
    }

    #[test]
    fn test_empty_symbol_suffix_is_rejected() {
        let err = Layout::from_toml_over_builtin("symbol_suffix = \"\"\n").unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));
    }

    #[test]
    fn test_with_platforms_replaces_list() {
        let layout = Layout::builtin()
            .unwrap()
            .with_platforms(vec!["macosx".to_string()])
            .unwrap();
        assert_eq!(layout.platforms, vec!["macosx"]);
        assert!(Layout::builtin()
            .unwrap()
            .with_platforms(vec![String::new()])
            .is_err());
    }

    #[test]
    fn test_platform_must_be_a_plain_name() {
        let err = Layout::from_toml_over_builtin("platforms = [\"../outside\"]\n").unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));
    }

    #[test]
    fn test_current_dir_is_not_a_platform() {
        let err = Layout::from_toml_over_builtin("platforms = [\".\"]\n").unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));

        let err = Layout::builtin()
            .unwrap()
            .with_platforms(vec![".".to_string()])
            .unwrap_err();
        assert!(matches!(err, CleanError::Config(_)));
    }
}
