//! Configuration for Storyteller.
//!
//! - [`StoreConfig`] - where stories live
//! - [`EditorConfig`] - word-count goal and recount debounce
//! - [`SearchConfig`] - catalog search defaults
//! - [`StoryConfig`] - root configuration, loaded from TOML
//!
//! Every section falls back to its [`Default`] when absent from the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoryError};
use crate::goal::DEFAULT_GOAL;

const APP_DIR: &str = "storyteller";
const CONFIG_FILE: &str = "config.toml";
const STORIES_DIR: &str = "stories";

/// Location of the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding `<date> <title>.html` files.
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

/// Editor behaviour.
///
/// ```
/// use story_core::config::EditorConfig;
///
/// let config = EditorConfig::default();
/// assert_eq!(config.goal, 100);
/// assert_eq!(config.debounce_ms, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Target word count.
    pub goal: usize,
    /// Quiet interval before the buffer is recounted.
    pub debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL,
            debounce_ms: 100,
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Catalog search defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet interval before a typed query is applied.
    pub debounce_ms: u64,
    pub case_sensitive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            case_sensitive: false,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub store: StoreConfig,
    pub editor: EditorConfig,
    pub search: SearchConfig,
}

impl StoryConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Config`] if the TOML is invalid.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| StoryError::Config(e.to_string()))
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Storage`] if the file cannot be read and
    /// [`StoryError::Config`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, otherwise the per-user config file if one
    /// exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`StoryConfig::load`] errors. An explicit `path` must exist.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Serialize back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Serialization`] if encoding fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StoryError::Serialization(e.to_string()))
    }
}

/// `<config dir>/storyteller/config.toml`, when the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<documents>/stories`, falling back to `~/Documents/stories`, then
/// `./stories`.
#[must_use]
pub fn default_store_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .map_or_else(|| PathBuf::from(STORIES_DIR), |docs| docs.join(STORIES_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_behaviour() {
        let config = StoryConfig::default();
        assert_eq!(config.editor.goal, 100);
        assert_eq!(config.editor.debounce(), Duration::from_millis(100));
        assert_eq!(config.search.debounce(), Duration::from_millis(100));
        assert!(!config.search.case_sensitive);
        assert!(config.store.dir.ends_with(STORIES_DIR));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config = StoryConfig::from_toml(
            r#"
[store]
dir = "/tmp/my-stories"

[editor]
goal = 750
"#,
        )
        .unwrap();
        assert_eq!(config.store.dir, PathBuf::from("/tmp/my-stories"));
        assert_eq!(config.editor.goal, 750);
        assert_eq!(config.editor.debounce_ms, 100);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = StoryConfig::from_toml("[editor]\ngoal = \"lots\"").unwrap_err();
        assert!(matches!(err, StoryError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = StoryConfig::default();
        config.search.case_sensitive = true;
        let text = config.to_toml().unwrap();
        assert_eq!(StoryConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn load_reads_file_and_discover_requires_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\ngoal = 5\n").unwrap();

        let config = StoryConfig::discover(Some(&path)).unwrap();
        assert_eq!(config.editor.goal, 5);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            StoryConfig::discover(Some(&missing)),
            Err(StoryError::Storage(_))
        ));
    }
}
