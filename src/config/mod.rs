//! Site configuration management for `vellum.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[base]`      | Site metadata (title, author, url)               |
//! | `[build]`     | Paths, page sizes, highlighter command           |
//! | `[[pattern]]` | Content scan patterns (see [`ScanPattern`])      |
//! | `[slugs]`     | Custom slug overrides for tags and categories    |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! url = "https://example.com"
//!
//! [build]
//! source = "content"
//! output = "public"
//! index_size = 10
//! feed_size = 10
//! highlighter = ["python3", "-m", "vellum_pygments_adapter"]
//!
//! [[pattern]]
//! start = "posts"
//! glob = "*.md"
//! type = "post"
//! renderer = "markdown"
//! template = "post.liquid"
//! target = "blog"
//!
//! [slugs]
//! "C++" = "cpp"
//! ```

mod error;
mod patterns;

pub use error::ConfigError;
pub use patterns::ScanPattern;

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing `vellum.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Content scan patterns
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<ScanPattern>,

    /// Custom slug overrides for tags and categories
    #[serde(default)]
    pub slugs: HashMap<String, String>,
}

/// Basic site information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title, used for the main RSS group
    #[serde(default)]
    pub title: String,

    /// Base URL of the deployed site
    #[serde(default)]
    pub url: Option<String>,

    /// Site author
    #[serde(default)]
    pub author: Option<String>,

    /// Site description
    #[serde(default)]
    pub description: Option<String>,
}

/// Build settings.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Content source root
    #[educe(Default(expression = PathBuf::from("content")))]
    #[serde(default = "defaults::source")]
    pub source: PathBuf,

    /// Output directory
    #[educe(Default(expression = PathBuf::from("public")))]
    #[serde(default = "defaults::output")]
    pub output: PathBuf,

    /// Posts per index page
    #[educe(Default = 10)]
    #[serde(default = "defaults::index_size")]
    pub index_size: usize,

    /// Posts per RSS feed
    #[educe(Default = 10)]
    #[serde(default = "defaults::feed_size")]
    pub feed_size: usize,

    /// Highlighter subprocess command (binary + arguments)
    #[educe(Default(expression = defaults::highlighter()))]
    #[serde(default = "defaults::highlighter")]
    pub highlighter: Vec<String>,
}

mod defaults {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        PathBuf::from("content")
    }

    pub fn output() -> PathBuf {
        PathBuf::from("public")
    }

    pub const fn index_size() -> usize {
        10
    }

    pub const fn feed_size() -> usize {
        10
    }

    pub fn highlighter() -> Vec<String> {
        vec![
            "python3".to_string(),
            "-m".to_string(),
            "vellum_pygments_adapter".to_string(),
        ]
    }
}

impl SiteConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: Self = toml::from_str(&raw)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Validate configuration consistency.
    ///
    /// Checked once after load; rendering assumes these invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.index_size == 0 {
            return Err(ConfigError::Validation(
                "build.index_size must be positive".into(),
            ));
        }
        if self.build.feed_size == 0 {
            return Err(ConfigError::Validation(
                "build.feed_size must be positive".into(),
            ));
        }
        if self.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[pattern]] is required".into(),
            ));
        }
        if self.build.highlighter.is_empty() {
            return Err(ConfigError::Validation(
                "build.highlighter command must not be empty".into(),
            ));
        }
        for pattern in &self.patterns {
            if pattern.start.is_empty() {
                return Err(ConfigError::Validation(
                    "pattern.start must not be empty".into(),
                ));
            }
            if pattern.renderer.is_empty() {
                return Err(ConfigError::Validation(
                    "pattern.renderer must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemType;

    const MINIMAL: &str = r#"
        [base]
        title = "Test Site"

        [[pattern]]
        start = "posts"
        glob = "*.md"
        type = "post"
        renderer = "markdown"
        template = "post.liquid"
        target = "blog"
    "#;

    #[test]
    fn test_parse_minimal() {
        let config: SiteConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.base.title, "Test Site");
        assert_eq!(config.build.index_size, 10);
        assert_eq!(config.build.feed_size, 10);
        assert_eq!(config.patterns.len(), 1);
        assert_eq!(config.patterns[0].item_type, ItemType::Post);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_custom_slugs() {
        let config: SiteConfig = toml::from_str(&format!(
            "{MINIMAL}\n[slugs]\n\"C++\" = \"cpp\"\n\"C#\" = \"csharp\"\n"
        ))
        .unwrap();
        assert_eq!(config.slugs.get("C++").map(String::as_str), Some("cpp"));
        assert_eq!(config.slugs.get("C#").map(String::as_str), Some("csharp"));
    }

    #[test]
    fn test_validate_zero_index_size() {
        let mut config: SiteConfig = toml::from_str(MINIMAL).unwrap();
        config.build.index_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_no_patterns() {
        let config = SiteConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[base]\nbogus = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_highlighter_command() {
        let config: SiteConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.build.highlighter[0], "python3");
    }
}
