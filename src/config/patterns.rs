//! Scan pattern descriptors.
//!
//! A [`ScanPattern`] describes one class of content: where it lives, which
//! renderer and template handle it, and where its output is routed. Patterns
//! are loaded once from `[[pattern]]` tables in `vellum.toml` and never
//! mutated afterwards.

use crate::items::ItemType;
use serde::{Deserialize, Serialize};

/// Static descriptor of a content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanPattern {
    /// Directory to scan, relative to the source root (e.g. `"posts"`).
    pub start: String,

    /// File name glob, `*` wildcards only (e.g. `"*.md"`).
    pub glob: String,

    /// Item type produced by this pattern.
    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// Renderer name, resolved against the renderer registry.
    pub renderer: String,

    /// Default template for items from this pattern.
    pub template: String,

    /// Output directory prefix (e.g. `"blog"`); empty for the site root.
    #[serde(default)]
    pub target: String,

    /// Emit directory-style URLs ending in `/`.
    #[serde(default = "default_true")]
    pub pretty_urls: bool,

    /// Split content on the teaser marker.
    #[serde(default = "default_true")]
    pub teasers: bool,

    /// Include items from this pattern in the sitemap.
    #[serde(default = "default_true")]
    pub sitemap: bool,
}

const fn default_true() -> bool {
    true
}

impl ScanPattern {
    /// Check a file name against the pattern glob.
    ///
    /// Only `*` wildcards are supported; everything else matches literally.
    pub fn matches(&self, file_name: &str) -> bool {
        glob_match(&self.glob, file_name)
    }
}

/// Match `name` against a `*`-wildcard glob, case-sensitively.
fn glob_match(glob: &str, name: &str) -> bool {
    let parts: Vec<&str> = glob.split('*').collect();
    if parts.len() == 1 {
        return glob == name;
    }

    let mut rest = name;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }

    // Glob ended with '*'
    true
}
