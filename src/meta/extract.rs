//! Metadata extractors.
//!
//! Extractors turn raw file content into a [`MetaMap`]. They form an
//! ordered chain: content-aware extractors first, then the filesystem
//! extractor as the guaranteed terminal fallback (it only looks at the
//! file name and timestamps, so it can never fail to produce metadata).

use super::value::{MetaMap, MetaValue};
use crate::items::ItemType;
use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::{fs, path::Path, sync::OnceLock};

/// One strategy for extracting item metadata.
pub trait MetaExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this extractor applies to items of the given type.
    fn supports(&self, item_type: ItemType) -> bool;

    /// Extract metadata from the file content.
    ///
    /// `Ok(None)` means "no metadata found here" and the chain continues;
    /// `Err` is logged by the resolver and also continues the chain.
    fn extract(&self, source: &str, path: &Path, item_type: ItemType) -> Result<Option<MetaMap>>;

    /// The content body: the source with this extractor's metadata removed.
    fn content_body(&self, source: &str, path: &Path) -> String;
}

// ============================================================================
// YAML Front Matter
// ============================================================================

/// Extracts YAML front matter delimited by `---` lines.
pub struct YamlExtractor;

fn separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^---$").unwrap())
}

impl MetaExtractor for YamlExtractor {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn supports(&self, item_type: ItemType) -> bool {
        // Listings are raw code files; a `---` line in them is content.
        item_type != ItemType::Listing
    }

    fn extract(&self, source: &str, _path: &Path, _item_type: ItemType) -> Result<Option<MetaMap>> {
        let parts: Vec<&str> = separator().splitn(source, 3).collect();
        let Some(yaml) = parts.get(1) else {
            return Ok(None);
        };

        let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let serde_yaml::Value::Mapping(mapping) = raw else {
            return Ok(None);
        };

        let mut map = MetaMap::new();
        for (key, value) in &mapping {
            if let serde_yaml::Value::String(key) = key {
                map.insert(key, MetaValue::from_yaml(value));
            }
        }
        Ok(Some(map))
    }

    fn content_body(&self, source: &str, _path: &Path) -> String {
        separator()
            .splitn(source, 3)
            .last()
            .unwrap_or(source)
            .to_string()
    }
}

// ============================================================================
// Filesystem Fallback
// ============================================================================

/// Terminal fallback: metadata derived purely from filesystem facts.
///
/// Always returns a non-empty map; the resolver asserts this contract.
pub struct FsExtractor;

impl FsExtractor {
    fn published_from_fs(path: &Path) -> DateTime<Utc> {
        let meta = fs::metadata(path).ok();
        let time = meta
            .as_ref()
            .and_then(|m| m.created().or_else(|_| m.modified()).ok());
        time.map_or_else(Utc::now, DateTime::from)
    }
}

impl MetaExtractor for FsExtractor {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn supports(&self, _item_type: ItemType) -> bool {
        true
    }

    fn extract(&self, _source: &str, path: &Path, item_type: ItemType) -> Result<Option<MetaMap>> {
        // Listings keep their extension in the title; everything else
        // uses the bare file stem.
        let title = if item_type == ItemType::Listing {
            path.file_name()
        } else {
            path.file_stem()
        };
        let title = title
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut map = MetaMap::new();
        map.insert("title", MetaValue::Str(title));
        map.insert("published", MetaValue::Date(Self::published_from_fs(path)));
        Ok(Some(map))
    }

    fn content_body(&self, source: &str, _path: &Path) -> String {
        source.to_string()
    }
}
