//! Content item types flowing through the build pipeline.
//!
//! A content file becomes a [`RawItem`] after scanning and metadata
//! resolution, then an [`Item`] after rendering. Rendered items are
//! immutable and shared (`Arc<Item>`) between the grouping stage and the
//! template models.

use crate::{config::ScanPattern, meta::ItemMeta, toc::TocNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of content produced by a scan pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Post,
    Page,
    Project,
    Gallery,
    Listing,
}

/// A scanned content file with resolved metadata, before rendering.
#[derive(Debug, Clone)]
pub struct RawItem {
    pub item_type: ItemType,
    pub pattern: &'static ScanPattern,
    /// Full path of the source file.
    pub source_path: PathBuf,
    /// Path components relative to the pattern's start directory.
    pub path_elements: Vec<String>,
    pub meta: ItemMeta,
    /// Content body with metadata stripped.
    pub source: String,
}

/// A fully rendered content item.
#[derive(Debug, Clone)]
pub struct Item {
    pub item_type: ItemType,
    pub pattern: &'static ScanPattern,
    pub source_path: PathBuf,
    pub path_elements: Vec<String>,
    pub url: String,
    pub meta: ItemMeta,
    /// Rendered HTML body (after the teaser marker, if split).
    pub content: String,
    /// Rendered HTML before the teaser marker; empty when no marker.
    pub teaser: String,
    /// Renderer side-channel data (e.g. gallery image descriptors).
    pub rich: Option<RichData>,
    /// Heading forest for the table of contents.
    pub toc: Vec<TocNode>,
}

impl Item {
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn published(&self) -> DateTime<Utc> {
        self.meta.published
    }

    pub fn updated_or_published(&self) -> DateTime<Utc> {
        self.meta.updated.unwrap_or(self.meta.published)
    }

    /// Template for this item: per-item override or the pattern default.
    pub fn template_name(&self) -> &str {
        self.meta.template.as_deref().unwrap_or(&self.pattern.template)
    }

    /// Source path as a string key for navigation lookups.
    pub fn source_key(&self) -> String {
        self.source_path.to_string_lossy().into_owned()
    }
}

/// Renderer side-channel data, carried alongside the HTML body.
#[derive(Debug, Clone)]
pub enum RichData {
    Gallery(Vec<GalleryImage>),
}

/// One image parsed from a gallery manifest.
///
/// Dimensions are intentionally absent: sizing belongs to the thumbnail
/// engine, which probes image files itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "thumbnailName")]
    pub thumbnail_name: String,
    pub description: String,
}
