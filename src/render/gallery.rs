//! Gallery renderer.
//!
//! A gallery source is a tab-separated manifest with a header line:
//!
//! ```text
//! Name	Description
//! sunset.jpg	Sunset over the bay
//! ```
//!
//! The HTML body comes from the `galleryIntroHtml` custom field; the
//! parsed images travel as rich data for the gallery template.

use super::{RenderOutput, SingleRenderer};
use crate::{
    items::{GalleryImage, RawItem, RichData},
    meta::MetaValue,
};
use anyhow::{Result, bail};
use std::path::Path;

pub struct GalleryRenderer;

impl SingleRenderer for GalleryRenderer {
    fn render(&self, item: &RawItem) -> Result<RenderOutput> {
        let html = match item.meta.custom.get("galleryIntroHtml") {
            Some(MetaValue::Str(intro)) => intro.clone(),
            _ => String::new(),
        };

        let images = parse_manifest(&item.source)?;
        Ok(RenderOutput {
            html,
            rich: Some(RichData::Gallery(images)),
            headings: Vec::new(),
        })
    }
}

fn parse_manifest(source: &str) -> Result<Vec<GalleryImage>> {
    let mut lines = source.lines().filter(|l| !l.trim().is_empty());

    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let columns: Vec<String> = header.split('\t').map(|c| c.trim().to_lowercase()).collect();
    let Some(name_col) = columns.iter().position(|c| c == "name") else {
        bail!("gallery manifest has no `Name` column");
    };
    let description_col = columns.iter().position(|c| c == "description");

    let mut images = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(name) = fields.get(name_col).map(|n| n.trim()) else {
            bail!("gallery manifest row is missing the `Name` column: {line}");
        };
        if name.is_empty() {
            bail!("gallery manifest row has an empty `Name`: {line}");
        }
        let description = description_col
            .and_then(|c| fields.get(c))
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        images.push(GalleryImage {
            file_name: name.to_string(),
            thumbnail_name: thumbnail_name(name),
            description,
        });
    }
    Ok(images)
}

/// `sunset.jpg` → `sunset.thumbnail.jpg`.
fn thumbnail_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{}.thumbnail.{}",
            stem.to_string_lossy(),
            ext.to_string_lossy()
        ),
        _ => format!("{file_name}.thumbnail"),
    }
}
