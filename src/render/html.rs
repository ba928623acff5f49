//! Raw HTML renderer: the body is already HTML and passes through.

use super::{RenderOutput, SingleRenderer};
use crate::items::RawItem;
use anyhow::Result;

pub struct HtmlRenderer;

impl SingleRenderer for HtmlRenderer {
    fn render(&self, item: &RawItem) -> Result<RenderOutput> {
        Ok(RenderOutput::html(item.source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ScanPattern,
        items::ItemType,
        meta::{ItemMeta, MetaMap},
    };
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn test_passthrough() {
        let pattern: &'static ScanPattern = Box::leak(Box::new(ScanPattern {
            start: "pages".into(),
            glob: "*.html".into(),
            item_type: ItemType::Page,
            renderer: "html".into(),
            template: "page.liquid".into(),
            target: String::new(),
            pretty_urls: true,
            teasers: false,
            sitemap: true,
        }));
        let item = RawItem {
            item_type: ItemType::Page,
            pattern,
            source_path: PathBuf::from("content/pages/about.html"),
            path_elements: vec!["about.html".into()],
            meta: ItemMeta {
                title: "About".into(),
                published: Utc::now(),
                updated: None,
                tags: Vec::new(),
                category: None,
                description: None,
                thumbnail: None,
                template: None,
                comments: true,
                guide: None,
                project: None,
                custom: MetaMap::new(),
            },
            source: "<p>About me.</p>".into(),
        };
        let output = HtmlRenderer.render(&item).unwrap();
        assert_eq!(output.html, "<p>About me.</p>");
        assert!(output.rich.is_none());
        assert!(output.headings.is_empty());
    }
}
