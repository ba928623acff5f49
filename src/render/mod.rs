//! Item rendering.
//!
//! Raw items are partitioned by the renderer name their scan pattern
//! declares and handed to the matching renderer from the registry. Bulk
//! renderers take a whole partition in one call (listings, where the
//! highlighter batch matters); single renderers run once per item,
//! concurrently.
//!
//! Post-processing is uniform across renderers: teaser split, URL
//! synthesis and table of contents folding.

mod gallery;
mod html;
mod listing;
mod markdown;

pub use gallery::GalleryRenderer;
pub use html::HtmlRenderer;
pub use listing::ListingRenderer;
pub use markdown::MarkdownRenderer;

use crate::{
    highlight::{HighlightCache, HighlightError},
    items::{Item, RawItem, RichData},
    toc::{self, Heading},
};
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::{path::Path, sync::Arc, sync::OnceLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown renderer `{0}`")]
    UnknownRenderer(String),

    #[error("bulk result for `{0}` was not returned by the renderer")]
    UnmatchedResult(String),

    #[error("failed to render {path}")]
    Failed {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Highlight(#[from] HighlightError),
}

/// What a renderer produces for one item, before post-processing.
pub struct RenderOutput {
    pub html: String,
    pub rich: Option<RichData>,
    /// Flat heading sequence in document order; folded into a TOC later.
    pub headings: Vec<Heading>,
}

impl RenderOutput {
    pub fn html(html: String) -> Self {
        Self {
            html,
            rich: None,
            headings: Vec::new(),
        }
    }
}

/// Renders one item at a time; may also produce rich side-channel data.
pub trait SingleRenderer: Send + Sync {
    fn render(&self, item: &RawItem) -> anyhow::Result<RenderOutput>;
}

/// Renders a whole partition in one call, one output per input item in
/// input order.
pub trait BulkRenderer: Send + Sync {
    fn render_bulk(&self, items: &[RawItem]) -> Result<Vec<RenderOutput>, RenderError>;
}

pub enum Renderer {
    Single(Box<dyn SingleRenderer>),
    Bulk(Box<dyn BulkRenderer>),
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Name-keyed renderer registry; the seam where content types are added.
pub struct RenderDispatcher {
    renderers: FxHashMap<&'static str, Renderer>,
}

impl RenderDispatcher {
    /// Build the registry with the stock renderers.
    pub fn new(highlight: Arc<HighlightCache>) -> Self {
        let mut renderers: FxHashMap<&'static str, Renderer> = FxHashMap::default();
        renderers.insert(
            "markdown",
            Renderer::Single(Box::new(MarkdownRenderer::new(highlight.clone()))),
        );
        renderers.insert("html", Renderer::Single(Box::new(HtmlRenderer)));
        renderers.insert("gallery", Renderer::Single(Box::new(GalleryRenderer)));
        renderers.insert(
            "listing",
            Renderer::Bulk(Box::new(ListingRenderer::new(highlight))),
        );
        Self { renderers }
    }

    /// Render all items. Output order is unspecified; grouping re-sorts.
    pub fn render(&self, raw_items: Vec<RawItem>) -> Result<Vec<Item>, RenderError> {
        // Structural check up front, before any rendering work
        for raw in &raw_items {
            if !self.renderers.contains_key(raw.pattern.renderer.as_str()) {
                return Err(RenderError::UnknownRenderer(raw.pattern.renderer.clone()));
            }
        }

        let mut partitions: FxHashMap<&str, Vec<RawItem>> = FxHashMap::default();
        for raw in raw_items {
            partitions
                .entry(raw.pattern.renderer.as_str())
                .or_default()
                .push(raw);
        }

        let mut items = Vec::new();
        for (name, partition) in partitions {
            match &self.renderers[name] {
                Renderer::Bulk(renderer) => {
                    let outputs = renderer.render_bulk(&partition)?;
                    for (raw, output) in partition.into_iter().zip(outputs) {
                        items.push(assemble(raw, output));
                    }
                }
                Renderer::Single(renderer) => {
                    let rendered: Result<Vec<Item>, RenderError> = partition
                        .into_par_iter()
                        .map(|raw| {
                            let output = renderer.render(&raw).map_err(|source| {
                                RenderError::Failed {
                                    path: raw.source_path.to_string_lossy().into_owned(),
                                    source,
                                }
                            })?;
                            Ok(assemble(raw, output))
                        })
                        .collect();
                    items.extend(rendered?);
                }
            }
        }
        Ok(items)
    }
}

// ============================================================================
// Post-Processing
// ============================================================================

fn teaser_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<!--\s*TEASER_END\s*-->").unwrap())
}

/// Uniform post-processing: teaser split, URL synthesis, TOC folding.
fn assemble(raw: RawItem, output: RenderOutput) -> Item {
    let (teaser, content) = split_teaser(&raw, output.html);
    let url = synthesize_url(&raw);
    let toc = toc::build_tree(&output.headings);

    Item {
        item_type: raw.item_type,
        pattern: raw.pattern,
        source_path: raw.source_path,
        path_elements: raw.path_elements,
        url,
        meta: raw.meta,
        content,
        teaser,
        rich: output.rich,
        toc,
    }
}

fn split_teaser(raw: &RawItem, html: String) -> (String, String) {
    if raw.pattern.teasers {
        let parts: Vec<&str> = teaser_marker().splitn(&html, 2).collect();
        if let [teaser, content] = parts[..] {
            return (teaser.to_string(), content.to_string());
        }
    }
    (String::new(), html)
}

/// Build the item URL from the target directory and path elements.
///
/// Pretty URLs get a trailing `/`; otherwise the file becomes
/// `{stem}.html`, with listings keeping their source extension
/// (`util.py` → `util.py.html`).
fn synthesize_url(raw: &RawItem) -> String {
    let mut url = String::from("/");
    if !raw.pattern.target.is_empty() {
        url.push_str(&raw.pattern.target);
        url.push('/');
    }

    let Some((last, parents)) = raw.path_elements.split_last() else {
        return url;
    };
    for parent in parents {
        url.push_str(parent);
        url.push('/');
    }

    let last_path = Path::new(last);
    let stem = last_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| last.clone());
    url.push_str(&stem);

    if raw.pattern.pretty_urls {
        url.push('/');
    } else {
        if raw.item_type == crate::items::ItemType::Listing
            && let Some(ext) = last_path.extension()
        {
            url.push('.');
            url.push_str(&ext.to_string_lossy());
        }
        url.push_str(".html");
    }
    url
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

    fn pattern(item_type: ItemType, renderer: &str, pretty: bool, teasers: bool) -> &'static ScanPattern {
        Box::leak(Box::new(ScanPattern {
            start: "posts".into(),
            glob: "*".into(),
            item_type,
            renderer: renderer.into(),
            template: "post.liquid".into(),
            target: "blog".into(),
            pretty_urls: pretty,
            teasers,
            sitemap: true,
        }))
    }

    fn raw(pattern: &'static ScanPattern, elements: &[&str]) -> RawItem {
        RawItem {
            item_type: pattern.item_type,
            pattern,
            source_path: PathBuf::from(format!("content/{}", elements.join("/"))),
            path_elements: elements.iter().map(ToString::to_string).collect(),
            meta: ItemMeta {
                title: "T".into(),
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
            source: String::new(),
        }
    }

    // ========================================================================
    // URL synthesis
    // ========================================================================

    #[test]
    fn test_url_pretty() {
        let p = pattern(ItemType::Post, "markdown", true, true);
        assert_eq!(synthesize_url(&raw(p, &["hello.md"])), "/blog/hello/");
        assert_eq!(
            synthesize_url(&raw(p, &["2024", "hello.md"])),
            "/blog/2024/hello/"
        );
    }

    #[test]
    fn test_url_listing_keeps_extension() {
        let p = Box::leak(Box::new(ScanPattern {
            start: "listings".into(),
            glob: "*".into(),
            item_type: ItemType::Listing,
            renderer: "listing".into(),
            template: "listing.liquid".into(),
            target: "listings".into(),
            pretty_urls: false,
            teasers: false,
            sitemap: true,
        }));
        assert_eq!(
            synthesize_url(&raw(p, &["tools", "util.py"])),
            "/listings/tools/util.py.html"
        );
    }

    #[test]
    fn test_url_plain_html() {
        let p = pattern(ItemType::Page, "html", false, false);
        assert_eq!(synthesize_url(&raw(p, &["about.html"])), "/blog/about.html");
    }

    #[test]
    fn test_url_without_target() {
        let p = Box::leak(Box::new(ScanPattern {
            start: "pages".into(),
            glob: "*".into(),
            item_type: ItemType::Page,
            renderer: "markdown".into(),
            template: "page.liquid".into(),
            target: String::new(),
            pretty_urls: true,
            teasers: false,
            sitemap: true,
        }));
        assert_eq!(synthesize_url(&raw(p, &["about.md"])), "/about/");
    }

    // ========================================================================
    // Teaser split
    // ========================================================================

    #[test]
    fn test_teaser_split() {
        let p = pattern(ItemType::Post, "markdown", true, true);
        let item = raw(p, &["a.md"]);
        let (teaser, content) =
            split_teaser(&item, "<p>intro</p><!-- TEASER_END --><p>rest</p>".into());
        assert_eq!(teaser, "<p>intro</p>");
        assert_eq!(content, "<p>rest</p>");
    }

    #[test]
    fn test_teaser_marker_whitespace_variants() {
        let p = pattern(ItemType::Post, "markdown", true, true);
        let item = raw(p, &["a.md"]);
        let (teaser, _) = split_teaser(&item, "a<!--TEASER_END-->b".into());
        assert_eq!(teaser, "a");
    }

    #[test]
    fn test_teaser_absent_marker() {
        let p = pattern(ItemType::Post, "markdown", true, true);
        let item = raw(p, &["a.md"]);
        let (teaser, content) = split_teaser(&item, "<p>whole</p>".into());
        assert!(teaser.is_empty());
        assert_eq!(content, "<p>whole</p>");
    }

    #[test]
    fn test_teaser_disabled_pattern() {
        let p = pattern(ItemType::Page, "markdown", true, false);
        let item = raw(p, &["a.md"]);
        let (teaser, content) = split_teaser(&item, "a<!-- TEASER_END -->b".into());
        assert!(teaser.is_empty());
        assert_eq!(content, "a<!-- TEASER_END -->b");
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    #[test]
    fn test_unknown_renderer_rejected_before_rendering() {
        use crate::cache::MemoryCache;
        use crate::highlight::{HighlightRequest, HighlightResponse, HighlightService};

        struct PanicService;
        impl HighlightService for PanicService {
            fn render_batch(
                &self,
                _requests: &[HighlightRequest],
            ) -> Result<Vec<HighlightResponse>, HighlightError> {
                panic!("should never be called");
            }
        }

        let cache = Arc::new(HighlightCache::new(
            Arc::new(MemoryCache::new()),
            Arc::new(PanicService),
        ));
        let dispatcher = RenderDispatcher::new(cache);

        let p = pattern(ItemType::Post, "asciidoc", true, true);
        let err = dispatcher.render(vec![raw(p, &["a.adoc"])]).unwrap_err();
        assert!(matches!(err, RenderError::UnknownRenderer(name) if name == "asciidoc"));
    }
}
