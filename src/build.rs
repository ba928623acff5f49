//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── ItemScanner ──────► raw items (parallel scan + meta resolution)
//!     │
//!     ├── RenderDispatcher ─► rendered items (HighlightCache underneath)
//!     │
//!     ├── GroupEngine ──────► groups + sorted item set
//!     │
//!     └── OutputWriter ─────► pages and feeds on disk, then cache persist
//! ```
//!
//! Any stage error aborts the whole build; nothing is partially
//! published and the highlight cache is only persisted after a fully
//! successful pass.

use crate::{
    cache::{CacheStore, JsonFileCache},
    config::SiteConfig,
    groups::{Group, NavSlot, RssGroup},
    grouping::GroupEngine,
    highlight::{HighlightCache, PygmentsService},
    items::Item,
    log,
    meta::MetaResolver,
    output::{OutputWriter, TemplateEngine, XmlWriter},
    render::RenderDispatcher,
    scan::ItemScanner,
};
use anyhow::{Context, Result};
use std::{fs, path::Path, sync::Arc};

const CACHE_FILE: &str = ".vellum-cache.json";

/// Build the entire site.
///
/// If `clean` is true, the output directory is removed first.
pub fn build_site(config: &'static SiteConfig, clean: bool) -> Result<()> {
    if clean && config.build.output.exists() {
        fs::remove_dir_all(&config.build.output).with_context(|| {
            format!("failed to clean {}", config.build.output.display())
        })?;
    }

    let cache_path = config
        .config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .join(CACHE_FILE);
    let store = Arc::new(JsonFileCache::open(&cache_path)?);
    let service = Arc::new(PygmentsService::new(&config.build.highlighter)?);
    let highlight = Arc::new(HighlightCache::new(
        Arc::clone(&store) as Arc<dyn CacheStore>,
        service,
    ));

    log!("scan"; "scanning {}", config.build.source.display());
    let raw_items = ItemScanner::new(config, MetaResolver::with_defaults()).scan()?;

    log!("render"; "rendering {} items", raw_items.len());
    let items = RenderDispatcher::new(highlight).render(raw_items)?;

    let (items, groups) = GroupEngine::with_defaults(config).generate(items)?;
    log!("group"; "generated {} groups", groups.len());

    let writer = OutputWriter::new(
        Arc::new(StubTemplateEngine),
        Arc::new(StubXmlWriter),
        &config.build.output,
    )?;
    writer.write_site(&items, &groups)?;

    store.persist()?;
    log!("cache"; "persisted highlight cache to {}", cache_path.display());
    Ok(())
}

// ============================================================================
// Stand-in collaborators
// ============================================================================
// Page and feed formatting belongs to external collaborators behind the
// `TemplateEngine`/`XmlWriter` seams. These stand-ins emit the rendered
// content without any layout so a build works end to end; a real
// template stack replaces them through the traits.

struct StubTemplateEngine;

impl TemplateEngine for StubTemplateEngine {
    fn render_item(&self, item: &Item, nav: Option<&NavSlot>) -> Result<String> {
        let mut page = format!("<h1>{}</h1>\n{}\n", item.title(), item.content);
        if let Some(nav) = nav {
            if let Some(prev) = &nav.prev {
                page.push_str(&format!("<a href=\"{}\">{}</a>\n", prev.url, prev.title));
            }
            if let Some(next) = &nav.next {
                page.push_str(&format!("<a href=\"{}\">{}</a>\n", next.url, next.title));
            }
        }
        Ok(page)
    }

    fn render_group(&self, group: &Group) -> Result<String> {
        let mut page = String::new();
        match group {
            Group::Html(g) => {
                page.push_str(&format!("<h1>{}</h1>\n", g.title));
                for item in &g.items {
                    page.push_str(&format!(
                        "<a href=\"{}\">{}</a>\n",
                        item.url,
                        item.title()
                    ));
                }
            }
            Group::Links(g) => {
                page.push_str(&format!("<h1>{}</h1>\n", g.title));
                for link in &g.links {
                    page.push_str(&format!("<a href=\"{}\">{}</a>\n", link.url, link.title));
                }
            }
            Group::DirectoryTree(g) => {
                page.push_str(&format!("<h1>{}</h1>\n", g.title));
                for entry in &g.entries {
                    page.push_str(&format!("<a href=\"{}\">{}</a>\n", entry.url, entry.title));
                }
            }
            Group::Rss(_) | Group::Navigation(_) => {}
        }
        Ok(page)
    }
}

struct StubXmlWriter;

impl XmlWriter for StubXmlWriter {
    fn render_feed(&self, feed: &RssGroup) -> Result<String> {
        let mut xml = format!("<rss><channel><title>{}</title>", feed.title);
        for item in &feed.items {
            xml.push_str(&format!(
                "<item><title>{}</title><link>{}</link></item>",
                item.title(),
                item.url
            ));
        }
        xml.push_str("</channel></rss>");
        Ok(xml)
    }
}
