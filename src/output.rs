//! Output writing.
//!
//! Rendered items and groups are handed to pluggable [`TemplateEngine`]
//! and [`XmlWriter`] seams; this module only decides where the produced
//! bytes land and writes them with bounded parallelism. Page formatting
//! and feed formatting live behind the seams.

use crate::{
    groups::{Group, NavSlot, NavigationIndex, RssGroup},
    items::Item,
    log,
    utils::url::url_to_output_path,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::Path, path::PathBuf, sync::Arc};

/// Output writing runs on its own small pool so a large site cannot
/// saturate the global pool with blocking file IO.
const WRITE_THREADS: usize = 4;

/// Formats HTML pages from items and groups.
pub trait TemplateEngine: Send + Sync {
    /// Render a single content item. `nav` carries the previous/next
    /// links when the item is a post.
    fn render_item(&self, item: &Item, nav: Option<&NavSlot>) -> Result<String>;

    /// Render a group page. Never called with RSS or navigation groups.
    fn render_group(&self, group: &Group) -> Result<String>;
}

/// Formats XML feeds.
pub trait XmlWriter: Send + Sync {
    fn render_feed(&self, feed: &RssGroup) -> Result<String>;
}

pub struct OutputWriter {
    templates: Arc<dyn TemplateEngine>,
    xml: Arc<dyn XmlWriter>,
    output_root: PathBuf,
    pool: rayon::ThreadPool,
}

impl OutputWriter {
    pub fn new(
        templates: Arc<dyn TemplateEngine>,
        xml: Arc<dyn XmlWriter>,
        output_root: &Path,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WRITE_THREADS)
            .build()
            .context("failed to build output thread pool")?;
        Ok(Self {
            templates,
            xml,
            output_root: output_root.to_path_buf(),
            pool,
        })
    }

    /// Write every item page, group page and feed. Any failure aborts
    /// the whole pass.
    pub fn write_site(&self, items: &[Arc<Item>], groups: &[Group]) -> Result<()> {
        let navigation = groups
            .iter()
            .find_map(|group| match group {
                Group::Navigation(index) => Some(index),
                _ => None,
            })
            .cloned()
            .unwrap_or_default();

        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| self.write_item(item, &navigation))
                .chain(groups.par_iter().map(|group| self.write_group(group)))
                .collect::<Result<()>>()
        })?;

        log!("output"; "wrote {} items and {} groups", items.len(),
            groups.iter().filter(|g| !g.is_navigation()).count());
        Ok(())
    }

    fn write_item(&self, item: &Item, navigation: &NavigationIndex) -> Result<()> {
        let nav = navigation.get(&item.source_key());
        let html = self
            .templates
            .render_item(item, nav)
            .with_context(|| format!("failed to render {}", item.url))?;
        self.write_file(&item.url, &html)
    }

    fn write_group(&self, group: &Group) -> Result<()> {
        let rendered = match group {
            Group::Navigation(_) => return Ok(()),
            Group::Rss(feed) => self
                .xml
                .render_feed(feed)
                .with_context(|| format!("failed to render feed {}", feed.url))?,
            other => {
                let url = other.url().unwrap_or_default().to_string();
                self.templates
                    .render_group(other)
                    .with_context(|| format!("failed to render {url}"))?
            }
        };
        match group.url() {
            Some(url) => self.write_file(url, &rendered),
            None => Ok(()),
        }
    }

    fn write_file(&self, url: &str, content: &str) -> Result<()> {
        let path = url_to_output_path(url, &self.output_root)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{HtmlGroup, NavLink};
    use crate::grouping::test_support::*;
    use parking_lot::Mutex;

    struct RecordingEngine {
        rendered: Mutex<Vec<String>>,
    }

    impl RecordingEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rendered: Mutex::new(Vec::new()),
            })
        }
    }

    impl TemplateEngine for RecordingEngine {
        fn render_item(&self, item: &Item, nav: Option<&NavSlot>) -> Result<String> {
            self.rendered.lock().push(item.url.clone());
            let prev = nav
                .and_then(|n| n.prev.as_ref())
                .map_or("-", |l| l.url.as_str());
            Ok(format!("item:{} prev:{}", item.url, prev))
        }

        fn render_group(&self, group: &Group) -> Result<String> {
            let url = group.url().unwrap_or_default().to_string();
            self.rendered.lock().push(url.clone());
            Ok(format!("group:{url}"))
        }
    }

    struct PlainXml;

    impl XmlWriter for PlainXml {
        fn render_feed(&self, feed: &RssGroup) -> Result<String> {
            Ok(format!("feed:{}", feed.url))
        }
    }

    fn writer(root: &Path) -> (OutputWriter, Arc<RecordingEngine>) {
        let engine = RecordingEngine::new();
        let w = OutputWriter::new(engine.clone(), Arc::new(PlainXml), root).unwrap();
        (w, engine)
    }

    #[test]
    fn test_pretty_url_lands_in_index_html() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _) = writer(dir.path());
        let items = arc_items(vec![item(post_pattern(), "hello.md", 1)]);
        writer.write_site(&items, &[]).unwrap();

        let expected = dir.path().join(items[0].url.trim_start_matches('/'));
        assert!(expected.join("index.html").is_file());
    }

    #[test]
    fn test_groups_and_feeds_written() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _) = writer(dir.path());
        let groups = vec![
            Group::Html(HtmlGroup {
                items: Vec::new(),
                title: "Blog".into(),
                url: "/blog/index-1.html".into(),
                template: "index.liquid".into(),
                key: Some("1".into()),
                prev_url: None,
                next_url: None,
                rss_url: None,
            }),
            Group::Rss(RssGroup {
                items: Vec::new(),
                title: "Blog".into(),
                url: "/rss.xml".into(),
                key: None,
            }),
            Group::Navigation(NavigationIndex::default()),
        ];
        writer.write_site(&[], &groups).unwrap();

        assert!(dir.path().join("blog/index-1.html").is_file());
        let feed = fs::read_to_string(dir.path().join("rss.xml")).unwrap();
        assert_eq!(feed, "feed:/rss.xml");
    }

    #[test]
    fn test_navigation_links_reach_templates() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _) = writer(dir.path());
        let items = arc_items(vec![
            item(post_pattern(), "newer.md", 2),
            item(post_pattern(), "older.md", 1),
        ]);
        let mut index = NavigationIndex::default();
        index.insert(
            items[0].source_key(),
            NavSlot {
                prev: Some(NavLink::for_item(&items[1])),
                next: None,
            },
        );
        index.insert(
            items[1].source_key(),
            NavSlot {
                prev: None,
                next: Some(NavLink::for_item(&items[0])),
            },
        );
        writer
            .write_site(&items, &[Group::Navigation(index)])
            .unwrap();

        let page = url_to_output_path(&items[0].url, dir.path()).unwrap();
        let html = fs::read_to_string(page).unwrap();
        assert!(html.contains(&format!("prev:{}", items[1].url)));
    }
}
