//! Shared group construction helpers.
//!
//! Groupers describe what to group; the formatter owns the mechanics
//! shared between them: pagination, feed assembly, directory trees and
//! breadcrumbs.

use crate::{
    config::SiteConfig,
    groups::{Breadcrumb, HtmlGroup, RssGroup, TreeEntry, TreeEntryKind, TreeGroup},
    items::Item,
};
use std::{
    collections::BTreeMap,
    sync::Arc,
};

#[derive(Clone, Copy)]
pub struct GroupFormatter {
    config: &'static SiteConfig,
}

impl GroupFormatter {
    pub fn new(config: &'static SiteConfig) -> Self {
        Self { config }
    }

    /// One unpaginated HTML group.
    pub fn html_list_group(
        &self,
        items: Vec<Arc<Item>>,
        title: &str,
        url: &str,
        template: &str,
        key: Option<String>,
    ) -> HtmlGroup {
        HtmlGroup {
            items,
            title: title.to_string(),
            url: url.to_string(),
            template: template.to_string(),
            key,
            prev_url: None,
            next_url: None,
            rss_url: None,
        }
    }

    /// One RSS feed, capped at the configured feed size.
    pub fn rss_feed(
        &self,
        items: &[Arc<Item>],
        title: &str,
        url: &str,
        key: Option<String>,
    ) -> RssGroup {
        RssGroup {
            items: items
                .iter()
                .take(self.config.build.feed_size)
                .cloned()
                .collect(),
            title: title.to_string(),
            url: url.to_string(),
            key,
        }
    }

    /// Paginated HTML groups for an index.
    ///
    /// Page 0 keeps the canonical folder URL; page N becomes
    /// `{base}/index-N.html` and its title gains an "old posts" suffix.
    /// Ranges are start-inclusive, end-exclusive and never overlap.
    pub fn html_index_groups(
        &self,
        items: &[Arc<Item>],
        title: &str,
        base_url: &str,
        template: &str,
        key: Option<&str>,
        rss_url: Option<&str>,
    ) -> Vec<HtmlGroup> {
        let mut sorted: Vec<Arc<Item>> = items.to_vec();
        sorted.sort_by(|a, b| b.published().cmp(&a.published()));

        let size = self.config.build.index_size;
        let base = base_url.trim_end_matches('/');
        let page_count = sorted.len().div_ceil(size);

        (0..page_count)
            .map(|page| {
                let range = page * size..((page + 1) * size).min(sorted.len());
                let url = if page == 0 {
                    format!("{base}/")
                } else {
                    format!("{base}/index-{page}.html")
                };
                let page_title = if page == 0 {
                    title.to_string()
                } else {
                    format!("{title} (old posts, page {page})")
                };
                let prev_url = match page {
                    0 => None,
                    1 => Some(format!("{base}/")),
                    n => Some(format!("{base}/index-{}.html", n - 1)),
                };
                let next_url = (page + 1 < page_count)
                    .then(|| format!("{base}/index-{}.html", page + 1));

                HtmlGroup {
                    items: sorted[range].to_vec(),
                    title: page_title,
                    url,
                    template: template.to_string(),
                    key: Some(key.map_or_else(|| page.to_string(), ToString::to_string)),
                    prev_url,
                    next_url,
                    rss_url: rss_url.map(ToString::to_string),
                }
            })
            .collect()
    }

    /// One tree group per directory level, per target directory.
    ///
    /// Every item contributes its own leaf entry plus one synthetic
    /// directory entry for each proper prefix of its path; entries are
    /// deduplicated by joined path, then regrouped by their parent URL.
    pub fn directory_tree_groups(
        &self,
        items: &[Arc<Item>],
        template: &str,
        title_prefix: &str,
        title_suffix: &str,
    ) -> Vec<TreeGroup> {
        let mut by_target: BTreeMap<&str, Vec<&Arc<Item>>> = BTreeMap::new();
        for item in items {
            by_target.entry(&item.pattern.target).or_default().push(item);
        }

        by_target
            .into_values()
            .flat_map(|target_items| {
                self.directory_tree_group(&target_items, template, title_prefix, title_suffix)
            })
            .collect()
    }

    fn directory_tree_group(
        &self,
        items: &[&Arc<Item>],
        template: &str,
        title_prefix: &str,
        title_suffix: &str,
    ) -> Vec<TreeGroup> {
        let Some(first) = items.first() else {
            return Vec::new();
        };
        let base_path = format!("/{}", first.pattern.target);

        // Set semantics on (kind, joined path); BTreeMap keeps the
        // whole pass deterministic
        let mut entries: BTreeMap<(TreeEntryKind, String), TreeEntry> = BTreeMap::new();
        for item in items {
            let leaf = TreeEntry {
                kind: TreeEntryKind::Item,
                title: item.path_elements.last().cloned().unwrap_or_default(),
                url: item.url.clone(),
                path: item.path_elements.clone(),
            };
            entries.insert((TreeEntryKind::Item, leaf.joined_path()), leaf);

            for depth in 1..item.path_elements.len() {
                let prefix = &item.path_elements[..depth];
                let directory = TreeEntry {
                    kind: TreeEntryKind::Directory,
                    title: prefix.last().cloned().unwrap_or_default(),
                    url: format!("{base_path}/{}/", prefix.join("/")),
                    path: prefix.to_vec(),
                };
                entries.insert((TreeEntryKind::Directory, directory.joined_path()), directory);
            }
        }

        let mut by_parent: BTreeMap<String, Vec<TreeEntry>> = BTreeMap::new();
        for entry in entries.into_values() {
            by_parent.entry(parent_url(&entry.url)).or_default().push(entry);
        }

        by_parent
            .into_iter()
            .map(|(url, mut group_entries)| {
                group_entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.url.cmp(&b.url)));
                TreeGroup {
                    title: format!("{title_prefix}{}{title_suffix}", url.trim_start_matches('/')),
                    breadcrumbs: build_breadcrumbs(&url),
                    entries: group_entries,
                    url,
                    template: template.to_string(),
                }
            })
            .collect()
    }
}

/// URL of the directory containing `url` (everything up to and
/// including the last `/` of the trimmed URL).
fn parent_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(index) => format!("{}/", &url[..index]),
        None => format!("{trimmed}/"),
    }
}

/// Breadcrumb trail from splitting a URL on `/`.
///
/// Crumb text strips a `.html` suffix; intermediate crumbs always link
/// to folder URLs.
pub fn build_breadcrumbs(url: &str) -> Vec<Breadcrumb> {
    let parts: Vec<&str> = url.trim_matches('/').split('/').collect();
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut crumb_url = format!("/{}", parts[..=i].join("/"));
            if i != parts.len() - 1 || url.ends_with('/') {
                crumb_url.push('/');
            }
            Breadcrumb {
                title: part.strip_suffix(".html").unwrap_or(part).to_string(),
                url: crumb_url,
            }
        })
        .collect()
}
