//! Site structure groups.
//!
//! A group is a named, URL-addressable collection of items destined for
//! one rendered page or feed. Groupers produce them; the template engine
//! and XML writer consume them as opaque models.

use crate::items::Item;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Any output the groupers can produce.
#[derive(Debug, Clone)]
pub enum Group {
    Html(HtmlGroup),
    Rss(RssGroup),
    Links(LinkGroup),
    DirectoryTree(TreeGroup),
    Navigation(NavigationIndex),
}

impl Group {
    /// URL of the page or feed this group renders to, when it has one.
    ///
    /// The navigation index is a lookup table, not a page.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Html(g) => Some(&g.url),
            Self::Rss(g) => Some(&g.url),
            Self::Links(g) => Some(&g.url),
            Self::DirectoryTree(g) => Some(&g.url),
            Self::Navigation(_) => None,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation(_))
    }
}

/// A page of items rendered through an HTML template.
#[derive(Debug, Clone)]
pub struct HtmlGroup {
    pub items: Vec<Arc<Item>>,
    pub title: String,
    pub url: String,
    pub template: String,
    /// Grouping key (year, tag slug, page number), when the group has one.
    pub key: Option<String>,
    /// Preceding page in a pagination chain, absent on page 0.
    pub prev_url: Option<String>,
    /// Following page in a pagination chain, absent on the last page.
    pub next_url: Option<String>,
    /// Companion RSS feed advertised on the page.
    pub rss_url: Option<String>,
}

/// A feed of items for the XML writer.
#[derive(Debug, Clone)]
pub struct RssGroup {
    pub items: Vec<Arc<Item>>,
    pub title: String,
    pub url: String,
    pub key: Option<String>,
}

/// A flat list of links (archives overview, tag overview).
#[derive(Debug, Clone)]
pub struct LinkGroup {
    pub links: Vec<LinkItem>,
    pub title: String,
    pub url: String,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub title: String,
    pub url: String,
    /// Link class shown next to the title (`tag`, `category`).
    pub kind: Option<String>,
    /// Number of posts behind the link.
    pub count: Option<usize>,
}

/// One directory level of a listing tree.
#[derive(Debug, Clone)]
pub struct TreeGroup {
    pub entries: Vec<TreeEntry>,
    pub title: String,
    pub url: String,
    pub template: String,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: TreeEntryKind,
    pub title: String,
    pub url: String,
    /// Path elements relative to the tree root; dedup key when joined.
    pub path: Vec<String>,
}

impl TreeEntry {
    /// Joined path, the set-semantics identity of an entry.
    pub fn joined_path(&self) -> String {
        self.path.join("/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeEntryKind {
    /// Synthetic directory node. Sorts before items.
    Directory,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub title: String,
    pub url: String,
}

/// Previous/next adjacency over posts, keyed by source path.
#[derive(Debug, Clone, Default)]
pub struct NavigationIndex {
    entries: FxHashMap<String, NavSlot>,
}

#[derive(Debug, Clone, Default)]
pub struct NavSlot {
    /// Older neighbor, absent for the oldest post.
    pub prev: Option<NavLink>,
    /// Newer neighbor, absent for the newest post.
    pub next: Option<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

impl NavLink {
    pub fn for_item(item: &Item) -> Self {
        Self {
            title: item.title().to_string(),
            url: item.url.clone(),
        }
    }
}

impl NavigationIndex {
    pub fn insert(&mut self, source_key: String, slot: NavSlot) {
        self.entries.insert(source_key, slot);
    }

    pub fn get(&self, source_key: &str) -> Option<&NavSlot> {
        self.entries.get(source_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_entry_joined_path() {
        let leaf = TreeEntry {
            kind: TreeEntryKind::Item,
            title: "util.py".into(),
            url: "/listings/tools/util.py.html".into(),
            path: vec!["tools".into(), "util.py".into()],
        };
        assert_eq!(leaf.joined_path(), "tools/util.py");
    }

    #[test]
    fn test_directory_sorts_before_item() {
        assert!(TreeEntryKind::Directory < TreeEntryKind::Item);
    }

    #[test]
    fn test_navigation_index_lookup() {
        let mut index = NavigationIndex::default();
        index.insert(
            "content/posts/a.md".into(),
            NavSlot {
                prev: None,
                next: Some(NavLink {
                    title: "B".into(),
                    url: "/blog/b/".into(),
                }),
            },
        );
        let slot = index.get("content/posts/a.md").unwrap();
        assert!(slot.prev.is_none());
        assert_eq!(slot.next.as_ref().unwrap().title, "B");
        assert!(index.get("missing").is_none());
    }
}
