//! Site structure generation.
//!
//! The engine sorts the rendered items once (published descending, tie
//! broken by source path ascending), extracts the posts, and runs every
//! registered grouper over them. Grouping is pure computation with no
//! I/O; it is deliberately single threaded and deterministic.
//!
//! | Grouper | Input | Output |
//! |---------|-------|--------|
//! | [`IndexGrouper`] | posts | paginated blog index + main RSS feed |
//! | [`ArchiveGrouper`] | posts | per-year lists + archive overview |
//! | [`TagCategoryGrouper`] | posts | tag/category indices, feeds, overview |
//! | [`NavigationGrouper`] | posts | previous/next lookup |
//! | [`GuideGrouper`] | posts | guide overview |
//! | [`ListingIndexGrouper`] | items | directory trees for listings |
//! | [`GalleryIndexGrouper`] | items | gallery overview |
//! | [`ProjectGrouper`] | items | project overview |

mod archive;
mod formatter;
mod index;
mod listing;
mod lists;
mod navigation;
mod tags;

pub use archive::ArchiveGrouper;
pub use formatter::{GroupFormatter, build_breadcrumbs};
pub use index::IndexGrouper;
pub use listing::ListingIndexGrouper;
pub use lists::{GalleryIndexGrouper, GuideGrouper, ProjectGrouper};
pub use navigation::NavigationGrouper;
pub use tags::TagCategoryGrouper;

use crate::{config::SiteConfig, groups::Group, items::Item, items::ItemType};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("some tags or categories have duplicate slugs: {}", .0.join(", "))]
    SlugCollision(Vec<String>),

    #[error("expected exactly one navigation index, found {0}")]
    NavigationCount(usize),
}

/// Grouper over the full item set.
pub trait ItemGrouper: Send + Sync {
    fn group_items(&self, items: &[Arc<Item>]) -> Result<Vec<Group>, GroupError>;
}

/// Grouper over posts only.
pub trait PostGrouper: Send + Sync {
    fn group_posts(&self, posts: &[Arc<Item>]) -> Result<Vec<Group>, GroupError>;
}

/// Runs all registered groupers and enforces structural invariants.
pub struct GroupEngine {
    item_groupers: Vec<Box<dyn ItemGrouper>>,
    post_groupers: Vec<Box<dyn PostGrouper>>,
}

impl GroupEngine {
    pub fn new(
        item_groupers: Vec<Box<dyn ItemGrouper>>,
        post_groupers: Vec<Box<dyn PostGrouper>>,
    ) -> Self {
        Self {
            item_groupers,
            post_groupers,
        }
    }

    /// The full stock grouper set.
    pub fn with_defaults(config: &'static SiteConfig) -> Self {
        let formatter = GroupFormatter::new(config);
        Self::new(
            vec![
                Box::new(ListingIndexGrouper::new(formatter)),
                Box::new(GalleryIndexGrouper::new(formatter)),
                Box::new(ProjectGrouper::new(formatter)),
            ],
            vec![
                Box::new(IndexGrouper::new(config, formatter)),
                Box::new(ArchiveGrouper::new(formatter)),
                Box::new(TagCategoryGrouper::new(config, formatter)),
                Box::new(GuideGrouper::new(formatter)),
                Box::new(NavigationGrouper),
            ],
        )
    }

    /// Generate all groups for the rendered item set. Returns the items
    /// back, sorted and shared, alongside the groups; output writing
    /// needs both.
    #[allow(clippy::type_complexity)]
    pub fn generate(&self, items: Vec<Item>) -> Result<(Vec<Arc<Item>>, Vec<Group>), GroupError> {
        let mut sorted: Vec<Arc<Item>> = items.into_iter().map(Arc::new).collect();
        sorted.sort_by(|a, b| {
            b.published()
                .cmp(&a.published())
                .then_with(|| a.source_path.cmp(&b.source_path))
        });

        let posts: Vec<Arc<Item>> = sorted
            .iter()
            .filter(|item| item.item_type == ItemType::Post)
            .cloned()
            .collect();

        let mut groups = Vec::new();
        for grouper in &self.item_groupers {
            groups.extend(grouper.group_items(&sorted)?);
        }
        for grouper in &self.post_groupers {
            groups.extend(grouper.group_posts(&posts)?);
        }

        let navigation_count = groups.iter().filter(|g| g.is_navigation()).count();
        if navigation_count != 1 {
            return Err(GroupError::NavigationCount(navigation_count));
        }

        Ok((sorted, groups))
    }
}
