//! Main blog index and site-wide RSS feed.

use super::{GroupError, GroupFormatter, PostGrouper};
use crate::{config::SiteConfig, groups::Group, items::Item};
use std::sync::Arc;

pub struct IndexGrouper {
    config: &'static SiteConfig,
    formatter: GroupFormatter,
}

impl IndexGrouper {
    pub fn new(config: &'static SiteConfig, formatter: GroupFormatter) -> Self {
        Self { config, formatter }
    }
}

impl PostGrouper for IndexGrouper {
    fn group_posts(&self, posts: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let mut groups: Vec<Group> = self
            .formatter
            .html_index_groups(posts, "Blog", "/", "index.liquid", None, None)
            .into_iter()
            .map(Group::Html)
            .collect();

        groups.push(Group::Rss(self.formatter.rss_feed(
            posts,
            &self.config.base.title,
            "/rss.xml",
            None,
        )));

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::test_support::*;

    fn grouper() -> IndexGrouper {
        let config: &'static SiteConfig = Box::leak(Box::new(SiteConfig {
            base: crate::config::BaseConfig {
                title: "My Site".into(),
                ..Default::default()
            },
            ..Default::default()
        }));
        IndexGrouper::new(config, GroupFormatter::new(config))
    }

    #[test]
    fn test_index_and_feed() {
        let posts = arc_items((1..=12).map(|d| item(post_pattern(), &format!("p{d:02}.md"), d)).collect());
        let groups = grouper().group_posts(&posts).unwrap();

        let pages: Vec<_> = groups
            .iter()
            .filter_map(|g| match g {
                Group::Html(h) => Some(h),
                _ => None,
            })
            .collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].url, "/");
        assert_eq!(pages[0].title, "Blog");

        let feed = groups
            .iter()
            .find_map(|g| match g {
                Group::Rss(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert_eq!(feed.url, "/rss.xml");
        assert_eq!(feed.title, "My Site");
        assert_eq!(feed.items.len(), 10);
    }
}
