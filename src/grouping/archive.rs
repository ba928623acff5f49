//! Year archives.
//!
//! One HTML list per publication year plus a single "Archives" overview
//! sorted descending by year, with per-year post counts.

use super::{GroupError, GroupFormatter, PostGrouper};
use crate::{
    groups::{Group, LinkGroup, LinkItem},
    items::Item,
};
use chrono::Datelike;
use std::{collections::BTreeMap, sync::Arc};

pub struct ArchiveGrouper {
    formatter: GroupFormatter,
}

impl ArchiveGrouper {
    pub fn new(formatter: GroupFormatter) -> Self {
        Self { formatter }
    }
}

impl PostGrouper for ArchiveGrouper {
    fn group_posts(&self, posts: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_year: BTreeMap<i32, Vec<Arc<Item>>> = BTreeMap::new();
        for post in posts {
            by_year
                .entry(post.published().year())
                .or_default()
                .push(post.clone());
        }

        // Newest year first, both for the groups and the overview
        let mut groups = Vec::new();
        let mut links = Vec::new();
        for (year, year_posts) in by_year.into_iter().rev() {
            let url = format!("/blog/{year}/");
            links.push(LinkItem {
                title: year.to_string(),
                url: url.clone(),
                kind: None,
                count: Some(year_posts.len()),
            });
            groups.push(Group::Html(self.formatter.html_list_group(
                year_posts,
                &format!("Posts for the year {year}"),
                &url,
                "item_list.liquid",
                Some(year.to_string()),
            )));
        }

        groups.push(Group::Links(LinkGroup {
            links,
            title: "Archives".into(),
            url: "/blog/".into(),
            template: "link_list.liquid".into(),
        }));

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::test_support::*;
    use crate::config::SiteConfig;
    use chrono::{TimeZone, Utc};

    fn grouper() -> ArchiveGrouper {
        ArchiveGrouper::new(GroupFormatter::new(Box::leak(Box::new(SiteConfig::default()))))
    }

    fn post_in_year(name: &str, year: i32) -> Item {
        let mut post = item(post_pattern(), name, 1);
        post.meta.published = Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap();
        post
    }

    #[test]
    fn test_year_buckets_and_overview() {
        let posts = arc_items(vec![
            post_in_year("a.md", 2023),
            post_in_year("b.md", 2024),
            post_in_year("c.md", 2024),
        ]);
        let groups = grouper().group_posts(&posts).unwrap();
        assert_eq!(groups.len(), 3);

        let Group::Html(first) = &groups[0] else {
            panic!("expected HTML group");
        };
        assert_eq!(first.title, "Posts for the year 2024");
        assert_eq!(first.url, "/blog/2024/");
        assert_eq!(first.key.as_deref(), Some("2024"));
        assert_eq!(first.items.len(), 2);

        let Group::Links(overview) = groups.last().unwrap() else {
            panic!("expected link group");
        };
        assert_eq!(overview.title, "Archives");
        assert_eq!(overview.url, "/blog/");
        // Descending by year, with counts
        assert_eq!(overview.links[0].title, "2024");
        assert_eq!(overview.links[0].count, Some(2));
        assert_eq!(overview.links[1].title, "2023");
        assert_eq!(overview.links[1].count, Some(1));
    }

    #[test]
    fn test_no_posts_no_groups() {
        assert!(grouper().group_posts(&[]).unwrap().is_empty());
    }
}
