//! Tag and category indices.
//!
//! Categories and tags share one slug universe under `/blog/tags/`;
//! categories are distinguished by a `cat_` slug prefix. All slugs are
//! collected before anything is emitted, and any collision, including a
//! tag colliding with a category, aborts the build naming every
//! offending slug.

use super::{GroupError, GroupFormatter, PostGrouper};
use crate::{
    config::SiteConfig,
    groups::{Group, LinkGroup, LinkItem},
    items::Item,
    utils::slug::slugify_with,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

const URL_ROOT: &str = "/blog/tags/";

pub struct TagCategoryGrouper {
    config: &'static SiteConfig,
    formatter: GroupFormatter,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct TagKey {
    name: String,
    slug: String,
    is_category: bool,
}

impl TagKey {
    fn html_url(&self) -> String {
        format!("{URL_ROOT}{}/", self.slug)
    }

    fn rss_url(&self) -> String {
        format!("{URL_ROOT}{}.xml", self.slug)
    }
}

impl TagCategoryGrouper {
    pub fn new(config: &'static SiteConfig, formatter: GroupFormatter) -> Self {
        Self { config, formatter }
    }

    /// Group posts by category key, then by tag key, preserving first
    /// appearance order within each kind.
    fn collect(&self, posts: &[Arc<Item>]) -> Vec<(TagKey, Vec<Arc<Item>>)> {
        let mut buckets: Vec<(TagKey, Vec<Arc<Item>>)> = Vec::new();
        let mut index: FxHashMap<TagKey, usize> = FxHashMap::default();

        let mut push = |key: TagKey, post: &Arc<Item>| {
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                buckets.push((key, Vec::new()));
                buckets.len() - 1
            });
            buckets[slot].1.push(post.clone());
        };

        for post in posts {
            if let Some(category) = &post.meta.category {
                push(
                    TagKey {
                        name: category.clone(),
                        slug: format!("cat_{}", slugify_with(category, &self.config.slugs)),
                        is_category: true,
                    },
                    post,
                );
            }
        }
        for post in posts {
            for tag in &post.meta.tags {
                push(
                    TagKey {
                        name: tag.clone(),
                        slug: slugify_with(tag, &self.config.slugs),
                        is_category: false,
                    },
                    post,
                );
            }
        }
        buckets
    }
}

impl PostGrouper for TagCategoryGrouper {
    fn group_posts(&self, posts: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let buckets = self.collect(posts);
        if buckets.is_empty() {
            return Ok(Vec::new());
        }

        // Slug uniqueness is build-wide, across tags and categories
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        for (key, _) in &buckets {
            *seen.entry(&key.slug).or_default() += 1;
        }
        let mut duplicates: Vec<String> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(slug, _)| format!("'{slug}'"))
            .collect();
        if !duplicates.is_empty() {
            duplicates.sort();
            return Err(GroupError::SlugCollision(duplicates));
        }

        let mut groups = Vec::new();
        for (key, bucket) in &buckets {
            let title = format!("Posts about {}", key.name);
            groups.extend(
                self.formatter
                    .html_index_groups(
                        bucket,
                        &title,
                        &key.html_url(),
                        "tag_index.liquid",
                        Some(&key.slug),
                        Some(&key.rss_url()),
                    )
                    .into_iter()
                    .map(Group::Html),
            );
            groups.push(Group::Rss(self.formatter.rss_feed(
                bucket,
                &title,
                &key.rss_url(),
                Some(key.slug.clone()),
            )));
        }

        let mut links: Vec<LinkItem> = buckets
            .iter()
            .map(|(key, bucket)| LinkItem {
                title: key.name.clone(),
                url: key.html_url(),
                kind: Some(if key.is_category { "category" } else { "tag" }.to_string()),
                count: Some(bucket.len()),
            })
            .collect();
        links.sort_by(|a, b| a.title.cmp(&b.title));

        groups.push(Group::Links(LinkGroup {
            links,
            title: "Tags and Categories".into(),
            url: URL_ROOT.into(),
            template: "tag_list.liquid".into(),
        }));

        Ok(groups)
    }
}
