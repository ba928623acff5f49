//! Flat overview lists: galleries, guides and projects.

use super::{GroupError, GroupFormatter, ItemGrouper, PostGrouper};
use crate::{
    groups::Group,
    items::{Item, ItemType},
};
use std::sync::Arc;

/// All galleries, sorted by title, on one page.
pub struct GalleryIndexGrouper {
    formatter: GroupFormatter,
}

impl GalleryIndexGrouper {
    pub fn new(formatter: GroupFormatter) -> Self {
        Self { formatter }
    }
}

impl ItemGrouper for GalleryIndexGrouper {
    fn group_items(&self, items: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let mut galleries: Vec<Arc<Item>> = items
            .iter()
            .filter(|item| item.item_type == ItemType::Gallery)
            .cloned()
            .collect();
        galleries.sort_by(|a, b| a.title().cmp(b.title()));

        Ok(vec![Group::Html(self.formatter.html_list_group(
            galleries,
            "Galleries",
            "/galleries/",
            "item_list.liquid",
            None,
        ))])
    }
}

/// Posts carrying guide metadata, most recently touched first.
pub struct GuideGrouper {
    formatter: GroupFormatter,
}

impl GuideGrouper {
    pub fn new(formatter: GroupFormatter) -> Self {
        Self { formatter }
    }
}

impl PostGrouper for GuideGrouper {
    fn group_posts(&self, posts: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let mut guides: Vec<Arc<Item>> = posts
            .iter()
            .filter(|post| post.meta.guide.is_some())
            .cloned()
            .collect();
        guides.sort_by(|a, b| b.updated_or_published().cmp(&a.updated_or_published()));

        Ok(vec![Group::Html(self.formatter.html_list_group(
            guides,
            "Guides",
            "/guides/",
            "guide_index.liquid",
            None,
        ))])
    }
}

/// Project items ordered by their explicit sort key, then title.
pub struct ProjectGrouper {
    formatter: GroupFormatter,
}

impl ProjectGrouper {
    pub fn new(formatter: GroupFormatter) -> Self {
        Self { formatter }
    }
}

impl ItemGrouper for ProjectGrouper {
    fn group_items(&self, items: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let mut projects: Vec<Arc<Item>> = items
            .iter()
            .filter(|item| item.item_type == ItemType::Project)
            .cloned()
            .collect();
        projects.sort_by(|a, b| {
            let a_sort = a.meta.project.as_ref().map_or(i64::MAX, |p| p.sort);
            let b_sort = b.meta.project.as_ref().map_or(i64::MAX, |p| p.sort);
            a_sort.cmp(&b_sort).then_with(|| a.title().cmp(b.title()))
        });

        Ok(vec![Group::Html(self.formatter.html_list_group(
            projects,
            "Projects",
            "/projects/",
            "project_list.liquid",
            None,
        ))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScanPattern, SiteConfig};
    use crate::grouping::test_support::*;
    use crate::meta::{GuideMeta, ProjectMeta};
    use std::sync::OnceLock;

    fn formatter() -> GroupFormatter {
        GroupFormatter::new(Box::leak(Box::new(SiteConfig::default())))
    }

    fn project_pattern() -> &'static ScanPattern {
        static PATTERN: OnceLock<&'static ScanPattern> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Box::leak(Box::new(ScanPattern {
                start: "projects".into(),
                glob: "*.md".into(),
                item_type: ItemType::Project,
                renderer: "markdown".into(),
                template: "project.liquid".into(),
                target: "projects".into(),
                pretty_urls: true,
                teasers: false,
                sitemap: true,
            }))
        })
    }

    fn project(name: &str, sort: i64) -> Item {
        let mut p = item(project_pattern(), name, 1);
        p.meta.project = Some(ProjectMeta {
            sort,
            dev_status: 5,
            featured: false,
            download: None,
            github: None,
            bug_tracker: None,
            role: None,
            license: None,
            language: None,
            logo: None,
        });
        p
    }

    #[test]
    fn test_projects_sorted_by_sort_then_title() {
        let grouper = ProjectGrouper::new(formatter());
        let items = arc_items(vec![
            project("zeta.md", 1),
            project("beta.md", 2),
            project("alpha.md", 1),
        ]);
        let groups = grouper.group_items(&items).unwrap();
        let Group::Html(list) = &groups[0] else {
            panic!("expected HTML group");
        };
        assert_eq!(list.url, "/projects/");
        let titles: Vec<&str> = list.items.iter().map(|i| i.title()).collect();
        assert_eq!(titles, ["alpha", "zeta", "beta"]);
    }

    #[test]
    fn test_guides_filtered_and_sorted() {
        let grouper = GuideGrouper::new(formatter());
        let mut guide_old = item(post_pattern(), "old-guide.md", 1);
        guide_old.meta.guide = Some(GuideMeta {
            effect: "x".into(),
            platform: "y".into(),
            topic: "z".into(),
        });
        let mut guide_new = item(post_pattern(), "new-guide.md", 5);
        guide_new.meta.guide = guide_old.meta.guide.clone();
        let plain = item(post_pattern(), "plain.md", 9);

        let groups = grouper
            .group_posts(&arc_items(vec![plain, guide_old, guide_new]))
            .unwrap();
        let Group::Html(list) = &groups[0] else {
            panic!("expected HTML group");
        };
        assert_eq!(list.title, "Guides");
        let titles: Vec<&str> = list.items.iter().map(|i| i.title()).collect();
        assert_eq!(titles, ["new-guide", "old-guide"]);
    }

    #[test]
    fn test_galleries_sorted_by_title() {
        static PATTERN: OnceLock<&'static ScanPattern> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Box::leak(Box::new(ScanPattern {
                start: "galleries".into(),
                glob: "*.tsv".into(),
                item_type: ItemType::Gallery,
                renderer: "gallery".into(),
                template: "gallery.liquid".into(),
                target: "galleries".into(),
                pretty_urls: true,
                teasers: false,
                sitemap: true,
            }))
        });
        let grouper = GalleryIndexGrouper::new(formatter());
        let items = arc_items(vec![
            item(pattern, "winter.tsv", 1),
            item(pattern, "autumn.tsv", 2),
        ]);
        let groups = grouper.group_items(&items).unwrap();
        let Group::Html(list) = &groups[0] else {
            panic!("expected HTML group");
        };
        let titles: Vec<&str> = list.items.iter().map(|i| i.title()).collect();
        assert_eq!(titles, ["autumn", "winter"]);
    }
}
