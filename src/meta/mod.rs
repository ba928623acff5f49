//! Metadata resolution with extractor fallback.
//!
//! [`MetaResolver`] runs a prioritized extractor chain over a content
//! file. The last extractor in the chain is the designated fallback; it
//! derives metadata purely from filesystem facts and must always succeed.
//! Field values read through a fallback-chained lookup: the winning
//! extractor's map first, the filesystem map second.
//!
//! ```text
//! raw source ──► YamlExtractor ──(none/error)──► ... ──► FsExtractor
//!                     │                                     │
//!                (first hit wins)                    (always present)
//!                     └──────────── FallbackChain ──────────┘
//!                                        │
//!                                    ItemMeta
//! ```

mod extract;
mod value;

pub use extract::{FsExtractor, MetaExtractor, YamlExtractor};
pub use value::{FallbackChain, MetaMap, MetaValue, parse_date};

use crate::{items::ItemType, log};
use chrono::{DateTime, Utc};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Fatal metadata resolution errors. Extractor failures are not listed
/// here: they are recoverable and only logged.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("`{field}` is missing or empty for {path}")]
    MissingField { field: String, path: String },

    #[error("`{field}` in {path}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
        path: String,
    },

    /// The terminal fallback extractor broke its contract. This is an
    /// integration error, not a content error.
    #[error("fallback extractor `{0}` did not return any metadata")]
    FallbackContract(&'static str),
}

// ============================================================================
// Resolved Metadata
// ============================================================================

/// Fully resolved metadata for one content item.
#[derive(Debug, Clone)]
pub struct ItemMeta {
    pub title: String,
    pub published: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    /// Sorted case-insensitively on resolution.
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub template: Option<String>,
    pub comments: bool,
    pub guide: Option<GuideMeta>,
    pub project: Option<ProjectMeta>,
    /// The winning extractor's raw field map, for template access.
    pub custom: MetaMap,
}

impl ItemMeta {
    pub fn updated_or_published(&self) -> DateTime<Utc> {
        self.updated.unwrap_or(self.published)
    }
}

/// Guide classification, present when `guide: true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideMeta {
    pub effect: String,
    pub platform: String,
    pub topic: String,
}

/// Project metadata, parsed for Project items only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMeta {
    pub sort: i64,
    pub dev_status: i64,
    pub featured: bool,
    pub download: Option<String>,
    pub github: Option<String>,
    pub bug_tracker: Option<String>,
    pub role: Option<String>,
    pub license: Option<String>,
    pub language: Option<String>,
    pub logo: Option<String>,
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves item metadata via a prioritized, fallback-capable chain.
pub struct MetaResolver {
    extractors: Vec<Box<dyn MetaExtractor>>,
    fallback: Box<dyn MetaExtractor>,
}

impl MetaResolver {
    /// Build a resolver from an ordered chain. The last element is the
    /// terminal fallback.
    ///
    /// # Panics
    /// Panics if the chain is empty; wiring without a fallback is a
    /// programming error caught at startup.
    pub fn new(mut chain: Vec<Box<dyn MetaExtractor>>) -> Self {
        assert!(!chain.is_empty(), "extractor chain must not be empty");
        let fallback = chain.pop().unwrap();
        Self {
            extractors: chain,
            fallback,
        }
    }

    /// The default chain: YAML front matter, then filesystem facts.
    pub fn with_defaults() -> Self {
        Self::new(vec![Box::new(YamlExtractor), Box::new(FsExtractor)])
    }

    /// Resolve metadata and the content body for one file.
    pub fn resolve(
        &self,
        source: &str,
        path: &std::path::Path,
        item_type: ItemType,
    ) -> Result<(ItemMeta, String), MetaError> {
        let path_str = path.to_string_lossy();

        let fallback_meta = self
            .fallback
            .extract(source, path, item_type)
            .ok()
            .flatten()
            .filter(|m| !m.is_empty())
            .ok_or(MetaError::FallbackContract(self.fallback.name()))?;

        let mut source_meta = MetaMap::new();
        let mut body = String::new();

        for extractor in &self.extractors {
            if !extractor.supports(item_type) {
                continue;
            }
            let candidate = match extractor.extract(source, path, item_type) {
                Ok(candidate) => candidate,
                Err(err) => {
                    log!("meta"; "extractor {} failed on {}: {}", extractor.name(), path_str, err);
                    continue;
                }
            };
            if let Some(candidate) = candidate {
                body = extractor.content_body(source, path);
                source_meta = candidate;
                break;
            }
        }

        if source_meta.is_empty() || body.trim().is_empty() {
            body = self.fallback.content_body(source, path);
        }

        let reader = FallbackChain::new(&source_meta, &fallback_meta, &path_str);

        let guide = if reader.boolean("guide")? == Some(true) {
            Some(Self::parse_guide(&reader)?)
        } else {
            None
        };
        let project = if item_type == ItemType::Project {
            Some(Self::parse_project(&reader)?)
        } else {
            None
        };

        let meta = ItemMeta {
            title: reader.required_string("title")?,
            published: reader.required_date("published")?,
            updated: reader.date("updated")?,
            tags: reader.tags("tags")?,
            category: reader.string("category"),
            description: reader.string("description"),
            thumbnail: reader.string("thumbnail"),
            template: reader.string("template"),
            comments: reader.boolean("comments")?.unwrap_or(true),
            guide,
            project,
            custom: source_meta,
        };

        Ok((meta, body))
    }

    fn parse_guide(reader: &FallbackChain<'_>) -> Result<GuideMeta, MetaError> {
        Ok(GuideMeta {
            effect: reader.required_string("guideEffect")?,
            platform: reader.required_string("guidePlatform")?,
            topic: reader.required_string("guideTopic")?,
        })
    }

    fn parse_project(reader: &FallbackChain<'_>) -> Result<ProjectMeta, MetaError> {
        Ok(ProjectMeta {
            sort: reader.required_number("sort")?,
            dev_status: reader.required_number("devstatus")?,
            featured: reader.boolean("featured")?.unwrap_or(false),
            download: reader.string("download"),
            github: reader.string("github"),
            bug_tracker: reader.string("bugtracker"),
            role: reader.string("role"),
            license: reader.string("license"),
            language: reader.string("language"),
            logo: reader.string("logo"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::io::Write;
    use std::path::Path;

    // ========================================================================
    // Test extractors
    // ========================================================================

    /// Extractor that always errors, to exercise the skip-and-continue path.
    struct FailingExtractor;

    impl MetaExtractor for FailingExtractor {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn supports(&self, _item_type: ItemType) -> bool {
            true
        }
        fn extract(&self, _s: &str, _p: &Path, _t: ItemType) -> anyhow::Result<Option<MetaMap>> {
            Err(anyhow!("deliberate failure"))
        }
        fn content_body(&self, _s: &str, _p: &Path) -> String {
            unreachable!("failing extractor never wins")
        }
    }

    /// Fallback that returns nothing, violating its contract.
    struct BrokenFallback;

    impl MetaExtractor for BrokenFallback {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn supports(&self, _item_type: ItemType) -> bool {
            true
        }
        fn extract(&self, _s: &str, _p: &Path, _t: ItemType) -> anyhow::Result<Option<MetaMap>> {
            Ok(None)
        }
        fn content_body(&self, s: &str, _p: &Path) -> String {
            s.to_string()
        }
    }

    fn temp_md(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::with_suffix(".md").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    #[test]
    fn test_resolve_front_matter_wins() {
        let source = "---\ntitle: My Post\npublished: 2024-05-01\ntags: [Zeta, alpha]\n---\nBody text\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let (meta, body) = resolver
            .resolve(source, file.path(), ItemType::Post)
            .unwrap();

        assert_eq!(meta.title, "My Post");
        assert_eq!(meta.tags, vec!["alpha", "Zeta"]);
        assert!(meta.comments);
        assert_eq!(body, "\nBody text\n");
    }

    #[test]
    fn test_resolve_falls_back_to_filesystem() {
        let source = "No front matter here.\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let (meta, body) = resolver
            .resolve(source, file.path(), ItemType::Page)
            .unwrap();

        // Title comes from the file name, published from file times
        assert!(!meta.title.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn test_resolve_failing_extractor_continues() {
        let source = "plain content\n";
        let file = temp_md(source);
        let resolver = MetaResolver::new(vec![
            Box::new(FailingExtractor),
            Box::new(YamlExtractor),
            Box::new(FsExtractor),
        ]);
        let (meta, _) = resolver
            .resolve(source, file.path(), ItemType::Post)
            .unwrap();
        assert!(!meta.title.is_empty());
    }

    #[test]
    fn test_resolve_broken_fallback_is_fatal() {
        let file = temp_md("x");
        let resolver = MetaResolver::new(vec![Box::new(BrokenFallback)]);
        let err = resolver.resolve("x", file.path(), ItemType::Post).unwrap_err();
        assert!(matches!(err, MetaError::FallbackContract("broken")));
    }

    #[test]
    fn test_resolve_guide_meta() {
        let source = "---\ntitle: T\npublished: 2024-01-01\nguide: true\nguideEffect: speed\nguidePlatform: linux\nguideTopic: kernels\n---\nbody\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let (meta, _) = resolver
            .resolve(source, file.path(), ItemType::Post)
            .unwrap();
        let guide = meta.guide.unwrap();
        assert_eq!(guide.effect, "speed");
        assert_eq!(guide.platform, "linux");
        assert_eq!(guide.topic, "kernels");
    }

    #[test]
    fn test_resolve_guide_missing_field() {
        let source = "---\ntitle: T\npublished: 2024-01-01\nguide: true\n---\nbody\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let err = resolver
            .resolve(source, file.path(), ItemType::Post)
            .unwrap_err();
        assert!(matches!(err, MetaError::MissingField { .. }));
    }

    #[test]
    fn test_resolve_project_meta() {
        let source = "---\ntitle: Tool\npublished: 2024-01-01\nsort: 2\ndevstatus: 5\nfeatured: true\ngithub: https://github.com/x/y\n---\nbody\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let (meta, _) = resolver
            .resolve(source, file.path(), ItemType::Project)
            .unwrap();
        let project = meta.project.unwrap();
        assert_eq!(project.sort, 2);
        assert_eq!(project.dev_status, 5);
        assert!(project.featured);
        assert_eq!(project.github.as_deref(), Some("https://github.com/x/y"));
    }

    #[test]
    fn test_resolve_project_requires_numbers() {
        let source = "---\ntitle: Tool\npublished: 2024-01-01\n---\nbody\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let err = resolver
            .resolve(source, file.path(), ItemType::Project)
            .unwrap_err();
        assert!(matches!(err, MetaError::MissingField { .. }));
    }

    #[test]
    fn test_resolve_field_lookup_case_insensitive() {
        let source = "---\nTitle: Upper Case Key\nPUBLISHED: 2024-02-02\n---\nbody\n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let (meta, _) = resolver
            .resolve(source, file.path(), ItemType::Post)
            .unwrap();
        assert_eq!(meta.title, "Upper Case Key");
    }

    #[test]
    fn test_resolve_empty_front_matter_body_falls_back() {
        // Front matter exists but the remaining body is blank: the body
        // must come from the fallback extractor (the whole source).
        let source = "---\ntitle: T\npublished: 2024-01-01\n---\n   \n";
        let file = temp_md(source);
        let resolver = MetaResolver::with_defaults();
        let (_, body) = resolver
            .resolve(source, file.path(), ItemType::Post)
            .unwrap();
        assert_eq!(body, source);
    }
}
