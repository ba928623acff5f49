//! Markdown renderer.
//!
//! Standard CommonMark plus tables, footnotes, strikethrough and heading
//! attributes. Two event rewrites happen before HTML emission: fenced
//! code blocks are replaced with highlighter output, and headings get an
//! `id` (explicit `{#id}` attribute, or a deduplicated slug of the
//! heading text) so the table of contents can link to them.

use super::{RenderOutput, SingleRenderer};
use crate::{
    highlight::HighlightCache,
    items::RawItem,
    toc::Heading,
    utils::slug::slugify,
};
use anyhow::Result;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub struct MarkdownRenderer {
    highlight: Arc<HighlightCache>,
}

impl MarkdownRenderer {
    pub fn new(highlight: Arc<HighlightCache>) -> Self {
        Self { highlight }
    }

    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
    }
}

impl SingleRenderer for MarkdownRenderer {
    fn render(&self, item: &RawItem) -> Result<RenderOutput> {
        let events: Vec<Event> = Parser::new_ext(&item.source, Self::options()).collect();
        let mut out: Vec<Event> = Vec::with_capacity(events.len());
        let mut headings = Vec::new();
        let mut anchors = AnchorSet::default();

        let mut i = 0;
        while i < events.len() {
            match &events[i] {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                    let language = (!lang.is_empty()).then(|| lang.to_string());
                    let mut code = String::new();
                    let mut j = i + 1;
                    while j < events.len() && !matches!(events[j], Event::End(TagEnd::CodeBlock)) {
                        if let Event::Text(text) = &events[j] {
                            code.push_str(text);
                        }
                        j += 1;
                    }

                    let path = item
                        .source_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned());
                    let highlighted = self.highlight.render(&code, path, language)?;
                    out.push(Event::Html(highlighted.into()));
                    i = j + 1;
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    let mut title = String::new();
                    let mut j = i + 1;
                    while j < events.len() && !matches!(events[j], Event::End(TagEnd::Heading(_))) {
                        match &events[j] {
                            Event::Text(text) | Event::Code(text) => title.push_str(text),
                            _ => {}
                        }
                        j += 1;
                    }

                    let anchor = match id {
                        Some(explicit) => anchors.claim(explicit.to_string()),
                        None => anchors.claim(slugify(&title)),
                    };
                    headings.push(Heading {
                        anchor: anchor.clone(),
                        title,
                        level: *level as u8,
                    });

                    out.push(Event::Start(Tag::Heading {
                        level: *level,
                        id: Some(anchor.into()),
                        classes: classes.clone(),
                        attrs: attrs.clone(),
                    }));
                    out.extend(events[i + 1..=j.min(events.len() - 1)].iter().cloned());
                    i = j + 1;
                }
                event => {
                    out.push(event.clone());
                    i += 1;
                }
            }
        }

        let mut body = String::with_capacity(item.source.len() * 2);
        html::push_html(&mut body, out.into_iter());

        Ok(RenderOutput {
            html: body,
            rich: None,
            headings,
        })
    }
}

/// Tracks claimed anchors; repeated slugs get a numeric suffix.
#[derive(Default)]
struct AnchorSet {
    seen: FxHashMap<String, usize>,
}

impl AnchorSet {
    fn claim(&mut self, base: String) -> String {
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        if !self.seen.contains_key(&base) {
            self.seen.insert(base.clone(), 0);
            return base;
        }
        let mut n = self.seen[&base];
        loop {
            n += 1;
            let candidate = format!("{base}-{n}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(base.clone(), n);
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}
