//! Code listing renderer.
//!
//! Listings are raw source files highlighted wholesale. They render as a
//! bulk partition so the whole set goes to the highlighter in one batch;
//! results are re-associated by correlation id, not response order.

use super::{BulkRenderer, RenderError, RenderOutput};
use crate::{highlight::HighlightCache, items::RawItem};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub struct ListingRenderer {
    highlight: Arc<HighlightCache>,
}

impl ListingRenderer {
    pub fn new(highlight: Arc<HighlightCache>) -> Self {
        Self { highlight }
    }
}

impl BulkRenderer for ListingRenderer {
    fn render_bulk(&self, items: &[RawItem]) -> Result<Vec<RenderOutput>, RenderError> {
        let requests: Vec<_> = items
            .iter()
            .map(|item| {
                // File name, not the full path: it ends up in the
                // rendered output and in highlighter error messages
                let path = item
                    .source_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                HighlightCache::request(item.source.clone(), path, None)
            })
            .collect();
        let ids: Vec<u64> = requests.iter().map(|r| r.id).collect();

        let responses = self.highlight.render_many(requests)?;
        let mut by_id: FxHashMap<u64, String> =
            responses.into_iter().map(|r| (r.id, r.html)).collect();

        items
            .iter()
            .zip(ids)
            .map(|(item, id)| {
                by_id.remove(&id).map(RenderOutput::html).ok_or_else(|| {
                    RenderError::UnmatchedResult(item.source_path.to_string_lossy().into_owned())
                })
            })
            .collect()
    }
}
