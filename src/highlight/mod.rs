//! Content-addressed cache in front of the highlighting subprocess.
//!
//! Keys are derived from the snippet content, so unchanged code never
//! re-invokes the highlighter across builds. A batch is all-or-nothing:
//! if any snippet fails, the whole batch fails and nothing is cached.

mod service;

pub use service::{
    HIGHLIGHT_TIMEOUT, HighlightError, HighlightRequest, HighlightResponse, HighlightService,
    PygmentsService,
};

use crate::cache::CacheStore;
use rustc_hash::FxHashMap;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Cache namespace; the suffix versions the key scheme.
const NAMESPACE: &str = "highlight:1";

/// Process-wide correlation id counter.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Caching facade over a [`HighlightService`].
pub struct HighlightCache {
    store: Arc<dyn CacheStore>,
    service: Arc<dyn HighlightService>,
}

impl HighlightCache {
    pub fn new(store: Arc<dyn CacheStore>, service: Arc<dyn HighlightService>) -> Self {
        Self { store, service }
    }

    /// Build a request with a fresh correlation id.
    pub fn request(
        source: impl Into<String>,
        path: Option<String>,
        language: Option<String>,
    ) -> HighlightRequest {
        HighlightRequest {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            path,
            source: source.into(),
            language,
        }
    }

    /// Highlight a single snippet, using the cache.
    pub fn render(
        &self,
        source: &str,
        path: Option<String>,
        language: Option<String>,
    ) -> Result<String, HighlightError> {
        let request = Self::request(source, path, language);
        let mut responses = self.render_many(vec![request])?;
        match responses.pop() {
            Some(response) => Ok(response.html),
            None => Err(HighlightError::Protocol("empty response batch".into())),
        }
    }

    /// Highlight a batch, using the cache.
    ///
    /// Hits are answered locally; all misses go out in a single external
    /// call. Responses come back in request order, correlated by id. If
    /// any miss fails, the whole call fails and no result is cached, so
    /// a rerun retries every snippet of the batch.
    pub fn render_many(
        &self,
        requests: Vec<HighlightRequest>,
    ) -> Result<Vec<HighlightResponse>, HighlightError> {
        let mut hits: FxHashMap<u64, HighlightResponse> = FxHashMap::default();
        let mut misses: Vec<(String, HighlightRequest)> = Vec::new();

        for request in &requests {
            let key = cache_key(&request.source, request.path.as_deref(), request.language.as_deref());
            match self.store.get(NAMESPACE, &key) {
                Some(html) => {
                    hits.insert(
                        request.id,
                        HighlightResponse {
                            id: request.id,
                            path: request.path.clone(),
                            success: true,
                            html,
                        },
                    );
                }
                None => misses.push((key, request.clone())),
            }
        }

        if !misses.is_empty() {
            let batch: Vec<HighlightRequest> =
                misses.iter().map(|(_, request)| request.clone()).collect();
            let responses = self.service.render_batch(&batch)?;

            let mut by_id: FxHashMap<u64, HighlightResponse> =
                responses.into_iter().map(|r| (r.id, r)).collect();

            // Correlate before caching so a partial failure caches nothing
            let mut fresh: Vec<(String, HighlightResponse)> = Vec::with_capacity(misses.len());
            let mut failures = Vec::new();
            for (key, request) in misses {
                let Some(response) = by_id.remove(&request.id) else {
                    return Err(HighlightError::Protocol(format!(
                        "no response for request id {}",
                        request.id
                    )));
                };
                if response.success {
                    fresh.push((key, response));
                } else {
                    failures.push(format!("{}: {}", response.label(), response.html));
                }
            }
            if !failures.is_empty() {
                return Err(HighlightError::RenderFailed(failures));
            }

            for (key, response) in fresh {
                self.store.set(NAMESPACE, &key, Some(response.html.clone()));
                hits.insert(response.id, response);
            }
        }

        requests
            .iter()
            .map(|request| {
                hits.remove(&request.id).ok_or_else(|| {
                    HighlightError::Protocol(format!("lost response for request id {}", request.id))
                })
            })
            .collect()
    }
}

/// `blake3(source)` in lowercase hex, then path and language.
///
/// Path and language are part of the key because the highlighter output
/// depends on both (language selection and error labeling).
fn cache_key(source: &str, path: Option<&str>, language: Option<&str>) -> String {
    let hash = hex::encode(blake3::hash(source.as_bytes()).as_bytes());
    format!(
        "{hash}|{}|{}",
        path.unwrap_or_default(),
        language.unwrap_or_default()
    )
}
