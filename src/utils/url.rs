//! URL to filesystem path mapping.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Map a site-absolute URL onto a path under the output root.
///
/// A trailing `/` denotes a folder URL and maps to its `index.html`.
///
/// | URL | Output path |
/// |-----|-------------|
/// | `/` | `public/index.html` |
/// | `/blog/` | `public/blog/index.html` |
/// | `/blog/index-2.html` | `public/blog/index-2.html` |
/// | `/rss.xml` | `public/rss.xml` |
pub fn url_to_output_path(url: &str, output_root: &Path) -> Result<PathBuf> {
    let Some(relative) = url.strip_prefix('/') else {
        bail!("URL `{url}` is not site-absolute");
    };

    let mut path = output_root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    if url.ends_with('/') {
        path.push("index.html");
    }
    Ok(path)
}
