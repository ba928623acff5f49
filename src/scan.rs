//! Content scanning.
//!
//! Each scan pattern walks its start directory recursively and claims
//! the files matching its glob. Claimed files are read, normalized to
//! `\n` line endings and run through metadata resolution in parallel.

use crate::{config::SiteConfig, items::RawItem, log, meta::MetaResolver};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::Path, path::PathBuf};
use walkdir::WalkDir;

pub struct ItemScanner {
    config: &'static SiteConfig,
    resolver: MetaResolver,
}

impl ItemScanner {
    pub fn new(config: &'static SiteConfig, resolver: MetaResolver) -> Self {
        Self { config, resolver }
    }

    /// Scan all patterns and produce raw items. Order is unspecified.
    pub fn scan(&self) -> Result<Vec<RawItem>> {
        let mut candidates: Vec<(&'static crate::config::ScanPattern, PathBuf, Vec<String>)> =
            Vec::new();

        for pattern in &self.config.patterns {
            let top = self.config.build.source.join(&pattern.start);
            for entry in WalkDir::new(&top) {
                let entry = entry.with_context(|| format!("failed to scan {}", top.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if !pattern.matches(&name) {
                    continue;
                }
                let elements = path_elements(entry.path(), &top);
                candidates.push((pattern, entry.into_path(), elements));
            }
        }

        log!("scan"; "found {} content files", candidates.len());

        candidates
            .into_par_iter()
            .map(|(pattern, path, path_elements)| self.load(pattern, path, path_elements))
            .collect()
    }

    fn load(
        &self,
        pattern: &'static crate::config::ScanPattern,
        path: PathBuf,
        path_elements: Vec<String>,
    ) -> Result<RawItem> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = normalize_newlines(&raw);

        let (meta, body) = self.resolver.resolve(&source, &path, pattern.item_type)?;

        Ok(RawItem {
            item_type: pattern.item_type,
            pattern,
            source_path: path,
            path_elements,
            meta,
            source: body,
        })
    }
}

/// Path components below the pattern's start directory.
fn path_elements(path: &Path, top: &Path) -> Vec<String> {
    path.strip_prefix(top)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}

fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}
