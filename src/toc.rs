//! Table of contents construction.
//!
//! Renderers collect the flat heading sequence of a document; this module
//! folds it into a forest. Folding runs level by level, deepest first:
//! every pending root at the current level is absorbed by its immediate
//! predecessor when that predecessor is shallower. Headings with no
//! shallower predecessor stay roots, so a document that opens with an h3
//! still produces a sensible tree.

use serde::Serialize;

/// One heading as collected by a renderer, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub anchor: String,
    pub title: String,
    pub level: u8,
}

/// A node of the table of contents forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub anchor: String,
    pub title: String,
    pub level: u8,
    pub children: Vec<TocNode>,
}

impl From<&Heading> for TocNode {
    fn from(heading: &Heading) -> Self {
        Self {
            anchor: heading.anchor.clone(),
            title: heading.title.clone(),
            level: heading.level,
            children: Vec::new(),
        }
    }
}

/// Fold a flat heading sequence into a forest.
///
/// Child order equals document order at every depth. Only levels 2..=6
/// ever nest; h1 headings always stay roots.
pub fn build_tree(headings: &[Heading]) -> Vec<TocNode> {
    let mut pending: Vec<TocNode> = headings.iter().map(TocNode::from).collect();

    let mut floor = u8::MAX;
    loop {
        let Some(deepest) = pending
            .iter()
            .map(|node| node.level)
            .filter(|&level| level >= 2 && level < floor)
            .max()
        else {
            break;
        };
        pending = fold_level(pending, deepest);
        floor = deepest;
    }

    pending
}

/// One folding pass: absorb every root at `level` into its immediate
/// predecessor when that predecessor is strictly shallower.
fn fold_level(nodes: Vec<TocNode>, level: u8) -> Vec<TocNode> {
    let mut kept: Vec<TocNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.level == level
            && let Some(prev) = kept.last_mut()
            && prev.level < level
        {
            prev.children.push(node);
            continue;
        }
        kept.push(node);
    }
    kept
}
