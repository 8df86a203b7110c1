//! Outline tree construction.
//!
//! Headings are nested in a single left-to-right pass. The open ancestor
//! chain is always the rightmost spine of the tree, so the builder only
//! tracks the levels along that spine and walks `last_mut()` links to find
//! the attachment point.

use serde::Serialize;

use crate::flatten::Flatten;
use crate::threshold::{MAX_LEVEL, MIN_LEVEL, Threshold};

/// A heading supplied by the markup parser, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingElement<C> {
    /// Heading level (1-6).
    pub level: u8,
    /// Renderable heading content.
    pub content: C,
}

impl<C> HeadingElement<C> {
    /// Create a heading element.
    pub fn new(level: u8, content: C) -> Self {
        Self { level, content }
    }
}

/// A heading placed in the outline, with the deeper headings it contains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutlineNode<C> {
    /// Heading level (1-6).
    pub level: u8,
    /// Content taken from the source heading.
    pub content: C,
    /// Nested headings in document order, each deeper than this one.
    pub children: Vec<OutlineNode<C>>,
}

impl<C> OutlineNode<C> {
    fn leaf(heading: HeadingElement<C>) -> Self {
        Self {
            level: heading.level,
            content: heading.content,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Hierarchical outline of one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineTree<C> {
    roots: Vec<OutlineNode<C>>,
    threshold: Threshold,
}

impl<C> OutlineTree<C> {
    /// Top-level nodes in document order.
    #[must_use]
    pub fn roots(&self) -> &[OutlineNode<C>] {
        &self.roots
    }

    /// Consume the tree, returning its top-level nodes.
    #[must_use]
    pub fn into_roots(self) -> Vec<OutlineNode<C>> {
        self.roots
    }

    /// Threshold the tree was built with.
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(OutlineNode::node_count).sum()
    }

    /// Iterate all nodes grouped by level, shallowest first.
    ///
    /// Within a level, nodes appear in document order regardless of which
    /// parent holds them. The iterator borrows the tree and can be recreated
    /// any number of times.
    #[must_use]
    pub fn flatten(&self) -> Flatten<'_, C> {
        Flatten::new(&self.roots, self.threshold.get())
    }
}

/// Build an outline from headings in document order.
///
/// Headings deeper than `threshold` are dropped before nesting, so they never
/// appear in the tree and never affect where other headings attach.
///
/// Heading levels must be within `1..=6`; the markup parser guarantees this.
pub fn build_outline<C, I>(headings: I, threshold: Threshold) -> OutlineTree<C>
where
    I: IntoIterator<Item = HeadingElement<C>>,
{
    let mut roots: Vec<OutlineNode<C>> = Vec::new();
    // Levels of the open ancestors, outermost first.
    let mut open: Vec<u8> = Vec::new();

    for heading in headings {
        let level = heading.level;
        debug_assert!(
            (MIN_LEVEL..=MAX_LEVEL).contains(&level),
            "heading level {level} outside 1..=6"
        );

        if !threshold.includes(level) {
            continue;
        }

        while open.last().is_some_and(|&top| top >= level) {
            open.pop();
        }

        let node = OutlineNode::leaf(heading);
        match open_ancestor(&mut roots, open.len()) {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
        open.push(level);
    }

    OutlineTree { roots, threshold }
}

/// Node at `depth` along the rightmost spine (depth 1 is the last root).
fn open_ancestor<C>(roots: &mut [OutlineNode<C>], depth: usize) -> Option<&mut OutlineNode<C>> {
    if depth == 0 {
        return None;
    }
    let mut node = roots.last_mut()?;
    for _ in 1..depth {
        node = node.children.last_mut()?;
    }
    Some(node)
}
