//! Per-level flattening of an outline.

use std::iter::FusedIterator;
use std::slice;

use crate::outline::OutlineNode;

/// Iterator over outline nodes grouped by level.
///
/// Emits every level-1 node in document order, then every level-2 node,
/// and so on up to the tree's threshold. Each level is a pre-order walk
/// that only descends into shallower nodes: children are always deeper than
/// their parent, so a node at or below the current level cannot hide one
/// that belongs to it.
///
/// Created by [`OutlineTree::flatten`](crate::OutlineTree::flatten).
pub struct Flatten<'a, C> {
    roots: &'a [OutlineNode<C>],
    level: u8,
    max_level: u8,
    stack: Vec<slice::Iter<'a, OutlineNode<C>>>,
}

impl<'a, C> Flatten<'a, C> {
    pub(crate) fn new(roots: &'a [OutlineNode<C>], max_level: u8) -> Self {
        Self {
            roots,
            level: 0,
            max_level,
            stack: Vec::new(),
        }
    }
}

impl<'a, C> Iterator for Flatten<'a, C> {
    type Item = &'a OutlineNode<C>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(siblings) = self.stack.last_mut() else {
                if self.roots.is_empty() || self.level >= self.max_level {
                    return None;
                }
                self.level += 1;
                self.stack.push(self.roots.iter());
                continue;
            };

            match siblings.next() {
                None => {
                    self.stack.pop();
                }
                Some(node) if node.level == self.level => return Some(node),
                Some(node) if node.level < self.level => self.stack.push(node.children.iter()),
                Some(_) => {}
            }
        }
    }
}

impl<C> FusedIterator for Flatten<'_, C> {}
