#![forbid(unsafe_code)]

use super::HierarchyGuard;
use crate::ids::CategoryId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Category,
    /// The node is already on the current path; it is shown but not expanded.
    CircularReference,
    /// The parent sits at the depth cap; its children are not expanded.
    DepthTruncated,
}

/// One line of the rendered forest.
///
/// Markers reuse the id, name and parent of the node they stand for: the
/// revisited node for `CircularReference`, the node whose children were cut
/// for `DepthTruncated`. A marker never names itself as its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry<'a> {
    pub id: &'a CategoryId,
    pub name: &'a str,
    pub parent_id: Option<&'a CategoryId>,
    pub depth: usize,
    pub has_children: bool,
    pub kind: EntryKind,
}

impl TreeEntry<'_> {
    pub fn is_circular_reference_marker(&self) -> bool {
        self.kind == EntryKind::CircularReference
    }

    pub fn is_depth_truncated_marker(&self) -> bool {
        self.kind == EntryKind::DepthTruncated
    }

    pub fn is_marker(&self) -> bool {
        self.kind != EntryKind::Category
    }
}

/// Depth-bounded view of the forest. Holds no walk state: every call to
/// [`RenderTree::iter`] starts a fresh pass.
pub struct RenderTree<'g, 'a> {
    guard: &'g HierarchyGuard<'a>,
    max_depth: usize,
}

impl<'g, 'a> RenderTree<'g, 'a> {
    pub(super) fn new(guard: &'g HierarchyGuard<'a>, max_depth: usize) -> Self {
        Self {
            guard,
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn iter(&self) -> TreeWalk<'g, 'a> {
        TreeWalk::new(self.guard, self.max_depth)
    }
}

impl<'g, 'a> IntoIterator for &RenderTree<'g, 'a> {
    type Item = TreeEntry<'a>;
    type IntoIter = TreeWalk<'g, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum Pending<'a> {
    Node { index: usize, depth: usize },
    Marker(TreeEntry<'a>),
}

/// Pre-order walk over the forest with an explicit stack.
pub struct TreeWalk<'g, 'a> {
    guard: &'g HierarchyGuard<'a>,
    max_depth: usize,
    entry_points: std::vec::IntoIter<usize>,
    stack: Vec<Pending<'a>>,
    path: Vec<&'a CategoryId>,
}

impl<'g, 'a> TreeWalk<'g, 'a> {
    fn new(guard: &'g HierarchyGuard<'a>, max_depth: usize) -> Self {
        Self {
            guard,
            max_depth,
            entry_points: entry_points(guard).into_iter(),
            stack: Vec::new(),
            path: Vec::new(),
        }
    }

    fn visit(&mut self, index: usize, depth: usize) -> TreeEntry<'a> {
        let guard = self.guard;
        let node = &guard.nodes()[index];
        let children = guard.child_indices(&node.id);
        let has_children = !children.is_empty();

        self.path.truncate(depth);
        if self.path.contains(&&node.id) {
            tracing::warn!(
                category = %node.id,
                name = %node.name,
                depth,
                "circular reference detected while rendering category tree"
            );
            return TreeEntry {
                id: &node.id,
                name: &node.name,
                parent_id: node.parent_id.as_ref(),
                depth,
                has_children,
                kind: EntryKind::CircularReference,
            };
        }
        self.path.push(&node.id);

        if has_children {
            if depth + 1 >= self.max_depth {
                self.stack.push(Pending::Marker(TreeEntry {
                    id: &node.id,
                    name: &node.name,
                    parent_id: node.parent_id.as_ref(),
                    depth: depth + 1,
                    has_children: false,
                    kind: EntryKind::DepthTruncated,
                }));
            } else {
                self.stack
                    .extend(children.iter().rev().map(|&child| Pending::Node {
                        index: child,
                        depth: depth + 1,
                    }));
            }
        }

        TreeEntry {
            id: &node.id,
            name: &node.name,
            parent_id: node.parent_id.as_ref(),
            depth,
            has_children,
            kind: EntryKind::Category,
        }
    }
}

impl<'a> Iterator for TreeWalk<'_, 'a> {
    type Item = TreeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop() {
                Some(Pending::Marker(entry)) => return Some(entry),
                Some(Pending::Node { index, depth }) => return Some(self.visit(index, depth)),
                None => {
                    let index = self.entry_points.next()?;
                    self.stack.push(Pending::Node { index, depth: 0 });
                }
            }
        }
    }
}

/// Where each pass starts, in input order: true roots, nodes whose parent is
/// not loaded, and the smallest id of every parent loop. Together these reach
/// every node.
fn entry_points(guard: &HierarchyGuard<'_>) -> Vec<usize> {
    let mut out: Vec<usize> = guard
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| match node.parent_id.as_ref() {
            None => true,
            Some(parent) => !guard.contains(parent),
        })
        .map(|(index, _)| index)
        .collect();

    for cycle in guard.cycles() {
        if let Some(index) = cycle.first().and_then(|id| guard.index_of(id)) {
            out.push(index);
        }
    }

    out.sort_unstable();
    out.dedup();
    out
}
