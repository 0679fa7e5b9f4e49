#![forbid(unsafe_code)]

//! Structural checks over a flat category list.
//!
//! The guard never owns the categories: it indexes a borrowed snapshot, so
//! every query sees exactly the list the caller loaded and nothing is shared
//! between calls.

mod lint;
mod tree;

pub use lint::*;
pub use tree::*;

use crate::category::CategoryNode;
use crate::ids::CategoryId;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Result of an ancestor query that keeps "no relation" apart from "the
/// stored parent chain loops".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ancestry {
    IsAncestor,
    NotAncestor,
    CycleDetected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChainWalk {
    Found,
    Terminated,
    Cycle,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("Invalid parent selection: a category cannot be its own parent ({id})")]
    SelfParent { id: CategoryId },
    #[error("Invalid parent selection: This would create a circular reference ({id} -> {parent})")]
    Cycle { id: CategoryId, parent: CategoryId },
    #[error("Invalid parent selection: the parent chain of {parent} already loops")]
    CorruptParentChain { parent: CategoryId },
    #[error("Invalid parent selection: unknown category {parent}")]
    UnknownParent { parent: CategoryId },
}

impl HierarchyError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfParent { .. } => "SELF_PARENT",
            Self::Cycle { .. } => "PARENT_CYCLE",
            Self::CorruptParentChain { .. } => "CORRUPT_PARENT_CHAIN",
            Self::UnknownParent { .. } => "UNKNOWN_PARENT",
        }
    }
}

pub struct HierarchyGuard<'a> {
    nodes: &'a [CategoryNode],
    by_id: HashMap<&'a CategoryId, usize>,
    children: HashMap<&'a CategoryId, Vec<usize>>,
}

impl<'a> HierarchyGuard<'a> {
    /// Indexes `nodes`. A repeated id resolves to its first occurrence.
    pub fn new(nodes: &'a [CategoryNode]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<&'a CategoryId, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            by_id.entry(&node.id).or_insert(index);
            if let Some(parent) = node.parent_id.as_ref() {
                children.entry(parent).or_default().push(index);
            }
        }
        Self {
            nodes,
            by_id,
            children,
        }
    }

    pub fn nodes(&self) -> &'a [CategoryNode] {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &CategoryId) -> Option<&'a CategoryNode> {
        let nodes = self.nodes;
        self.by_id.get(id).map(|&index| &nodes[index])
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.by_id.contains_key(id)
    }

    fn index_of(&self, id: &CategoryId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    fn parent_of(&self, id: &CategoryId) -> Option<&'a CategoryId> {
        self.get(id).and_then(|node| node.parent_id.as_ref())
    }

    fn child_indices(&self, id: &CategoryId) -> &[usize] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn child_ids(&self, id: &CategoryId) -> impl Iterator<Item = &'a CategoryId> + '_ {
        let nodes = self.nodes;
        self.child_indices(id).iter().map(move |&index| &nodes[index].id)
    }

    /// Follows parent links from `start` (inclusive) until `target`, a root,
    /// or a repeated link.
    fn walk_up<'b>(&'b self, start: &'b CategoryId, target: &CategoryId) -> ChainWalk {
        let mut seen: HashSet<&'b CategoryId> = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if id == target {
                return ChainWalk::Found;
            }
            if !seen.insert(id) {
                return ChainWalk::Cycle;
            }
            current = self.parent_of(id);
        }
        ChainWalk::Terminated
    }

    fn chain_terminates(&self, start: &CategoryId) -> bool {
        let mut seen: HashSet<&CategoryId> = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if !seen.insert(id) {
                return false;
            }
            current = self.parent_of(id);
        }
        true
    }

    pub fn ancestry(&self, candidate_ancestor: &CategoryId, node: &CategoryId) -> Ancestry {
        let Some(parent) = self.parent_of(node) else {
            return Ancestry::NotAncestor;
        };
        match self.walk_up(parent, candidate_ancestor) {
            ChainWalk::Found => Ancestry::IsAncestor,
            ChainWalk::Terminated => Ancestry::NotAncestor,
            ChainWalk::Cycle => Ancestry::CycleDetected,
        }
    }

    /// True when `candidate_ancestor` sits somewhere above `node`. A looping
    /// parent chain answers `false`; use [`Self::ancestry`] to tell the two
    /// apart.
    pub fn is_ancestor(&self, candidate_ancestor: &CategoryId, node: &CategoryId) -> bool {
        self.ancestry(candidate_ancestor, node) == Ancestry::IsAncestor
    }

    /// True when giving `node` the parent `proposed_parent` would close a loop,
    /// or when the proposed parent's own chain already loops.
    pub fn would_create_cycle(
        &self,
        node: &CategoryId,
        proposed_parent: Option<&CategoryId>,
    ) -> bool {
        let Some(parent) = proposed_parent else {
            return false;
        };
        if parent == node {
            return true;
        }
        self.walk_up(parent, node) != ChainWalk::Terminated
    }

    /// Gate run before a create (`node == None`) or update is submitted.
    pub fn check_parent(
        &self,
        node: Option<&CategoryId>,
        proposed_parent: Option<&CategoryId>,
    ) -> Result<(), HierarchyError> {
        let Some(parent) = proposed_parent else {
            return Ok(());
        };
        if let Some(node) = node
            && node == parent
        {
            return Err(HierarchyError::SelfParent { id: node.clone() });
        }
        if !self.contains(parent) {
            return Err(HierarchyError::UnknownParent {
                parent: parent.clone(),
            });
        }
        let walk = match node {
            Some(node) => self.walk_up(parent, node),
            None if self.chain_terminates(parent) => ChainWalk::Terminated,
            None => ChainWalk::Cycle,
        };
        match (walk, node) {
            (ChainWalk::Terminated, _) => Ok(()),
            (ChainWalk::Found, Some(node)) => Err(HierarchyError::Cycle {
                id: node.clone(),
                parent: parent.clone(),
            }),
            _ => Err(HierarchyError::CorruptParentChain {
                parent: parent.clone(),
            }),
        }
    }

    /// Every node strictly below `ancestor`. Safe on looping data: each id is
    /// expanded once.
    pub fn descendants(&self, ancestor: &CategoryId) -> HashSet<&'a CategoryId> {
        let mut visited: HashSet<&'a CategoryId> = HashSet::new();
        let mut stack: Vec<&'a CategoryId> = self.child_ids(ancestor).collect();
        while let Some(id) = stack.pop() {
            if visited.insert(id) {
                stack.extend(self.child_ids(id));
            }
        }
        visited
    }

    pub fn is_descendant(&self, node: &CategoryId, ancestor: &CategoryId) -> bool {
        let mut visited: HashSet<&'a CategoryId> = HashSet::new();
        let mut stack: Vec<&'a CategoryId> = self.child_ids(ancestor).collect();
        while let Some(id) = stack.pop() {
            if id == node {
                return true;
            }
            if visited.insert(id) {
                stack.extend(self.child_ids(id));
            }
        }
        false
    }

    /// Categories that may be offered as the new parent of `editing`: all of
    /// them except `editing` itself and its subtree. Input order is kept.
    pub fn parent_candidates(&self, editing: Option<&CategoryId>) -> Vec<&'a CategoryNode> {
        let Some(editing) = editing else {
            return self.nodes.iter().collect();
        };
        let excluded = self.descendants(editing);
        self.nodes
            .iter()
            .filter(|node| &node.id != editing && !excluded.contains(&node.id))
            .collect()
    }

    /// Every loop in the stored parent relation, each sorted by id and
    /// reported once.
    pub fn cycles(&self) -> Vec<Vec<&'a CategoryId>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Active,
            Done,
        }

        let mut marks: HashMap<&'a CategoryId, Mark> = HashMap::new();
        let mut out = Vec::new();
        for node in self.nodes {
            if marks.contains_key(&node.id) {
                continue;
            }
            let mut path: Vec<&'a CategoryId> = Vec::new();
            let mut current = Some(&node.id);
            while let Some(id) = current {
                match marks.get(id) {
                    Some(Mark::Done) => break,
                    Some(Mark::Active) => {
                        if let Some(start) = path.iter().position(|seen| *seen == id) {
                            let mut cycle = path[start..].to_vec();
                            cycle.sort();
                            out.push(cycle);
                        }
                        break;
                    }
                    None => {}
                }
                if !self.contains(id) {
                    break;
                }
                marks.insert(id, Mark::Active);
                path.push(id);
                current = self.parent_of(id);
            }
            for id in path {
                marks.insert(id, Mark::Done);
            }
        }
        out
    }

    /// Number of parent hops from `id` to its root, or `None` when the chain
    /// loops or ends at an unknown parent.
    pub fn depth_of(&self, id: &CategoryId) -> Option<usize> {
        let mut seen: HashSet<&CategoryId> = HashSet::new();
        let mut depth = 0usize;
        let mut current = id;
        loop {
            if !seen.insert(current) {
                return None;
            }
            let node = self.get(current)?;
            match node.parent_id.as_ref() {
                None => return Some(depth),
                Some(parent) => {
                    depth = depth.saturating_add(1);
                    current = parent;
                }
            }
        }
    }

    pub fn build_tree(&self, max_depth: usize) -> RenderTree<'_, 'a> {
        RenderTree::new(self, max_depth)
    }
}
