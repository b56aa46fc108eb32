// MIT LICENSE
//
// Copyright (c) 2021 Dash Core Group
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Linear, path-tagged form of a balanced forest and its reconstruction.

use std::{iter::Peekable, vec::IntoIter};

use nestree_path::NodePath;
use tracing::debug;

use crate::{
    node::{Forest, Node, NodeKind},
    record::CompositeKey,
    Error,
};

/// Kind of a flattened node. Nested children follow their subtree root in
/// the flat sequence instead of being owned by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatKind {
    Leaf(u64),
    SubtreeRoot,
}

/// One node of the flattened sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub path: NodePath,
    pub composite_key: CompositeKey,
    pub kind: FlatKind,
    pub root_hash: u64,
}

impl FlatNode {
    pub fn key(&self) -> u64 {
        self.composite_key.last()
    }

    pub fn value(&self) -> Option<u64> {
        match self.kind {
            FlatKind::Leaf(value) => Some(value),
            FlatKind::SubtreeRoot => None,
        }
    }

    pub fn is_subtree_root(&self) -> bool {
        self.kind == FlatKind::SubtreeRoot
    }

    /// Nesting level, recovered from the path.
    pub fn nesting_level(&self) -> usize {
        self.path.nesting_depth()
    }
}

/// Pre-order traversal: each node is followed by its nested forest before
/// the next sibling.
pub fn flatten(forest: &[Node]) -> Vec<FlatNode> {
    fn walk(forest: &[Node], out: &mut Vec<FlatNode>) {
        for node in forest {
            let kind = match &node.kind {
                NodeKind::Leaf(value) => FlatKind::Leaf(*value),
                NodeKind::SubtreeRoot(_) => FlatKind::SubtreeRoot,
            };
            out.push(FlatNode {
                path: node.path.clone(),
                composite_key: node.composite_key.clone(),
                kind,
                root_hash: node.root_hash,
            });
            if let NodeKind::SubtreeRoot(children) = &node.kind {
                walk(children, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(forest, &mut out);
    out
}

/// Orders nodes by path, which lists every subtree root after its left
/// subtree and right before its own nested forest.
pub fn sort_by_path(nodes: &mut [FlatNode]) {
    nodes.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Walks path-sorted nodes from the top root, rebuilding owned forests.
struct Rebuilder {
    nodes: Peekable<IntoIter<FlatNode>>,
}

impl Rebuilder {
    fn next_at(&mut self, path: &NodePath) -> Option<FlatNode> {
        self.nodes.next_if(|node| node.path == *path)
    }

    /// Rebuilds the forest addressed from `prefix`, in ascending key order.
    fn forest(&mut self, prefix: &NodePath, nesting_level: usize) -> Result<Forest, Error> {
        let mut forest = Forest::new();
        self.subtree(prefix, nesting_level, &mut forest)?;
        Ok(forest)
    }

    fn subtree(
        &mut self,
        position: &NodePath,
        nesting_level: usize,
        out: &mut Forest,
    ) -> Result<(), Error> {
        if let Some(root) = self.next_at(position) {
            // a plain path sorts before its whole subtree
            if root.is_subtree_root() {
                return Err(Error::MalformedInput(format!(
                    "subtree root at {} has no nesting marker",
                    root.path
                )));
            }
            self.subtree(&position.left(), nesting_level, out)?;
            out.push(Self::leaf(root, nesting_level));
            return self.subtree(&position.right(), nesting_level, out);
        }

        let marked = position.marked();
        let left = position.left();
        let nested = position.nested();
        let belongs_here = self.nodes.peek().is_some_and(|node| {
            node.path == marked || node.path.starts_with(&left) || node.path.starts_with(&nested)
        });
        if !belongs_here {
            return Ok(());
        }

        self.subtree(&left, nesting_level, out)?;
        let root = self.next_at(&marked).ok_or_else(|| {
            Error::PathLookupFailure(format!("expected a subtree root at {marked}"))
        })?;
        if !root.is_subtree_root() {
            return Err(Error::MalformedInput(format!(
                "leaf at {} carries a nesting marker",
                root.path
            )));
        }
        let children = self.forest(&nested, nesting_level + 1)?;
        let mut node = Node::with_kind(
            root.composite_key,
            nesting_level,
            NodeKind::SubtreeRoot(children),
        );
        node.path = root.path;
        node.root_hash = root.root_hash;
        out.push(node);
        self.subtree(&position.right(), nesting_level, out)
    }

    fn leaf(flat: FlatNode, nesting_level: usize) -> Node {
        let value = flat.value().unwrap_or_default();
        let mut node = Node::leaf(flat.composite_key, nesting_level, value);
        node.path = flat.path;
        node.root_hash = flat.root_hash;
        node
    }
}

/// Reconstructs the owned forest from flattened nodes in any order, using
/// the paths alone.
///
/// Nodes that cannot be reached from the top root are reported as
/// [`Error::IncompleteCommitment`], an expected subtree root that is missing
/// as [`Error::PathLookupFailure`].
pub fn rebuild_forest(nodes: &[FlatNode]) -> Result<Forest, Error> {
    let mut sorted = nodes.to_vec();
    sort_by_path(&mut sorted);
    let mut rebuilder = Rebuilder {
        nodes: sorted.into_iter().peekable(),
    };
    let forest = rebuilder.forest(&NodePath::root(), 0)?;

    let leftover: Vec<FlatNode> = rebuilder.nodes.collect();
    if let Some(first) = leftover.first() {
        return Err(Error::IncompleteCommitment {
            unconsumed: leftover.len(),
            first: first.path.to_string(),
        });
    }
    debug!(nodes = nodes.len(), top_level = forest.len(), "rebuilt forest");
    Ok(forest)
}
