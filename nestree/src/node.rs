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

//! Tree nodes and forests.

use nestree_path::NodePath;

use crate::record::CompositeKey;

/// Siblings at one nesting level under one parent prefix, stored
/// contiguously. After balancing, array positions read through the pivot
/// rule form a binary search tree.
pub type Forest = Vec<Node>;

/// What a node holds: a primitive value or a nested forest, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(u64),
    SubtreeRoot(Forest),
}

/// A node of the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Last component of `composite_key`.
    pub key: u64,
    pub composite_key: CompositeKey,
    /// Depth below the grouping scope, 0 for the top forest.
    pub nesting_level: usize,
    pub kind: NodeKind,
    /// Assigned by the balancer, empty before.
    pub path: NodePath,
    /// Assigned by the commitment pass, 0 before.
    pub root_hash: u64,
}

impl Node {
    pub fn leaf(composite_key: CompositeKey, nesting_level: usize, value: u64) -> Self {
        Self::with_kind(composite_key, nesting_level, NodeKind::Leaf(value))
    }

    pub fn subtree_root(composite_key: CompositeKey, nesting_level: usize) -> Self {
        Self::with_kind(composite_key, nesting_level, NodeKind::SubtreeRoot(Forest::new()))
    }

    pub(crate) fn with_kind(composite_key: CompositeKey, nesting_level: usize, kind: NodeKind) -> Self {
        Node {
            key: composite_key.last(),
            composite_key,
            nesting_level,
            kind,
            path: NodePath::root(),
            root_hash: 0,
        }
    }

    pub fn is_subtree_root(&self) -> bool {
        matches!(self.kind, NodeKind::SubtreeRoot(_))
    }

    pub fn value(&self) -> Option<u64> {
        match self.kind {
            NodeKind::Leaf(value) => Some(value),
            NodeKind::SubtreeRoot(_) => None,
        }
    }

    pub fn children(&self) -> Option<&Forest> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::SubtreeRoot(children) => Some(children),
        }
    }
}

/// Number of nodes in the forest, nested forests included.
pub fn count_nodes(forest: &[Node]) -> usize {
    forest
        .iter()
        .map(|node| 1 + node.children().map_or(0, |children| count_nodes(children)))
        .sum()
}
