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

//! In-place balancing of sibling arrays.
//!
//! A forest is never restructured with pointers: its nodes stay in ascending
//! key order and the array positions themselves are the tree. The root of a
//! range is the node at [`pivot_index`] of that range, the nodes before it
//! form the left subtree and the nodes after it the right subtree.
//!
//! The pivot depends only on the range length. If the binary form of `n`
//! starts with `10` (2, 4, 5, 8..=11, 16, ...) the left subtree is one level
//! taller than the right one and its size is obtained by replacing that
//! leading `10` with `01`: 5 (`101`) gets a left subtree of 3 (`011`), 9
//! (`1001`) gets 5 (`0101`). If it starts with `11` (3, 6, 7, 12..=15, ...)
//! both sides have the same height and the right subtree size is `n` without
//! its top bit: 6 (`110`) gets a right subtree of 2 (`10`), 13 (`1101`) gets
//! 5 (`101`). Either way the height is `floor(log2 n)`.

use nestree_path::NodePath;
use tracing::debug;

use crate::node::{count_nodes, Node, NodeKind};

/// Index of the subtree root within a range of `n` nodes, `None` for an
/// empty range.
pub fn pivot_index(n: usize) -> Option<usize> {
    match n {
        0 => None,
        1 => Some(0),
        _ => {
            // shift right until only the top two bits (10 or 11) remain
            let mut reduced = n;
            let mut full_size = 0;
            while reduced > 3 {
                reduced >>= 1;
                full_size = (full_size << 1) + 1;
            }
            if reduced == 3 {
                Some((full_size << 1) + 1)
            } else {
                Some(n - 1 - full_size)
            }
        }
    }
}

/// Height of the tree the pivot rule builds over `n` nodes, counted in edges
/// (a single node has height 0). `None` for an empty range.
pub fn tree_height(n: usize) -> Option<usize> {
    let pivot = pivot_index(n)?;
    let left = tree_height(pivot).map_or(0, |h| h + 1);
    let right = tree_height(n - pivot - 1).map_or(0, |h| h + 1);
    Some(left.max(right))
}

/// Balances a forest and every forest nested in it, assigning paths.
///
/// The top forest is addressed from the empty path; see `nestree_path` for
/// the encoding.
pub fn balance_forest(forest: &mut [Node]) {
    balance_at(forest, &NodePath::root());
    debug!(
        top_level = forest.len(),
        nodes = count_nodes(forest),
        height = ?tree_height(forest.len()),
        "balanced forest"
    );
}

fn balance_at(nodes: &mut [Node], path: &NodePath) {
    let Some(pivot) = pivot_index(nodes.len()) else {
        return;
    };
    let (left, rest) = nodes.split_at_mut(pivot);
    let Some((root, right)) = rest.split_first_mut() else {
        return;
    };

    match &mut root.kind {
        NodeKind::SubtreeRoot(children) => {
            root.path = path.marked();
            balance_at(children, &path.nested());
        }
        NodeKind::Leaf(_) => root.path = path.clone(),
    }

    balance_at(left, &path.left());
    balance_at(right, &path.right());
}
