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

//! Bottom-up commitment of a balanced forest.
//!
//! Every node gets a root hash covering its own entry, its left and right
//! subtrees inside the sibling array and, for a subtree root, the whole
//! nested forest:
//!
//! `combine([tag, key, payload, left_hash, right_hash])`
//!
//! where `payload` is the leaf value or the root hash of the nested forest,
//! and missing children contribute [`EMPTY_HASH`]. The combining function
//! runs exactly once per node, after all of that node's descendants.

use std::collections::HashMap;

use integer_encoding::VarInt;
use nestree_costs::{cost_return_on_error_no_add, CostContext, CostResult, CostsExt, OperationCost};
use nestree_path::NodePath;
use tracing::debug;

use crate::{
    balance::pivot_index,
    flatten::{flatten, rebuild_forest, FlatNode},
    node::{Node, NodeKind},
    Error,
};

/// Hash of an absent subtree.
pub const EMPTY_HASH: u64 = 0;

/// First input of a leaf's combination.
pub const LEAF_TAG: u64 = 0;
/// First input of a subtree root's combination.
pub const SUBTREE_TAG: u64 = 1;

/// Folds a node's inputs into a single root hash.
pub trait Combiner {
    fn combine(&self, inputs: &[u64]) -> u64;
}

impl<F> Combiner for F
where
    F: Fn(&[u64]) -> u64,
{
    fn combine(&self, inputs: &[u64]) -> u64 {
        self(inputs)
    }
}

/// Blake3 over the length-prefixed little-endian inputs, truncated to the
/// first 8 bytes of the digest.
///
/// Truncation keeps the hash an integer; it gives no collision resistance
/// against a motivated adversary.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Combiner;

impl Combiner for Blake3Combiner {
    fn combine(&self, inputs: &[u64]) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&inputs.len().encode_var_vec());
        for input in inputs {
            hasher.update(&input.to_le_bytes());
        }
        let mut truncated = [0u8; 8];
        truncated.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
        u64::from_le_bytes(truncated)
    }
}

/// Ignores its inputs and returns a fixed hash.
#[derive(Debug, Clone, Copy)]
pub struct ConstantCombiner(pub u64);

impl Default for ConstantCombiner {
    fn default() -> Self {
        ConstantCombiner(123_456_789)
    }
}

impl Combiner for ConstantCombiner {
    fn combine(&self, _inputs: &[u64]) -> u64 {
        self.0
    }
}

/// Commits a balanced forest in place, returning the root hash of the top
/// forest ([`EMPTY_HASH`] when empty).
pub fn commit_forest<C>(forest: &mut [Node], combiner: &C) -> CostContext<u64>
where
    C: Combiner + ?Sized,
{
    let ctx = commit_range(forest, combiner);
    debug!(
        root_hash = ctx.value,
        combine_calls = ctx.cost.combine_calls,
        "committed forest"
    );
    ctx
}

fn commit_range<C>(nodes: &mut [Node], combiner: &C) -> CostContext<u64>
where
    C: Combiner + ?Sized,
{
    let mut cost = OperationCost::default();
    let Some(pivot) = pivot_index(nodes.len()) else {
        return EMPTY_HASH.wrap_with_cost(cost);
    };
    let (left, rest) = nodes.split_at_mut(pivot);
    let Some((root, right)) = rest.split_first_mut() else {
        return EMPTY_HASH.wrap_with_cost(cost);
    };

    let left_hash = commit_range(left, combiner).unwrap_add_cost(&mut cost);
    let right_hash = commit_range(right, combiner).unwrap_add_cost(&mut cost);
    let (tag, payload) = match &mut root.kind {
        NodeKind::Leaf(value) => (LEAF_TAG, *value),
        NodeKind::SubtreeRoot(children) => (
            SUBTREE_TAG,
            commit_range(children, combiner).unwrap_add_cost(&mut cost),
        ),
    };

    root.root_hash = combiner.combine(&[tag, root.key, payload, left_hash, right_hash]);
    cost += OperationCost::with_combine_calls(1) + OperationCost::with_nodes_visited(1);
    root.root_hash.wrap_with_cost(cost)
}

/// Commits a flattened sequence, writing each node's root hash back into
/// `nodes` (their order is kept).
///
/// The whole sequence must hang off the top root: leftover nodes fail the
/// commitment with [`Error::IncompleteCommitment`] and nothing is updated.
pub fn commit_flat<C>(nodes: &mut [FlatNode], combiner: &C) -> CostResult<u64, Error>
where
    C: Combiner + ?Sized,
{
    let mut cost = OperationCost::default();
    let mut forest = cost_return_on_error_no_add!(&cost, rebuild_forest(nodes));
    let root_hash = commit_forest(&mut forest, combiner).unwrap_add_cost(&mut cost);

    let hashes: HashMap<NodePath, u64> = flatten(&forest)
        .into_iter()
        .map(|node| (node.path, node.root_hash))
        .collect();
    for node in nodes.iter_mut() {
        if let Some(hash) = hashes.get(&node.path) {
            node.root_hash = *hash;
        }
    }
    Ok(root_hash).wrap_with_cost(cost)
}
