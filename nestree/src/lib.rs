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

//! Balanced, path-addressed forests for composite-key data.
//!
//! Contract storage is a mapping of mappings: a record is addressed by a
//! composite key `(contract, attribute, field, nested keys...)`. Records sorted
//! by that key are grouped into a forest where every node either holds a
//! value or roots a nested forest of the next key component. Each sibling
//! array is then balanced in place by a deterministic pivot rule, so its
//! array positions form a binary search tree of minimal height, and every
//! node gets a positional path (see [`nestree_path`]).
//!
//! The balanced forest is flattened into path-tagged nodes which can be
//! serialized, committed bottom-up to a single root hash, exported to
//! Graphviz and sampled for read sets.
//!
//! ```
//! use nestree::{
//!     balance_forest, commit_forest, group_records_in, Blake3Combiner, CompositeKey,
//!     GroupingScope, Record,
//! };
//!
//! let records = [
//!     Record::new(CompositeKey::new(vec![0, 0, 0]).unwrap(), 5),
//!     Record::new(CompositeKey::new(vec![0, 0, 1, 3]).unwrap(), 7),
//!     Record::new(CompositeKey::new(vec![0, 0, 1, 9]).unwrap(), 2),
//! ];
//! let mut forest = group_records_in(&records, &GroupingScope::under(&[0, 0])).unwrap();
//! balance_forest(&mut forest);
//! assert_eq!(forest[1].path.as_str(), "M");
//!
//! let root_hash = commit_forest(&mut forest, &Blake3Combiner).unwrap();
//! assert_eq!(forest[1].root_hash, root_hash);
//! ```

mod balance;
mod commitment;
mod error;
mod flatten;
pub mod generator;
pub mod graph;
mod grouper;
mod node;
mod record;
pub mod sampler;
pub mod serializer;
#[cfg(feature = "visualize")]
mod visualize;

pub use balance::{balance_forest, pivot_index, tree_height};
pub use commitment::{
    commit_flat, commit_forest, Blake3Combiner, Combiner, ConstantCombiner, EMPTY_HASH, LEAF_TAG,
    SUBTREE_TAG,
};
pub use error::Error;
pub use flatten::{flatten, rebuild_forest, sort_by_path, FlatKind, FlatNode};
pub use generator::{GeneratorOptions, RecordGenerator};
pub use grouper::{group_records, group_records_in, GroupingScope};
pub use nestree_costs as costs;
pub use nestree_path::{NodePath, ParentLink, PathError, Step, ROOT_TOKEN};
pub use node::{count_nodes, Forest, Node, NodeKind};
pub use record::{sort_records, CompositeKey, Record, FIXED_KEY_COMPONENTS, MAX_NESTED_KEYS};
pub use sampler::select_reads;
#[cfg(feature = "visualize")]
pub use nestree_visualize::{visualize_stdout, visualize_to_string, Drawer, Visualize};
#[cfg(feature = "visualize")]
pub use visualize::ForestView;

/// Groups sorted records under `scope` and balances the result.
pub fn build_forest<'a, I>(records: I, scope: &GroupingScope) -> Result<Forest, Error>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut forest = group_records_in(records, scope)?;
    balance_forest(&mut forest);
    Ok(forest)
}

/// Flattens a balanced forest in path order, the order of the tree file.
pub fn flatten_sorted(forest: &[Node]) -> Vec<FlatNode> {
    let mut flat = flatten(forest);
    sort_by_path(&mut flat);
    flat
}
