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

//! Grouping of sorted records into a forest of nested forests.
//!
//! Records arrive sorted by composite key, so every record either continues
//! the forest currently being filled, closes some of the open nesting levels,
//! or opens new ones. A stack of open levels is enough to build the whole
//! hierarchy in one pass.

use tracing::debug;

use crate::{
    node::{Forest, Node, NodeKind},
    record::{CompositeKey, Record},
    Error,
};

/// Key prefix under which the grouper roots its top forest.
///
/// The global scope starts at contract ids. Scoping under a contract and an
/// attribute makes field ids the top level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingScope {
    prefix: Vec<u64>,
}

impl GroupingScope {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn under(prefix: &[u64]) -> Self {
        GroupingScope {
            prefix: prefix.to_vec(),
        }
    }

    pub fn prefix(&self) -> &[u64] {
        &self.prefix
    }
}

/// An open nesting level: the subtree root that owns it (none for the scope
/// level) and the siblings collected so far.
struct Level {
    prefix: Vec<u64>,
    root: Option<Node>,
    nodes: Forest,
}

struct Grouper {
    base: Level,
    open: Vec<Level>,
}

impl Grouper {
    fn new(scope: &GroupingScope) -> Self {
        Grouper {
            base: Level {
                prefix: scope.prefix.clone(),
                root: None,
                nodes: Forest::new(),
            },
            open: Vec::new(),
        }
    }

    fn top(&self) -> &Level {
        self.open.last().unwrap_or(&self.base)
    }

    fn top_mut(&mut self) -> &mut Level {
        self.open.last_mut().unwrap_or(&mut self.base)
    }

    /// Nesting level of nodes appended to the top level.
    fn depth(&self) -> usize {
        self.open.len()
    }

    /// Closes the innermost open level, handing its siblings to the subtree
    /// root that owns it.
    fn close(&mut self) {
        if let Some(Level { root, nodes, .. }) = self.open.pop() {
            if let Some(mut root) = root {
                root.kind = NodeKind::SubtreeRoot(nodes);
                self.top_mut().nodes.push(root);
            }
        }
    }

    fn add(&mut self, record: &Record) -> Result<(), Error> {
        let key = record.key.components();

        // Backtrack until the top level's prefix is a proper prefix of the key.
        while !self.open.is_empty() && {
            let prefix = &self.top().prefix;
            key.len() <= prefix.len() || !key.starts_with(prefix)
        } {
            self.close();
        }

        // Materialize the nesting levels implied by the key length.
        while key.len() > self.top().prefix.len() + 1 {
            let depth = self.depth();
            let nested = &key[..self.top().prefix.len() + 1];
            let nested_key = nested[nested.len() - 1];
            if let Some(last) = self.top().nodes.last() {
                if last.key == nested_key {
                    return Err(Error::MalformedInput(format!(
                        "{} nests under {} which already holds a value",
                        record.key, last.composite_key
                    )));
                }
            }
            self.open.push(Level {
                prefix: nested.to_vec(),
                root: Some(Node::subtree_root(CompositeKey::from_prefix(nested), depth)),
                nodes: Forest::new(),
            });
        }

        let depth = self.depth();
        self.top_mut()
            .nodes
            .push(Node::leaf(record.key.clone(), depth, record.value));
        Ok(())
    }

    fn finish(mut self) -> Forest {
        while !self.open.is_empty() {
            self.close();
        }
        self.base.nodes
    }
}

/// Groups records sorted by composite key into the global forest.
pub fn group_records<'a, I>(records: I) -> Result<Forest, Error>
where
    I: IntoIterator<Item = &'a Record>,
{
    group_records_in(records, &GroupingScope::global())
}

/// Groups records sorted by composite key into a forest rooted at `scope`.
///
/// Every record must extend the scope prefix by at least one component.
/// Out of order records are rejected with [`Error::UnsortedInput`], repeated
/// keys with [`Error::DuplicateKey`], and a key extending another record's
/// key with [`Error::MalformedInput`].
pub fn group_records_in<'a, I>(records: I, scope: &GroupingScope) -> Result<Forest, Error>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut grouper = Grouper::new(scope);
    let mut previous: Option<&CompositeKey> = None;
    let mut count = 0usize;

    for record in records {
        if let Some(previous) = previous {
            if record.key == *previous {
                return Err(Error::DuplicateKey(record.key.clone()));
            }
            if record.key < *previous {
                return Err(Error::UnsortedInput {
                    previous: previous.clone(),
                    current: record.key.clone(),
                });
            }
        }
        if record.key.len() <= scope.prefix.len() || !record.key.starts_with(&scope.prefix) {
            return Err(Error::MalformedInput(format!(
                "{} lies outside of the grouping scope {:?}",
                record.key, scope.prefix
            )));
        }
        grouper.add(record)?;
        previous = Some(&record.key);
        count += 1;
    }

    let forest = grouper.finish();
    debug!(records = count, top_level = forest.len(), "grouped records");
    Ok(forest)
}
