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

//! Composite keys and the records addressed by them.

use core::fmt;

use itertools::Itertools;

use crate::Error;

/// Number of leading key components with a fixed role: contract, attribute
/// and field identifiers.
pub const FIXED_KEY_COMPONENTS: usize = 3;

/// Deepest supported nesting below a field (mapping of mappings of mappings).
pub const MAX_NESTED_KEYS: usize = 3;

/// Ordered, non-empty sequence of key components.
///
/// Ordering is lexicographic by component with a prefix sorting before all of
/// its extensions, which is exactly the ordering of the underlying `Vec`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey(Vec<u64>);

impl CompositeKey {
    /// Creates a key, rejecting an empty component list.
    pub fn new(components: Vec<u64>) -> Result<Self, Error> {
        if components.is_empty() {
            return Err(Error::MalformedInput(
                "composite key must have at least one component".to_owned(),
            ));
        }
        Ok(CompositeKey(components))
    }

    /// Copies a non-empty prefix of a key known to be valid.
    pub(crate) fn from_prefix(components: &[u64]) -> Self {
        debug_assert!(!components.is_empty());
        CompositeKey(components.to_vec())
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last component, the key of the node at its own level.
    pub fn last(&self) -> u64 {
        self.0[self.0.len() - 1]
    }

    pub fn starts_with(&self, prefix: &[u64]) -> bool {
        self.0.starts_with(prefix)
    }

    /// The same key with its last component incremented, `None` on overflow.
    pub fn with_last_incremented(&self) -> Option<Self> {
        let mut components = self.0.clone();
        let last = components.last_mut()?;
        *last = last.checked_add(1)?;
        Some(CompositeKey(components))
    }
}

impl TryFrom<Vec<u64>> for CompositeKey {
    type Error = Error;

    fn try_from(components: Vec<u64>) -> Result<Self, Self::Error> {
        CompositeKey::new(components)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

/// A single composite key to value fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: CompositeKey,
    pub value: u64,
}

impl Record {
    pub fn new(key: CompositeKey, value: u64) -> Self {
        Record { key, value }
    }
}

/// Sorts records by composite key, the order the grouper expects.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| a.key.cmp(&b.key));
}
