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

//! Positional paths of nodes inside a balanced nestree forest.
//!
//! A path is the route from the top of the forest down to a node, spelled
//! over four symbols:
//!
//! * `L` / `R` descend into the left / right half of a balanced sibling array;
//! * `M` (only ever the last symbol) marks a node that roots a nested forest;
//! * `N` enters the nested forest of the node whose path is the same prefix
//!   followed by `M`.
//!
//! Paths double as identifiers and as a sort key: ordering them bytewise
//! (`L < M < N < R`) visits a node's left subtree, the node itself when it
//! roots a nested forest, then that nested forest, then the right subtree.

#![deny(missing_docs)]

mod error;
mod parent;

use core::{fmt, str::FromStr};

pub use error::PathError;
pub use parent::ParentLink;

/// Token used in text formats for the empty (top root) path.
pub const ROOT_TOKEN: &str = "_";

/// One symbol of a [`NodePath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Descend into the left part of the sibling array.
    Left,
    /// Descend into the right part of the sibling array.
    Right,
    /// The node roots a nested forest.
    Marker,
    /// Enter a nested forest.
    Nested,
}

impl Step {
    /// Symbol of the step.
    pub fn symbol(self) -> char {
        match self {
            Step::Left => 'L',
            Step::Right => 'R',
            Step::Marker => 'M',
            Step::Nested => 'N',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'L' => Some(Step::Left),
            'R' => Some(Step::Right),
            'M' => Some(Step::Marker),
            'N' => Some(Step::Nested),
            _ => None,
        }
    }
}

/// Path of a node, see crate docs for the encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(String);

impl NodePath {
    /// The empty path of the top-level root.
    pub fn root() -> Self {
        NodePath(String::new())
    }

    /// Raw symbols of the path, empty for the top root.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the top root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the node roots a nested forest.
    pub fn is_subtree_root(&self) -> bool {
        self.0.ends_with('M')
    }

    /// How many nested forests lie between the top forest and this node.
    pub fn nesting_depth(&self) -> usize {
        self.0.matches('N').count()
    }

    /// Last symbol, if any.
    pub fn last_step(&self) -> Option<Step> {
        self.0.chars().last().and_then(Step::from_symbol)
    }

    /// True if `prefix` is a symbol-wise prefix of this path.
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.0.starts_with(prefix.as_str())
    }

    fn child(&self, step: Step) -> Self {
        debug_assert!(
            !self.is_subtree_root(),
            "marked path {} cannot be extended",
            self
        );
        let mut path = String::with_capacity(self.0.len() + 1);
        path.push_str(&self.0);
        path.push(step.symbol());
        NodePath(path)
    }

    /// Path of the left subtree root.
    pub fn left(&self) -> Self {
        self.child(Step::Left)
    }

    /// Path of the right subtree root.
    pub fn right(&self) -> Self {
        self.child(Step::Right)
    }

    /// Prefix under which the nested forest of a node at this position is
    /// addressed.
    pub fn nested(&self) -> Self {
        self.child(Step::Nested)
    }

    /// The same position marked as the root of a nested forest.
    pub fn marked(&self) -> Self {
        self.child(Step::Marker)
    }

    /// The position without a trailing `M`.
    pub fn unmarked(&self) -> Self {
        match self.0.strip_suffix('M') {
            Some(stripped) => NodePath(stripped.to_owned()),
            None => self.clone(),
        }
    }

    /// Text form used in files and diagrams: the raw symbols, or
    /// [`ROOT_TOKEN`] for the top root.
    pub fn token(&self) -> &str {
        if self.0.is_empty() {
            ROOT_TOKEN
        } else {
            &self.0
        }
    }

    /// Parses the text form produced by [`NodePath::token`].
    pub fn from_token(token: &str) -> Result<Self, PathError> {
        if token.is_empty() {
            return Err(PathError::EmptyToken);
        }
        if token == ROOT_TOKEN {
            return Ok(NodePath::root());
        }
        token.parse()
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let last = s.chars().count().saturating_sub(1);
        for (position, symbol) in s.chars().enumerate() {
            match Step::from_symbol(symbol) {
                None => {
                    return Err(PathError::InvalidSymbol {
                        path: s.to_owned(),
                        symbol,
                        position,
                    })
                }
                Some(Step::Marker) if position != last => {
                    return Err(PathError::MarkerNotLast {
                        path: s.to_owned(),
                        position,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(NodePath(s.to_owned()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
