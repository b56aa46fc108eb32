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

use thiserror::Error;

/// Errors from parsing or resolving node paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A symbol outside of `L`, `R`, `M`, `N`.
    #[error("invalid symbol {symbol:?} at {position} in path {path:?}")]
    InvalidSymbol {
        /// The offending path.
        path: String,
        /// The offending symbol.
        symbol: char,
        /// Its position.
        position: usize,
    },
    /// `M` somewhere other than the end of the path.
    #[error("nesting marker at {position} is not the last symbol of path {path:?}")]
    MarkerNotLast {
        /// The offending path.
        path: String,
        /// Position of the marker.
        position: usize,
    },
    /// An empty token where a path was expected.
    #[error("empty path token")]
    EmptyToken,
    /// Neither the direct parent nor its marked form is known.
    #[error("parent {candidate} of path {path} not found")]
    MissingParent {
        /// Path of the child.
        path: String,
        /// Last parent path that was looked up.
        candidate: String,
    },
}
