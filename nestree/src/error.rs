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

use nestree_path::PathError;

use crate::record::CompositeKey;

/// Errors of a nestree build run. None of them is recoverable within the
/// run: the batch is abandoned and the error surfaces to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Input data errors
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("unsorted input: {current} follows {previous}")]
    UnsortedInput {
        previous: CompositeKey,
        current: CompositeKey,
    },
    #[error("duplicate composite key {0}")]
    DuplicateKey(CompositeKey),

    // Structure errors
    // Nodes were left over after walking the structure from its top root
    #[error("incomplete commitment: {unconsumed} node(s) left unconsumed, first at path {first}")]
    IncompleteCommitment { unconsumed: usize, first: String },
    // A path refers to a parent or root that is not part of the structure
    #[error("path lookup failure: {0}")]
    PathLookupFailure(String),
    #[error("invalid path: {0}")]
    InvalidPath(PathError),

    // Configuration errors
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    // Irrecoverable errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PathError> for Error {
    fn from(error: PathError) -> Self {
        match error {
            PathError::MissingParent { .. } => Error::PathLookupFailure(error.to_string()),
            other => Error::InvalidPath(other),
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(error: tempfile::PersistError) -> Self {
        Error::Io(error.error)
    }
}
