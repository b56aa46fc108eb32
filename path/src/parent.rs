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

use crate::{NodePath, PathError, Step};

/// Edge from a node to its parent, derived from the path alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// Path of the parent as it is stored (marked if the parent roots a
    /// nested forest).
    pub parent: NodePath,
    /// How the parent reaches the child: `Left`, `Right` or `Nested`.
    pub port: Step,
}

impl NodePath {
    /// Finds the parent of this node among the known paths.
    ///
    /// The last `L`/`R`/`N` (ignoring a trailing `M`) is stripped. For `L`
    /// and `R` the parent is the stripped path, or that path marked with `M`
    /// when the parent roots a nested forest; for `N` it is always the marked
    /// form. Returns `None` for the top root.
    pub fn parent_link<F>(&self, exists: F) -> Result<Option<ParentLink>, PathError>
    where
        F: Fn(&NodePath) -> bool,
    {
        let position = self.unmarked();
        let Some(port) = position.last_step() else {
            return Ok(None);
        };
        let stem = NodePath(position.0[..position.0.len() - 1].to_owned());

        let candidate = match port {
            Step::Left | Step::Right if exists(&stem) => {
                return Ok(Some(ParentLink { parent: stem, port }));
            }
            Step::Left | Step::Right | Step::Nested => stem.marked(),
            Step::Marker => unreachable!("unmarked path cannot end with a marker"),
        };
        if exists(&candidate) {
            Ok(Some(ParentLink {
                parent: candidate,
                port,
            }))
        } else {
            Err(PathError::MissingParent {
                path: self.token().to_owned(),
                candidate: candidate.token().to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn known(paths: &[&str]) -> HashSet<NodePath> {
        paths.iter().map(|p| p.parse().expect("valid path")).collect()
    }

    fn link(of: &str, among: &HashSet<NodePath>) -> Result<Option<ParentLink>, PathError> {
        let path: NodePath = of.parse().expect("valid path");
        path.parent_link(|candidate| among.contains(candidate))
    }

    #[test]
    fn top_root_has_no_parent() {
        let paths = known(&["", "L"]);
        assert_eq!(link("", &paths), Ok(None));
        let paths = known(&["M", "N"]);
        assert_eq!(link("M", &paths), Ok(None));
    }

    #[test]
    fn sibling_descent_goes_to_plain_or_marked_parent() {
        let paths = known(&["", "L", "LR"]);
        assert_eq!(
            link("LR", &paths),
            Ok(Some(ParentLink {
                parent: "L".parse().unwrap(),
                port: Step::Right,
            }))
        );

        let paths = known(&["LM", "LN", "LR"]);
        assert_eq!(
            link("LR", &paths),
            Ok(Some(ParentLink {
                parent: "LM".parse().unwrap(),
                port: Step::Right,
            }))
        );
    }

    #[test]
    fn nested_root_hangs_off_the_marked_parent() {
        let paths = known(&["M", "NM", "NN", "NL"]);
        assert_eq!(
            link("NM", &paths),
            Ok(Some(ParentLink {
                parent: "M".parse().unwrap(),
                port: Step::Nested,
            }))
        );
        assert_eq!(
            link("NL", &paths),
            Ok(Some(ParentLink {
                parent: "NM".parse().unwrap(),
                port: Step::Left,
            }))
        );
    }

    #[test]
    fn missing_parent_is_reported() {
        let paths = known(&["LL"]);
        assert_eq!(
            link("LL", &paths),
            Err(PathError::MissingParent {
                path: "LL".to_owned(),
                candidate: "LM".to_owned(),
            })
        );
    }
}
