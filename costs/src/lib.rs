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

#![deny(missing_docs)]
//! Cost accounting shared by the nestree build passes.
//!
//! Every pass that does measurable work (commitment, file I/O) reports what
//! it consumed next to its result, so callers can check contracts such as
//! "the combining function ran once per node" without instrumenting it.

pub mod context;

use std::ops::{Add, AddAssign};

pub use context::{CostContext, CostResult, CostsExt};

/// Resources consumed by a pass (approximately).
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct OperationCost {
    /// How many times the combining function was invoked.
    pub combine_calls: u32,
    /// How many tree nodes were visited.
    pub nodes_visited: u32,
    /// How many bytes were written to durable storage.
    pub bytes_written: u64,
    /// How many bytes were read from durable storage.
    pub bytes_loaded: u64,
}

impl OperationCost {
    /// Cost of `calls` invocations of the combining function.
    pub fn with_combine_calls(combine_calls: u32) -> Self {
        OperationCost {
            combine_calls,
            ..Default::default()
        }
    }

    /// Cost of visiting `nodes_visited` nodes.
    pub fn with_nodes_visited(nodes_visited: u32) -> Self {
        OperationCost {
            nodes_visited,
            ..Default::default()
        }
    }

    /// Cost of writing `bytes_written` bytes.
    pub fn with_bytes_written(bytes_written: u64) -> Self {
        OperationCost {
            bytes_written,
            ..Default::default()
        }
    }

    /// Cost of reading `bytes_loaded` bytes.
    pub fn with_bytes_loaded(bytes_loaded: u64) -> Self {
        OperationCost {
            bytes_loaded,
            ..Default::default()
        }
    }

    /// True if nothing was consumed.
    pub fn is_nothing(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for OperationCost {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.combine_calls += rhs.combine_calls;
        self.nodes_visited += rhs.nodes_visited;
        self.bytes_written += rhs.bytes_written;
        self.bytes_loaded += rhs.bytes_loaded;
    }
}

/// Works like `?` for `CostResult`: on error returns early with the costs
/// accumulated so far, on success unwraps the value and adds its cost to the
/// accumulator.
#[macro_export]
macro_rules! cost_return_on_error {
    ( &mut $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result_with_cost = { $($body)+ };
            let result = result_with_cost.unwrap_add_cost(&mut $cost);
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

/// Same as [`cost_return_on_error`] but for a plain `Result`: nothing is added
/// to the accumulator, which is only used to wrap the early return.
#[macro_export]
macro_rules! cost_return_on_error_no_add {
    ( &$cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result = { $($body)+ };
            match result {
                Ok(x) => x,
                Err(e) => return Err(e.into()).wrap_with_cost($cost),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_set_a_single_field() {
        assert!(OperationCost::default().is_nothing());
        assert_eq!(OperationCost::with_combine_calls(3).combine_calls, 3);
        assert_eq!(OperationCost::with_nodes_visited(4).nodes_visited, 4);
        assert_eq!(OperationCost::with_bytes_written(5).bytes_written, 5);
        assert_eq!(OperationCost::with_bytes_loaded(6).bytes_loaded, 6);
        assert!(!OperationCost::with_bytes_loaded(6).is_nothing());
    }

    #[test]
    fn add_sums_every_field() {
        let left = OperationCost {
            combine_calls: 1,
            nodes_visited: 2,
            bytes_written: 3,
            bytes_loaded: 4,
        };
        let right = OperationCost {
            combine_calls: 10,
            nodes_visited: 20,
            bytes_written: 30,
            bytes_loaded: 40,
        };
        let mut acc = left;
        acc += right;
        assert_eq!(acc, left + right);
        assert_eq!(
            acc,
            OperationCost {
                combine_calls: 11,
                nodes_visited: 22,
                bytes_written: 33,
                bytes_loaded: 44,
            }
        );
    }

    fn failing_after_cost() -> CostResult<u32, String> {
        let mut cost = OperationCost::with_nodes_visited(1);
        let first = cost_return_on_error!(
            &mut cost,
            Ok::<u32, String>(7).wrap_with_cost(OperationCost::with_combine_calls(2))
        );
        let _second: u32 = cost_return_on_error!(
            &mut cost,
            Err::<u32, String>(format!("stopped after {first}"))
                .wrap_with_cost(OperationCost::with_combine_calls(5))
        );
        Ok(0).wrap_with_cost(cost)
    }

    #[test]
    fn early_return_keeps_accumulated_cost() {
        let result = failing_after_cost();
        assert_eq!(result.value, Err("stopped after 7".to_owned()));
        assert_eq!(result.cost.combine_calls, 7);
        assert_eq!(result.cost.nodes_visited, 1);
    }

    fn plain_result_early_return(fail: bool) -> CostResult<u8, String> {
        let cost = OperationCost::with_bytes_loaded(9);
        let value = cost_return_on_error_no_add!(
            &cost,
            if fail {
                Err("bad".to_owned())
            } else {
                Ok(1u8)
            }
        );
        Ok(value).wrap_with_cost(cost)
    }

    #[test]
    fn no_add_variant_wraps_plain_results() {
        let ok = plain_result_early_return(false);
        assert_eq!(ok.value, Ok(1));
        assert_eq!(ok.cost.bytes_loaded, 9);

        let err = plain_result_early_return(true);
        assert_eq!(err.value, Err("bad".to_owned()));
        assert_eq!(err.cost.bytes_loaded, 9);
    }
}
