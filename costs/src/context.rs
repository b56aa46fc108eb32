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

//! Values travelling together with the cost of producing them.

use crate::OperationCost;

/// Wrapped operation result with associated cost.
#[must_use]
#[derive(Debug, Eq, PartialEq)]
pub struct CostContext<T> {
    /// Wrapped operation's return value.
    pub value: T,
    /// Cost of the operation.
    pub cost: OperationCost,
}

impl<T> CostContext<T> {
    /// Take the value out, adding its cost to `acc_cost`.
    pub fn unwrap_add_cost(self, acc_cost: &mut OperationCost) -> T {
        *acc_cost += self.cost;
        self.value
    }

    /// Take the value out, dropping the cost.
    pub fn unwrap(self) -> T {
        self.value
    }

    /// Borrow the cost.
    pub fn cost(&self) -> &OperationCost {
        &self.cost
    }

    /// Borrow the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Applies `f` to the value, keeping the cost.
    pub fn map<B>(self, f: impl FnOnce(T) -> B) -> CostContext<B> {
        CostContext {
            value: f(self.value),
            cost: self.cost,
        }
    }

    /// Adds previously accumulated cost.
    pub fn add_cost(mut self, cost: OperationCost) -> Self {
        self.cost += cost;
        self
    }
}

/// `Result` wrapped into a `CostContext`.
pub type CostResult<T, E> = CostContext<Result<T, E>>;

impl<T, E> CostResult<T, E> {
    /// Maps the `Ok` value, keeping the cost.
    pub fn map_ok<B>(self, f: impl FnOnce(T) -> B) -> CostResult<B, E> {
        self.map(|result| result.map(f))
    }

    /// Maps the `Err` value, keeping the cost.
    pub fn map_err<B>(self, f: impl FnOnce(E) -> B) -> CostResult<T, B> {
        self.map(|result| result.map_err(f))
    }

    /// Chains another costed fallible step, summing both costs.
    pub fn flat_map_ok<B>(self, f: impl FnOnce(T) -> CostResult<B, E>) -> CostResult<B, E> {
        let mut cost = self.cost;
        let value = match self.value {
            Ok(x) => f(x).unwrap_add_cost(&mut cost),
            Err(e) => Err(e),
        };
        CostContext { value, cost }
    }

    /// Splits into the plain result and the cost.
    pub fn into_parts(self) -> (Result<T, E>, OperationCost) {
        (self.value, self.cost)
    }
}

/// Extension trait to attach a cost to any value.
pub trait CostsExt {
    /// Wraps the value with the provided cost.
    fn wrap_with_cost(self, cost: OperationCost) -> CostContext<Self>
    where
        Self: Sized,
    {
        CostContext { value: self, cost }
    }

    /// Wraps the value with a cost computed from it.
    fn wrap_fn_cost(self, f: impl FnOnce(&Self) -> OperationCost) -> CostContext<Self>
    where
        Self: Sized,
    {
        CostContext {
            cost: f(&self),
            value: self,
        }
    }
}

impl<T> CostsExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_cost() {
        let mapped = 75
            .wrap_with_cost(OperationCost::with_bytes_loaded(3))
            .map(|x| x + 25);
        assert_eq!(mapped.value, 100);
        assert_eq!(mapped.cost.bytes_loaded, 3);
    }

    #[test]
    fn flat_map_ok_sums_costs_and_short_circuits() {
        let ok: CostResult<u32, ()> = Ok(1).wrap_with_cost(OperationCost::with_combine_calls(1));
        let chained = ok.flat_map_ok(|x| Ok(x + 1).wrap_with_cost(OperationCost::with_combine_calls(2)));
        assert_eq!(chained.value, Ok(2));
        assert_eq!(chained.cost.combine_calls, 3);

        let err: CostResult<u32, &str> =
            Err("no").wrap_with_cost(OperationCost::with_combine_calls(1));
        let chained = err.flat_map_ok(|x| Ok(x).wrap_with_cost(OperationCost::with_combine_calls(50)));
        assert_eq!(chained.value, Err("no"));
        assert_eq!(chained.cost.combine_calls, 1);
    }

    #[test]
    fn wrap_fn_cost_derives_cost_from_value() {
        let ctx = vec![1u8, 2, 3].wrap_fn_cost(|v| OperationCost::with_bytes_written(v.len() as u64));
        assert_eq!(ctx.cost.bytes_written, 3);
        let (value, cost) = Ok::<_, ()>(ctx.value).wrap_with_cost(ctx.cost).into_parts();
        assert_eq!(value, Ok(vec![1, 2, 3]));
        assert_eq!(cost.bytes_written, 3);
    }
}
