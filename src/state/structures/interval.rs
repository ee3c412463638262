//
// revcp-rs is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License  v3
// as published by the Free Software Foundation.
//
// revcp-rs is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY.
// See the GNU Lesser General Public License  for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with revcp-rs. If not, see http://www.gnu.org/licenses/lgpl-3.0.en.html
//
// Copyright (c)  2022 by X. Gillard
//

//! This module provides the cheapest of all domain representations: a pair
//! of stored bounds. Holes cannot be represented, hence removing an interior
//! value is a no-op.

use crate::{Environment, ReversibleSet, StoredInt};

/// The interval `[lb, ub]` (empty when `lb > ub`)
#[derive(Debug, Clone, Copy)]
pub struct IntervalSet {
    lb: StoredInt,
    ub: StoredInt,
}

impl IntervalSet {
    /// Creates the interval `[lb, ub]`
    pub fn new(env: &mut Environment, lb: i32, ub: i32) -> Self {
        Self {
            lb: env.make_int(lb),
            ub: env.make_int(ub),
        }
    }
    /// Returns the lower bound of the interval
    pub fn min(&self, env: &Environment) -> Option<i32> {
        (!self.is_empty(env)).then(|| env.get(self.lb))
    }
    /// Returns the upper bound of the interval
    pub fn max(&self, env: &Environment) -> Option<i32> {
        (!self.is_empty(env)).then(|| env.get(self.ub))
    }
    /// Removes all values strictly smaller than `value` and returns the number
    /// of values that have been removed
    pub fn remove_below(&mut self, env: &mut Environment, value: i32) -> usize {
        let before = self.size(env);
        if before > 0 && value > env.get(self.lb) {
            env.set(self.lb, value);
        }
        before - self.size(env)
    }
    /// Removes all values strictly greater than `value` and returns the number
    /// of values that have been removed
    pub fn remove_above(&mut self, env: &mut Environment, value: i32) -> usize {
        let before = self.size(env);
        if before > 0 && value < env.get(self.ub) {
            env.set(self.ub, value);
        }
        before - self.size(env)
    }
}

impl ReversibleSet for IntervalSet {
    fn add(&mut self, env: &mut Environment, value: i32) -> bool {
        if self.is_empty(env) {
            env.set(self.lb, value);
            env.set(self.ub, value);
            true
        } else if env.get(self.lb).checked_sub(1) == Some(value) {
            env.set(self.lb, value);
            true
        } else if env.get(self.ub).checked_add(1) == Some(value) {
            env.set(self.ub, value);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, env: &mut Environment, value: i32) -> bool {
        let lb = env.get(self.lb);
        if !self.contains(env, value) {
            false
        } else if value == lb && lb < i32::MAX {
            env.increment(self.lb);
            true
        } else if value == env.get(self.ub) {
            env.decrement(self.ub);
            true
        } else {
            false
        }
    }

    fn contains(&self, env: &Environment, value: i32) -> bool {
        env.get(self.lb) <= value && value <= env.get(self.ub)
    }

    fn size(&self, env: &Environment) -> usize {
        let (lb, ub) = (env.get(self.lb) as i64, env.get(self.ub) as i64);
        (ub - lb + 1).max(0) as usize
    }

    fn first_element(&self, env: &Environment) -> Option<i32> {
        self.min(env)
    }

    fn next_element(&self, env: &Environment, after: i32) -> Option<i32> {
        let (lb, ub) = (env.get(self.lb), env.get(self.ub));
        if after < lb {
            (lb <= ub).then_some(lb)
        } else {
            (after < ub).then(|| after + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    #[test]
    fn only_the_bounds_can_be_removed() {
        let mut env = Environment::new();
        let mut itv = IntervalSet::new(&mut env, 0, 5);
        assert!(!itv.remove(&mut env, 3));
        assert!(itv.remove(&mut env, 0));
        assert!(itv.remove(&mut env, 5));
        assert_eq!(vec![1, 2, 3, 4], itv.iter(&env).collect::<Vec<_>>());
    }

    #[test]
    fn only_adjacent_values_can_be_added() {
        let mut env = Environment::new();
        let mut itv = IntervalSet::new(&mut env, 3, 4);
        assert!(!itv.add(&mut env, 7));
        assert!(itv.add(&mut env, 5));
        assert!(itv.add(&mut env, 2));
        assert!(!itv.add(&mut env, 3));
        assert_eq!(Some(2), itv.min(&env));
        assert_eq!(Some(5), itv.max(&env));
    }

    #[test]
    fn emptying_an_interval_is_undone() {
        let mut env = Environment::new();
        let mut itv = IntervalSet::new(&mut env, 0, 9);
        env.world_push();
        assert_eq!(5, itv.remove_below(&mut env, 5));
        assert_eq!(5, itv.remove_above(&mut env, 2));
        assert!(itv.is_empty(&env));
        assert_eq!(None, itv.first_element(&env));
        assert_eq!(0, itv.remove_above(&mut env, 0));
        env.world_pop();
        assert_eq!(10, itv.size(&env));
    }

    #[test]
    fn the_extreme_values_can_be_removed() {
        let mut env = Environment::new();
        let mut top = IntervalSet::new(&mut env, i32::MAX, i32::MAX);
        assert!(top.remove(&mut env, i32::MAX));
        assert!(top.is_empty(&env));
        assert_eq!(None, top.max(&env));

        let mut bottom = IntervalSet::new(&mut env, i32::MIN, i32::MIN + 1);
        assert_eq!(vec![i32::MIN, i32::MIN + 1], bottom.iter(&env).collect::<Vec<_>>());
        assert!(!bottom.add(&mut env, i32::MAX));
        assert!(bottom.remove(&mut env, i32::MIN + 1));
        assert!(bottom.remove(&mut env, i32::MIN));
        assert!(bottom.is_empty(&env));
        assert_eq!(None, bottom.next_element(&env, i32::MIN));
    }
}
