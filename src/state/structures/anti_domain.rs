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

//! This module provides the 'anti-domain' representation of an integer
//! domain: a pair of stored bounds plus a bitset of the values that have been
//! *excluded* from the interior. Moving a bound never touches the bitset,
//! which makes the representation well suited for large dense domains where
//! most of the pruning happens on the bounds.
//!
//! The bits of values that have fallen outside `[lb, ub]` are meaningless.

use crate::{Environment, ReversibleSet, StoredBitSet, StoredInt};

/// An integer domain `[lb, ub] \ excluded`
#[derive(Debug, Clone)]
pub struct AntiDomain {
    /// The smallest value this domain could ever hold
    offset: i32,
    /// The current lower bound
    lb: StoredInt,
    /// The current upper bound
    ub: StoredInt,
    /// The number of values in the domain
    size: StoredInt,
    /// The interior values that have been excluded (relative to offset)
    excluded: StoredBitSet,
}

impl AntiDomain {
    /// Creates a new domain holding all the values in `[lb, ub]`
    pub fn new(env: &mut Environment, lb: i32, ub: i32) -> Self {
        assert!(lb <= ub, "cannot create the empty domain [{lb}, {ub}]");
        let n = (ub as i64 - lb as i64 + 1) as usize;
        Self {
            offset: lb,
            lb: env.make_int(lb),
            ub: env.make_int(ub),
            size: env.make_int(i32::try_from(n).expect("domain is too large")),
            excluded: StoredBitSet::new(env, n),
        }
    }
    /// Returns the smallest value of the domain
    pub fn min(&self, env: &Environment) -> Option<i32> {
        (!self.is_empty(env)).then(|| env.get(self.lb))
    }
    /// Returns the largest value of the domain
    pub fn max(&self, env: &Environment) -> Option<i32> {
        (!self.is_empty(env)).then(|| env.get(self.ub))
    }
    /// Returns the largest value of the domain which is smaller than `before`
    pub fn prev_element(&self, env: &Environment, before: i32) -> Option<i32> {
        if self.is_empty(env) || before <= env.get(self.lb) {
            return None;
        }
        let ub = env.get(self.ub);
        let from = if before > ub { ub } else { before - 1 };
        self.excluded
            .prev_clear_bit(env, self.index(from))
            .map(|i| self.value(i))
    }

    /// Removes all the values strictly smaller than `value`. Returns the
    /// number of values that have been removed.
    pub fn remove_below(&mut self, env: &mut Environment, value: i32) -> usize {
        if self.is_empty(env) || value <= env.get(self.lb) {
            return 0;
        }
        let ub = env.get(self.ub);
        if value > ub {
            return self.wipe_out(env);
        }
        let lb = env.get(self.lb);
        let removed = self.present_between(env, lb, value - 1);
        // merge with the excluded run that starts at value (if any)
        let new_lb = self
            .excluded
            .next_clear_bit(env, self.index(value))
            .map(|i| self.value(i))
            .unwrap_or(ub);
        env.set(self.lb, new_lb);
        env.add(self.size, -(removed as i32));
        removed
    }
    /// Removes all the values strictly greater than `value`. Returns the
    /// number of values that have been removed.
    pub fn remove_above(&mut self, env: &mut Environment, value: i32) -> usize {
        if self.is_empty(env) || value >= env.get(self.ub) {
            return 0;
        }
        let lb = env.get(self.lb);
        if value < lb {
            return self.wipe_out(env);
        }
        let ub = env.get(self.ub);
        let removed = self.present_between(env, value + 1, ub);
        let new_ub = self
            .excluded
            .prev_clear_bit(env, self.index(value))
            .map(|i| self.value(i))
            .unwrap_or(lb);
        env.set(self.ub, new_ub);
        env.add(self.size, -(removed as i32));
        removed
    }
    /// Removes all the values in `[from, to]`. Returns the number of values
    /// that have been removed.
    pub fn remove_range(&mut self, env: &mut Environment, from: i32, to: i32) -> usize {
        if self.is_empty(env) || from > to {
            return 0;
        }
        let lb = env.get(self.lb);
        let ub = env.get(self.ub);
        if from <= lb && to >= ub {
            self.wipe_out(env)
        } else if from <= lb {
            self.remove_below(env, to + 1)
        } else if to >= ub {
            self.remove_above(env, from - 1)
        } else {
            let removed = self.present_between(env, from, to);
            let (lo, hi) = (self.index(from), self.index(to) + 1);
            self.excluded.set_range(env, lo, hi);
            env.add(self.size, -(removed as i32));
            removed
        }
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ PRIVATE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    #[inline]
    fn index(&self, value: i32) -> usize {
        (value as i64 - self.offset as i64) as usize
    }
    #[inline]
    fn value(&self, index: usize) -> i32 {
        (self.offset as i64 + index as i64) as i32
    }
    /// Number of values of [from, to] which belong to the domain (both
    /// must lie within the current bounds)
    fn present_between(&self, env: &Environment, from: i32, to: i32) -> usize {
        let (lo, hi) = (self.index(from), self.index(to) + 1);
        (hi - lo) - self.excluded.count_range(env, lo, hi)
    }
    /// Empties the domain and returns the number of values removed
    fn wipe_out(&mut self, env: &mut Environment) -> usize {
        let removed = self.size(env);
        env.set(self.size, 0);
        removed
    }
}

impl ReversibleSet for AntiDomain {
    fn add(&mut self, env: &mut Environment, value: i32) -> bool {
        if value < self.offset || self.index(value) >= self.excluded.capacity() {
            return false;
        }
        if self.is_empty(env) {
            env.set(self.lb, value);
            env.set(self.ub, value);
        } else {
            let lb = env.get(self.lb);
            let ub = env.get(self.ub);
            if value < lb {
                // the values in between are not part of the domain
                let (lo, hi) = (self.index(value) + 1, self.index(lb));
                self.excluded.set_range(env, lo, hi);
                env.set(self.lb, value);
            } else if value > ub {
                let (lo, hi) = (self.index(ub) + 1, self.index(value));
                self.excluded.set_range(env, lo, hi);
                env.set(self.ub, value);
            } else if !self.excluded.get(env, self.index(value)) {
                return false;
            }
        }
        let idx = self.index(value);
        self.excluded.clear(env, idx);
        env.increment(self.size);
        true
    }

    fn remove(&mut self, env: &mut Environment, value: i32) -> bool {
        if !self.contains(env, value) {
            return false;
        }
        let lb = env.get(self.lb);
        let ub = env.get(self.ub);
        if lb == ub {
            self.wipe_out(env);
        } else if value == lb {
            self.remove_below(env, value + 1);
        } else if value == ub {
            self.remove_above(env, value - 1);
        } else {
            let idx = self.index(value);
            self.excluded.set(env, idx);
            env.decrement(self.size);
        }
        true
    }

    fn contains(&self, env: &Environment, value: i32) -> bool {
        !self.is_empty(env)
            && env.get(self.lb) <= value
            && value <= env.get(self.ub)
            && !self.excluded.get(env, self.index(value))
    }

    fn size(&self, env: &Environment) -> usize {
        env.get(self.size) as usize
    }

    fn first_element(&self, env: &Environment) -> Option<i32> {
        self.min(env)
    }

    fn next_element(&self, env: &Environment, after: i32) -> Option<i32> {
        if self.is_empty(env) || after >= env.get(self.ub) {
            return None;
        }
        let lb = env.get(self.lb);
        let from = if after < lb { lb } else { after + 1 };
        self.excluded
            .next_clear_bit(env, self.index(from))
            .map(|i| self.value(i))
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    fn content(env: &Environment, dom: &AntiDomain) -> Vec<i32> {
        dom.iter(env).collect()
    }

    #[test]
    fn bounds_drift_without_touching_the_interior() {
        let mut env = Environment::new();
        let mut dom = AntiDomain::new(&mut env, -5, 100);
        env.world_push();
        assert_eq!(10, dom.remove_below(&mut env, 5));
        assert_eq!(50, dom.remove_above(&mut env, 50));
        assert_eq!(Some(5), dom.min(&env));
        assert_eq!(Some(50), dom.max(&env));
        assert_eq!(46, dom.size(&env));
        assert_eq!(0, dom.excluded.cardinality(&env));
        env.world_pop();
        assert_eq!(106, dom.size(&env));
        assert_eq!(Some(-5), dom.min(&env));
    }

    #[test]
    fn removing_a_bound_merges_with_the_adjacent_excluded_run() {
        let mut env = Environment::new();
        let mut dom = AntiDomain::new(&mut env, 0, 200);
        assert_eq!(70, dom.remove_range(&mut env, 1, 70));
        assert_eq!(Some(0), dom.min(&env));
        assert!(dom.remove(&mut env, 0));
        assert_eq!(Some(71), dom.min(&env));

        assert_eq!(10, dom.remove_range(&mut env, 150, 159));
        assert_eq!(79, dom.remove_below(&mut env, 160));
        assert_eq!(Some(160), dom.min(&env));
        assert_eq!(41, dom.size(&env));
    }

    #[test]
    fn interior_removals_are_undone() {
        let mut env = Environment::new();
        let mut dom = AntiDomain::new(&mut env, 1, 9);
        env.world_push();
        assert!(dom.remove(&mut env, 5));
        assert!(!dom.remove(&mut env, 5));
        assert_eq!(3, dom.remove_range(&mut env, 2, 4));
        assert_eq!(vec![1, 6, 7, 8, 9], content(&env, &dom));
        assert_eq!(Some(1), dom.prev_element(&env, 6));
        assert_eq!(Some(6), dom.next_element(&env, 1));
        env.world_pop();
        assert_eq!((1..=9).collect::<Vec<_>>(), content(&env, &dom));
    }

    #[test]
    fn wipe_out_and_restore() {
        let mut env = Environment::new();
        let mut dom = AntiDomain::new(&mut env, 0, 3);
        env.world_push();
        assert_eq!(4, dom.remove_above(&mut env, -1));
        assert!(dom.is_empty(&env));
        assert_eq!(None, dom.min(&env));
        assert!(!dom.contains(&env, 2));
        env.world_pop();
        assert_eq!(4, dom.size(&env));
    }

    #[test]
    fn values_can_be_added_back_outside_the_bounds() {
        let mut env = Environment::new();
        let mut dom = AntiDomain::new(&mut env, 0, 10);
        dom.remove_below(&mut env, 6);
        assert!(dom.add(&mut env, 2));
        assert_eq!(vec![2, 6, 7, 8, 9, 10], content(&env, &dom));
        assert!(!dom.add(&mut env, 11));
        assert!(!dom.add(&mut env, 7));
        assert_eq!(6, dom.size(&env));
    }

    #[test]
    fn domains_can_touch_the_extreme_values() {
        let mut env = Environment::new();
        let mut top = AntiDomain::new(&mut env, i32::MAX - 2, i32::MAX);
        assert_eq!(2, top.remove_range(&mut env, i32::MAX - 1, i32::MAX));
        assert_eq!(Some(i32::MAX - 2), top.prev_element(&env, i32::MAX));
        assert!(top.remove(&mut env, i32::MAX - 2));
        assert!(top.is_empty(&env));

        let mut bottom = AntiDomain::new(&mut env, i32::MIN, i32::MIN + 2);
        assert_eq!(Some(i32::MIN + 1), bottom.next_element(&env, i32::MIN));
        assert!(bottom.remove(&mut env, i32::MIN));
        assert_eq!(Some(i32::MIN + 1), bottom.min(&env));
        assert_eq!(2, bottom.remove_range(&mut env, i32::MIN, i32::MAX));
        assert!(bottom.is_empty(&env));
    }
}
