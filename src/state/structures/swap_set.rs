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

//! This module provides the swap-array partition (a.k.a. bipartite set or
//! sparse set): the universe `offset .. offset + n` is split in two by a
//! stored `boundary`. The elements at positions `[0, boundary)` are in the
//! set, the others are out.
//!
//! # Note
//! Every move swaps an element with the element sitting right at the
//! boundary. When a world only ever removes (or only ever adds) elements,
//! restoring the boundary alone would suffice: the elements on its left form
//! the same set as before, merely permuted. That no longer holds when
//! additions and removals interleave (an added element can be swapped deep
//! into the left part by a later removal), which is why the two swapped
//! slots are stored primitives as well. Each operation still costs O(1) and
//! saves each slot at most once per world.

use crate::{Environment, ReversibleSet, StoredInt};

/// A reversible swap-array partition
#[derive(Debug, Clone)]
pub struct SwapSet {
    /// offset of the values
    offset: i32,
    /// position -> element (relative to offset)
    elements: Vec<StoredInt>,
    /// element (relative to offset) -> position
    positions: Vec<StoredInt>,
    /// the number of elements in the set
    boundary: StoredInt,
}

impl SwapSet {
    /// Creates a new swap set over the universe `offset .. offset + n`. The
    /// set is either full or empty depending on the `full` flag.
    pub fn new(env: &mut Environment, offset: i32, n: usize, full: bool) -> Self {
        let n = i32::try_from(n).expect("swap set universe is too large");
        Self {
            offset,
            elements: (0..n).map(|i| env.make_int(i)).collect(),
            positions: (0..n).map(|i| env.make_int(i)).collect(),
            boundary: env.make_int(if full { n } else { 0 }),
        }
    }
    /// Returns the number of elements in the universe of this set
    pub fn capacity(&self) -> usize {
        self.elements.len()
    }
    /// Returns the element sitting at the given position of the array
    /// (positions below `size` are the members of the set)
    pub fn element_at(&self, env: &Environment, position: usize) -> i32 {
        env.get(self.elements[position]) + self.offset
    }
    /// Removes all the elements from the set
    pub fn clear(&mut self, env: &mut Environment) {
        env.set(self.boundary, 0);
    }

    /// Returns the index of `value` in the universe (if it belongs to it)
    fn index_of(&self, value: i32) -> Option<usize> {
        let idx = value as i64 - self.offset as i64;
        if idx < 0 || idx >= self.elements.len() as i64 {
            None
        } else {
            Some(idx as usize)
        }
    }
    /// Returns the position of the element with the given index
    fn position(&self, env: &Environment, idx: usize) -> usize {
        env.get(self.positions[idx]) as usize
    }
    /// Swaps the elements sitting at positions a and b
    fn swap(&self, env: &mut Environment, a: usize, b: usize) {
        if a != b {
            let ea = env.get(self.elements[a]);
            let eb = env.get(self.elements[b]);
            env.set(self.elements[a], eb);
            env.set(self.elements[b], ea);
            env.set(self.positions[ea as usize], b as i32);
            env.set(self.positions[eb as usize], a as i32);
        }
    }
}

impl ReversibleSet for SwapSet {
    fn add(&mut self, env: &mut Environment, value: i32) -> bool {
        match self.index_of(value) {
            Some(idx) if !self.contains(env, value) => {
                let boundary = env.get(self.boundary) as usize;
                let position = self.position(env, idx);
                self.swap(env, position, boundary);
                env.increment(self.boundary);
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, env: &mut Environment, value: i32) -> bool {
        match self.index_of(value) {
            Some(idx) if self.contains(env, value) => {
                let last = env.decrement(self.boundary) as usize;
                let position = self.position(env, idx);
                self.swap(env, position, last);
                true
            }
            _ => false,
        }
    }

    fn contains(&self, env: &Environment, value: i32) -> bool {
        self.index_of(value)
            .map(|idx| (self.position(env, idx) as i32) < env.get(self.boundary))
            .unwrap_or(false)
    }

    fn size(&self, env: &Environment) -> usize {
        env.get(self.boundary) as usize
    }

    fn first_element(&self, env: &Environment) -> Option<i32> {
        if self.size(env) > 0 {
            Some(self.element_at(env, 0))
        } else {
            None
        }
    }

    fn next_element(&self, env: &Environment, after: i32) -> Option<i32> {
        let next = self.position(env, self.index_of(after)?) + 1;
        if next < self.size(env) {
            Some(self.element_at(env, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    fn sorted_content(env: &Environment, set: &SwapSet) -> Vec<i32> {
        let mut out = set.iter(env).collect::<Vec<_>>();
        out.sort_unstable();
        out
    }

    #[test]
    fn membership_flips_and_reverts() {
        let mut env = Environment::new();
        let mut set = SwapSet::new(&mut env, 0, 4, false);
        for i in 0..4 {
            assert!(set.add(&mut env, i));
        }
        assert_eq!(4, set.size(&env));

        env.world_push();
        assert!(set.remove(&mut env, 1));
        assert!(set.remove(&mut env, 2));
        assert!(set.contains(&env, 0));
        assert!(!set.contains(&env, 1));
        assert!(!set.contains(&env, 2));
        assert!(set.contains(&env, 3));
        assert_eq!(vec![0, 3], sorted_content(&env, &set));

        env.world_pop();
        for i in 0..4 {
            assert!(set.contains(&env, i));
        }
        assert_eq!(vec![0, 1, 2, 3], sorted_content(&env, &set));
    }

    #[test]
    fn additions_are_undone_too() {
        let mut env = Environment::new();
        let mut set = SwapSet::new(&mut env, 10, 5, false);
        assert!(set.add(&mut env, 12));

        env.world_push();
        assert!(set.add(&mut env, 14));
        assert!(set.add(&mut env, 10));
        assert!(set.remove(&mut env, 12));
        assert_eq!(vec![10, 14], sorted_content(&env, &set));

        env.world_pop();
        assert_eq!(vec![12], sorted_content(&env, &set));
    }

    #[test]
    fn interleaved_additions_and_removals_across_worlds() {
        let mut env = Environment::new();
        let mut set = SwapSet::new(&mut env, 0, 6, false);
        set.add(&mut env, 0);
        set.add(&mut env, 1);

        env.world_push();
        assert!(set.add(&mut env, 4));
        env.world_push();
        assert!(set.remove(&mut env, 0));
        assert!(set.add(&mut env, 5));
        assert_eq!(vec![1, 4, 5], sorted_content(&env, &set));

        env.world_pop();
        assert_eq!(vec![0, 1, 4], sorted_content(&env, &set));
        env.world_pop();
        assert_eq!(vec![0, 1], sorted_content(&env, &set));
    }

    #[test]
    fn values_outside_the_universe_are_never_members() {
        let mut env = Environment::new();
        let mut set = SwapSet::new(&mut env, -2, 3, true);
        assert!(set.contains(&env, -2));
        assert!(set.contains(&env, 0));
        assert!(!set.contains(&env, 1));
        assert!(!set.contains(&env, -3));
        assert!(!set.add(&mut env, 5));
        assert!(!set.remove(&mut env, 5));
    }

    #[test]
    fn remove_of_an_absent_element_is_a_noop() {
        let mut env = Environment::new();
        let mut set = SwapSet::new(&mut env, 0, 3, true);
        assert!(set.remove(&mut env, 1));
        assert!(!set.remove(&mut env, 1));
        assert_eq!(2, set.size(&env));
    }

    #[test]
    fn clear_empties_the_set_until_backtrack() {
        let mut env = Environment::new();
        let mut set = SwapSet::new(&mut env, 0, 3, true);
        env.world_push();
        set.clear(&mut env);
        assert!(set.is_empty(&env));
        assert_eq!(None, set.first_element(&env));
        env.world_pop();
        assert_eq!(3, set.size(&env));
    }
}
