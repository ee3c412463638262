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

//! This module provides a reversible doubly linked set. Its links are stored
//! integers, so that unlinking (or relinking) an element is undone by the
//! environment like any other write. The elements are scanned in the order
//! in which they have been inserted.

use crate::{Environment, ReversibleSet, StoredBool, StoredInt};

/// A reversible doubly linked set over the universe `offset .. offset + n`.
///
/// The list is circular and goes through a sentinel node whose index is `n`.
#[derive(Debug, Clone)]
pub struct LinkedSet {
    /// offset of the values
    offset: i32,
    /// successor of each node (sentinel included)
    next: Vec<StoredInt>,
    /// predecessor of each node (sentinel included)
    prev: Vec<StoredInt>,
    /// is the element part of the set ?
    present: Vec<StoredBool>,
    /// number of elements in the set
    size: StoredInt,
}

impl LinkedSet {
    /// Creates a new linked set over the universe `offset .. offset + n`
    /// which is either full (elements in increasing order) or empty.
    pub fn new(env: &mut Environment, offset: i32, n: usize, full: bool) -> Self {
        let sentinel = i32::try_from(n).expect("linked set universe is too large");
        let len = sentinel + 1;
        let (next, prev): (Vec<StoredInt>, Vec<StoredInt>) = if full {
            (
                (0..len).map(|i| env.make_int((i + 1) % len)).collect(),
                (0..len).map(|i| env.make_int((i + len - 1) % len)).collect(),
            )
        } else {
            (
                (0..len).map(|_| env.make_int(sentinel)).collect(),
                (0..len).map(|_| env.make_int(sentinel)).collect(),
            )
        };
        Self {
            offset,
            next,
            prev,
            present: (0..n).map(|_| env.make_bool(full)).collect(),
            size: env.make_int(if full { sentinel } else { 0 }),
        }
    }
    /// Returns the index of the sentinel node
    fn sentinel(&self) -> usize {
        self.present.len()
    }
    /// Returns the index of `value` in the universe (if it belongs to it)
    fn index_of(&self, value: i32) -> Option<usize> {
        let idx = value as i64 - self.offset as i64;
        if idx < 0 || idx >= self.present.len() as i64 {
            None
        } else {
            Some(idx as usize)
        }
    }
    /// Converts a node into an element (None for the sentinel)
    fn element(&self, node: i32) -> Option<i32> {
        if node as usize == self.sentinel() {
            None
        } else {
            Some(node + self.offset)
        }
    }
    /// Returns the last element that has been added (if any)
    pub fn last_element(&self, env: &Environment) -> Option<i32> {
        self.element(env.get(self.prev[self.sentinel()]))
    }
}

impl ReversibleSet for LinkedSet {
    fn add(&mut self, env: &mut Environment, value: i32) -> bool {
        match self.index_of(value) {
            Some(idx) if !env.get(self.present[idx]) => {
                let sentinel = self.sentinel();
                let tail = env.get(self.prev[sentinel]);
                env.set(self.next[tail as usize], idx as i32);
                env.set(self.prev[idx], tail);
                env.set(self.next[idx], sentinel as i32);
                env.set(self.prev[sentinel], idx as i32);
                env.set(self.present[idx], true);
                env.increment(self.size);
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, env: &mut Environment, value: i32) -> bool {
        match self.index_of(value) {
            Some(idx) if env.get(self.present[idx]) => {
                let before = env.get(self.prev[idx]);
                let after = env.get(self.next[idx]);
                env.set(self.next[before as usize], after);
                env.set(self.prev[after as usize], before);
                env.set(self.present[idx], false);
                env.decrement(self.size);
                true
            }
            _ => false,
        }
    }

    fn contains(&self, env: &Environment, value: i32) -> bool {
        self.index_of(value)
            .map(|idx| env.get(self.present[idx]))
            .unwrap_or(false)
    }

    fn size(&self, env: &Environment) -> usize {
        env.get(self.size) as usize
    }

    fn first_element(&self, env: &Environment) -> Option<i32> {
        self.element(env.get(self.next[self.sentinel()]))
    }

    fn next_element(&self, env: &Environment, after: i32) -> Option<i32> {
        let idx = self.index_of(after)?;
        if env.get(self.present[idx]) {
            self.element(env.get(self.next[idx]))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    fn content(env: &Environment, set: &LinkedSet) -> Vec<i32> {
        set.iter(env).collect()
    }

    #[test]
    fn scan_follows_insertion_order() {
        let mut env = Environment::new();
        let mut set = LinkedSet::new(&mut env, 0, 5, false);
        set.add(&mut env, 3);
        set.add(&mut env, 0);
        set.add(&mut env, 4);
        assert_eq!(vec![3, 0, 4], content(&env, &set));
        assert_eq!(Some(4), set.last_element(&env));
    }

    #[test]
    fn unlinking_is_undone_on_backtrack() {
        let mut env = Environment::new();
        let mut set = LinkedSet::new(&mut env, 1, 5, true);
        assert_eq!(vec![1, 2, 3, 4, 5], content(&env, &set));

        env.world_push();
        assert!(set.remove(&mut env, 1));
        assert!(set.remove(&mut env, 3));
        env.world_push();
        assert!(set.remove(&mut env, 5));
        assert!(set.add(&mut env, 1));
        assert_eq!(vec![2, 4, 1], content(&env, &set));

        env.world_pop();
        assert_eq!(vec![2, 4, 5], content(&env, &set));
        env.world_pop();
        assert_eq!(vec![1, 2, 3, 4, 5], content(&env, &set));
        assert_eq!(5, set.size(&env));
    }

    #[test]
    fn emptying_the_set_leaves_only_the_sentinel() {
        let mut env = Environment::new();
        let mut set = LinkedSet::new(&mut env, 0, 2, true);
        set.remove(&mut env, 0);
        set.remove(&mut env, 1);
        assert!(set.is_empty(&env));
        assert_eq!(None, set.first_element(&env));
        assert_eq!(None, set.last_element(&env));
        assert!(!set.contains(&env, 0));
        assert!(!set.contains(&env, 9));
    }
}
