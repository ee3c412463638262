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

//! This module provides the reversible data structures that are built on top
//! of the stored primitives. None of them implements any rollback logic of
//! its own: popping a world in the environment suffices to restore them to
//! the exact state they had in that world.

use crate::Environment;

/// All the operations that can be applied to a reversible set of integers.
///
/// `add` of an element which is already present and `remove` of an element
/// which is absent are no-ops returning false.
pub trait ReversibleSet {
    /// Adds the given element to the set and tells whether it was added
    fn add(&mut self, env: &mut Environment, value: i32) -> bool;
    /// Removes the given element from the set and tells whether it was removed
    fn remove(&mut self, env: &mut Environment, value: i32) -> bool;
    /// Returns true iff the set contains the given element
    fn contains(&self, env: &Environment, value: i32) -> bool;
    /// Returns the number of elements in the set
    fn size(&self, env: &Environment) -> usize;
    /// Returns true iff the set is empty
    fn is_empty(&self, env: &Environment) -> bool {
        self.size(env) == 0
    }
    /// Returns the first element of a scan (if there is one)
    fn first_element(&self, env: &Environment) -> Option<i32>;
    /// Returns the element which follows `after` in the scan. `after` must
    /// be an element of the set; the set must not be modified while scanning.
    fn next_element(&self, env: &Environment, after: i32) -> Option<i32>;
    /// Returns an iterator over the elements of the set
    fn iter<'a>(&'a self, env: &'a Environment) -> SetIter<'a, Self>
    where
        Self: Sized,
    {
        SetIter {
            set: self,
            env,
            next: self.first_element(env),
        }
    }
}

/// An iterator over the elements of a reversible set
#[derive(Debug)]
pub struct SetIter<'a, S: ReversibleSet> {
    set: &'a S,
    env: &'a Environment,
    next: Option<i32>,
}
impl<S: ReversibleSet> Iterator for SetIter<'_, S> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let current = self.next?;
        self.next = self.set.next_element(self.env, current);
        Some(current)
    }
}

/// A reversible set whose representation is chosen at creation time
#[derive(Debug, Clone)]
pub enum StoredSet {
    /// swap-array partition: best for small or sparse index sets
    Swap(SwapSet),
    /// linked list: iterates in insertion order
    Linked(LinkedSet),
    /// plain bitset
    Bits(StoredBitSet),
    /// bitset of excluded values with drifting bounds: best for large dense
    /// domains
    Anti(AntiDomain),
    /// bounds only
    Interval(IntervalSet),
}

macro_rules! dispatch {
    ($me: expr, $s: ident => $e: expr) => {
        match $me {
            StoredSet::Swap($s) => $e,
            StoredSet::Linked($s) => $e,
            StoredSet::Bits($s) => $e,
            StoredSet::Anti($s) => $e,
            StoredSet::Interval($s) => $e,
        }
    };
}

impl ReversibleSet for StoredSet {
    fn add(&mut self, env: &mut Environment, value: i32) -> bool {
        dispatch!(self, s => s.add(env, value))
    }
    fn remove(&mut self, env: &mut Environment, value: i32) -> bool {
        dispatch!(self, s => s.remove(env, value))
    }
    fn contains(&self, env: &Environment, value: i32) -> bool {
        dispatch!(self, s => s.contains(env, value))
    }
    fn size(&self, env: &Environment) -> usize {
        dispatch!(self, s => s.size(env))
    }
    fn first_element(&self, env: &Environment) -> Option<i32> {
        dispatch!(self, s => s.first_element(env))
    }
    fn next_element(&self, env: &Environment, after: i32) -> Option<i32> {
        dispatch!(self, s => s.next_element(env, after))
    }
}

impl From<SwapSet> for StoredSet {
    fn from(s: SwapSet) -> Self {
        Self::Swap(s)
    }
}
impl From<LinkedSet> for StoredSet {
    fn from(s: LinkedSet) -> Self {
        Self::Linked(s)
    }
}
impl From<StoredBitSet> for StoredSet {
    fn from(s: StoredBitSet) -> Self {
        Self::Bits(s)
    }
}
impl From<AntiDomain> for StoredSet {
    fn from(s: AntiDomain) -> Self {
        Self::Anti(s)
    }
}
impl From<IntervalSet> for StoredSet {
    fn from(s: IntervalSet) -> Self {
        Self::Interval(s)
    }
}

mod anti_domain;
mod bitset;
mod interval;
mod linked_set;
mod swap_set;

pub use anti_domain::*;
pub use bitset::*;
pub use interval::*;
pub use linked_set::*;
pub use swap_set::*;

#[cfg(test)]
mod tests_stored_set {
    use crate::SaveAndRestore;

    use super::*;

    fn all_variants(env: &mut Environment) -> Vec<StoredSet> {
        vec![
            SwapSet::new(env, 0, 8, true).into(),
            LinkedSet::new(env, 0, 8, true).into(),
            StoredBitSet::full(env, 8).into(),
            AntiDomain::new(env, 0, 7).into(),
            IntervalSet::new(env, 0, 7).into(),
        ]
    }

    #[test]
    fn every_variant_is_restored_by_world_pop() {
        let mut env = Environment::new();
        let mut sets = all_variants(&mut env);

        env.world_push();
        for set in sets.iter_mut() {
            assert!(set.remove(&mut env, 0));
            assert!(set.remove(&mut env, 7));
            assert!(!set.remove(&mut env, 7));
            assert_eq!(6, set.size(&env));
        }
        env.world_pop();

        for set in sets.iter() {
            assert_eq!(8, set.size(&env));
            let mut content = set.iter(&env).collect::<Vec<_>>();
            content.sort_unstable();
            assert_eq!((0..8).collect::<Vec<_>>(), content);
        }
    }

    #[test]
    fn add_of_a_present_element_is_a_noop() {
        let mut env = Environment::new();
        for mut set in all_variants(&mut env) {
            assert!(!set.add(&mut env, 3));
            assert_eq!(8, set.size(&env));
        }
    }
}
