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

//! This module defines the trail: the append only log of undo records that
//! is partitioned into worlds.

use std::iter::Rev;
use std::vec::Drain;

/// The minimum number of records that are reserved whenever the trail needs
/// to grow.
const MIN_GROWTH: usize = 16;

/// A trail consists of a sequence of undo records typically representing the
/// changes to some data structure. The purpose of this structure is to allow
/// undoing the changes in order to restore a previous state.
///
/// The records are partitioned in worlds: `starts[d - 1]` is the position of
/// the first record of world `d` (world 0, the root, starts at position 0).
#[derive(Debug, Clone)]
pub struct Trail<E> {
    /// The undo records themselves
    records: Vec<E>,
    /// Where does each world (but the root) begin ?
    starts: Vec<usize>,
}

// Not derived to avoid imposing Default on E
impl<E> Default for Trail<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Trail<E> {
    /// Creates a new empty trail
    pub fn new() -> Self {
        Self::with_capacity(0)
    }
    /// Creates a new empty trail able to hold `capacity` records before it
    /// needs to grow
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            starts: vec![],
        }
    }
    /// Returns the depth of the current world (0 means root)
    pub fn depth(&self) -> usize {
        self.starts.len()
    }
    /// Returns the number of records on the trail (the 'current level')
    pub fn level(&self) -> usize {
        self.records.len()
    }
    /// Returns the number of records that can be pushed before a reallocation
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }
    /// Returns true iff there is no record on the trail
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends an undo record to the current world.
    ///
    /// The storage grows by roughly 1.5x *before* the record is written so that
    /// the write itself never triggers an implicit reallocation.
    pub fn push(&mut self, record: E) {
        if self.records.len() == self.records.capacity() {
            let extra = (self.records.capacity() / 2).max(MIN_GROWTH);
            self.records.reserve_exact(extra);
        }
        self.records.push(record);
    }

    /// Opens a new world
    pub fn world_push(&mut self) {
        self.starts.push(self.records.len());
    }

    /// Closes the current world and yields all of its records in reverse
    /// chronological order. The records are removed from the trail.
    pub fn world_pop(&mut self) -> Rev<Drain<'_, E>> {
        let start = self
            .starts
            .pop()
            .expect("cannot pop above the root world of the trail");
        self.records.drain(start..).rev()
    }

    /// Merges the current world into its parent: the records are kept and
    /// will be undone when the parent world is popped.
    pub fn world_commit(&mut self) {
        self.starts
            .pop()
            .expect("cannot commit the root world of the trail");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popped_records_come_in_reverse_order() {
        let mut trail = Trail::new();
        trail.push(1);

        trail.world_push();
        trail.push(2);
        trail.push(3);
        trail.push(4);

        let popped = trail.world_pop().collect::<Vec<_>>();
        assert_eq!(vec![4, 3, 2], popped);
        assert_eq!(1, trail.level());
        assert_eq!(0, trail.depth());
    }

    #[test]
    fn each_world_pops_its_own_records() {
        let mut trail = Trail::new();
        trail.push(1);
        trail.world_push();
        trail.world_push();
        trail.push(2);
        trail.world_push();
        trail.push(3);
        trail.push(4);

        assert_eq!(4, trail.level());
        assert_eq!(vec![4, 3], trail.world_pop().collect::<Vec<_>>());
        assert_eq!(vec![2], trail.world_pop().collect::<Vec<_>>());
        assert_eq!(0, trail.world_pop().count());
        assert_eq!(1, trail.level());
        assert_eq!(0, trail.depth());
    }

    #[test]
    fn commit_hands_the_records_over_to_the_parent() {
        let mut trail = Trail::new();
        trail.world_push();
        trail.push(1);
        trail.world_push();
        trail.push(2);
        trail.world_commit();

        assert_eq!(1, trail.depth());
        assert_eq!(2, trail.level());

        let popped = trail.world_pop().collect::<Vec<_>>();
        assert_eq!(vec![2, 1], popped);
        assert!(trail.is_empty());
    }

    #[test]
    fn the_trail_grows_geometrically() {
        let mut trail = Trail::with_capacity(100);
        for i in 0..100 {
            trail.push(i);
        }
        assert_eq!(100, trail.capacity());
        trail.push(100);
        assert!(trail.capacity() >= 150);
        assert_eq!(101, trail.level());
    }

    #[test]
    #[should_panic]
    fn popping_the_root_world_is_a_contract_violation() {
        let mut trail = Trail::<usize>::new();
        let _ = trail.world_pop();
    }

    #[test]
    #[should_panic]
    fn committing_the_root_world_is_a_contract_violation() {
        let mut trail = Trail::<usize>::new();
        trail.world_commit();
    }
}
