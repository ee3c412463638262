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

//! This module provides an indexed binary min-heap over dense item
//! identifiers (`0 .. n`). Each item is present at most once; the heap keeps
//! track of the position of every item so that it can be removed (or
//! re-keyed) in logarithmic time.
//!
//! Items with equal keys are popped in insertion order.

use std::cmp::Ordering;

/// One entry of the heap
#[derive(Debug, Clone, Copy)]
struct Entry {
    item: usize,
    key: f64,
    /// insertion sequence number (tie breaker)
    seq: u64,
}
impl Entry {
    #[inline]
    fn cmp(&self, other: &Entry) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then(self.seq.cmp(&other.seq))
    }
}

/// An indexed binary min-heap of items weighted by a floating point key
#[derive(Debug, Clone, Default)]
pub struct WeightedQueue {
    /// the heap itself
    heap: Vec<Entry>,
    /// item -> position in the heap
    position: Vec<Option<usize>>,
    /// next insertion sequence number
    seq: u64,
}

impl WeightedQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns the number of items in the queue
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    /// Returns true iff the queue holds no item
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    /// Returns true iff the given item is in the queue
    pub fn contains(&self, item: usize) -> bool {
        self.position.get(item).copied().flatten().is_some()
    }
    /// Returns the key of the given item (if it is queued)
    pub fn key_of(&self, item: usize) -> Option<f64> {
        self.position
            .get(item)
            .copied()
            .flatten()
            .map(|pos| self.heap[pos].key)
    }
    /// Inserts an item in the queue.
    ///
    /// # Panics
    /// Inserting an item which is already present is a programming error.
    pub fn insert(&mut self, item: usize, key: f64) {
        assert!(!self.contains(item), "item {item} is already queued");
        if item >= self.position.len() {
            self.position.resize(item + 1, None);
        }
        let seq = self.seq;
        self.seq += 1;

        let pos = self.heap.len();
        self.heap.push(Entry { item, key, seq });
        self.position[item] = Some(pos);
        self.sift_up(pos);
    }
    /// Removes the item with the smallest key and returns it along with its key
    pub fn pop_min(&mut self) -> Option<(usize, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.take(0);
        Some((top.item, top.key))
    }
    /// Removes the given item from the queue and tells whether it was present
    pub fn remove(&mut self, item: usize) -> bool {
        match self.position.get(item).copied().flatten() {
            Some(pos) => {
                self.take(pos);
                true
            }
            None => false,
        }
    }
    /// Recomputes the key of every queued item and restores the heap property.
    /// The insertion order of the items is preserved for tie breaking.
    pub fn rekey_all<F: FnMut(usize, f64) -> f64>(&mut self, mut f: F) {
        for e in self.heap.iter_mut() {
            e.key = f(e.item, e.key);
        }
        self.heapify();
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ PRIVATE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Removes the entry at the given position
    fn take(&mut self, pos: usize) -> Entry {
        let last = self.heap.len() - 1;
        self.swap(pos, last);
        let entry = self.heap.pop().expect("the heap cannot be empty here");
        self.position[entry.item] = None;
        if pos < self.heap.len() {
            self.sift_down(pos);
            self.sift_up(pos);
        }
        entry
    }
    fn heapify(&mut self) {
        for pos in (0..self.heap.len() / 2).rev() {
            self.sift_down(pos);
        }
    }
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a].item] = Some(a);
        self.position[self.heap[b].item] = Some(b);
    }
    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].cmp(&self.heap[parent]) == Ordering::Less {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.heap[left].cmp(&self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && self.heap[right].cmp(&self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}
