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

//! This module provides a reversible bitset whose words are stored longs.
//! Only the words that actually change are saved on the trail, and at most
//! once per world.

use crate::{Environment, ReversibleSet, StoredInt, StoredLong};

/// The number of bits in one word
const WORD: usize = 64;

/// Returns a mask with the bits `[lo, hi)` of a word set (0 <= lo < hi <= 64)
#[inline]
fn mask(lo: usize, hi: usize) -> u64 {
    let upper = if hi == WORD { !0 } else { (1_u64 << hi) - 1 };
    upper & (!0_u64 << lo)
}

/// A reversible set of bits `0 .. capacity`
#[derive(Debug, Clone)]
pub struct StoredBitSet {
    /// The number of bits in the universe
    capacity: usize,
    /// The words of the bitset
    words: Vec<StoredLong>,
    /// The number of bits that are set
    card: StoredInt,
}

impl StoredBitSet {
    /// Creates a new bitset of the given capacity where no bit is set
    pub fn new(env: &mut Environment, capacity: usize) -> Self {
        let nwords = (capacity + WORD - 1) / WORD;
        Self {
            capacity,
            words: (0..nwords).map(|_| env.make_long(0)).collect(),
            card: env.make_int(0),
        }
    }
    /// Creates a new bitset of the given capacity where all bits are set
    pub fn full(env: &mut Environment, capacity: usize) -> Self {
        let mut bits = Self::new(env, capacity);
        bits.set_range(env, 0, capacity);
        bits
    }
    /// Returns the number of bits in the universe
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Returns the number of bits that are set
    pub fn cardinality(&self, env: &Environment) -> usize {
        env.get(self.card) as usize
    }

    /// Returns true iff the ith bit is set
    pub fn get(&self, env: &Environment, i: usize) -> bool {
        i < self.capacity && self.word(env, i / WORD) & (1 << (i % WORD)) != 0
    }
    /// Sets the ith bit and tells whether it changed
    pub fn set(&mut self, env: &mut Environment, i: usize) -> bool {
        assert!(i < self.capacity, "bit {i} is out of bounds");
        self.update(env, i / WORD, |w| w | (1 << (i % WORD))) != 0
    }
    /// Clears the ith bit and tells whether it changed
    pub fn clear(&mut self, env: &mut Environment, i: usize) -> bool {
        assert!(i < self.capacity, "bit {i} is out of bounds");
        self.update(env, i / WORD, |w| w & !(1 << (i % WORD))) != 0
    }
    /// Sets all the bits in `[from, to)` and returns the number of bits that
    /// changed
    pub fn set_range(&mut self, env: &mut Environment, from: usize, to: usize) -> usize {
        self.update_range(env, from, to, |w, m| w | m)
    }
    /// Clears all the bits in `[from, to)` and returns the number of bits that
    /// changed
    pub fn clear_range(&mut self, env: &mut Environment, from: usize, to: usize) -> usize {
        self.update_range(env, from, to, |w, m| w & !m)
    }
    /// Returns the number of bits that are set in `[from, to)`
    pub fn count_range(&self, env: &Environment, from: usize, to: usize) -> usize {
        let to = to.min(self.capacity);
        let mut count = 0;
        let mut lo = from;
        while lo < to {
            let w = lo / WORD;
            let hi = to.min((w + 1) * WORD);
            let m = mask(lo % WORD, hi - w * WORD);
            count += (self.word(env, w) & m).count_ones() as usize;
            lo = hi;
        }
        count
    }

    /// Returns the index of the first set bit at or after `from`
    pub fn next_set_bit(&self, env: &Environment, from: usize) -> Option<usize> {
        self.scan_forward(env, from, false)
    }
    /// Returns the index of the first clear bit at or after `from`
    pub fn next_clear_bit(&self, env: &Environment, from: usize) -> Option<usize> {
        self.scan_forward(env, from, true)
    }
    /// Returns the index of the last set bit at or before `from`
    pub fn prev_set_bit(&self, env: &Environment, from: usize) -> Option<usize> {
        self.scan_backward(env, from, false)
    }
    /// Returns the index of the last clear bit at or before `from`
    pub fn prev_clear_bit(&self, env: &Environment, from: usize) -> Option<usize> {
        self.scan_backward(env, from, true)
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ PRIVATE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    #[inline]
    fn word(&self, env: &Environment, w: usize) -> u64 {
        env.get(self.words[w]) as u64
    }
    /// Replaces word w with f(w), maintains the cardinality and returns the
    /// number of bits that changed
    fn update<F: Fn(u64) -> u64>(&mut self, env: &mut Environment, w: usize, f: F) -> usize {
        let old = self.word(env, w);
        let new = f(old);
        if old == new {
            0
        } else {
            env.set(self.words[w], new as i64);
            let delta = new.count_ones() as i32 - old.count_ones() as i32;
            env.add(self.card, delta);
            (old ^ new).count_ones() as usize
        }
    }
    fn update_range<F>(&mut self, env: &mut Environment, from: usize, to: usize, f: F) -> usize
    where
        F: Fn(u64, u64) -> u64,
    {
        let to = to.min(self.capacity);
        let mut changed = 0;
        let mut lo = from;
        while lo < to {
            let w = lo / WORD;
            let hi = to.min((w + 1) * WORD);
            let m = mask(lo % WORD, hi - w * WORD);
            changed += self.update(env, w, |word| f(word, m));
            lo = hi;
        }
        changed
    }
    /// Finds the first bit at or after from which is set (or clear when
    /// `inverted` is true)
    fn scan_forward(&self, env: &Environment, from: usize, inverted: bool) -> Option<usize> {
        if from >= self.capacity {
            return None;
        }
        let load = |w: usize| {
            let word = self.word(env, w);
            if inverted {
                !word
            } else {
                word
            }
        };
        let mut w = from / WORD;
        let mut word = load(w) & (!0_u64 << (from % WORD));
        loop {
            if word != 0 {
                let idx = w * WORD + word.trailing_zeros() as usize;
                return (idx < self.capacity).then_some(idx);
            }
            w += 1;
            if w == self.words.len() {
                return None;
            }
            word = load(w);
        }
    }
    /// Finds the last bit at or before from which is set (or clear when
    /// `inverted` is true)
    fn scan_backward(&self, env: &Environment, from: usize, inverted: bool) -> Option<usize> {
        if self.capacity == 0 {
            return None;
        }
        let from = from.min(self.capacity - 1);
        let load = |w: usize| {
            let word = self.word(env, w);
            if inverted {
                !word
            } else {
                word
            }
        };
        let mut w = from / WORD;
        let mut word = load(w) & (!0_u64 >> (WORD - 1 - from % WORD));
        loop {
            if word != 0 {
                return Some(w * WORD + WORD - 1 - word.leading_zeros() as usize);
            }
            if w == 0 {
                return None;
            }
            w -= 1;
            word = load(w);
        }
    }
}

impl ReversibleSet for StoredBitSet {
    fn add(&mut self, env: &mut Environment, value: i32) -> bool {
        value >= 0 && (value as usize) < self.capacity && self.set(env, value as usize)
    }
    fn remove(&mut self, env: &mut Environment, value: i32) -> bool {
        value >= 0 && (value as usize) < self.capacity && self.clear(env, value as usize)
    }
    fn contains(&self, env: &Environment, value: i32) -> bool {
        value >= 0 && self.get(env, value as usize)
    }
    fn size(&self, env: &Environment) -> usize {
        self.cardinality(env)
    }
    fn first_element(&self, env: &Environment) -> Option<i32> {
        self.next_set_bit(env, 0).map(|i| i as i32)
    }
    fn next_element(&self, env: &Environment, after: i32) -> Option<i32> {
        let from = usize::try_from(after).ok()? + 1;
        self.next_set_bit(env, from).map(|i| i as i32)
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    #[test]
    fn set_and_clear_are_undone() {
        let mut env = Environment::new();
        let mut bits = StoredBitSet::new(&mut env, 130);
        bits.set(&mut env, 3);
        bits.set(&mut env, 129);

        env.world_push();
        assert!(bits.set(&mut env, 64));
        assert!(!bits.set(&mut env, 64));
        assert!(bits.clear(&mut env, 3));
        assert_eq!(2, bits.cardinality(&env));
        env.world_pop();

        assert!(bits.get(&env, 3));
        assert!(!bits.get(&env, 64));
        assert!(bits.get(&env, 129));
        assert!(!bits.get(&env, 500));
        assert_eq!(2, bits.cardinality(&env));
    }

    #[test]
    fn ranges_span_several_words() {
        let mut env = Environment::new();
        let mut bits = StoredBitSet::new(&mut env, 200);
        assert_eq!(140, bits.set_range(&mut env, 10, 150));
        assert_eq!(140, bits.cardinality(&env));
        assert_eq!(0, bits.set_range(&mut env, 20, 30));
        assert_eq!(50, bits.clear_range(&mut env, 60, 110));
        assert_eq!(90, bits.cardinality(&env));
        assert_eq!(6, bits.count_range(&env, 56, 112));
        assert!(bits.get(&env, 59));
        assert!(!bits.get(&env, 60));
        assert!(!bits.get(&env, 109));
        assert!(bits.get(&env, 110));
    }

    #[test]
    fn the_full_bitset_holds_exactly_capacity_bits() {
        let mut env = Environment::new();
        let bits = StoredBitSet::full(&mut env, 70);
        assert_eq!(70, bits.cardinality(&env));
        assert_eq!(Some(69), bits.prev_set_bit(&env, 1_000));
        assert_eq!(None, bits.next_clear_bit(&env, 0));
        assert_eq!(None, bits.next_set_bit(&env, 70));
    }

    #[test]
    fn word_level_scans() {
        let mut env = Environment::new();
        let mut bits = StoredBitSet::new(&mut env, 256);
        bits.set(&mut env, 5);
        bits.set(&mut env, 70);
        bits.set(&mut env, 200);

        assert_eq!(Some(5), bits.next_set_bit(&env, 0));
        assert_eq!(Some(5), bits.next_set_bit(&env, 5));
        assert_eq!(Some(70), bits.next_set_bit(&env, 6));
        assert_eq!(Some(200), bits.next_set_bit(&env, 71));
        assert_eq!(None, bits.next_set_bit(&env, 201));

        assert_eq!(Some(200), bits.prev_set_bit(&env, 255));
        assert_eq!(Some(70), bits.prev_set_bit(&env, 199));
        assert_eq!(Some(5), bits.prev_set_bit(&env, 69));
        assert_eq!(None, bits.prev_set_bit(&env, 4));

        bits.set_range(&mut env, 0, 130);
        assert_eq!(Some(130), bits.next_clear_bit(&env, 0));
        assert_eq!(Some(131), bits.next_clear_bit(&env, 131));
        assert_eq!(None, bits.prev_clear_bit(&env, 129));
        assert_eq!(Some(199), bits.prev_clear_bit(&env, 200));
    }

    #[test]
    fn iteration_visits_the_set_bits_in_order() {
        let mut env = Environment::new();
        let mut bits = StoredBitSet::new(&mut env, 100);
        for i in [99, 0, 63, 64] {
            bits.add(&mut env, i);
        }
        assert!(!bits.add(&mut env, -1));
        assert!(!bits.add(&mut env, 100));
        assert_eq!(vec![0, 63, 64, 99], bits.iter(&env).collect::<Vec<_>>());
    }
}
