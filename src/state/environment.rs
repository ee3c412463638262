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

//! This module defines the environment: the single authority that knows in
//! which world the search currently is and which is able to roll back all
//! the stored primitives to any of the enclosing worlds.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;

use crate::{EnvironmentConfig, Integral, SaveAndRestore, Scalar, Trail};

/// Source of the (process wide) unique environment identifiers
static NEXT_ENVIRONMENT: AtomicU32 = AtomicU32::new(0);

/// The identifier of an environment. Stored primitives are tagged with the
/// identifier of their owner so that using a primitive with the wrong
/// environment gets caught instead of silently corrupting some other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentId(u32);

/// The identifier of a managed (stored) primitive of type T. This is only a
/// handle: the value itself lives in the environment.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Stored<T: Scalar> {
    /// The environment owning this primitive
    env: EnvironmentId,
    /// The position of the primitive in the environment
    slot: u32,
    _type: PhantomData<T>,
}
// Not derived because it would require T: Clone
impl<T: Scalar> Clone for Stored<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: Scalar> Copy for Stored<T> {}

/// A stored 32 bits integer
pub type StoredInt = Stored<i32>;
/// A stored 64 bits integer
pub type StoredLong = Stored<i64>;
/// A stored boolean
pub type StoredBool = Stored<bool>;
/// A stored double precision float
pub type StoredDouble = Stored<f64>;

/// The current state of one managed primitive
#[derive(Debug, Clone, Copy)]
struct Slot {
    /// The encoded value
    bits: u64,
    /// The stamp of the world in which this slot has last been saved on the
    /// trail. The slot needs not be saved again as long as that world is the
    /// current one.
    ///
    /// # Note:
    /// This is what minicp and maxicp call 'magic'.
    stamp: u64,
}

/// An undo record: it suffices to put it back in place to undo a write.
#[derive(Debug, Clone, Copy)]
struct UndoRecord {
    /// The slot that has been modified
    slot: u32,
    /// What the slot looked like before it got modified
    state: Slot,
}

/// The environment owns the trail and all the stored primitives. It is the
/// only entity entitled to decide what world the solver is in, and to roll
/// the state back to an enclosing world.
#[derive(Debug)]
pub struct Environment {
    /// The identifier of this environment
    id: EnvironmentId,
    /// The current value of the various managed primitives
    slots: Vec<Slot>,
    /// The previous values that are saved on the trail
    trail: Trail<UndoRecord>,
    /// The stamp of every world on the current path (root included)
    stamps: Vec<u64>,
    /// The next stamp to hand out. World stamps are never reused, not even
    /// after the world has been popped.
    next_stamp: u64,
    /// A counter which is bumped by every world operation
    timestamp: u64,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates a new environment with the default configuration
    pub fn new() -> Self {
        Self::with_config(&EnvironmentConfig::default())
    }
    /// Creates a new environment with the given configuration
    pub fn with_config(config: &EnvironmentConfig) -> Self {
        Self {
            id: EnvironmentId(NEXT_ENVIRONMENT.fetch_add(1, Ordering::Relaxed)),
            slots: Vec::with_capacity(config.initial_slots),
            trail: Trail::with_capacity(config.initial_trail_capacity),
            stamps: vec![0],
            next_stamp: 1,
            timestamp: 0,
        }
    }
    /// Returns the identifier of this environment
    pub fn id(&self) -> EnvironmentId {
        self.id
    }
    /// Returns the value of the counter that is bumped upon every world
    /// operation (push, pop, commit). Two equal timestamps mean that no world
    /// operation occurred in between.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
    /// Returns the number of undo records currently on the trail
    pub fn trail_level(&self) -> usize {
        self.trail.level()
    }
    /// Returns the number of primitives managed by this environment
    pub fn nb_primitives(&self) -> usize {
        self.slots.len()
    }

    /// Pops worlds until the given depth is reached
    pub fn world_pop_until(&mut self, world: usize) {
        assert!(
            world <= self.world_index(),
            "cannot pop until world {world} from world {}",
            self.world_index()
        );
        while self.world_index() > world {
            self.world_pop();
        }
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ FACTORIES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Creates a new managed primitive holding the given initial value.
    ///
    /// The primitive is stamped with the current world: writes issued in the
    /// world where it was born are not recorded.
    pub fn make<T: Scalar>(&mut self, value: T) -> Stored<T> {
        let slot = u32::try_from(self.slots.len()).expect("too many stored primitives");
        self.slots.push(Slot {
            bits: value.to_bits(),
            stamp: self.current_stamp(),
        });
        Stored {
            env: self.id,
            slot,
            _type: PhantomData,
        }
    }
    /// Creates a new stored integer
    pub fn make_int(&mut self, value: i32) -> StoredInt {
        self.make(value)
    }
    /// Creates a new stored long
    pub fn make_long(&mut self, value: i64) -> StoredLong {
        self.make(value)
    }
    /// Creates a new stored boolean
    pub fn make_bool(&mut self, value: bool) -> StoredBool {
        self.make(value)
    }
    /// Creates a new stored double
    pub fn make_double(&mut self, value: f64) -> StoredDouble {
        self.make(value)
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ ACCESSORS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Returns the current value of a stored primitive
    #[inline]
    pub fn get<T: Scalar>(&self, id: Stored<T>) -> T {
        self.check_owner(id.env);
        T::from_bits(self.slots[id.slot as usize].bits)
    }

    /// Sets the value of a stored primitive and returns the new value
    #[inline]
    pub fn set<T: Scalar>(&mut self, id: Stored<T>, value: T) -> T {
        self.check_owner(id.env);
        let bits = value.to_bits();
        let stamp = self.current_stamp();
        let curr = self.slots[id.slot as usize];
        // if the value is unchanged there is no need to do anything
        if curr.bits != bits {
            // the root world can never be undone: no need to record anything
            if curr.stamp != stamp && self.world_index() > 0 {
                self.trail.push(UndoRecord {
                    slot: id.slot,
                    state: curr,
                });
            }
            self.slots[id.slot as usize] = Slot { bits, stamp };
        }
        value
    }

    /// Adds delta to a stored integral primitive and returns the new value
    pub fn add<T: Integral>(&mut self, id: Stored<T>, delta: T) -> T {
        self.set(id, self.get(id) + delta)
    }
    /// Increments a stored integral primitive and returns the new value
    pub fn increment<T: Integral>(&mut self, id: Stored<T>) -> T {
        self.add(id, T::one())
    }
    /// Decrements a stored integral primitive and returns the new value
    pub fn decrement<T: Integral>(&mut self, id: Stored<T>) -> T {
        self.set(id, self.get(id) - T::one())
    }
    /// Negates a stored boolean and returns the new value
    pub fn flip(&mut self, id: StoredBool) -> bool {
        self.set(id, !self.get(id))
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ PRIVATE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// The stamp of the current world
    #[inline]
    fn current_stamp(&self) -> u64 {
        // there is always at least the root stamp
        self.stamps[self.stamps.len() - 1]
    }
    #[inline]
    fn check_owner(&self, env: EnvironmentId) {
        assert!(
            env == self.id,
            "stored primitive of environment {:?} used with environment {:?}",
            env,
            self.id
        );
    }
}

impl SaveAndRestore for Environment {
    fn world_push(&mut self) {
        self.trail.world_push();
        self.stamps.push(self.next_stamp);
        self.next_stamp += 1;
        self.timestamp += 1;
        trace!("world push -> {}", self.world_index());
    }

    fn world_pop(&mut self) {
        assert!(
            self.world_index() > 0,
            "cannot pop above the root world of the environment"
        );
        let slots = &mut self.slots;
        for record in self.trail.world_pop() {
            slots[record.slot as usize] = record.state;
        }
        self.stamps.pop();
        self.timestamp += 1;
        trace!("world pop -> {}", self.world_index());
    }

    fn world_commit(&mut self) {
        assert!(
            self.world_index() > 0,
            "cannot commit the root world of the environment"
        );
        self.trail.world_commit();
        self.stamps.pop();
        self.timestamp += 1;
        trace!("world commit -> {}", self.world_index());
    }

    fn world_index(&self) -> usize {
        self.trail.depth()
    }
}

// #############################################################################
// ### UNIT TESTS ##############################################################
// #############################################################################
