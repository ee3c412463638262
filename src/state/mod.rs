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

//! The state module comprises all traits and datastructures related to
//! the state (save and restore) management.
//!
//! # Note
//! All reversible objects are mere handles (identifiers) into an
//! `Environment` which owns the actual data. This keeps the reversible
//! objects dead simple (they are `Copy`) and makes it impossible for a write
//! to bypass the trail: every mutation has to go through the environment.

//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ MANAGER TRAITS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// An implementation of this type is capable of saving and restoring the
/// state of the resources it manages, one world at a time.
pub trait SaveAndRestore {
    /// Opens a new world: everything that is modified from now on can be
    /// undone with a call to `world_pop`
    fn world_push(&mut self);
    /// Undoes all the modifications of the current world and gets back to
    /// the parent world. Calling this method from the root world is a
    /// programming error.
    fn world_pop(&mut self);
    /// Merges the current world into its parent without undoing anything.
    /// Calling this method from the root world is a programming error.
    fn world_commit(&mut self);
    /// Returns the depth of the current world (0 is the root)
    fn world_index(&self) -> usize;
}

mod environment;
mod structures;
mod trail;

pub use environment::*;
pub use structures::*;
pub use trail::*;
