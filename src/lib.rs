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

//! # revcp
//! The reversible state and propagation core of a constraint programming
//! solver.
//!
//! The crate is organised in layers. The `state` module offers an
//! environment where stored primitives live and which is able to roll them
//! back to any enclosing world of the search tree, plus a couple of
//! reversible sets built on top of these primitives. The `engine` module
//! builds the integer variables, the delta logs and the propagation engine
//! on top of that state, and the `Solver` ties everything together for a
//! search procedure to drive.

mod config;
mod constraints;
mod engine;
mod state;
mod utils;

pub use config::*;
pub use constraints::*;
pub use engine::*;
pub use state::*;
pub use utils::*;

/// Everything that is needed to write a model, a propagator or a search
pub mod prelude {
    pub use crate::{
        CPResult, Cause, Contradiction, DeltaKind, DeltaMonitor, DomainStore, Environment,
        EventMask, IntEvent, IntVar, LessOrEqual, NotEqual, PostContext, Priority,
        PropagationContext, Propagator, PropagatorId, ReversibleSet, SaveAndRestore, Solver,
        SolverConfig, StoredBool, StoredInt,
    };
}
