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

//! The engine module comprises everything that is needed to run the
//! propagation on top of the reversible state: variables, deltas, events,
//! propagators, the scheduler and the solver facade.

mod contradiction;
mod delta;
mod events;
mod propagator;
mod scheduler;
mod solver;
mod variables;

pub use contradiction::*;
pub use delta::*;
pub use events::*;
pub use propagator::*;
pub use scheduler::*;
pub use solver::*;
pub use variables::*;
