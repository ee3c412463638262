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

//! This module defines the vocabulary used to describe what happened to the
//! domain of a variable, and who made it happen.

use std::fmt::Display;

use enumset::{EnumSet, EnumSetType};

use crate::PropagatorId;

/// The kinds of events that can happen on the domain of an integer variable
#[derive(Debug, EnumSetType, Hash)]
pub enum IntEvent {
    /// The domain collapsed to a single value
    Instantiate,
    /// The lower bound has increased
    IncLow,
    /// The upper bound has decreased
    DecUpp,
    /// At least one value has been removed (this is also raised along with
    /// the bound events)
    Remove,
}

/// A set of events
pub type EventMask = EnumSet<IntEvent>;

impl IntEvent {
    /// The events that are raised whenever any bound changes
    pub fn bounds() -> EventMask {
        IntEvent::Instantiate | IntEvent::IncLow | IntEvent::DecUpp
    }
    /// All the events
    pub fn all() -> EventMask {
        EnumSet::all()
    }
}

impl Display for IntEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntEvent::Instantiate => write!(f, "[Event:Instantiate]"),
            IntEvent::IncLow => write!(f, "[Event:IncLow]"),
            IntEvent::DecUpp => write!(f, "[Event:DecUpp]"),
            IntEvent::Remove => write!(f, "[Event:Remove]"),
        }
    }
}

/// The origin of a domain modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    /// Nobody in particular (or several distinct origins)
    Null,
    /// A search decision
    Decision,
    /// A propagator
    Propagator(PropagatorId),
}

impl Cause {
    /// Merges two causes: the result is the cause itself when both are equal
    /// and `Null` otherwise
    pub fn merge(self, other: Cause) -> Cause {
        if self == other {
            self
        } else {
            Cause::Null
        }
    }
}
