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

//! This module defines the kind of error that is raised whenever the
//! propagation detects that the current node of the search tree has no
//! solution.

use crate::{Cause, IntVar};

/// This is the kind of error that gets raised whenever a domain gets wiped
/// out or a propagator detects an inconsistency. It is cheap to create and to
/// copy: raising it never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("contradiction ({message}) caused by {cause:?} on {variable:?}")]
pub struct Contradiction {
    /// Who detected the failure
    pub cause: Cause,
    /// The variable whose domain was wiped out (if any)
    pub variable: Option<IntVar>,
    /// A short description of what went wrong
    pub message: &'static str,
}

impl Contradiction {
    /// Creates a new contradiction
    pub fn new(cause: Cause, variable: Option<IntVar>, message: &'static str) -> Self {
        Self {
            cause,
            variable,
            message,
        }
    }
}

/// The result of a propagation operation. (Note: all propagation operations
/// can fail, in which case they raise a Contradiction error)
pub type CPResult<T> = Result<T, Contradiction>;
