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

//! This module provides the implementation of the less or equal constraint.

use crate::prelude::*;

/// This constraint enforces that x <= y + c
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessOrEqual {
    /// x and y
    scope: [IntVar; 2],
    /// the offset
    c: i32,
}

impl LessOrEqual {
    /// Creates a new instance of the constraint x <= y + c
    pub fn new(x: IntVar, y: IntVar, c: i32) -> Self {
        Self { scope: [x, y], c }
    }
}
impl Propagator for LessOrEqual {
    fn name(&self) -> &str {
        "less_or_equal"
    }
    fn scope(&self) -> &[IntVar] {
        &self.scope
    }
    /// Only the lower bound of x and the upper bound of y matter
    fn event_mask(&self, idx: usize) -> EventMask {
        if idx == 0 {
            IntEvent::IncLow.into()
        } else {
            IntEvent::DecUpp.into()
        }
    }
    fn propagate(&mut self, ctx: &mut PropagationContext) -> CPResult<()> {
        let [x, y] = self.scope;
        // bounds are shifted in i64: out of the i32 range, the new bound is
        // either out of reach (no-op) or past every value (failure)
        let c = i64::from(self.c);
        let (Some(x_min), Some(y_max)) = (ctx.min(x), ctx.max(y)) else {
            return ctx.fail(None, "empty domain");
        };
        match i32::try_from(i64::from(y_max) + c) {
            Ok(ub) => {
                ctx.update_upper_bound(x, ub)?;
            }
            Err(_) if c < 0 => return ctx.fail(Some(x), "empty domain"),
            Err(_) => {}
        }
        match i32::try_from(i64::from(x_min) - c) {
            Ok(lb) => {
                ctx.update_lower_bound(y, lb)?;
            }
            Err(_) if c < 0 => return ctx.fail(Some(y), "empty domain"),
            Err(_) => {}
        }
        if let (Some(x_max), Some(y_min)) = (ctx.max(x), ctx.min(y)) {
            if i64::from(x_max) <= i64::from(y_min) + c {
                ctx.set_passive();
            }
        }
        Ok(())
    }
}
