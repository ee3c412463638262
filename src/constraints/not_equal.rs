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

//! This module provides the implementation of the not equal constraint.

use crate::prelude::*;

/// This constraint enforces that x != y + c
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotEqual {
    /// x and y
    scope: [IntVar; 2],
    /// the offset
    c: i32,
}
impl NotEqual {
    /// Creates a new instance of the constraint x != y + c
    pub fn new(x: IntVar, y: IntVar, c: i32) -> Self {
        Self { scope: [x, y], c }
    }
}
impl Propagator for NotEqual {
    fn name(&self) -> &str {
        "not_equal"
    }
    fn scope(&self) -> &[IntVar] {
        &self.scope
    }
    /// A bounded variable only loses a value once it becomes one of its bounds
    fn event_mask(&self, _idx: usize) -> EventMask {
        IntEvent::bounds()
    }
    fn propagate(&mut self, ctx: &mut PropagationContext) -> CPResult<()> {
        let [x, y] = self.scope;
        let c = i64::from(self.c);
        if let Some(v) = ctx.value(x) {
            forbid(ctx, y, i64::from(v) - c)
        } else if let Some(v) = ctx.value(y) {
            forbid(ctx, x, i64::from(v) + c)
        } else {
            Ok(())
        }
    }
}

/// Removes value from the domain of var. A value that does not fit in an i32
/// cannot belong to any domain: the constraint is then trivially satisfied.
fn forbid(ctx: &mut PropagationContext, var: IntVar, value: i64) -> CPResult<()> {
    match i32::try_from(value) {
        Ok(value) => {
            ctx.remove_value(var, value)?;
            if !ctx.contains(var, value) {
                ctx.set_passive();
            }
        }
        Err(_) => ctx.set_passive(),
    }
    Ok(())
}
