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

//! This module provides the definition of the propagators along with the
//! contexts through which they interact with the rest of the solver.

use crate::{
    CPResult, Cause, Contradiction, DeltaKind, DeltaMonitor, DomainStore, Environment, EventMask,
    IntEvent, IntVar, VariableStore,
};

/// An identifier to a propagator which has been posted on a solver
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropagatorId(pub(crate) usize);
impl PropagatorId {
    /// Returns the identifier of this propagator
    pub fn id(self) -> usize {
        self.0
    }
}

/// How expensive a propagator is. Cheap propagators are always executed
/// before the expensive ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Unary,
    Binary,
    Ternary,
    Linear,
    Quadratic,
    Cubic,
    VerySlow,
}
impl Priority {
    /// The base key of a propagator having this priority in the queue. Bases
    /// are far enough apart for the adaptive weights to never make a
    /// propagator overtake one of a cheaper class.
    pub fn base(self) -> f64 {
        (self as u8) as f64 * 1_000_000.0
    }
}

/// The propagator is the portion of the code where the magic actually happens.
/// A propagator is called by the solver during the fixpoint computation. It
/// enforces a certain level of consistency on the domain of the variables it
/// works on.
///
/// The state of a propagator must be kept in stored primitives (allocated
/// with the environment given upon post) whenever it has to be restored upon
/// backtrack.
pub trait Propagator: Send {
    /// A human readable name (used for logging)
    fn name(&self) -> &str {
        "propagator"
    }
    /// The variables this propagator depends on
    fn scope(&self) -> &[IntVar];
    /// The priority of this propagator
    fn priority(&self) -> Priority {
        Priority::Binary
    }
    /// The events that must wake this propagator up when they happen on the
    /// variable at position `idx` of its scope
    fn event_mask(&self, _idx: usize) -> EventMask {
        IntEvent::all()
    }
    /// Returns true iff the propagator wants to be told about the events one
    /// scope position at a time (`propagate_event`) rather than be called
    /// through `propagate` for any change
    fn reacts_on_fine_events(&self) -> bool {
        false
    }
    /// Called once when the propagator is posted
    fn on_post(&mut self, _ctx: &mut PostContext) {}
    /// Runs the complete filtering algorithm
    fn propagate(&mut self, ctx: &mut PropagationContext) -> CPResult<()>;
    /// Reacts to the `events` that happened on the variable at position `idx`
    /// of the scope
    fn propagate_event(
        &mut self,
        ctx: &mut PropagationContext,
        _idx: usize,
        _events: EventMask,
    ) -> CPResult<()> {
        self.propagate(ctx)
    }
    /// Called when the queue is flushed after a contradiction, so that the
    /// propagator can drop whatever non reversible data it had accumulated
    fn on_flush(&mut self) {}
}

/// What a propagator can access when it is being posted
pub struct PostContext<'a> {
    pub(crate) env: &'a mut Environment,
    pub(crate) vars: &'a mut VariableStore,
    pub(crate) me: PropagatorId,
}
impl PostContext<'_> {
    /// The identifier of the propagator being posted
    pub fn id(&self) -> PropagatorId {
        self.me
    }
    /// The environment where to allocate the stored state of the propagator
    pub fn environment(&mut self) -> &mut Environment {
        self.env
    }
    /// The variables of the model (read only)
    pub fn variables(&self) -> &VariableStore {
        self.vars
    }
    /// Starts monitoring the delta of the given variable
    pub fn monitor(&mut self, var: IntVar) -> DeltaMonitor {
        self.vars.monitor(self.env, var, Cause::Propagator(self.me))
    }
}

/// What a propagator can access when it is being executed. This context is a
/// domain store where all modifications are attributed to the propagator.
pub struct PropagationContext<'a> {
    env: &'a mut Environment,
    vars: &'a mut VariableStore,
    me: PropagatorId,
    reschedule: bool,
    passive: bool,
}
impl<'a> PropagationContext<'a> {
    pub(crate) fn new(env: &'a mut Environment, vars: &'a mut VariableStore, me: PropagatorId) -> Self {
        Self {
            env,
            vars,
            me,
            reschedule: false,
            passive: false,
        }
    }
    /// The identifier of the running propagator
    pub fn id(&self) -> PropagatorId {
        self.me
    }
    /// The cause every modification is attributed to
    pub fn cause(&self) -> Cause {
        Cause::Propagator(self.me)
    }
    /// The environment holding the stored state of the propagator
    pub fn environment(&mut self) -> &mut Environment {
        self.env
    }
    /// Asks the engine to run this propagator again (a full propagation) once
    /// the current execution is over
    pub fn reschedule(&mut self) {
        self.reschedule = true;
    }
    /// Declares the propagator entailed: it will not be woken up anymore
    /// until the current world is popped
    pub fn set_passive(&mut self) {
        self.passive = true;
    }
    /// Builds a contradiction attributed to the running propagator
    pub fn fail<T>(&self, var: Option<IntVar>, message: &'static str) -> CPResult<T> {
        Err(Contradiction::new(self.cause(), var, message))
    }
    /// Freezes the window of the monitor of `var`
    pub fn freeze(&mut self, monitor: &mut DeltaMonitor, var: IntVar) {
        let now = self.env.timestamp();
        monitor.freeze(self.vars.delta_mut(var), now);
    }
    /// Skips everything the monitor of `var` has not seen yet
    pub fn unfreeze(&mut self, monitor: &mut DeltaMonitor, var: IntVar) {
        let now = self.env.timestamp();
        monitor.unfreeze(self.vars.delta_mut(var), now);
    }
    /// Calls `f` on each value that has been removed from `var` in the frozen
    /// window of the monitor. Unlike `DeltaMonitor::for_each_removal`, the
    /// callback may modify the domains (including the one of `var`) while
    /// iterating.
    ///
    /// # Panics
    /// If the delta of `var` does not record value removals (bounded
    /// variable) or if it was cleared after the monitor was frozen.
    pub fn for_each_removal<F>(&mut self, monitor: &DeltaMonitor, var: IntVar, mut f: F) -> CPResult<()>
    where
        F: FnMut(&mut Self, i32) -> CPResult<()>,
    {
        let log = self.vars.delta(var);
        log.check_supports(DeltaKind::Removal);
        monitor.check_window(log);
        for i in monitor.window(DeltaKind::Removal) {
            let removal = self.vars.delta(var).removal(i);
            if removal.cause != monitor.owner() {
                f(self, removal.value)?;
            }
        }
        Ok(())
    }

    pub(crate) fn take_flags(&self) -> (bool, bool) {
        (self.reschedule, self.passive)
    }
}

impl DomainStore for PropagationContext<'_> {
    fn min(&self, var: IntVar) -> Option<i32> {
        self.vars.min(self.env, var)
    }
    fn max(&self, var: IntVar) -> Option<i32> {
        self.vars.max(self.env, var)
    }
    fn size(&self, var: IntVar) -> usize {
        self.vars.size(self.env, var)
    }
    fn contains(&self, var: IntVar, value: i32) -> bool {
        self.vars.contains(self.env, var, value)
    }
    fn next_value(&self, var: IntVar, after: i32) -> Option<i32> {
        self.vars.next_value(self.env, var, after)
    }
    fn prev_value(&self, var: IntVar, before: i32) -> Option<i32> {
        self.vars.prev_value(self.env, var, before)
    }

    fn remove_value(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        let cause = self.cause();
        self.vars.remove_value(self.env, var, value, cause)
    }
    fn remove_interval(&mut self, var: IntVar, from: i32, to: i32) -> CPResult<bool> {
        let cause = self.cause();
        self.vars.remove_interval(self.env, var, from, to, cause)
    }
    fn update_lower_bound(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        let cause = self.cause();
        self.vars.update_lower_bound(self.env, var, value, cause)
    }
    fn update_upper_bound(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        let cause = self.cause();
        self.vars.update_upper_bound(self.env, var, value, cause)
    }
    fn instantiate_to(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        let cause = self.cause();
        self.vars.instantiate_to(self.env, var, value, cause)
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    #[test]
    fn cheaper_priorities_have_smaller_bases() {
        assert_eq!(0.0, Priority::Unary.base());
        assert!(Priority::Binary.base() < Priority::Ternary.base());
        assert!(Priority::Cubic.base() + 500_000.0 < Priority::VerySlow.base());
    }

    #[test]
    fn modifications_are_attributed_to_the_propagator() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = vars.new_var(&mut env, 0, 5, true, None);
        let me = PropagatorId(2);

        let mut ctx = PropagationContext::new(&mut env, &mut vars, me);
        assert_eq!(Ok(true), ctx.update_upper_bound(x, 3));
        assert_eq!(Some(3), ctx.max(x));
        let err = ctx.fail::<()>(Some(x), "boom").unwrap_err();
        assert_eq!(Cause::Propagator(me), err.cause);
        ctx.reschedule();
        assert_eq!((true, false), ctx.take_flags());

        let mut seen = vec![];
        vars.drain_events(|_, _, cause, _| seen.push(cause));
        assert_eq!(vec![Cause::Propagator(me)], seen);
    }

    #[test]
    fn removals_can_be_consumed_while_modifying_domains() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = vars.new_var(&mut env, 0, 9, true, None);
        let y = vars.new_var(&mut env, 0, 9, true, None);
        let me = PropagatorId(0);
        let mut monitor = vars.monitor(&env, x, Cause::Propagator(me));

        vars.remove_value(&mut env, x, 3, Cause::Decision).unwrap();
        vars.remove_value(&mut env, x, 5, Cause::Decision).unwrap();

        let mut ctx = PropagationContext::new(&mut env, &mut vars, me);
        ctx.freeze(&mut monitor, x);
        let result = ctx.for_each_removal(&monitor, x, |ctx, v| {
            ctx.remove_value(y, v)?;
            // this one is ours: it will not show up
            ctx.remove_value(x, v + 1).map(|_| ())
        });
        assert!(result.is_ok());
        assert!(!ctx.contains(y, 3));
        assert!(!ctx.contains(y, 5));
        assert!(!ctx.contains(x, 4));
        assert_eq!(8, ctx.size(y));

        ctx.freeze(&mut monitor, x);
        assert!(monitor.window(DeltaKind::Removal).len() == 2);
        let mut again = vec![];
        ctx.for_each_removal(&monitor, x, |_, v| {
            again.push(v);
            Ok(())
        })
        .unwrap();
        assert!(again.is_empty());
    }

    #[test]
    #[should_panic(expected = "does not record Removal entries")]
    fn the_removals_of_a_bounded_variable_cannot_be_iterated() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = vars.new_var(&mut env, 0, 9, false, None);
        let me = PropagatorId(0);
        let mut monitor = vars.monitor(&env, x, Cause::Propagator(me));
        vars.update_lower_bound(&mut env, x, 3, Cause::Decision).unwrap();

        let mut ctx = PropagationContext::new(&mut env, &mut vars, me);
        ctx.freeze(&mut monitor, x);
        let _ = ctx.for_each_removal(&monitor, x, |_, _| Ok(()));
    }

    #[test]
    #[should_panic(expected = "freeze it again")]
    fn a_stale_window_cannot_be_consumed() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = vars.new_var(&mut env, 0, 9, true, None);
        let me = PropagatorId(0);
        let mut monitor = vars.monitor(&env, x, Cause::Propagator(me));
        vars.remove_value(&mut env, x, 4, Cause::Decision).unwrap();
        {
            let mut ctx = PropagationContext::new(&mut env, &mut vars, me);
            ctx.freeze(&mut monitor, x);
        }

        env.world_push();
        vars.remove_value(&mut env, x, 5, Cause::Decision).unwrap();
        let mut ctx = PropagationContext::new(&mut env, &mut vars, me);
        let _ = ctx.for_each_removal(&monitor, x, |_, _| Ok(()));
    }
}
