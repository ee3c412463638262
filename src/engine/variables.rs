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

//! This module provides the definition and implementation of the integer
//! variables, the DomainStore trait and the VariableStore which owns all the
//! domains.
//!
//! Every successful domain modification does three things: it updates the
//! reversible domain, it appends to the delta log of the variable (when some
//! propagator monitors it) and it raises events which the propagation engine
//! later collects to decide which propagators must be scheduled.

use enumset::EnumSet;
use rustc_hash::FxHashMap;

use crate::{
    AntiDomain, CPResult, Cause, Contradiction, DeltaKind, DeltaLog, DeltaMonitor, Environment,
    EventMask, IntEvent, IntervalSet, PropagatorId, ReversibleSet,
};

/// An integer variable that can be used in a CP model
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(pub(crate) usize);
impl IntVar {
    /// Returns the identifier of this variable
    pub fn id(self) -> usize {
        self.0
    }
}

/// A domain store is the entity that gives a hook to propagators (and to the
/// search) for reading and modifying the variables domains. Every modification
/// is attributed to a cause which is implicit: the propagator for a
/// propagation context, the search decision for the solver.
///
/// All the modification methods tell whether the domain actually changed, and
/// return a Contradiction error when it would become empty.
pub trait DomainStore {
    /// Returns the minimum value of the domain of this variable (if it exists)
    fn min(&self, var: IntVar) -> Option<i32>;
    /// Returns the maximum value of the domain of this variable (if it exists)
    fn max(&self, var: IntVar) -> Option<i32>;
    /// Returns the size of the domain of this variable
    fn size(&self, var: IntVar) -> usize;
    /// Returns true iff the domain of the target `var` contains the specified `value`
    fn contains(&self, var: IntVar, value: i32) -> bool;
    /// Returns the smallest value of the domain which is greater than `after`
    fn next_value(&self, var: IntVar, after: i32) -> Option<i32>;
    /// Returns the largest value of the domain which is smaller than `before`
    fn prev_value(&self, var: IntVar, before: i32) -> Option<i32>;
    /// Returns true iff the domain of the target variable is a singleton
    fn is_instantiated(&self, var: IntVar) -> bool {
        self.size(var) == 1
    }
    /// Returns the value of the variable if it is instantiated
    fn value(&self, var: IntVar) -> Option<i32> {
        if self.is_instantiated(var) {
            self.min(var)
        } else {
            None
        }
    }

    /// Removes the specified value from the domain of the target variable
    fn remove_value(&mut self, var: IntVar, value: i32) -> CPResult<bool>;
    /// Removes all the values in `[from, to]` from the domain of the target
    /// variable
    fn remove_interval(&mut self, var: IntVar, from: i32, to: i32) -> CPResult<bool>;
    /// Removes all values strictly less than the specified value
    fn update_lower_bound(&mut self, var: IntVar, value: i32) -> CPResult<bool>;
    /// Removes all values strictly greater than the specified value
    fn update_upper_bound(&mut self, var: IntVar, value: i32) -> CPResult<bool>;
    /// Removes all values but the specified one
    fn instantiate_to(&mut self, var: IntVar, value: i32) -> CPResult<bool>;
}

/// The reversible representation of a domain
#[derive(Debug, Clone)]
enum Domain {
    /// Every value can be removed individually
    Enumerated(AntiDomain),
    /// Only the bounds are maintained
    Bounded(IntervalSet),
}

impl Domain {
    fn min(&self, env: &Environment) -> Option<i32> {
        match self {
            Domain::Enumerated(d) => d.min(env),
            Domain::Bounded(d) => d.min(env),
        }
    }
    fn max(&self, env: &Environment) -> Option<i32> {
        match self {
            Domain::Enumerated(d) => d.max(env),
            Domain::Bounded(d) => d.max(env),
        }
    }
    fn set(&self) -> &dyn ReversibleSet {
        match self {
            Domain::Enumerated(d) => d,
            Domain::Bounded(d) => d,
        }
    }
    fn prev_value(&self, env: &Environment, before: i32) -> Option<i32> {
        match self {
            Domain::Enumerated(d) => d.prev_element(env, before),
            Domain::Bounded(d) => {
                let (lb, ub) = (d.min(env)?, d.max(env)?);
                (before > lb).then(|| (before - 1).min(ub))
            }
        }
    }
    fn remove_below(&mut self, env: &mut Environment, value: i32) -> usize {
        match self {
            Domain::Enumerated(d) => d.remove_below(env, value),
            Domain::Bounded(d) => d.remove_below(env, value),
        }
    }
    fn remove_above(&mut self, env: &mut Environment, value: i32) -> usize {
        match self {
            Domain::Enumerated(d) => d.remove_above(env, value),
            Domain::Bounded(d) => d.remove_above(env, value),
        }
    }
}

/// Everything the store knows about one variable
#[derive(Debug, Clone)]
struct VarData {
    name: Option<String>,
    domain: Domain,
    /// Only maintained when some propagator monitors the variable
    delta: Option<DeltaLog>,
    /// The propagators to notify (along with the position of the variable in
    /// their scope)
    subscribers: Vec<(PropagatorId, usize)>,
    /// The events that have not been dispatched yet
    pending: EventMask,
    /// Who caused the pending events
    pending_cause: Cause,
}

/// The variable store owns the domains of all the variables
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: Vec<VarData>,
    names: FxHashMap<String, IntVar>,
    /// The variables having pending events (each appears at most once)
    touched: Vec<IntVar>,
}

impl VariableStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns the number of variables in the store
    pub fn len(&self) -> usize {
        self.vars.len()
    }
    /// Returns true iff the store holds no variable
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
    /// Creates a new variable whose domain is `[lb, ub]`. An enumerated
    /// variable supports the removal of any value whereas a bounded one only
    /// keeps track of its bounds.
    pub fn new_var(
        &mut self,
        env: &mut Environment,
        lb: i32,
        ub: i32,
        enumerated: bool,
        name: Option<&str>,
    ) -> IntVar {
        assert!(lb <= ub, "cannot create a variable with the empty domain [{lb}, {ub}]");
        let var = IntVar(self.vars.len());
        let domain = if enumerated {
            Domain::Enumerated(AntiDomain::new(env, lb, ub))
        } else {
            Domain::Bounded(IntervalSet::new(env, lb, ub))
        };
        if let Some(name) = name {
            self.names.insert(name.to_string(), var);
        }
        self.vars.push(VarData {
            name: name.map(str::to_string),
            domain,
            delta: None,
            subscribers: vec![],
            pending: EnumSet::empty(),
            pending_cause: Cause::Null,
        });
        var
    }
    /// Returns the variable having the given name (if any)
    pub fn by_name(&self, name: &str) -> Option<IntVar> {
        self.names.get(name).copied()
    }
    /// Returns the name of the variable (if it has one)
    pub fn name(&self, var: IntVar) -> Option<&str> {
        self.vars[var.0].name.as_deref()
    }
    /// Returns true iff the variable can have holes in its domain
    pub fn is_enumerated(&self, var: IntVar) -> bool {
        matches!(self.vars[var.0].domain, Domain::Enumerated(_))
    }
    /// Returns the propagators that are notified of the changes on var
    pub fn subscribers(&self, var: IntVar) -> &[(PropagatorId, usize)] {
        &self.vars[var.0].subscribers
    }
    /// Registers a propagator that wants to be notified of the changes on var
    pub fn subscribe(&mut self, var: IntVar, propagator: PropagatorId, idx: usize) {
        self.vars[var.0].subscribers.push((propagator, idx));
    }
    /// Stops notifying the propagator of the changes on var
    pub fn unsubscribe(&mut self, var: IntVar, propagator: PropagatorId) {
        self.vars[var.0].subscribers.retain(|(id, _)| *id != propagator);
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ DELTAS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Creates a monitor over the delta log of the variable, on behalf of the
    /// given owner. The log is created on first request: an enumerated
    /// variable records its value removals and bound changes, a bounded one
    /// only records its bound changes.
    pub fn monitor(&mut self, env: &Environment, var: IntVar, owner: Cause) -> DeltaMonitor {
        let data = &mut self.vars[var.0];
        if data.delta.is_none() {
            let kinds = match data.domain {
                Domain::Enumerated(_) => EnumSet::all(),
                Domain::Bounded(_) => EnumSet::only(DeltaKind::Bound),
            };
            data.delta = Some(DeltaLog::new(kinds, env.timestamp()));
        }
        DeltaMonitor::new(owner)
    }
    /// Returns the delta log of the variable
    ///
    /// # Panics
    /// If nobody ever asked to monitor that variable.
    pub fn delta(&self, var: IntVar) -> &DeltaLog {
        self.vars[var.0]
            .delta
            .as_ref()
            .expect("the variable is not monitored")
    }
    /// Returns the delta log of the variable (mutable)
    pub fn delta_mut(&mut self, var: IntVar) -> &mut DeltaLog {
        self.vars[var.0]
            .delta
            .as_mut()
            .expect("the variable is not monitored")
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ EVENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Returns true iff some events have not been dispatched yet
    pub fn has_pending_events(&self) -> bool {
        !self.touched.is_empty()
    }
    /// Returns the events pending on the given variable
    pub fn pending_events(&self, var: IntVar) -> EventMask {
        self.vars[var.0].pending
    }
    /// Hands all the pending events over to `f` (var, events, cause,
    /// subscribers) and forgets them.
    pub fn drain_events<F>(&mut self, mut f: F)
    where
        F: FnMut(IntVar, EventMask, Cause, &[(PropagatorId, usize)]),
    {
        let mut touched = std::mem::take(&mut self.touched);
        for var in touched.drain(..) {
            let data = &mut self.vars[var.0];
            let events = std::mem::take(&mut data.pending);
            let cause = data.pending_cause;
            data.pending_cause = Cause::Null;
            f(var, events, cause, &data.subscribers);
        }
        // keep the allocation
        self.touched = touched;
    }
    /// Forgets all the pending events
    pub fn clear_events(&mut self) {
        for var in self.touched.drain(..) {
            let data = &mut self.vars[var.0];
            data.pending = EnumSet::empty();
            data.pending_cause = Cause::Null;
        }
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ QUERIES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Returns the minimum value of the domain (if it exists)
    pub fn min(&self, env: &Environment, var: IntVar) -> Option<i32> {
        self.vars[var.0].domain.min(env)
    }
    /// Returns the maximum value of the domain (if it exists)
    pub fn max(&self, env: &Environment, var: IntVar) -> Option<i32> {
        self.vars[var.0].domain.max(env)
    }
    /// Returns the size of the domain
    pub fn size(&self, env: &Environment, var: IntVar) -> usize {
        self.vars[var.0].domain.set().size(env)
    }
    /// Returns true iff the domain contains the value
    pub fn contains(&self, env: &Environment, var: IntVar, value: i32) -> bool {
        self.vars[var.0].domain.set().contains(env, value)
    }
    /// Returns the smallest value of the domain which is greater than `after`
    pub fn next_value(&self, env: &Environment, var: IntVar, after: i32) -> Option<i32> {
        let domain = &self.vars[var.0].domain;
        let min = domain.min(env)?;
        if after < min {
            Some(min)
        } else {
            domain.set().next_element(env, after)
        }
    }
    /// Returns the largest value of the domain which is smaller than `before`
    pub fn prev_value(&self, env: &Environment, var: IntVar, before: i32) -> Option<i32> {
        self.vars[var.0].domain.prev_value(env, before)
    }
    /// Returns all the values of the domain in increasing order
    pub fn values(&self, env: &Environment, var: IntVar) -> Vec<i32> {
        let mut out = vec![];
        let mut current = self.min(env, var);
        while let Some(v) = current {
            out.push(v);
            current = self.next_value(env, var, v);
        }
        out
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ MODIFICATIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Removes a value from the domain of var. Removing an interior value
    /// from a bounded variable is impossible and leaves the domain unchanged.
    pub fn remove_value(
        &mut self,
        env: &mut Environment,
        var: IntVar,
        value: i32,
        cause: Cause,
    ) -> CPResult<bool> {
        if !self.contains(env, var, value) {
            return Ok(false);
        }
        let (min, max) = self.bounds(env, var);
        if min == max {
            // the last value: no bound can be shifted past it
            Err(self.wipe_out(var, cause))
        } else if value == min {
            self.update_lower_bound(env, var, value + 1, cause)
        } else if value == max {
            self.update_upper_bound(env, var, value - 1, cause)
        } else {
            let now = env.timestamp();
            let data = &mut self.vars[var.0];
            match &mut data.domain {
                Domain::Bounded(_) => Ok(false),
                Domain::Enumerated(dom) => {
                    dom.remove(env, value);
                    if let Some(delta) = data.delta.as_mut() {
                        delta.record_removal(value, cause, now);
                    }
                    self.notify(var, IntEvent::Remove.into(), cause);
                    Ok(true)
                }
            }
        }
    }

    /// Removes all the values in `[from, to]` from the domain of var
    pub fn remove_interval(
        &mut self,
        env: &mut Environment,
        var: IntVar,
        from: i32,
        to: i32,
        cause: Cause,
    ) -> CPResult<bool> {
        if from > to {
            return Ok(false);
        }
        let (min, max) = self.bounds(env, var);
        if from <= min && to >= max {
            Err(self.wipe_out(var, cause))
        } else if from <= min {
            self.update_lower_bound(env, var, to + 1, cause)
        } else if to >= max {
            self.update_upper_bound(env, var, from - 1, cause)
        } else {
            let now = env.timestamp();
            let present = self.values_between(env, var, from, to);
            let data = &mut self.vars[var.0];
            match &mut data.domain {
                Domain::Bounded(_) => Ok(false),
                Domain::Enumerated(dom) => {
                    if present.is_empty() {
                        return Ok(false);
                    }
                    dom.remove_range(env, from, to);
                    if let Some(delta) = data.delta.as_mut() {
                        for v in present {
                            delta.record_removal(v, cause, now);
                        }
                    }
                    self.notify(var, IntEvent::Remove.into(), cause);
                    Ok(true)
                }
            }
        }
    }

    /// Removes all the values strictly smaller than `value`
    pub fn update_lower_bound(
        &mut self,
        env: &mut Environment,
        var: IntVar,
        value: i32,
        cause: Cause,
    ) -> CPResult<bool> {
        let (min, max) = self.bounds(env, var);
        if value <= min {
            return Ok(false);
        }
        if value > max {
            return Err(self.wipe_out(var, cause));
        }
        let now = env.timestamp();
        let removed = self.logged_values_between(env, var, min, value - 1);
        let data = &mut self.vars[var.0];
        data.domain.remove_below(env, value);
        let new_min = data.domain.min(env).unwrap_or(value);
        if let Some(delta) = data.delta.as_mut() {
            for v in removed {
                delta.record_removal(v, cause, now);
            }
            delta.record_bound_change(min, new_min, true, cause, now);
        }
        let mut events = IntEvent::Remove | IntEvent::IncLow;
        if new_min == max {
            events |= IntEvent::Instantiate;
        }
        self.notify(var, events, cause);
        Ok(true)
    }

    /// Removes all the values strictly greater than `value`
    pub fn update_upper_bound(
        &mut self,
        env: &mut Environment,
        var: IntVar,
        value: i32,
        cause: Cause,
    ) -> CPResult<bool> {
        let (min, max) = self.bounds(env, var);
        if value >= max {
            return Ok(false);
        }
        if value < min {
            return Err(self.wipe_out(var, cause));
        }
        let now = env.timestamp();
        let removed = self.logged_values_between(env, var, value + 1, max);
        let data = &mut self.vars[var.0];
        data.domain.remove_above(env, value);
        let new_max = data.domain.max(env).unwrap_or(value);
        if let Some(delta) = data.delta.as_mut() {
            for v in removed {
                delta.record_removal(v, cause, now);
            }
            delta.record_bound_change(max, new_max, false, cause, now);
        }
        let mut events = IntEvent::Remove | IntEvent::DecUpp;
        if new_max == min {
            events |= IntEvent::Instantiate;
        }
        self.notify(var, events, cause);
        Ok(true)
    }

    /// Removes all the values but `value` from the domain of var
    pub fn instantiate_to(
        &mut self,
        env: &mut Environment,
        var: IntVar,
        value: i32,
        cause: Cause,
    ) -> CPResult<bool> {
        if !self.contains(env, var, value) {
            return Err(self.wipe_out(var, cause));
        }
        if self.size(env, var) == 1 {
            return Ok(false);
        }
        let (min, max) = self.bounds(env, var);
        let now = env.timestamp();
        let removed = if self.logs(var, DeltaKind::Removal) {
            self.values(env, var)
        } else {
            vec![]
        };

        let data = &mut self.vars[var.0];
        data.domain.remove_below(env, value);
        data.domain.remove_above(env, value);
        if let Some(delta) = data.delta.as_mut() {
            for v in removed.into_iter().filter(|v| *v != value) {
                delta.record_removal(v, cause, now);
            }
            if min != value {
                delta.record_bound_change(min, value, true, cause, now);
            }
            if max != value {
                delta.record_bound_change(max, value, false, cause, now);
            }
        }
        let mut events = IntEvent::Instantiate | IntEvent::Remove;
        if min != value {
            events |= IntEvent::IncLow;
        }
        if max != value {
            events |= IntEvent::DecUpp;
        }
        self.notify(var, events, cause);
        Ok(true)
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ PRIVATE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// The bounds of a domain which is never empty outside of a failure
    fn bounds(&self, env: &Environment, var: IntVar) -> (i32, i32) {
        let domain = &self.vars[var.0].domain;
        match (domain.min(env), domain.max(env)) {
            (Some(min), Some(max)) => (min, max),
            _ => panic!("the domain of {var:?} is empty outside of a failure"),
        }
    }
    /// Does the delta log of var record that kind of entries ?
    fn logs(&self, var: IntVar, kind: DeltaKind) -> bool {
        self.vars[var.0]
            .delta
            .as_ref()
            .map(|d| d.supports(kind))
            .unwrap_or(false)
    }
    /// The values of `[from, to]` that are in the domain of var
    fn values_between(&self, env: &Environment, var: IntVar, from: i32, to: i32) -> Vec<i32> {
        let mut out = vec![];
        let mut current = match from.checked_sub(1) {
            Some(after) => self.next_value(env, var, after),
            None => self.min(env, var),
        };
        while let Some(v) = current {
            if v > to {
                break;
            }
            out.push(v);
            current = self.next_value(env, var, v);
        }
        out
    }
    /// Same as values_between but only when value removals are logged
    fn logged_values_between(&self, env: &Environment, var: IntVar, from: i32, to: i32) -> Vec<i32> {
        if self.logs(var, DeltaKind::Removal) {
            self.values_between(env, var, from, to)
        } else {
            vec![]
        }
    }
    /// Builds the contradiction corresponding to the wipe out of var
    fn wipe_out(&self, var: IntVar, cause: Cause) -> Contradiction {
        Contradiction::new(cause, Some(var), "empty domain")
    }
    /// Raises events on var
    fn notify(&mut self, var: IntVar, events: EventMask, cause: Cause) {
        let data = &mut self.vars[var.0];
        if data.pending.is_empty() {
            data.pending_cause = cause;
            self.touched.push(var);
        } else {
            data.pending_cause = data.pending_cause.merge(cause);
        }
        data.pending |= events;
    }
}

#[cfg(test)]
mod tests {
    use crate::SaveAndRestore;

    use super::*;

    const P: Cause = Cause::Propagator(PropagatorId(0));

    fn enumerated(env: &mut Environment, vars: &mut VariableStore, lb: i32, ub: i32) -> IntVar {
        vars.new_var(env, lb, ub, true, None)
    }

    #[test]
    fn removing_interior_values_raises_remove_only() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = enumerated(&mut env, &mut vars, 0, 9);

        assert_eq!(Ok(true), vars.remove_value(&mut env, x, 4, P));
        assert_eq!(Ok(false), vars.remove_value(&mut env, x, 4, P));
        assert_eq!(EventMask::only(IntEvent::Remove), vars.pending_events(x));
        assert_eq!(9, vars.size(&env, x));
        assert_eq!(Some(5), vars.next_value(&env, x, 3));
        assert_eq!(Some(3), vars.prev_value(&env, x, 5));
    }

    #[test]
    fn bound_changes_raise_bound_events() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = enumerated(&mut env, &mut vars, 0, 9);

        assert_eq!(Ok(true), vars.update_lower_bound(&mut env, x, 3, P));
        assert_eq!(Ok(false), vars.update_lower_bound(&mut env, x, 2, P));
        assert_eq!(IntEvent::Remove | IntEvent::IncLow, vars.pending_events(x));
        vars.clear_events();

        assert_eq!(Ok(true), vars.update_upper_bound(&mut env, x, 4, P));
        assert_eq!(IntEvent::Remove | IntEvent::DecUpp, vars.pending_events(x));
        vars.clear_events();

        assert_eq!(Ok(true), vars.remove_value(&mut env, x, 3, P));
        assert_eq!(
            IntEvent::Remove | IntEvent::IncLow | IntEvent::Instantiate,
            vars.pending_events(x)
        );
        assert_eq!(Some(4), vars.min(&env, x));
    }

    #[test]
    fn wiping_a_domain_out_is_a_contradiction() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = enumerated(&mut env, &mut vars, 0, 3);

        let err = vars.update_lower_bound(&mut env, x, 4, P).unwrap_err();
        assert_eq!(Some(x), err.variable);
        assert_eq!(P, err.cause);
        assert!(vars.instantiate_to(&mut env, x, 7, P).is_err());
        vars.instantiate_to(&mut env, x, 2, P).unwrap();
        assert!(vars.remove_value(&mut env, x, 2, P).is_err());
        assert_eq!(vec![2], vars.values(&env, x));
    }

    #[test]
    fn bounded_variables_ignore_interior_removals() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = vars.new_var(&mut env, 0, 10, false, Some("x"));

        assert_eq!(Ok(false), vars.remove_value(&mut env, x, 5, P));
        assert_eq!(Ok(false), vars.remove_interval(&mut env, x, 3, 6, P));
        assert!(!vars.has_pending_events());
        assert_eq!(Ok(true), vars.remove_interval(&mut env, x, -3, 2, P));
        assert_eq!(Some(3), vars.min(&env, x));
        assert_eq!(Some(x), vars.by_name("x"));
        assert_eq!(Some("x"), vars.name(x));
    }

    #[test]
    fn the_delta_log_records_every_removed_value() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = enumerated(&mut env, &mut vars, 0, 9);
        let mut monitor = vars.monitor(&env, x, P);

        vars.remove_interval(&mut env, x, 3, 5, Cause::Decision).unwrap();
        vars.update_upper_bound(&mut env, x, 7, Cause::Decision).unwrap();
        vars.instantiate_to(&mut env, x, 1, Cause::Decision).unwrap();

        let now = env.timestamp();
        monitor.freeze(vars.delta_mut(x), now);
        let mut removed = vec![];
        monitor.for_each_removal(vars.delta(x), |v| removed.push(v));
        removed.sort_unstable();
        assert_eq!(vec![0, 2, 3, 4, 5, 6, 7, 8, 9], removed);

        let mut bounds = vec![];
        monitor.for_each_bound_change(vars.delta(x), |b| bounds.push((b.old, b.new, b.lower)));
        assert_eq!(vec![(9, 7, false), (0, 1, true), (7, 1, false)], bounds);
    }

    #[test]
    fn events_of_distinct_causes_are_merged() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = enumerated(&mut env, &mut vars, 0, 9);
        let y = enumerated(&mut env, &mut vars, 0, 9);

        vars.remove_value(&mut env, x, 5, P).unwrap();
        vars.remove_value(&mut env, x, 6, P).unwrap();
        vars.remove_value(&mut env, y, 5, P).unwrap();
        vars.remove_value(&mut env, y, 0, Cause::Decision).unwrap();

        let mut seen = vec![];
        vars.drain_events(|var, events, cause, _| seen.push((var, events, cause)));
        assert_eq!(
            vec![
                (x, EventMask::only(IntEvent::Remove), P),
                (y, IntEvent::Remove | IntEvent::IncLow, Cause::Null),
            ],
            seen
        );
        assert!(!vars.has_pending_events());
    }

    #[test]
    fn domains_are_restored_on_backtrack() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let x = enumerated(&mut env, &mut vars, 0, 5);

        env.world_push();
        vars.remove_value(&mut env, x, 2, P).unwrap();
        vars.update_upper_bound(&mut env, x, 3, P).unwrap();
        assert_eq!(vec![0, 1, 3], vars.values(&env, x));
        env.world_pop();
        assert_eq!(vec![0, 1, 2, 3, 4, 5], vars.values(&env, x));
    }

    #[test]
    fn the_last_value_at_either_end_of_the_integers_can_be_removed() {
        let mut env = Environment::new();
        let mut vars = VariableStore::new();
        let top = enumerated(&mut env, &mut vars, i32::MAX, i32::MAX);
        let bottom = vars.new_var(&mut env, i32::MIN, i32::MIN, false, None);
        let both = vars.new_var(&mut env, i32::MAX - 1, i32::MAX, false, None);

        let err = vars.remove_value(&mut env, top, i32::MAX, P).unwrap_err();
        assert_eq!(Some(top), err.variable);
        assert!(vars.remove_value(&mut env, bottom, i32::MIN, P).is_err());
        assert!(vars.remove_interval(&mut env, both, i32::MIN, i32::MAX, P).is_err());
        assert_eq!(vec![i32::MAX], vars.values(&env, top));

        assert_eq!(Ok(true), vars.remove_value(&mut env, both, i32::MAX, P));
        assert_eq!(vec![i32::MAX - 1], vars.values(&env, both));
        assert_eq!(None, vars.next_value(&env, both, i32::MAX - 1));
        assert_eq!(None, vars.prev_value(&env, bottom, i32::MIN));
    }
}
