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

//! This module provides the solver: the facade which a search procedure
//! drives. It owns the environment, the variables and the propagation engine
//! and makes sure these three evolve in lockstep.
//!
//! A typical search loop looks like this:
//! ```
//! # use revcp::prelude::*;
//! let mut solver = Solver::default();
//! let x = solver.new_int_var(0, 3);
//! let y = solver.new_int_var(0, 3);
//! solver.post(Box::new(NotEqual::new(x, y, 0)));
//! assert!(solver.propagate().is_ok());
//!
//! solver.world_push();
//! solver.instantiate_to(x, 2).unwrap();
//! assert!(solver.propagate().is_ok());
//! assert!(!solver.contains(y, 2));
//! solver.world_pop();
//!
//! assert!(solver.contains(y, 2));
//! ```

use log::debug;

use crate::{
    CPResult, Cause, DomainStore, EngineStats, Environment, IntVar, PropagationEngine, Propagator,
    PropagatorId, SaveAndRestore, SolverConfig, VariableStore,
};

/// The solver
pub struct Solver {
    config: SolverConfig,
    env: Environment,
    vars: VariableStore,
    engine: PropagationEngine,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver {
    /// Creates a new solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            env: Environment::with_config(&config.environment),
            vars: VariableStore::new(),
            engine: PropagationEngine::new(config.engine),
        }
    }
    /// Returns the configuration of this solver
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
    /// Returns the environment of this solver
    pub fn environment(&self) -> &Environment {
        &self.env
    }
    /// Returns the environment of this solver (mutable). This is where the
    /// search procedure allocates its own stored primitives.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }
    /// Returns the variables of this solver
    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }
    /// Returns the propagation engine of this solver
    pub fn engine(&self) -> &PropagationEngine {
        &self.engine
    }
    /// Returns the statistics of the propagation engine
    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    /// Creates a new integer variable with domain `[lb, ub]`
    pub fn new_int_var(&mut self, lb: i32, ub: i32) -> IntVar {
        self.vars.new_var(&mut self.env, lb, ub, true, None)
    }
    /// Creates a new named integer variable with domain `[lb, ub]`
    pub fn new_named_int_var(&mut self, name: &str, lb: i32, ub: i32) -> IntVar {
        self.vars.new_var(&mut self.env, lb, ub, true, Some(name))
    }
    /// Creates a new integer variable with domain `[lb, ub]` whose holes
    /// are not represented
    pub fn new_bounded_var(&mut self, lb: i32, ub: i32) -> IntVar {
        self.vars.new_var(&mut self.env, lb, ub, false, None)
    }
    /// Creates a new binary 0,1 variable
    pub fn new_bool_var(&mut self) -> IntVar {
        self.new_int_var(0, 1)
    }
    /// Returns the variable having the given name (if any)
    pub fn variable_by_name(&self, name: &str) -> Option<IntVar> {
        self.vars.by_name(name)
    }
    /// Returns all the values of the domain of var (increasing order)
    pub fn values(&self, var: IntVar) -> Vec<i32> {
        self.vars.values(&self.env, var)
    }

    /// Posts a propagator. This must happen at the root world.
    pub fn post(&mut self, propagator: Box<dyn Propagator>) -> PropagatorId {
        self.engine.post(&mut self.env, &mut self.vars, propagator)
    }
    /// Posts a propagator which is removed when the current world is popped
    pub fn post_temporary(&mut self, propagator: Box<dyn Propagator>) -> PropagatorId {
        self.engine
            .post_temporary(&mut self.env, &mut self.vars, propagator)
    }
    /// Runs the propagation until the fixpoint. When a contradiction is
    /// found, the engine is flushed before the error is returned so that the
    /// caller only has to pop the current world.
    pub fn propagate(&mut self) -> CPResult<()> {
        let result = self.engine.run_to_fixpoint(&mut self.env, &mut self.vars);
        if let Err(contradiction) = result {
            debug!("propagation failed at depth {}", self.env.world_index());
            self.engine.flush(&mut self.vars);
            return Err(contradiction);
        }
        Ok(())
    }
    /// Pops all the worlds above `world`
    pub fn world_pop_until(&mut self, world: usize) {
        self.env.world_pop_until(world);
        self.vars.clear_events();
        self.engine.backtrack(world, &mut self.vars);
    }
}

impl SaveAndRestore for Solver {
    fn world_push(&mut self) {
        self.env.world_push()
    }
    /// The events raised in the popped world are discarded, and so are the
    /// propagators that were temporarily posted in it
    fn world_pop(&mut self) {
        self.env.world_pop();
        self.vars.clear_events();
        self.engine
            .backtrack(self.env.world_index(), &mut self.vars);
    }
    fn world_commit(&mut self) {
        self.env.world_commit();
        self.engine.commit(self.env.world_index());
    }
    fn world_index(&self) -> usize {
        self.env.world_index()
    }
}

impl DomainStore for Solver {
    fn min(&self, var: IntVar) -> Option<i32> {
        self.vars.min(&self.env, var)
    }
    fn max(&self, var: IntVar) -> Option<i32> {
        self.vars.max(&self.env, var)
    }
    fn size(&self, var: IntVar) -> usize {
        self.vars.size(&self.env, var)
    }
    fn contains(&self, var: IntVar, value: i32) -> bool {
        self.vars.contains(&self.env, var, value)
    }
    fn next_value(&self, var: IntVar, after: i32) -> Option<i32> {
        self.vars.next_value(&self.env, var, after)
    }
    fn prev_value(&self, var: IntVar, before: i32) -> Option<i32> {
        self.vars.prev_value(&self.env, var, before)
    }

    fn remove_value(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        self.vars.remove_value(&mut self.env, var, value, Cause::Decision)
    }
    fn remove_interval(&mut self, var: IntVar, from: i32, to: i32) -> CPResult<bool> {
        self.vars
            .remove_interval(&mut self.env, var, from, to, Cause::Decision)
    }
    fn update_lower_bound(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        self.vars
            .update_lower_bound(&mut self.env, var, value, Cause::Decision)
    }
    fn update_upper_bound(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        self.vars
            .update_upper_bound(&mut self.env, var, value, Cause::Decision)
    }
    fn instantiate_to(&mut self, var: IntVar, value: i32) -> CPResult<bool> {
        self.vars
            .instantiate_to(&mut self.env, var, value, Cause::Decision)
    }
}
