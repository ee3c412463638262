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

//! This module provides the propagation engine: the entity that decides which
//! propagator runs next and that keeps running them until nothing changes
//! anymore (a fixpoint) or until one of them detects a contradiction.
//!
//! # Note
//! The propagators are kept in a priority queue keyed by their priority class
//! plus an adaptive weight. The weight of a propagator grows each time it asks
//! to be rescheduled and slowly decays (geometrically) from one fixpoint round
//! to the next, so that the propagators which keep waking up pay for it.
//!
//! Besides the permanent propagators posted at the root, a propagator can be
//! posted temporarily in a deeper world. It then lives until that world gets
//! popped. Since a world is always popped before its parent, the temporary
//! propagators form the tail of the propagator list, sorted by world.

use enumset::EnumSet;
use log::{debug, trace};

use crate::{
    CPResult, Cause, EngineConfig, Environment, EventMask, PostContext, Priority,
    PropagationContext, Propagator, PropagatorId, SaveAndRestore, StoredBool, VariableStore,
    WeightedQueue,
};

/// The counters maintained by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// How many times a propagator has been executed
    pub propagations: u64,
    /// How many executions ended with a contradiction
    pub contradictions: u64,
    /// How many times a propagator was scheduled while it already was
    pub redundant_schedules: u64,
    /// How many times a propagator asked to run again
    pub reschedules: u64,
    /// How many times the weights have been decayed
    pub decays: u64,
}

/// Where a propagator stands with respect to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Scheduled,
    Running,
}

/// Everything the engine knows about one propagator
struct Record {
    propagator: Box<dyn Propagator>,
    state: State,
    /// false once the propagator is entailed (restored upon backtrack)
    active: StoredBool,
    priority: Priority,
    weight: f64,
    fine_grained: bool,
    /// the events the propagator reacts to, per scope position
    masks: Vec<EventMask>,
    /// a full propagation is required on the next execution
    needs_full: bool,
    /// the world where the propagator has been posted (0 when permanent)
    world: usize,
    /// the events pending per scope position (fine grained propagators only)
    pending: Vec<EventMask>,
    /// the scope positions having pending events, in arrival order
    touched: Vec<usize>,
}

impl Record {
    fn key(&self) -> f64 {
        self.priority.base() + self.weight
    }
    fn clear_events(&mut self) {
        for idx in self.touched.drain(..) {
            self.pending[idx] = EnumSet::empty();
        }
        self.needs_full = false;
    }
}

/// The propagation engine
pub struct PropagationEngine {
    config: EngineConfig,
    records: Vec<Record>,
    queue: WeightedQueue,
    /// the propagator which has been executed last in the current round
    last: Option<usize>,
    /// the environment timestamp of the last fixpoint round
    round: Option<u64>,
    stats: EngineStats,
}

impl Default for PropagationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PropagationEngine {
    /// Creates an engine without any propagator
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            records: vec![],
            queue: WeightedQueue::new(),
            last: None,
            round: None,
            stats: EngineStats::default(),
        }
    }
    /// Returns the configuration of this engine
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    /// Returns the statistics gathered so far
    pub fn stats(&self) -> EngineStats {
        self.stats
    }
    /// Returns the number of posted propagators
    pub fn len(&self) -> usize {
        self.records.len()
    }
    /// Returns true iff no propagator has been posted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Returns the number of propagators waiting in the queue
    pub fn nb_scheduled(&self) -> usize {
        self.queue.len()
    }
    /// Returns true iff the propagator is waiting in the queue
    pub fn is_scheduled(&self, id: PropagatorId) -> bool {
        self.records[id.0].state == State::Scheduled
    }
    /// Returns false iff the propagator has been declared entailed
    pub fn is_active(&self, env: &Environment, id: PropagatorId) -> bool {
        env.get(self.records[id.0].active)
    }
    /// Returns the adaptive weight of the propagator
    pub fn weight(&self, id: PropagatorId) -> f64 {
        self.records[id.0].weight
    }
    /// Returns the name of the propagator
    pub fn name(&self, id: PropagatorId) -> &str {
        self.records[id.0].propagator.name()
    }

    /// Posts a propagator: it gets subscribed to the variables of its scope
    /// and scheduled for an initial full propagation. Permanent propagators
    /// can only be posted at the root world.
    pub fn post(
        &mut self,
        env: &mut Environment,
        vars: &mut VariableStore,
        propagator: Box<dyn Propagator>,
    ) -> PropagatorId {
        assert_eq!(
            0,
            env.world_index(),
            "permanent propagators can only be posted at the root world"
        );
        self.post_in_world(env, vars, propagator)
    }

    /// Posts a propagator that only lives as long as the current world: it
    /// is unsubscribed and forgotten by `backtrack` once that world has been
    /// popped. The identifier of a forgotten propagator gets reused by the
    /// next post.
    pub fn post_temporary(
        &mut self,
        env: &mut Environment,
        vars: &mut VariableStore,
        propagator: Box<dyn Propagator>,
    ) -> PropagatorId {
        self.post_in_world(env, vars, propagator)
    }

    /// Forgets the temporary propagators that were posted in a world deeper
    /// than `world`. This must be called after the environment has been
    /// popped down to `world`.
    pub fn backtrack(&mut self, world: usize, vars: &mut VariableStore) {
        let keep = self
            .records
            .iter()
            .rposition(|r| r.world <= world)
            .map_or(0, |i| i + 1);
        for (offset, record) in self.records.drain(keep..).enumerate() {
            let item = keep + offset;
            let id = PropagatorId(item);
            self.queue.remove(item);
            if self.last == Some(item) {
                self.last = None;
            }
            for var in record.propagator.scope() {
                vars.unsubscribe(*var, id);
            }
            trace!(
                "forget {} ({id:?}) posted in world {}",
                record.propagator.name(),
                record.world
            );
        }
    }

    /// Hands the temporary propagators of the committed worlds over to
    /// `world` (the current world once the commit is done)
    pub fn commit(&mut self, world: usize) {
        for record in self.records.iter_mut().rev() {
            if record.world <= world {
                break;
            }
            record.world = world;
        }
    }

    /// Schedules a full propagation of the given propagator. Scheduling a
    /// propagator which is already in the queue does nothing.
    pub fn schedule(&mut self, id: PropagatorId) {
        let record = &mut self.records[id.0];
        record.needs_full = true;
        enqueue(&mut self.queue, &mut self.stats, id.0, record);
    }

    /// Takes a propagator out of the queue and forgets its pending events
    pub fn remove(&mut self, id: PropagatorId) {
        let record = &mut self.records[id.0];
        self.queue.remove(id.0);
        record.state = State::Idle;
        record.clear_events();
    }

    /// Executes the scheduled propagators until the fixpoint is reached. The
    /// first contradiction aborts the whole process: it is up to the caller
    /// to flush the engine before going on.
    pub fn run_to_fixpoint(&mut self, env: &mut Environment, vars: &mut VariableStore) -> CPResult<()> {
        self.decay_if_new_round(env.timestamp());
        self.dispatch(env, vars);

        while let Some((item, _)) = self.queue.pop_min() {
            let record = &mut self.records[item];
            record.state = State::Running;
            self.last = Some(item);

            let mut ctx = PropagationContext::new(env, vars, PropagatorId(item));
            trace!("run {} ({item})", record.propagator.name());
            let result = if record.needs_full || !record.fine_grained {
                record.propagator.propagate(&mut ctx)
            } else {
                let mut touched = std::mem::take(&mut record.touched);
                let mut result = Ok(());
                for idx in touched.iter().copied() {
                    let events = std::mem::take(&mut record.pending[idx]);
                    result = record.propagator.propagate_event(&mut ctx, idx, events);
                    if result.is_err() {
                        break;
                    }
                }
                for idx in touched.drain(..) {
                    record.pending[idx] = EnumSet::empty();
                }
                record.touched = touched;
                result
            };
            let (reschedule, passive) = ctx.take_flags();
            record.state = State::Idle;
            record.clear_events();
            self.stats.propagations += 1;

            if let Err(contradiction) = result {
                self.stats.contradictions += 1;
                debug!("contradiction in {}: {contradiction}", record.propagator.name());
                return Err(contradiction);
            }
            if passive {
                env.set(record.active, false);
            } else if reschedule {
                record.weight += self.config.reschedule_penalty();
                record.needs_full = true;
                self.stats.reschedules += 1;
                enqueue(&mut self.queue, &mut self.stats, item, record);
            }
            self.dispatch(env, vars);
        }
        self.last = None;
        Ok(())
    }

    /// Empties the queue without executing anything. Each dropped propagator
    /// (and the one that failed) is notified through its `on_flush` hook. All
    /// the pending variable events are discarded.
    pub fn flush(&mut self, vars: &mut VariableStore) {
        let last = self.last.take();
        if let Some(item) = last {
            self.records[item].propagator.on_flush();
        }
        while let Some((item, _)) = self.queue.pop_min() {
            let record = &mut self.records[item];
            record.state = State::Idle;
            record.clear_events();
            if last != Some(item) {
                record.propagator.on_flush();
            }
        }
        vars.clear_events();
        debug!("flushed the propagation engine");
    }

    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~ PRIVATE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    //~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Subscribes, registers and schedules a propagator in the current world
    fn post_in_world(
        &mut self,
        env: &mut Environment,
        vars: &mut VariableStore,
        mut propagator: Box<dyn Propagator>,
    ) -> PropagatorId {
        let world = env.world_index();
        let id = PropagatorId(self.records.len());
        let scope = propagator.scope().to_vec();
        let masks = (0..scope.len())
            .map(|idx| propagator.event_mask(idx))
            .collect::<Vec<_>>();
        for (idx, var) in scope.iter().copied().enumerate() {
            if !masks[idx].is_empty() {
                vars.subscribe(var, id, idx);
            }
        }
        propagator.on_post(&mut PostContext {
            env: &mut *env,
            vars: &mut *vars,
            me: id,
        });
        trace!("post {} as {id:?} in world {world}", propagator.name());

        self.records.push(Record {
            state: State::Idle,
            active: env.make_bool(true),
            priority: propagator.priority(),
            weight: 0.0,
            fine_grained: propagator.reacts_on_fine_events(),
            pending: vec![EnumSet::empty(); scope.len()],
            touched: vec![],
            masks,
            needs_full: false,
            world,
            propagator,
        });
        self.schedule(id);
        id
    }

    /// Decays all weights when a new round begins (the timestamp of the
    /// environment has changed since the previous one)
    fn decay_if_new_round(&mut self, now: u64) {
        if self.round == Some(now) {
            return;
        }
        self.round = Some(now);
        let gamma = self.config.decay();
        for record in self.records.iter_mut() {
            record.weight *= gamma;
        }
        let records = &self.records;
        self.queue.rekey_all(|item, _| records[item].key());
        self.stats.decays += 1;
        debug!("decayed the propagator weights (round {now})");
    }

    /// Turns the pending variable events into schedules
    fn dispatch(&mut self, env: &Environment, vars: &mut VariableStore) {
        let records = &mut self.records;
        let queue = &mut self.queue;
        let stats = &mut self.stats;
        vars.drain_events(|_, events, cause, subscribers| {
            for &(id, idx) in subscribers {
                if cause == Cause::Propagator(id) {
                    continue;
                }
                let record = &mut records[id.0];
                let relevant = events & record.masks[idx];
                if relevant.is_empty() || !env.get(record.active) {
                    continue;
                }
                if record.fine_grained {
                    if record.pending[idx].is_empty() {
                        record.touched.push(idx);
                    }
                    record.pending[idx] |= relevant;
                } else {
                    record.needs_full = true;
                }
                enqueue(queue, stats, id.0, record);
            }
        });
    }
}

/// Inserts the propagator in the queue unless it already is there
fn enqueue(queue: &mut WeightedQueue, stats: &mut EngineStats, item: usize, record: &mut Record) {
    if record.state == State::Scheduled {
        stats.redundant_schedules += 1;
    } else {
        record.state = State::Scheduled;
        queue.insert(item, record.key());
    }
}
