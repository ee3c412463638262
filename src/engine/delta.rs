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

//! This module provides the delta log of a variable (the append only record
//! of what has been removed from its domain) along with the monitors that
//! propagators use to consume that log incrementally.
//!
//! # Note
//! A delta log is not reversible. Instead, it is lazily cleared whenever it
//! gets written (or observed) under a different timestamp of the environment
//! than the one of its last clear. Every world operation bumps the timestamp,
//! so a log never holds entries from two distinct fixpoint rounds. A monitor
//! that notices the log has been cleared since it last looked simply rewinds
//! its cursors to the beginning.

use std::ops::Range;

use enumset::{EnumSet, EnumSetType};

use crate::Cause;

/// The kinds of entries a delta log may hold
#[derive(Debug, EnumSetType, Hash)]
pub enum DeltaKind {
    /// Individual value removals
    Removal,
    /// Bound tightenings
    Bound,
}

impl DeltaKind {
    #[inline]
    fn index(self) -> usize {
        match self {
            DeltaKind::Removal => 0,
            DeltaKind::Bound => 1,
        }
    }
}

/// A value that has been removed from a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// The value that was removed
    pub value: i32,
    /// Who removed it
    pub cause: Cause,
    /// The timestamp of the environment when it was removed
    pub stamp: u64,
}

/// A bound that has been tightened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundChange {
    /// The previous value of the bound
    pub old: i32,
    /// The new value of the bound
    pub new: i32,
    /// Is it the lower bound (true) or the upper bound (false) ?
    pub lower: bool,
    /// Who tightened the bound
    pub cause: Cause,
    /// The timestamp of the environment when it was tightened
    pub stamp: u64,
}

/// One entry of a delta log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaEntry {
    /// A removed value
    Removal(Removal),
    /// A tightened bound
    Bound(BoundChange),
}

/// The delta log of one variable
#[derive(Debug, Clone)]
pub struct DeltaLog {
    /// What kinds of entries are recorded in this log
    kinds: EnumSet<DeltaKind>,
    removals: Vec<Removal>,
    bounds: Vec<BoundChange>,
    /// The timestamp at which the log has last been cleared
    timestamp: u64,
}

impl DeltaLog {
    /// Creates a new empty log recording the given kinds of entries
    pub fn new(kinds: EnumSet<DeltaKind>, now: u64) -> Self {
        Self {
            kinds,
            removals: vec![],
            bounds: vec![],
            timestamp: now,
        }
    }
    /// Returns the kinds of entries that are recorded in this log
    pub fn kinds(&self) -> EnumSet<DeltaKind> {
        self.kinds
    }
    /// Returns true iff the log records the given kind of entries
    pub fn supports(&self, kind: DeltaKind) -> bool {
        self.kinds.contains(kind)
    }
    /// Returns the timestamp at which this log has last been cleared
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
    /// Returns the number of entries of the given kind
    pub fn len(&self, kind: DeltaKind) -> usize {
        match kind {
            DeltaKind::Removal => self.removals.len(),
            DeltaKind::Bound => self.bounds.len(),
        }
    }
    /// Returns true iff the log holds no entry at all
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.bounds.is_empty()
    }
    /// Returns the ith removal
    pub fn removal(&self, i: usize) -> Removal {
        self.removals[i]
    }
    /// Returns the ith bound change
    pub fn bound_change(&self, i: usize) -> BoundChange {
        self.bounds[i]
    }
    /// Clears the log unless it has already been cleared at timestamp `now`
    pub fn lazy_clear(&mut self, now: u64) {
        if self.timestamp != now {
            self.removals.clear();
            self.bounds.clear();
            self.timestamp = now;
        }
    }
    /// Records the removal of a value
    pub fn record_removal(&mut self, value: i32, cause: Cause, now: u64) {
        self.check_supports(DeltaKind::Removal);
        self.lazy_clear(now);
        self.removals.push(Removal {
            value,
            cause,
            stamp: now,
        });
    }
    /// Records a bound tightening
    pub fn record_bound_change(&mut self, old: i32, new: i32, lower: bool, cause: Cause, now: u64) {
        self.check_supports(DeltaKind::Bound);
        self.lazy_clear(now);
        self.bounds.push(BoundChange {
            old,
            new,
            lower,
            cause,
            stamp: now,
        });
    }

    /// # Panics
    /// If the log does not record that kind of entries
    pub(crate) fn check_supports(&self, kind: DeltaKind) {
        assert!(
            self.supports(kind),
            "this delta log does not record {kind:?} entries"
        );
    }
}

/// A monitor is the private view of one propagator on the delta log of one
/// variable. It remembers what the propagator has already seen so that every
/// entry is observed exactly once.
#[derive(Debug, Clone, Copy)]
pub struct DeltaMonitor {
    /// The entries caused by the owner are never shown to it
    owner: Cause,
    /// The first entry (per kind) that has not been seen yet
    first: [usize; 2],
    /// The window (per kind) that is visible until the next freeze
    frozen: [(usize, usize); 2],
    /// The timestamp of the log when this monitor last synchronised with it
    timestamp: Option<u64>,
}

impl DeltaMonitor {
    /// Creates a new monitor on behalf of the given owner
    pub fn new(owner: Cause) -> Self {
        Self {
            owner,
            first: [0; 2],
            frozen: [(0, 0); 2],
            timestamp: None,
        }
    }
    /// Returns the owner of this monitor
    pub fn owner(&self) -> Cause {
        self.owner
    }
    /// Snapshots the entries that appeared since the last freeze: they are
    /// the ones that can be iterated until the next call to freeze.
    pub fn freeze(&mut self, log: &mut DeltaLog, now: u64) {
        self.synchronize(log, now);
        for kind in EnumSet::<DeltaKind>::all() {
            let k = kind.index();
            let len = log.len(kind);
            self.frozen[k] = (self.first[k], len);
            self.first[k] = len;
        }
    }
    /// Skips everything that is currently in the log
    pub fn unfreeze(&mut self, log: &mut DeltaLog, now: u64) {
        self.synchronize(log, now);
        for kind in EnumSet::<DeltaKind>::all() {
            let k = kind.index();
            let len = log.len(kind);
            self.frozen[k] = (len, len);
            self.first[k] = len;
        }
    }
    /// Returns the range of indices of the frozen window for the given kind
    pub fn window(&self, kind: DeltaKind) -> Range<usize> {
        let (from, to) = self.frozen[kind.index()];
        from..to
    }
    /// Iterates over the entries of the frozen window, skipping the ones that
    /// were caused by the owner of this monitor.
    ///
    /// # Panics
    /// If the log does not record that kind of entries, or if it has been
    /// cleared since the monitor was last frozen.
    pub fn for_each<F: FnMut(DeltaEntry)>(&self, log: &DeltaLog, kind: DeltaKind, mut f: F) {
        log.check_supports(kind);
        self.check_window(log);
        for i in self.window(kind) {
            let entry = match kind {
                DeltaKind::Removal => DeltaEntry::Removal(log.removal(i)),
                DeltaKind::Bound => DeltaEntry::Bound(log.bound_change(i)),
            };
            let cause = match entry {
                DeltaEntry::Removal(r) => r.cause,
                DeltaEntry::Bound(b) => b.cause,
            };
            if cause != self.owner {
                f(entry);
            }
        }
    }
    /// Iterates over the values removed in the frozen window
    pub fn for_each_removal<F: FnMut(i32)>(&self, log: &DeltaLog, mut f: F) {
        self.for_each(log, DeltaKind::Removal, |e| {
            if let DeltaEntry::Removal(r) = e {
                f(r.value)
            }
        })
    }
    /// Iterates over the bound changes of the frozen window
    pub fn for_each_bound_change<F: FnMut(BoundChange)>(&self, log: &DeltaLog, mut f: F) {
        self.for_each(log, DeltaKind::Bound, |e| {
            if let DeltaEntry::Bound(b) = e {
                f(b)
            }
        })
    }

    /// Makes sure the frozen window still designates entries of the log. A
    /// window frozen before a world operation may outlive the entries it
    /// designates as soon as anyone clears the log.
    pub(crate) fn check_window(&self, log: &DeltaLog) {
        assert!(
            self.timestamp.is_none() || self.timestamp == Some(log.timestamp()),
            "the delta log was cleared after the monitor was frozen (freeze it again)"
        );
    }

    /// Makes sure the cursors are meaningful for the current content of the log
    fn synchronize(&mut self, log: &mut DeltaLog, now: u64) {
        log.lazy_clear(now);
        if self.timestamp != Some(log.timestamp()) {
            self.first = [0; 2];
            self.frozen = [(0, 0); 2];
            self.timestamp = Some(log.timestamp());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::PropagatorId;

    use super::*;

    const ME: Cause = Cause::Propagator(PropagatorId(0));
    const OTHER: Cause = Cause::Propagator(PropagatorId(1));

    fn removals(monitor: &DeltaMonitor, log: &DeltaLog) -> Vec<i32> {
        let mut out = vec![];
        monitor.for_each_removal(log, |v| out.push(v));
        out
    }

    #[test]
    fn every_removal_is_seen_exactly_once() {
        let mut log = DeltaLog::new(EnumSet::all(), 0);
        let mut monitor = DeltaMonitor::new(ME);
        log.record_removal(1, OTHER, 0);
        log.record_removal(2, Cause::Decision, 0);

        monitor.freeze(&mut log, 0);
        assert_eq!(vec![1, 2], removals(&monitor, &log));

        log.record_removal(3, OTHER, 0);
        // the window does not move until the next freeze
        assert_eq!(vec![1, 2], removals(&monitor, &log));
        monitor.freeze(&mut log, 0);
        assert_eq!(vec![3], removals(&monitor, &log));
        monitor.freeze(&mut log, 0);
        assert!(removals(&monitor, &log).is_empty());
    }

    #[test]
    fn the_owner_does_not_see_its_own_removals() {
        let mut log = DeltaLog::new(EnumSet::all(), 0);
        let mut mine = DeltaMonitor::new(ME);
        let mut theirs = DeltaMonitor::new(OTHER);
        log.record_removal(1, ME, 0);
        log.record_removal(2, OTHER, 0);
        log.record_bound_change(0, 3, true, ME, 0);

        mine.freeze(&mut log, 0);
        theirs.freeze(&mut log, 0);
        assert_eq!(vec![2], removals(&mine, &log));
        assert_eq!(vec![1], removals(&theirs, &log));

        let mut bounds = vec![];
        theirs.for_each_bound_change(&log, |b| bounds.push((b.old, b.new, b.lower)));
        assert_eq!(vec![(0, 3, true)], bounds);
        mine.for_each_bound_change(&log, |_| panic!("nothing to see"));
    }

    #[test]
    fn a_new_timestamp_clears_the_log_and_rewinds_the_monitors() {
        let mut log = DeltaLog::new(EnumSet::all(), 0);
        let mut monitor = DeltaMonitor::new(ME);
        log.record_removal(1, OTHER, 0);
        log.record_removal(2, OTHER, 0);
        monitor.freeze(&mut log, 0);
        assert_eq!(2, monitor.window(DeltaKind::Removal).len());

        log.record_removal(7, OTHER, 1);
        assert_eq!(1, log.len(DeltaKind::Removal));
        monitor.freeze(&mut log, 1);
        assert_eq!(vec![7], removals(&monitor, &log));
    }

    #[test]
    fn unfreeze_skips_the_pending_entries() {
        let mut log = DeltaLog::new(EnumSet::all(), 0);
        let mut monitor = DeltaMonitor::new(ME);
        log.record_removal(1, OTHER, 0);
        monitor.unfreeze(&mut log, 0);
        log.record_removal(2, OTHER, 0);
        monitor.freeze(&mut log, 0);
        assert_eq!(vec![2], removals(&monitor, &log));
    }

    #[test]
    fn a_stale_log_is_cleared_when_observed() {
        let mut log = DeltaLog::new(EnumSet::all(), 0);
        let mut monitor = DeltaMonitor::new(ME);
        log.record_removal(1, OTHER, 0);
        monitor.freeze(&mut log, 5);
        assert!(log.is_empty());
        assert!(removals(&monitor, &log).is_empty());
    }

    #[test]
    #[should_panic]
    fn iterating_an_unsupported_kind_is_a_contract_violation() {
        let log = DeltaLog::new(DeltaKind::Bound.into(), 0);
        let monitor = DeltaMonitor::new(ME);
        monitor.for_each_removal(&log, |_| {});
    }

    #[test]
    #[should_panic]
    fn recording_an_unsupported_kind_is_a_contract_violation() {
        let mut log = DeltaLog::new(DeltaKind::Bound.into(), 0);
        log.record_removal(1, OTHER, 0);
    }

    #[test]
    #[should_panic(expected = "freeze it again")]
    fn a_window_frozen_before_a_clear_cannot_be_iterated() {
        let mut log = DeltaLog::new(EnumSet::all(), 0);
        let mut monitor = DeltaMonitor::new(ME);
        log.record_removal(1, OTHER, 0);
        log.record_removal(2, OTHER, 0);
        monitor.freeze(&mut log, 0);

        // someone else writes after a world operation: the log is cleared
        log.record_removal(3, OTHER, 1);
        monitor.for_each_removal(&log, |_| {});
    }
}
