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

//! This module groups the knobs that can be turned when creating an
//! environment, a propagation engine or a whole solver.

use thiserror::Error;

/// The errors that can occur when building an invalid configuration
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The decay factor must lie in the open interval (0, 1)
    #[error("the decay factor must lie in (0, 1) but {0} was given")]
    InvalidDecay(f64),
    /// The reschedule penalty must be strictly positive
    #[error("the reschedule penalty must be positive but {0} was given")]
    InvalidPenalty(f64),
}

/// The configuration of an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// The number of stored primitives to make room for upfront
    pub initial_slots: usize,
    /// The number of undo records the trail can hold before it first grows
    pub initial_trail_capacity: usize,
}
impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            initial_slots: 1_024,
            initial_trail_capacity: 1_024,
        }
    }
}

/// The configuration of the propagation engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// The factor by which the adaptive weight of every propagator is
    /// multiplied whenever a new fixpoint round begins
    decay: f64,
    /// The weight added to a propagator each time it asks to be rescheduled
    reschedule_penalty: f64,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay: 0.999,
            reschedule_penalty: 1.0,
        }
    }
}
impl EngineConfig {
    /// Returns the decay factor (gamma)
    pub fn decay(&self) -> f64 {
        self.decay
    }
    /// Returns the reschedule penalty
    pub fn reschedule_penalty(&self) -> f64 {
        self.reschedule_penalty
    }
    /// Sets the decay factor (gamma). It must lie in (0, 1).
    pub fn with_decay(mut self, decay: f64) -> Result<Self, ConfigError> {
        if decay > 0.0 && decay < 1.0 {
            self.decay = decay;
            Ok(self)
        } else {
            Err(ConfigError::InvalidDecay(decay))
        }
    }
    /// Sets the reschedule penalty. It must be positive.
    pub fn with_reschedule_penalty(mut self, penalty: f64) -> Result<Self, ConfigError> {
        if penalty > 0.0 && penalty.is_finite() {
            self.reschedule_penalty = penalty;
            Ok(self)
        } else {
            Err(ConfigError::InvalidPenalty(penalty))
        }
    }
}

/// The configuration of a whole solver
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverConfig {
    /// How to set up the environment
    pub environment: EnvironmentConfig,
    /// How to set up the propagation engine
    pub engine: EngineConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_decay_is_almost_one() {
        let config = EngineConfig::default();
        assert_eq!(0.999, config.decay());
        assert_eq!(1.0, config.reschedule_penalty());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = EngineConfig::default();
        assert_eq!(Err(ConfigError::InvalidDecay(1.0)), config.with_decay(1.0));
        assert_eq!(Err(ConfigError::InvalidDecay(0.0)), config.with_decay(0.0));
        assert_eq!(
            Err(ConfigError::InvalidPenalty(-1.0)),
            config.with_reschedule_penalty(-1.0)
        );
        assert!(config.with_decay(f64::NAN).is_err());
    }

    #[test]
    fn valid_values_are_accepted() {
        let config = EngineConfig::default()
            .with_decay(0.5)
            .and_then(|c| c.with_reschedule_penalty(2.0));
        let config = config.expect("valid configuration");
        assert_eq!(0.5, config.decay());
        assert_eq!(2.0, config.reschedule_penalty());
    }
}
