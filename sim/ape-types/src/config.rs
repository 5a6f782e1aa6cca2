//! Configuration types for simulation.
//!
//! This module provides the knobs a world reads when it is stepped or when it
//! creates bodies on the caller's behalf: the fixed timestep, default damping
//! and the safety checks run after each tick.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Main configuration for a simulation world.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Fixed timestep used by `World::step_fixed` (seconds).
    pub timestep: f64,
    /// Damping given to particles created by the world.
    pub particle_damping: f64,
    /// Linear damping given to rigid bodies created by the world.
    pub linear_damping: f64,
    /// Angular damping given to rigid bodies created by the world.
    pub angular_damping: f64,
    /// Fail the step when any body ends up with `NaN`/`Inf` state.
    pub check_divergence: bool,
    /// Integrate bodies concurrently (requires the `parallel` feature).
    pub parallel_integration: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            particle_damping: 1.0,
            linear_damping: 0.9,
            angular_damping: 0.9,
            check_divergence: true,
            parallel_integration: true,
        }
    }
}

impl SimulationConfig {
    /// Create a config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Real-time preset (60 Hz).
    #[must_use]
    pub fn realtime() -> Self {
        Self::default()
    }

    /// High-fidelity preset (1000 Hz, light damping).
    #[must_use]
    pub fn high_fidelity() -> Self {
        Self {
            timestep: 1.0 / 1000.0,
            particle_damping: 0.999,
            linear_damping: 0.99,
            angular_damping: 0.99,
            ..Default::default()
        }
    }

    /// Set the particle damping.
    #[must_use]
    pub fn particle_damping(mut self, damping: f64) -> Self {
        self.particle_damping = damping;
        self
    }

    /// Set the rigid-body damping pair.
    #[must_use]
    pub fn body_damping(mut self, linear: f64, angular: f64) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Disable the post-step `NaN`/`Inf` check.
    #[must_use]
    pub fn without_divergence_check(mut self) -> Self {
        self.check_divergence = false;
        self
    }

    /// Integrate sequentially even when the `parallel` feature is on.
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel_integration = false;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(crate::ApeError::InvalidTimestep(self.timestep));
        }

        if self.timestep > 1.0 {
            return Err(crate::ApeError::invalid_config(
                "timestep > 1 second is likely an error",
            ));
        }

        for (name, value) in [
            ("particle_damping", self.particle_damping),
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(crate::ApeError::invalid_config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Get the frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }
}
