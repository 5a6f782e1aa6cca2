//! Error types for simulation operations.

use thiserror::Error;

/// Errors that can occur while building or stepping a simulation.
///
/// Body-level contract violations (a non-positive step passed to
/// `integrate`, a zero mass) panic with the `Display` text of the matching
/// variant; everything else is returned to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApeError {
    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Mass must be strictly positive (infinity is allowed).
    #[error("invalid mass: {0} (must be positive)")]
    InvalidMass(f64),

    /// Inverse mass must be non-negative.
    #[error("invalid inverse mass: {0} (must be non-negative)")]
    NegativeInverseMass(f64),

    /// Damping must lie in `(0, 1]`.
    #[error("invalid damping: {0} (must be in (0, 1])")]
    InvalidDamping(f64),

    /// The inertia tensor has no inverse.
    #[error("inertia tensor is singular or non-finite")]
    SingularInertiaTensor,

    /// A particle handle that is not (or no longer) live.
    #[error("invalid particle handle: {0}")]
    InvalidParticle(String),

    /// A rigid body handle that is not (or no longer) live.
    #[error("invalid body handle: {0}")]
    InvalidBody(String),

    /// A generator id that the registry does not own.
    #[error("unknown force generator: {0}")]
    UnknownGenerator(String),

    /// Simulation diverged (`NaN` or `Inf` detected).
    #[error("simulation diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl ApeError {
    /// Create a diverged error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a divergence error.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this error refers to a stale or unknown handle.
    #[must_use]
    pub fn is_invalid_handle(&self) -> bool {
        matches!(
            self,
            Self::InvalidParticle(_) | Self::InvalidBody(_) | Self::UnknownGenerator(_)
        )
    }
}
