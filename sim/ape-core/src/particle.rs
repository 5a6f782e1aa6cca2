//! Point-mass particle and its integrator.

use ape_types::ApeError;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Below this inverse mass a particle is treated as infinitely heavy.
pub const INFINITE_MASS_THRESHOLD: f64 = 1e-9;

/// A point mass: position, velocity and a force accumulator, no orientation.
///
/// # Example
///
/// ```
/// use ape_core::Particle;
/// use nalgebra::Vector3;
///
/// let mut p = Particle::new();
/// p.acceleration = Vector3::new(0.0, -9.8, 0.0);
/// p.integrate(1.0);
///
/// assert!((p.position.y + 4.9).abs() < 1e-12);
/// assert!((p.velocity.y + 9.8).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    /// Position in world space.
    pub position: Vector3<f64>,
    /// Velocity in world space.
    pub velocity: Vector3<f64>,
    /// Constant acceleration (gravity and the like), never cleared.
    pub acceleration: Vector3<f64>,
    /// Fraction of velocity kept per unit time, applied as `damping^dt`.
    damping: f64,
    /// Zero means infinite mass.
    inverse_mass: f64,
    /// Forces for the current tick; cleared by `integrate`.
    accumulated_force: Vector3<f64>,
}

impl Default for Particle {
    fn default() -> Self {
        Self::new()
    }
}

impl Particle {
    /// Particle at the origin, at rest, unit mass, no damping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            damping: 1.0,
            inverse_mass: 1.0,
            accumulated_force: Vector3::zeros(),
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Set the velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the constant acceleration.
    #[must_use]
    pub fn with_acceleration(mut self, acceleration: Vector3<f64>) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set the damping. Panics under the same conditions as [`Self::set_damping`].
    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.set_damping(damping);
        self
    }

    /// Set the mass. Panics under the same conditions as [`Self::set_mass`].
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.set_mass(mass);
        self
    }

    /// Set the mass.
    ///
    /// # Panics
    ///
    /// If `mass` is zero, negative or `NaN`. Infinity is accepted and means
    /// an immovable particle.
    pub fn set_mass(&mut self, mass: f64) {
        assert!(mass > 0.0, "{}", ApeError::InvalidMass(mass));
        self.inverse_mass = mass.recip();
    }

    /// Mass, or `f64::INFINITY` when the inverse mass is (nearly) zero.
    #[must_use]
    pub fn mass(&self) -> f64 {
        if self.inverse_mass < INFINITE_MASS_THRESHOLD {
            f64::INFINITY
        } else {
            self.inverse_mass.recip()
        }
    }

    /// Set the inverse mass directly; zero makes the particle immovable.
    ///
    /// # Panics
    ///
    /// If `inverse_mass` is negative or `NaN`.
    pub fn set_inverse_mass(&mut self, inverse_mass: f64) {
        assert!(
            inverse_mass >= 0.0,
            "{}",
            ApeError::NegativeInverseMass(inverse_mass)
        );
        self.inverse_mass = inverse_mass;
    }

    /// Inverse mass.
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Whether forces can move this particle.
    #[must_use]
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass >= INFINITE_MASS_THRESHOLD
    }

    /// Set the fraction of velocity kept per second.
    ///
    /// # Panics
    ///
    /// If `damping` is outside `(0, 1]` or `NaN`.
    pub fn set_damping(&mut self, damping: f64) {
        assert!(
            damping > 0.0 && damping <= 1.0,
            "{}",
            ApeError::InvalidDamping(damping)
        );
        self.damping = damping;
    }

    /// Damping factor.
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Add a world-space force for the current tick.
    pub fn add_force(&mut self, force: &Vector3<f64>) {
        self.accumulated_force += force;
    }

    /// Force accumulated so far this tick.
    #[must_use]
    pub fn accumulated_force(&self) -> Vector3<f64> {
        self.accumulated_force
    }

    /// Zero the force accumulator.
    pub fn clear_accumulator(&mut self) {
        self.accumulated_force = Vector3::zeros();
    }

    /// Advance the particle by `dt`.
    ///
    /// Position moves first, from the old velocity and the constant
    /// acceleration only; the accumulated force then feeds into the velocity
    /// and is cleared.
    ///
    /// # Panics
    ///
    /// If `dt` is not strictly positive, or if the inverse mass is negative.
    pub fn integrate(&mut self, dt: f64) {
        assert!(dt > 0.0, "{}", ApeError::InvalidTimestep(dt));
        assert!(
            self.inverse_mass >= 0.0,
            "{}",
            ApeError::NegativeInverseMass(self.inverse_mass)
        );

        self.position += self.velocity * dt + self.acceleration * (0.5 * dt * dt);

        let resulting_acceleration = self.acceleration + self.accumulated_force * self.inverse_mass;

        self.velocity = self.velocity * self.damping.powf(dt) + resulting_acceleration * dt;

        self.clear_accumulator();
    }

    /// Kinetic energy `½ m v²`; zero for an immovable particle.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        if self.has_finite_mass() {
            0.5 * self.mass() * self.velocity.norm_squared()
        } else {
            0.0
        }
    }

    /// Check if the particle contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|x| x.is_finite()) && self.velocity.iter().all(|x| x.is_finite())
    }
}
