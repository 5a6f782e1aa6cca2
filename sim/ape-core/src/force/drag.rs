use ape_types::ApeError;
use nalgebra::Vector3;

use super::{ForceGenerator, ForceTarget};

/// Velocity-opposing drag with magnitude `k1·|v| + k2·|v|²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    k1: f64,
    k2: f64,
}

impl Drag {
    /// Drag with linear coefficient `k1` and quadratic coefficient `k2`.
    ///
    /// # Errors
    ///
    /// [`ApeError::InvalidConfig`] if either coefficient is negative or not
    /// finite.
    pub fn new(k1: f64, k2: f64) -> ape_types::Result<Self> {
        for (name, k) in [("k1", k1), ("k2", k2)] {
            if !k.is_finite() || k < 0.0 {
                return Err(ApeError::invalid_config(format!(
                    "drag coefficient {name} must be finite and non-negative, got {k}"
                )));
            }
        }
        Ok(Self { k1, k2 })
    }

    /// Linear coefficient.
    #[must_use]
    pub fn k1(&self) -> f64 {
        self.k1
    }

    /// Quadratic coefficient.
    #[must_use]
    pub fn k2(&self) -> f64 {
        self.k2
    }

    /// Drag force for a given velocity.
    #[must_use]
    pub fn force_for(&self, velocity: &Vector3<f64>) -> Vector3<f64> {
        let speed = velocity.norm();
        if speed == 0.0 {
            return Vector3::zeros();
        }
        let magnitude = self.k1 * speed + self.k2 * speed * speed;
        -(velocity / speed) * magnitude
    }
}

impl<T: ForceTarget> ForceGenerator<T> for Drag {
    fn update_force(&self, target: &mut T, _dt: f64) {
        let velocity = target.velocity();
        if velocity == Vector3::zeros() {
            return;
        }
        target.add_force(&self.force_for(&velocity));
    }
}
