use nalgebra::Vector3;

use super::{ForceGenerator, ForceTarget};
use crate::particle::INFINITE_MASS_THRESHOLD;

/// Adds `acceleration * mass` every tick: a uniform field such as gravity.
///
/// Targets whose inverse mass is below [`INFINITE_MASS_THRESHOLD`] are
/// skipped, since their mass is infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantAcceleration {
    /// Field acceleration in world space.
    pub acceleration: Vector3<f64>,
}

impl ConstantAcceleration {
    /// Field with the given acceleration.
    #[must_use]
    pub const fn new(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Standard Earth gravity, 9.81 m/s² along -Y.
    #[must_use]
    pub fn earth() -> Self {
        Self::new(Vector3::new(0.0, -9.81, 0.0))
    }
}

impl<T: ForceTarget> ForceGenerator<T> for ConstantAcceleration {
    fn update_force(&self, target: &mut T, _dt: f64) {
        let inverse_mass = target.inverse_mass();
        if inverse_mass < INFINITE_MASS_THRESHOLD {
            return;
        }
        target.add_force(&(self.acceleration / inverse_mass));
    }
}
