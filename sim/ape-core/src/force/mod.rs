//! Force generators and the registry that applies them.
//!
//! A [`ForceGenerator`] knows how to compute a force (or torque) and *add* it
//! to a target's accumulator. It never overwrites what other generators have
//! already added. The [`ForceRegistry`] pairs generators with targets and
//! applies every pair, in registration order, once per tick.
//!
//! # Example
//!
//! ```
//! use ape_core::arena::Arena;
//! use ape_core::force::{ConstantAcceleration, Drag, ParticleForceRegistry};
//! use ape_core::Particle;
//! use nalgebra::Vector3;
//!
//! let mut particles = Arena::new();
//! let p = particles.insert(Particle::new().with_mass(2.0));
//!
//! let mut registry = ParticleForceRegistry::new();
//! let gravity = registry.insert_generator(ConstantAcceleration::new(Vector3::new(0.0, -10.0, 0.0)));
//! let drag = registry.insert_generator(Drag::new(0.1, 0.01).unwrap());
//! registry.add(gravity, p).unwrap();
//! registry.add(drag, p).unwrap();
//!
//! registry.update_forces(&mut particles, 1.0 / 60.0);
//! assert_eq!(particles.get(p).unwrap().accumulated_force(), Vector3::new(0.0, -20.0, 0.0));
//! ```

mod drag;
mod gravity;
mod registry;

pub use drag::Drag;
pub use gravity::ConstantAcceleration;
pub use registry::{BodyForceRegistry, ForceRegistry, ParticleForceRegistry, Registration};

use nalgebra::Vector3;

use crate::particle::Particle;
use crate::rigid_body::RigidBody;

/// Anything a generator can push on.
pub trait ForceTarget {
    /// Linear velocity in world space.
    fn velocity(&self) -> Vector3<f64>;

    /// Inverse mass; zero means immovable.
    fn inverse_mass(&self) -> f64;

    /// Mass, `f64::INFINITY` for immovable targets.
    fn mass(&self) -> f64;

    /// Whether forces can move this target.
    fn has_finite_mass(&self) -> bool {
        self.inverse_mass() >= crate::particle::INFINITE_MASS_THRESHOLD
    }

    /// Add a world-space force through the center of mass.
    fn add_force(&mut self, force: &Vector3<f64>);
}

impl ForceTarget for Particle {
    fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    fn inverse_mass(&self) -> f64 {
        Particle::inverse_mass(self)
    }

    fn mass(&self) -> f64 {
        Particle::mass(self)
    }

    fn has_finite_mass(&self) -> bool {
        Particle::has_finite_mass(self)
    }

    fn add_force(&mut self, force: &Vector3<f64>) {
        Particle::add_force(self, force);
    }
}

impl ForceTarget for RigidBody {
    fn velocity(&self) -> Vector3<f64> {
        self.linear_velocity()
    }

    fn inverse_mass(&self) -> f64 {
        RigidBody::inverse_mass(self)
    }

    fn mass(&self) -> f64 {
        RigidBody::mass(self)
    }

    fn has_finite_mass(&self) -> bool {
        RigidBody::has_finite_mass(self)
    }

    fn add_force(&mut self, force: &Vector3<f64>) {
        RigidBody::add_force(self, force);
    }
}

/// Computes a force for one target and adds it to the target's accumulator.
///
/// Generators hold no per-target state, so a single generator can be
/// registered against any number of targets.
pub trait ForceGenerator<T>: std::fmt::Debug + Send + Sync {
    /// Add this generator's contribution for the tick of length `dt`.
    fn update_force(&self, target: &mut T, dt: f64);
}
