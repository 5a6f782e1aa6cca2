//! Simulation world: body storage, force registries and the tick.
//!
//! The [`World`] owns every particle and rigid body, one force registry per
//! body kind and the [`SimulationConfig`]. A tick runs in two phases:
//!
//! 1. every registered generator adds its force to its target;
//! 2. every body integrates over the same `dt`.
//!
//! No body is integrated before all forces for the tick are in. Frame timing
//! (how `dt` is measured) belongs to the caller.

use ape_types::{
    ApeError, BodyHandle, GeneratorId, ParticleHandle, Pose, SimulationConfig,
};
use nalgebra::Vector3;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::force::{BodyForceRegistry, ParticleForceRegistry};
use crate::particle::Particle;
use crate::rigid_body::RigidBody;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The simulation world.
#[derive(Debug)]
pub struct World {
    /// Simulation configuration.
    config: SimulationConfig,
    /// Simulated time elapsed, in seconds.
    time: f64,
    /// Number of completed steps.
    step_count: u64,
    particles: Arena<ParticleHandle, Particle>,
    bodies: Arena<BodyHandle, RigidBody>,
    particle_forces: ParticleForceRegistry,
    body_forces: BodyForceRegistry,
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            time: 0.0,
            step_count: 0,
            particles: Arena::new(),
            bodies: Arena::new(),
            particle_forces: ParticleForceRegistry::new(),
            body_forces: BodyForceRegistry::new(),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace the configuration after validating it.
    ///
    /// # Errors
    ///
    /// Whatever [`SimulationConfig::validate`] rejects; the old configuration
    /// stays in place.
    pub fn set_config(&mut self, config: SimulationConfig) -> ape_types::Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Simulated time elapsed.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Fixed timestep from the configuration.
    #[must_use]
    pub fn timestep(&self) -> f64 {
        self.config.timestep
    }

    // =========================================================================
    // Particles
    // =========================================================================

    /// A particle carrying the configured damping, not yet added.
    #[must_use]
    pub fn new_particle(&self) -> Particle {
        Particle::new().with_damping(self.config.particle_damping)
    }

    /// Add a particle and return its handle.
    pub fn add_particle(&mut self, particle: Particle) -> ParticleHandle {
        let handle = self.particles.insert(particle);
        debug!(particle = %handle, "added particle");
        handle
    }

    /// Remove a particle and every force registration that targets it.
    pub fn remove_particle(&mut self, handle: ParticleHandle) -> Option<Particle> {
        let particle = self.particles.remove(handle)?;
        let dropped = self.particle_forces.remove_target(handle);
        debug!(particle = %handle, dropped, "removed particle");
        Some(particle)
    }

    /// Get a particle.
    #[must_use]
    pub fn particle(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.particles.get(handle)
    }

    /// Get a particle mutably.
    #[must_use]
    pub fn particle_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        self.particles.get_mut(handle)
    }

    /// Iterate over particles with their handles.
    pub fn particles(&self) -> impl Iterator<Item = (ParticleHandle, &Particle)> {
        self.particles.iter()
    }

    /// Number of particles.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Position of a particle, for the rendering side.
    #[must_use]
    pub fn particle_position(&self, handle: ParticleHandle) -> Option<Vector3<f64>> {
        self.particles.get(handle).map(|p| p.position)
    }

    /// The particle force registry.
    #[must_use]
    pub fn particle_forces(&self) -> &ParticleForceRegistry {
        &self.particle_forces
    }

    /// The particle force registry, mutably (to insert generators).
    #[must_use]
    pub fn particle_forces_mut(&mut self) -> &mut ParticleForceRegistry {
        &mut self.particle_forces
    }

    /// Register `generator` against a live particle.
    ///
    /// # Errors
    ///
    /// [`ApeError::InvalidParticle`] for a stale handle,
    /// [`ApeError::UnknownGenerator`] for an id the registry does not own.
    pub fn register_particle_force(
        &mut self,
        generator: GeneratorId,
        particle: ParticleHandle,
    ) -> ape_types::Result<()> {
        if !self.particles.contains(particle) {
            return Err(ApeError::InvalidParticle(particle.to_string()));
        }
        self.particle_forces.add(generator, particle)
    }

    // =========================================================================
    // Rigid bodies
    // =========================================================================

    /// A rigid body carrying the configured damping, not yet added.
    #[must_use]
    pub fn new_rigid_body(&self) -> RigidBody {
        RigidBody::new().with_damping(self.config.linear_damping, self.config.angular_damping)
    }

    /// Add a rigid body and return its handle.
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = self.bodies.insert(body);
        debug!(body = %handle, "added rigid body");
        handle
    }

    /// Remove a rigid body and every force registration that targets it.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let body = self.bodies.remove(handle)?;
        let dropped = self.body_forces.remove_target(handle);
        debug!(body = %handle, dropped, "removed rigid body");
        Some(body)
    }

    /// Get a rigid body.
    #[must_use]
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Get a rigid body mutably.
    #[must_use]
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Iterate over rigid bodies with their handles.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Number of rigid bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Pose of a rigid body, for the rendering side.
    #[must_use]
    pub fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.bodies.get(handle).map(RigidBody::pose)
    }

    /// The rigid body force registry.
    #[must_use]
    pub fn body_forces(&self) -> &BodyForceRegistry {
        &self.body_forces
    }

    /// The rigid body force registry, mutably (to insert generators).
    #[must_use]
    pub fn body_forces_mut(&mut self) -> &mut BodyForceRegistry {
        &mut self.body_forces
    }

    /// Register `generator` against a live rigid body.
    ///
    /// # Errors
    ///
    /// [`ApeError::InvalidBody`] for a stale handle,
    /// [`ApeError::UnknownGenerator`] for an id the registry does not own.
    pub fn register_body_force(
        &mut self,
        generator: GeneratorId,
        body: BodyHandle,
    ) -> ape_types::Result<()> {
        if !self.bodies.contains(body) {
            return Err(ApeError::InvalidBody(body.to_string()));
        }
        self.body_forces.add(generator, body)
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Advance the world by `dt` seconds.
    ///
    /// # Errors
    ///
    /// - [`ApeError::InvalidTimestep`] if `dt` is not positive and finite.
    ///   Nothing is touched in that case.
    /// - [`ApeError::Diverged`] if divergence checking is on and a body
    ///   ends the step with non-finite state. The step has still been taken.
    pub fn step(&mut self, dt: f64) -> ape_types::Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ApeError::InvalidTimestep(dt));
        }

        self.particle_forces.update_forces(&mut self.particles, dt);
        self.body_forces.update_forces(&mut self.bodies, dt);

        self.integrate_all(dt);

        self.time += dt;
        self.step_count += 1;
        trace!(
            step = self.step_count,
            time = self.time,
            dt,
            particles = self.particles.len(),
            bodies = self.bodies.len(),
            "world stepped"
        );

        if self.config.check_divergence {
            self.check_finite()?;
        }
        Ok(())
    }

    /// Advance the world by the configured timestep.
    ///
    /// # Errors
    ///
    /// Same as [`Self::step`].
    pub fn step_fixed(&mut self) -> ape_types::Result<()> {
        self.step(self.config.timestep)
    }

    #[cfg(feature = "parallel")]
    fn integrate_all(&mut self, dt: f64) {
        if self.config.parallel_integration {
            self.particles.par_values_mut().for_each(|p| p.integrate(dt));
            self.bodies.par_values_mut().for_each(|b| b.integrate(dt));
        } else {
            self.integrate_sequential(dt);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn integrate_all(&mut self, dt: f64) {
        self.integrate_sequential(dt);
    }

    fn integrate_sequential(&mut self, dt: f64) {
        for particle in self.particles.values_mut() {
            particle.integrate(dt);
        }
        for body in self.bodies.values_mut() {
            body.integrate(dt);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Total kinetic energy of everything with finite mass.
    #[must_use]
    pub fn total_kinetic_energy(&self) -> f64 {
        let particles: f64 = self.particles.values().map(Particle::kinetic_energy).sum();
        let bodies: f64 = self.bodies.values().map(RigidBody::kinetic_energy).sum();
        particles + bodies
    }

    /// Validate the configuration and every body's state.
    ///
    /// # Errors
    ///
    /// The configuration error, or [`ApeError::Diverged`] for the first
    /// non-finite body.
    pub fn validate(&self) -> ape_types::Result<()> {
        self.config.validate()?;
        self.check_finite()
    }

    fn check_finite(&self) -> ape_types::Result<()> {
        if let Some((handle, _)) = self.particles.iter().find(|(_, p)| !p.is_finite()) {
            return Err(ApeError::diverged(format!(
                "particle {handle} has non-finite state"
            )));
        }
        if let Some((handle, _)) = self.bodies.iter().find(|(_, b)| !b.is_finite()) {
            return Err(ApeError::diverged(format!(
                "body {handle} has non-finite state"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::force::{ConstantAcceleration, Drag};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, UnitQuaternion};

    fn world() -> World {
        World::new(SimulationConfig::default().particle_damping(1.0).body_damping(1.0, 1.0))
    }

    #[test]
    fn test_forces_applied_before_integration() {
        let mut world = world();
        let p = world.add_particle(Particle::new().with_mass(2.0));
        let g = world
            .particle_forces_mut()
            .insert_generator(ConstantAcceleration::new(Vector3::new(0.0, -10.0, 0.0)));
        world.register_particle_force(g, p).unwrap();

        world.step(0.5).unwrap();

        let particle = world.particle(p).unwrap();
        // Force reaches velocity in the same tick; position saw the old velocity.
        assert_relative_eq!(particle.velocity.y, -5.0, epsilon = 1e-12);
        assert_relative_eq!(particle.position.y, 0.0, epsilon = 1e-12);
        assert_eq!(particle.accumulated_force(), Vector3::zeros());
    }

    #[test]
    fn test_step_advances_clock() {
        let mut world = world();
        world.step(0.25).unwrap();
        world.step_fixed().unwrap();

        assert_eq!(world.step_count(), 2);
        assert_relative_eq!(world.time(), 0.25 + world.timestep(), epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_step_leaves_world_untouched() {
        let mut world = world();
        let p = world.add_particle(Particle::new().with_velocity(Vector3::x()));

        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = world.step(dt).unwrap_err();
            assert!(matches!(err, ApeError::InvalidTimestep(_)));
        }
        assert_eq!(world.step_count(), 0);
        assert_eq!(world.particle_position(p), Some(Vector3::zeros()));
    }

    #[test]
    fn test_removal_purges_registrations() {
        let mut world = world();
        let a = world.add_body(RigidBody::new());
        let b = world.add_body(RigidBody::new());
        let g = world
            .body_forces_mut()
            .insert_generator(ConstantAcceleration::earth());
        world.register_body_force(g, a).unwrap();
        world.register_body_force(g, b).unwrap();

        assert!(world.remove_body(a).is_some());
        assert_eq!(world.body_forces().len(), 1);
        assert!(world.body(a).is_none());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_register_stale_handle_fails() {
        let mut world = world();
        let p = world.add_particle(Particle::new());
        let g = world
            .particle_forces_mut()
            .insert_generator(Drag::new(0.1, 0.0).unwrap());
        world.remove_particle(p);

        let err = world.register_particle_force(g, p).unwrap_err();
        assert!(err.is_invalid_handle());
        assert!(world.particle_forces().is_empty());
    }

    #[test]
    fn test_divergence_detected() {
        let mut world = world();
        let p = world.add_particle(Particle::new());
        world.particle_mut(p).unwrap().velocity = Vector3::new(f64::NAN, 0.0, 0.0);

        let err = world.step(0.1).unwrap_err();
        assert!(err.is_diverged());
        assert!(world.validate().is_err());

        let mut unchecked = World::new(SimulationConfig::default().without_divergence_check());
        let q = unchecked.add_particle(Particle::new());
        unchecked.particle_mut(q).unwrap().velocity = Vector3::new(f64::NAN, 0.0, 0.0);
        assert!(unchecked.step(0.1).is_ok());
    }

    #[test]
    fn test_new_bodies_take_configured_damping() {
        let world = World::new(SimulationConfig::default().particle_damping(0.5).body_damping(0.8, 0.7));
        assert_eq!(world.new_particle().damping(), 0.5);
        let body = world.new_rigid_body();
        assert_eq!(body.linear_damping(), 0.8);
        assert_eq!(body.angular_damping(), 0.7);
    }

    #[test]
    fn test_set_config_rejects_invalid() {
        let mut world = world();
        let before = world.config().clone();
        assert!(world.set_config(SimulationConfig::with_timestep(-1.0)).is_err());
        assert_eq!(world.config(), &before);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let build = |config: SimulationConfig| {
            let mut world = World::new(config);
            let g = world
                .body_forces_mut()
                .insert_generator(ConstantAcceleration::earth());
            for i in 0..32 {
                let mut body = world
                    .new_rigid_body()
                    .with_position(Vector3::new(f64::from(i), 0.0, 0.0))
                    .with_angular_velocity(Vector3::new(0.1, f64::from(i) * 0.01, 0.0));
                body.set_inertia_tensor(&Matrix3::from_diagonal_element(0.4)).unwrap();
                let h = world.add_body(body);
                world.register_body_force(g, h).unwrap();
            }
            for _ in 0..20 {
                world.step_fixed().unwrap();
            }
            world
        };

        let parallel = build(SimulationConfig::default());
        let sequential = build(SimulationConfig::default().sequential());

        for ((_, a), (_, b)) in parallel.bodies().zip(sequential.bodies()) {
            assert_eq!(a.position(), b.position());
            assert_eq!(a.orientation(), b.orientation());
        }
    }

    #[test]
    fn test_pose_and_energy_queries() {
        let mut world = world();
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5);
        let b = world.add_body(
            RigidBody::new()
                .with_position(Vector3::new(1.0, 2.0, 3.0))
                .with_orientation(q)
                .with_linear_velocity(Vector3::new(2.0, 0.0, 0.0)),
        );
        world.add_particle(Particle::new().with_velocity(Vector3::new(0.0, 1.0, 0.0)));

        let pose = world.pose(b).unwrap();
        assert_eq!(pose.position, Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(pose.orientation.angle_to(&q), 0.0, epsilon = 1e-12);

        // ½·1·4 + ½·1·1
        assert_relative_eq!(world.total_kinetic_energy(), 2.5, epsilon = 1e-12);
    }
}
