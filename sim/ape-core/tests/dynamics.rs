//! End-to-end checks of the integrators and the world tick.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use ape_core::force::{ConstantAcceleration, Drag, ForceGenerator, ParticleForceRegistry};
use ape_core::{Particle, RigidBody, SimulationConfig, World};
use approx::assert_relative_eq;
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

// =============================================================================
// Particle
// =============================================================================

#[test]
fn particle_free_fall_one_second() {
    let mut p = Particle::new().with_acceleration(Vector3::new(0.0, -9.8, 0.0));
    p.integrate(1.0);

    assert_relative_eq!(p.position, Vector3::new(0.0, -4.9, 0.0), epsilon = 1e-12);
    assert_relative_eq!(p.velocity, Vector3::new(0.0, -9.8, 0.0), epsilon = 1e-12);
}

#[test]
fn immovable_particle_keeps_velocity() {
    let mut p = Particle::new().with_velocity(Vector3::new(1.0, 0.0, 0.0));
    p.set_inverse_mass(0.0);
    p.integrate(1.0);

    assert_eq!(p.position, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(p.velocity, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
#[should_panic(expected = "invalid timestep")]
fn particle_rejects_zero_step() {
    Particle::new().integrate(0.0);
}

// =============================================================================
// Rigid body
// =============================================================================

#[test]
fn torque_impulse_spins_about_z() {
    let mut body = RigidBody::new().with_damping(1.0, 1.0);
    body.set_inverse_inertia_tensor(Matrix3::identity()).unwrap();
    body.add_torque(&Vector3::new(0.0, 0.0, 1.0));
    body.integrate(1.0);

    assert_relative_eq!(body.angular_velocity(), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    assert_eq!(body.position(), Vector3::zeros());

    let q = body.orientation();
    assert_relative_eq!(q.quaternion().norm(), 1.0, epsilon = 1e-12);
    let (axis, angle) = q.axis_angle().unwrap();
    assert_relative_eq!(axis.into_inner(), Vector3::z(), epsilon = 1e-12);
    // First-order update: q = (1, 0, 0, ½) normalized.
    assert_relative_eq!(angle, 2.0 * 0.5_f64.atan(), epsilon = 1e-12);
}

#[test]
fn torque_impulse_with_default_damping() {
    let mut body = RigidBody::new();
    body.set_inverse_inertia_tensor(Matrix3::identity()).unwrap();
    body.add_torque(&Vector3::new(0.0, 0.0, 1.0));
    body.integrate(1.0);

    assert_relative_eq!(body.angular_velocity().z, 0.9, epsilon = 1e-12);
    assert_eq!(body.accumulated_torque(), Vector3::zeros());
}

#[test]
fn off_center_force_produces_torque() {
    let mut body = RigidBody::new().with_damping(1.0, 1.0);
    body.set_inertia_tensor(&Matrix3::from_diagonal_element(2.0)).unwrap();
    body.add_force_at_body_point(&Vector3::new(0.0, 1.0, 0.0), &Vector3::new(1.0, 0.0, 0.0));

    assert_relative_eq!(body.accumulated_torque(), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

    body.integrate(0.1);
    assert_relative_eq!(body.angular_velocity().z, 0.05, epsilon = 1e-12);
    assert_relative_eq!(body.linear_velocity().y, 0.1, epsilon = 1e-12);
}

#[test]
fn orientation_stays_unit_under_spin() {
    let mut body = RigidBody::new()
        .with_damping(1.0, 1.0)
        .with_angular_velocity(Vector3::new(3.0, -2.0, 5.0))
        .with_orientation(UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3));

    for _ in 0..10_000 {
        body.integrate(1.0 / 60.0);
        assert_relative_eq!(body.orientation().quaternion().norm(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn singular_inertia_is_rejected() {
    let mut body = RigidBody::new();
    let before = *body.inverse_inertia_tensor();
    let err = body.set_inertia_tensor(&Matrix3::zeros()).unwrap_err();

    assert_eq!(err, ape_core::ApeError::SingularInertiaTensor);
    assert_eq!(*body.inverse_inertia_tensor(), before);
}

// =============================================================================
// Registry and world
// =============================================================================

/// Spring toward a fixed anchor, to check user generators plug in.
#[derive(Debug)]
struct AnchoredSpring {
    anchor: Vector3<f64>,
    stiffness: f64,
}

impl ForceGenerator<Particle> for AnchoredSpring {
    fn update_force(&self, target: &mut Particle, _dt: f64) {
        let force = (self.anchor - target.position) * self.stiffness;
        target.add_force(&force);
    }
}

#[test]
fn removed_pair_stops_contributing() {
    let mut world = World::new(SimulationConfig::default().particle_damping(1.0));
    let a = world.add_particle(Particle::new());
    let b = world.add_particle(Particle::new());

    let gravity = world
        .particle_forces_mut()
        .insert_generator(ConstantAcceleration::new(Vector3::new(0.0, -1.0, 0.0)));
    let wind = world
        .particle_forces_mut()
        .insert_generator(ConstantAcceleration::new(Vector3::new(1.0, 0.0, 0.0)));
    world.register_particle_force(gravity, a).unwrap();
    world.register_particle_force(gravity, b).unwrap();
    world.register_particle_force(wind, a).unwrap();

    assert!(world.particle_forces_mut().remove(gravity, a));
    world.step(1.0).unwrap();

    assert_relative_eq!(world.particle(a).unwrap().velocity, Vector3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(world.particle(b).unwrap().velocity, Vector3::new(0.0, -1.0, 0.0));
}

#[test]
fn custom_generator_oscillates() {
    let mut world = World::new(SimulationConfig::default().particle_damping(1.0));
    let p = world.add_particle(Particle::new().with_position(Vector3::new(1.0, 0.0, 0.0)));
    let spring = world.particle_forces_mut().insert_generator(AnchoredSpring {
        anchor: Vector3::zeros(),
        stiffness: 4.0,
    });
    world.register_particle_force(spring, p).unwrap();

    let mut crossed = false;
    for _ in 0..120 {
        world.step_fixed().unwrap();
        if world.particle_position(p).unwrap().x < 0.0 {
            crossed = true;
            break;
        }
    }
    assert!(crossed, "particle never passed the anchor");
}

#[test]
fn drag_slows_particle() {
    let mut particles = ape_core::arena::Arena::new();
    let p = particles.insert(Particle::new().with_velocity(Vector3::new(10.0, 0.0, 0.0)));

    let mut registry = ParticleForceRegistry::new();
    let drag = registry.insert_generator(Drag::new(0.5, 0.05).unwrap());
    registry.add(drag, p).unwrap();

    let dt = 1.0 / 60.0;
    let mut last = 10.0;
    for _ in 0..60 {
        registry.update_forces(&mut particles, dt);
        let particle = particles.get_mut(p).unwrap();
        particle.integrate(dt);
        assert!(particle.velocity.x < last);
        assert!(particle.velocity.x > 0.0);
        last = particle.velocity.x;
    }
}

#[test]
fn falling_body_under_world_gravity() {
    let mut world = World::new(SimulationConfig::default().body_damping(1.0, 1.0));
    let body = world.new_rigid_body().with_position(Vector3::new(0.0, 10.0, 0.0));
    let h = world.add_body(body);
    let g = world
        .body_forces_mut()
        .insert_generator(ConstantAcceleration::earth());
    world.register_body_force(g, h).unwrap();

    let steps = 60;
    for _ in 0..steps {
        world.step_fixed().unwrap();
    }

    // Semi-implicit Euler: y = y0 - g·dt²·n(n+1)/2
    let dt = world.timestep();
    let n = f64::from(steps);
    let expected = 10.0 - 9.81 * dt * dt * n * (n + 1.0) / 2.0;
    assert_relative_eq!(world.pose(h).unwrap().position.y, expected, epsilon = 1e-9);
    assert_relative_eq!(world.time(), 1.0, epsilon = 1e-12);
}
