//! Property-based tests for the integrators and force accumulation.
//!
//! Run with: cargo test -p ape-core -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ape_core::arena::Arena;
use ape_core::force::{ConstantAcceleration, ParticleForceRegistry};
use ape_core::{Particle, RigidBody};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_vector(range: f64) -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-range..range).prop_map(|[x, y, z]| Vector3::new(x, y, z))
}

fn arb_orientation() -> impl Strategy<Value = UnitQuaternion<f64>> {
    prop::array::uniform3(-3.0..3.0f64)
        .prop_map(|[r, p, y]| UnitQuaternion::from_euler_angles(r, p, y))
}

fn arb_dt() -> impl Strategy<Value = f64> {
    1e-4..0.1f64
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_mass_round_trip(mass in 1e-3..1e6f64) {
        let mut p = Particle::new();
        p.set_mass(mass);
        prop_assert!((p.mass() - mass).abs() <= mass * 1e-12);

        let mut b = RigidBody::new();
        b.set_mass(mass);
        prop_assert!((b.mass() - mass).abs() <= mass * 1e-12);
    }

    #[test]
    fn proptest_accumulator_cleared(
        force in arb_vector(100.0),
        velocity in arb_vector(10.0),
        dt in arb_dt(),
    ) {
        let mut p = Particle::new().with_velocity(velocity);
        p.add_force(&force);
        p.integrate(dt);
        prop_assert_eq!(p.accumulated_force(), Vector3::zeros());

        let mut b = RigidBody::new().with_linear_velocity(velocity);
        b.add_force_at_point(&force, &Vector3::new(1.0, 0.0, 0.0));
        b.integrate(dt);
        prop_assert_eq!(b.accumulated_force(), Vector3::zeros());
        prop_assert_eq!(b.accumulated_torque(), Vector3::zeros());
    }

    #[test]
    fn proptest_orientation_stays_unit(
        orientation in arb_orientation(),
        spin in arb_vector(20.0),
        torque in arb_vector(5.0),
        dt in arb_dt(),
    ) {
        let mut b = RigidBody::new()
            .with_orientation(orientation)
            .with_angular_velocity(spin);
        b.set_inverse_inertia_tensor(Matrix3::identity()).unwrap();
        for _ in 0..50 {
            b.add_torque(&torque);
            b.integrate(dt);
        }
        prop_assert!((b.orientation().quaternion().norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn proptest_world_inertia_is_symmetric(
        orientation in arb_orientation(),
        diag in prop::array::uniform3(0.1..10.0f64),
    ) {
        let mut b = RigidBody::new().with_orientation(orientation);
        b.set_inertia_tensor(&Matrix3::from_diagonal(&Vector3::from(diag))).unwrap();
        let w = b.inverse_inertia_tensor_world();
        prop_assert!((w - w.transpose()).norm() < 1e-9);
    }

    #[test]
    fn proptest_forces_are_additive(
        fields in prop::collection::vec(arb_vector(50.0), 1..8),
        mass in 0.1..10.0f64,
    ) {
        let mut particles = Arena::new();
        let p = particles.insert(Particle::new().with_mass(mass));

        let mut registry = ParticleForceRegistry::new();
        for field in &fields {
            let id = registry.insert_generator(ConstantAcceleration::new(*field));
            registry.add(id, p).unwrap();
        }
        registry.update_forces(&mut particles, 0.01);

        let expected: Vector3<f64> = fields.iter().map(|a| a * mass).sum();
        let got = particles.get(p).unwrap().accumulated_force();
        prop_assert!((got - expected).norm() <= 1e-9 * (1.0 + expected.norm()));
    }

    #[test]
    fn proptest_local_world_round_trip(
        orientation in arb_orientation(),
        position in arb_vector(100.0),
        point in arb_vector(10.0),
    ) {
        let b = RigidBody::new()
            .with_position(position)
            .with_orientation(orientation);
        let back = b.point_in_local_space(&b.point_in_world_space(&point));
        prop_assert!((back - point).norm() < 1e-9);
    }
}
