//! Six-degree-of-freedom rigid body and its integrator.
//!
//! A [`RigidBody`] keeps two kinds of state:
//!
//! - **Primary**: position, orientation, velocities, mass, body-space inverse
//!   inertia, the constant acceleration and the per-tick accumulators.
//! - **Derived**: the body → world transform and the world-space inverse
//!   inertia tensor. These are recomputed from the primary state by
//!   [`RigidBody::calculate_derived_data`] and are never written directly.
//!
//! Every setter that touches position or orientation re-derives immediately,
//! so the derived data is consistent with the pose at all times.

use ape_types::{ApeError, Pose};
use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

use crate::math::{
    self, transform_direction, transform_inertia_tensor, transform_inverse_direction,
    transform_inverse_point, transform_point, QuaternionExt,
};
use crate::particle::INFINITE_MASS_THRESHOLD;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rigid body in world space.
///
/// # Example
///
/// ```
/// use ape_core::RigidBody;
/// use nalgebra::{Matrix3, Vector3};
///
/// let mut body = RigidBody::new();
/// body.set_inertia_tensor(&Matrix3::identity()).unwrap();
/// body.set_damping(1.0, 1.0);
///
/// body.add_torque(&Vector3::new(0.0, 0.0, 1.0));
/// body.integrate(1.0);
///
/// assert!((body.angular_velocity().z - 1.0).abs() < 1e-12);
/// assert!((body.orientation().norm() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    position: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
    linear_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    /// Constant world-space acceleration (gravity and the like), never cleared.
    pub acceleration: Vector3<f64>,
    inverse_mass: f64,
    inverse_inertia_tensor: Matrix3<f64>,
    linear_damping: f64,
    angular_damping: f64,

    // Derived from position and orientation.
    inverse_inertia_tensor_world: Matrix3<f64>,
    transform_matrix: Matrix4<f64>,

    accumulated_force: Vector3<f64>,
    accumulated_torque: Vector3<f64>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Body at the origin, identity orientation, at rest, unit mass.
    ///
    /// The inverse inertia tensor starts at zero (the body does not respond to
    /// torque) until [`Self::set_inertia_tensor`] is called. Damping defaults
    /// to 0.9 for both linear and angular motion.
    #[must_use]
    pub fn new() -> Self {
        let mut body = Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            inverse_mass: 1.0,
            inverse_inertia_tensor: Matrix3::zeros(),
            linear_damping: 0.9,
            angular_damping: 0.9,
            inverse_inertia_tensor_world: Matrix3::zeros(),
            transform_matrix: Matrix4::identity(),
            accumulated_force: Vector3::zeros(),
            accumulated_torque: Vector3::zeros(),
        };
        body.calculate_derived_data();
        body
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.set_position(position);
        self
    }

    /// Set the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.set_orientation(orientation);
        self
    }

    /// Set the linear velocity.
    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the angular velocity.
    #[must_use]
    pub fn with_angular_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Set the mass. Panics under the same conditions as [`Self::set_mass`].
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.set_mass(mass);
        self
    }

    /// Set both damping coefficients. Panics under the same conditions as
    /// [`Self::set_damping`].
    #[must_use]
    pub fn with_damping(mut self, linear: f64, angular: f64) -> Self {
        self.set_damping(linear, angular);
        self
    }

    // =========================================================================
    // Mass and inertia
    // =========================================================================

    /// Set the mass.
    ///
    /// # Panics
    ///
    /// If `mass` is zero, negative or `NaN`.
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

    /// Set the inverse mass directly.
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

    /// Whether forces can move this body.
    #[must_use]
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass >= INFINITE_MASS_THRESHOLD
    }

    /// Set the body-space inertia tensor.
    ///
    /// The inverse is stored and the world-space inverse re-derived. On error
    /// the body is left untouched.
    ///
    /// # Errors
    ///
    /// [`ApeError::SingularInertiaTensor`] if the tensor has non-finite
    /// entries or no inverse.
    pub fn set_inertia_tensor(&mut self, inertia_tensor: &Matrix3<f64>) -> ape_types::Result<()> {
        if !inertia_tensor.iter().all(|x| x.is_finite()) {
            return Err(ApeError::SingularInertiaTensor);
        }
        let inverse = inertia_tensor
            .try_inverse()
            .filter(|m| m.iter().all(|x| x.is_finite()))
            .ok_or(ApeError::SingularInertiaTensor)?;

        self.inverse_inertia_tensor = inverse;
        self.calculate_derived_data();
        Ok(())
    }

    /// Set the body-space inverse inertia tensor directly.
    ///
    /// A zero matrix is allowed and means the body ignores torque. On error
    /// the body is left untouched.
    ///
    /// # Errors
    ///
    /// [`ApeError::SingularInertiaTensor`] if any entry is not finite.
    pub fn set_inverse_inertia_tensor(
        &mut self,
        inverse_inertia_tensor: Matrix3<f64>,
    ) -> ape_types::Result<()> {
        if !inverse_inertia_tensor.iter().all(|x| x.is_finite()) {
            return Err(ApeError::SingularInertiaTensor);
        }
        self.inverse_inertia_tensor = inverse_inertia_tensor;
        self.calculate_derived_data();
        Ok(())
    }

    /// Body-space inertia tensor, if the stored inverse is invertible.
    #[must_use]
    pub fn inertia_tensor(&self) -> Option<Matrix3<f64>> {
        self.inverse_inertia_tensor.try_inverse()
    }

    /// Body-space inverse inertia tensor.
    #[must_use]
    pub fn inverse_inertia_tensor(&self) -> &Matrix3<f64> {
        &self.inverse_inertia_tensor
    }

    /// World-space inverse inertia tensor (derived).
    #[must_use]
    pub fn inverse_inertia_tensor_world(&self) -> &Matrix3<f64> {
        &self.inverse_inertia_tensor_world
    }

    // =========================================================================
    // Pose and velocity
    // =========================================================================

    /// Position of the center of mass in world space.
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Move the body; re-derives the transform.
    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
        self.calculate_derived_data();
    }

    /// Orientation in world space.
    #[must_use]
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    /// Rotate the body; re-derives the transform and world inertia.
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.orientation = orientation;
        self.calculate_derived_data();
    }

    /// Position and orientation snapshot.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    /// Linear velocity in world space.
    #[must_use]
    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    /// Set the linear velocity.
    pub fn set_linear_velocity(&mut self, velocity: Vector3<f64>) {
        self.linear_velocity = velocity;
    }

    /// Angular velocity in world space.
    #[must_use]
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Set the angular velocity.
    pub fn set_angular_velocity(&mut self, velocity: Vector3<f64>) {
        self.angular_velocity = velocity;
    }

    /// Velocity of a world-space point rigidly attached to the body.
    #[must_use]
    pub fn velocity_at_point(&self, world_point: &Vector3<f64>) -> Vector3<f64> {
        self.linear_velocity + self.angular_velocity.cross(&(world_point - self.position))
    }

    /// Set the fraction of linear and angular velocity kept per second.
    ///
    /// # Panics
    ///
    /// If either value is outside `(0, 1]` or `NaN`.
    pub fn set_damping(&mut self, linear: f64, angular: f64) {
        for damping in [linear, angular] {
            assert!(
                damping > 0.0 && damping <= 1.0,
                "{}",
                ApeError::InvalidDamping(damping)
            );
        }
        self.linear_damping = linear;
        self.angular_damping = angular;
    }

    /// Linear damping factor.
    #[must_use]
    pub fn linear_damping(&self) -> f64 {
        self.linear_damping
    }

    /// Angular damping factor.
    #[must_use]
    pub fn angular_damping(&self) -> f64 {
        self.angular_damping
    }

    /// Body → world transform (derived).
    #[must_use]
    pub fn transform_matrix(&self) -> &Matrix4<f64> {
        &self.transform_matrix
    }

    // =========================================================================
    // Space conversion
    // =========================================================================

    /// Convert a body-space point to world space.
    #[must_use]
    pub fn point_in_world_space(&self, point: &Vector3<f64>) -> Vector3<f64> {
        transform_point(&self.transform_matrix, point)
    }

    /// Convert a world-space point to body space.
    #[must_use]
    pub fn point_in_local_space(&self, point: &Vector3<f64>) -> Vector3<f64> {
        transform_inverse_point(&self.transform_matrix, point)
    }

    /// Rotate a body-space direction into world space.
    #[must_use]
    pub fn direction_in_world_space(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        transform_direction(&self.transform_matrix, direction)
    }

    /// Rotate a world-space direction into body space.
    #[must_use]
    pub fn direction_in_local_space(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        transform_inverse_direction(&self.transform_matrix, direction)
    }

    // =========================================================================
    // Force application
    // =========================================================================

    /// Add a world-space force through the center of mass (no torque).
    pub fn add_force(&mut self, force: &Vector3<f64>) {
        self.accumulated_force += force;
    }

    /// Add a world-space torque.
    pub fn add_torque(&mut self, torque: &Vector3<f64>) {
        self.accumulated_torque += torque;
    }

    /// Add a world-space force applied at a world-space point.
    ///
    /// Contributes `(point - position) × force` to the torque accumulator.
    pub fn add_force_at_point(&mut self, force: &Vector3<f64>, point: &Vector3<f64>) {
        let arm = point - self.position;
        self.accumulated_force += force;
        self.accumulated_torque += arm.cross(force);
    }

    /// Add a world-space force applied at a body-space point.
    pub fn add_force_at_body_point(&mut self, force: &Vector3<f64>, point: &Vector3<f64>) {
        let world_point = self.point_in_world_space(point);
        self.add_force_at_point(force, &world_point);
    }

    /// Force accumulated so far this tick.
    #[must_use]
    pub fn accumulated_force(&self) -> Vector3<f64> {
        self.accumulated_force
    }

    /// Torque accumulated so far this tick.
    #[must_use]
    pub fn accumulated_torque(&self) -> Vector3<f64> {
        self.accumulated_torque
    }

    /// Zero both accumulators.
    pub fn clear_accumulators(&mut self) {
        self.accumulated_force = Vector3::zeros();
        self.accumulated_torque = Vector3::zeros();
    }

    // =========================================================================
    // Integration
    // =========================================================================

    /// Advance the body by `dt`.
    ///
    /// Velocities are updated first and damped, then the pose is moved with
    /// the new velocities. Derived data is refreshed and the accumulators are
    /// cleared before returning.
    ///
    /// # Panics
    ///
    /// If `dt` is not strictly positive.
    pub fn integrate(&mut self, dt: f64) {
        assert!(dt > 0.0, "{}", ApeError::InvalidTimestep(dt));

        let linear_acceleration = self.acceleration + self.accumulated_force * self.inverse_mass;
        let angular_acceleration = self.inverse_inertia_tensor_world * self.accumulated_torque;

        self.linear_velocity += linear_acceleration * dt;
        self.angular_velocity += angular_acceleration * dt;

        self.linear_velocity *= self.linear_damping.powf(dt);
        self.angular_velocity *= self.angular_damping.powf(dt);

        self.position += self.linear_velocity * dt + self.acceleration * (0.5 * dt * dt);

        // Not unit length until calculate_derived_data renormalizes it.
        self.orientation = UnitQuaternion::new_unchecked(
            self.orientation.add_scaled_vector(&self.angular_velocity, dt),
        );

        self.calculate_derived_data();
        self.clear_accumulators();
    }

    /// Renormalize the orientation and rebuild the transform and world-space
    /// inverse inertia tensor from the current pose.
    pub fn calculate_derived_data(&mut self) {
        self.orientation.renormalize();
        self.transform_matrix = math::transform_matrix(&self.position, &self.orientation);
        self.inverse_inertia_tensor_world = transform_inertia_tensor(
            &self.inverse_inertia_tensor,
            &math::rotation_block(&self.transform_matrix),
        );
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Kinetic energy (linear + rotational). Zero for an immovable body.
    ///
    /// The rotational term is skipped when the inertia tensor cannot be
    /// recovered from its stored inverse.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        if !self.has_finite_mass() {
            return 0.0;
        }
        let linear = 0.5 * self.mass() * self.linear_velocity.norm_squared();
        let angular = self
            .inverse_inertia_tensor_world
            .try_inverse()
            .map_or(0.0, |inertia| {
                0.5 * self.angular_velocity.dot(&(inertia * self.angular_velocity))
            });
        linear + angular
    }

    /// Check if the body contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pose().is_finite()
            && self.linear_velocity.iter().all(|x| x.is_finite())
            && self.angular_velocity.iter().all(|x| x.is_finite())
    }
}
