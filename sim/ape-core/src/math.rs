//! Math helpers on top of nalgebra's value types.
//!
//! nalgebra already provides the vector algebra (add, scale, cross, norm,
//! normalize) and 3x3 inversion. This module adds the handful of operations
//! the integrators need in a specific form:
//!
//! - [`QuaternionExt::add_scaled_vector`] - first-order orientation update
//! - [`transform_matrix`] - body → world affine map from position + orientation
//! - [`transform_point`] / [`transform_inverse_point`] - apply that map both ways
//! - [`transform_inertia_tensor`] - `R · I⁻¹ · Rᵗ` written out term by term
//!
//! # Mutation contract
//!
//! Every function here returns a new value and leaves its arguments alone.
//! Bodies are the only things that mutate state, and only their own fields.

use nalgebra::{Matrix3, Matrix4, Quaternion, UnitQuaternion, Vector3};

/// Orientation update from an angular velocity.
pub trait QuaternionExt {
    /// Rotate by `vector * scale` using the first-order approximation
    /// `q' = q + ½ · (0, vector·scale) · q`.
    ///
    /// The result is **not** normalized; callers renormalize once all updates
    /// for the tick are applied. Valid for small `|vector| · scale`.
    #[must_use]
    fn add_scaled_vector(&self, vector: &Vector3<f64>, scale: f64) -> Quaternion<f64>;
}

impl QuaternionExt for Quaternion<f64> {
    fn add_scaled_vector(&self, vector: &Vector3<f64>, scale: f64) -> Quaternion<f64> {
        let q = *self;
        let spin = Quaternion::from_parts(0.0, vector * scale);
        q + spin * q * 0.5
    }
}

impl QuaternionExt for UnitQuaternion<f64> {
    fn add_scaled_vector(&self, vector: &Vector3<f64>, scale: f64) -> Quaternion<f64> {
        self.quaternion().add_scaled_vector(vector, scale)
    }
}

/// Rotation matrix of a unit quaternion.
///
/// Diagonal terms are `1 - 2(y² + z²)` and so on; this matches
/// `UnitQuaternion::to_rotation_matrix` but is spelled out so the transform
/// below can reuse it without an intermediate `Rotation3`.
#[must_use]
pub fn rotation_matrix(q: &UnitQuaternion<f64>) -> Matrix3<f64> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    Matrix3::new(
        1.0 - 2.0 * (y * y + z * z),
        2.0 * (x * y - z * w),
        2.0 * (x * z + y * w),
        2.0 * (x * y + z * w),
        1.0 - 2.0 * (x * x + z * z),
        2.0 * (y * z - x * w),
        2.0 * (x * z - y * w),
        2.0 * (y * z + x * w),
        1.0 - 2.0 * (x * x + y * y),
    )
}

/// Affine body → world transform: rotation block from `orientation`,
/// translation column from `position`, bottom row `(0, 0, 0, 1)`.
#[must_use]
#[rustfmt::skip]
pub fn transform_matrix(position: &Vector3<f64>, orientation: &UnitQuaternion<f64>) -> Matrix4<f64> {
    let r = rotation_matrix(orientation);
    Matrix4::new(
        r[(0, 0)], r[(0, 1)], r[(0, 2)], position.x,
        r[(1, 0)], r[(1, 1)], r[(1, 2)], position.y,
        r[(2, 0)], r[(2, 1)], r[(2, 2)], position.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Upper-left 3x3 block of an affine transform.
#[must_use]
pub fn rotation_block(transform: &Matrix4<f64>) -> Matrix3<f64> {
    Matrix3::from_fn(|r, c| transform[(r, c)])
}

/// Translation column of an affine transform.
#[must_use]
pub fn translation(transform: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)])
}

/// Apply an affine transform to a point.
#[must_use]
pub fn transform_point(transform: &Matrix4<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    rotation_block(transform) * point + translation(transform)
}

/// Apply the inverse of a rigid affine transform to a point.
///
/// Uses `Rᵗ (p - t)`, which is only the inverse when the rotation block is
/// orthonormal; that holds for every transform built by [`transform_matrix`].
#[must_use]
pub fn transform_inverse_point(transform: &Matrix4<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    rotation_block(transform).transpose() * (point - translation(transform))
}

/// Rotate a direction (no translation).
#[must_use]
pub fn transform_direction(transform: &Matrix4<f64>, direction: &Vector3<f64>) -> Vector3<f64> {
    rotation_block(transform) * direction
}

/// Inverse-rotate a direction (no translation).
#[must_use]
pub fn transform_inverse_direction(
    transform: &Matrix4<f64>,
    direction: &Vector3<f64>,
) -> Vector3<f64> {
    rotation_block(transform).transpose() * direction
}

/// Inverse of a rigid affine transform, built as `[Rᵗ | -Rᵗ t]`.
#[must_use]
#[rustfmt::skip]
pub fn affine_inverse(transform: &Matrix4<f64>) -> Matrix4<f64> {
    let rt = rotation_block(transform).transpose();
    let t = -(rt * translation(transform));
    Matrix4::new(
        rt[(0, 0)], rt[(0, 1)], rt[(0, 2)], t.x,
        rt[(1, 0)], rt[(1, 1)], rt[(1, 2)], t.y,
        rt[(2, 0)], rt[(2, 1)], rt[(2, 2)], t.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Similarity transform of a body-space inverse inertia tensor into world
/// space: `R · iit_body · Rᵗ`.
///
/// Written as two explicit 3x3 products so the conjugation is visible and no
/// temporaries beyond `R · iit_body` are needed.
#[must_use]
pub fn transform_inertia_tensor(iit_body: &Matrix3<f64>, rotation: &Matrix3<f64>) -> Matrix3<f64> {
    // t = R · iit_body
    let t = Matrix3::from_fn(|r, c| {
        rotation[(r, 0)] * iit_body[(0, c)]
            + rotation[(r, 1)] * iit_body[(1, c)]
            + rotation[(r, 2)] * iit_body[(2, c)]
    });

    // t · Rᵗ
    Matrix3::from_fn(|r, c| {
        t[(r, 0)] * rotation[(c, 0)] + t[(r, 1)] * rotation[(c, 1)] + t[(r, 2)] * rotation[(c, 2)]
    })
}
