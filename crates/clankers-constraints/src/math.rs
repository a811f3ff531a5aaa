//! Rotation helpers for exponential-coordinate orientation errors.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Below this angle the `C / θ²` coefficient switches to its series
/// expansion.
const SMALL_ANGLE: f64 = 1e-2;

/// Skew-symmetric cross-product matrix: `skew(a) * b == a.cross(&b)`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Rotation angle in `[0, π]` and unit axis of `rotation`.
///
/// The axis is `None` for the identity rotation.
pub fn angle_axis(rotation: &UnitQuaternion<f64>) -> (f64, Option<Vector3<f64>>) {
    let q = rotation.quaternion();
    let imag = q.imag();
    let sin_half = imag.norm();
    if sin_half == 0.0 {
        return (0.0, None);
    }
    // atan2 stays accurate for tiny angles where acos(w) would not.
    let angle = 2.0 * sin_half.atan2(q.w.abs());
    let axis = imag / sin_half * q.w.signum();
    (angle, Some(axis))
}

/// Exponential coordinates `θ·â` of `rotation`.
pub fn rotation_log(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    match angle_axis(rotation) {
        (angle, Some(axis)) => axis * angle,
        (_, None) => Vector3::zeros(),
    }
}

/// Linear map from an angular velocity perturbing a rotation on the left to
/// the rate of change of its exponential coordinates `θ·â`:
///
/// ```text
/// E = I − ½·skew(θâ) + skew(θâ)²·C/θ²,   C = 1 − ½θ·sinθ / (1 − cosθ)
/// ```
///
/// `E` tends to the identity as θ → 0.
pub fn angular_velocity_to_angle_axis(angle: f64, axis: &Vector3<f64>) -> Matrix3<f64> {
    let t = angle.abs();
    let r_skew = skew(&(axis * angle));
    let coefficient = if t < SMALL_ANGLE {
        1.0 / 12.0 + t * t / 720.0
    } else {
        (1.0 - 0.5 * t * t.sin() / (1.0 - t.cos())) / (t * t)
    };
    Matrix3::identity() - 0.5 * r_skew + r_skew * r_skew * coefficient
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
