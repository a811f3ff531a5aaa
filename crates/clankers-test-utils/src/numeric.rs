//! Numerical differentiation for checking analytic Jacobians.

use nalgebra::{Matrix3xX, Vector3};

/// Central-difference Jacobian of `f` at `q` with step `h`.
pub fn finite_difference_jacobian<F>(mut f: F, q: &[f64], h: f64) -> Matrix3xX<f64>
where
    F: FnMut(&[f64]) -> Vector3<f64>,
{
    let mut jacobian = Matrix3xX::zeros(q.len());
    let mut shifted = q.to_vec();
    for j in 0..q.len() {
        shifted[j] = q[j] + h;
        let plus = f(&shifted);
        shifted[j] = q[j] - h;
        let minus = f(&shifted);
        shifted[j] = q[j];
        jacobian.set_column(j, &((plus - minus) / (2.0 * h)));
    }
    jacobian
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_linear_map() {
        let f = |q: &[f64]| Vector3::new(2.0 * q[0] - q[1], q[1] * 3.0, q[0] + q[1]);
        let jac = finite_difference_jacobian(f, &[0.3, -0.7], 1e-6);
        let expected = Matrix3xX::from_columns(&[
            Vector3::new(2.0, 0.0, 1.0),
            Vector3::new(-1.0, 3.0, 1.0),
        ]);
        assert_relative_eq!(jac, expected, epsilon = 1e-8);
    }
}
