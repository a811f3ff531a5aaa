//! Scalar two-sided bounds and their penalty functions.

use std::fmt;

use crate::error::ConfigError;

/// A closed interval `[lower, upper]` on one constrained task dimension.
///
/// Infinite ends denote an unconstrained side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    lower: f64,
    upper: f64,
}

/// One bound per task dimension, in axis order.
pub type BoundSet = [Bound; 3];

impl Bound {
    /// Create a bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBound`] if `lower > upper` or either
    /// end is NaN.
    pub fn new(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ConfigError::InvalidBound { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Symmetric bound `[-half_width, half_width]`.
    pub fn symmetric(half_width: f64) -> Result<Self, ConfigError> {
        Self::new(-half_width, half_width)
    }

    /// The bound `(-inf, inf)`.
    pub const fn unbounded() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    /// Lower end, `-inf` when unconstrained below.
    pub const fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper end, `inf` when unconstrained above.
    pub const fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether `value` lies inside the bound, boundary included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Whether both ends are infinite.
    pub fn is_unbounded(&self) -> bool {
        self.lower == f64::NEG_INFINITY && self.upper == f64::INFINITY
    }

    /// Distance of `value` outside the bound, zero inside.
    ///
    /// ```text
    /// (penalty) ^
    ///           | \         /
    ///           |  \       /
    ///           |   \_____/
    ///           |----------------> value
    /// ```
    ///
    /// Not differentiable at `lower` and `upper`.
    pub fn penalty(&self, value: f64) -> f64 {
        if self.contains(value) {
            0.0
        } else if value < self.lower {
            self.lower - value
        } else {
            value - self.upper
        }
    }

    /// Subgradient of [`penalty`](Self::penalty): -1 below, +1 above, 0
    /// inside including the boundary.
    pub fn derivative(&self, value: f64) -> f64 {
        if self.contains(value) {
            0.0
        } else if value < self.lower {
            -1.0
        } else {
            1.0
        }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounds: ({}, {})", self.lower, self.upper)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
