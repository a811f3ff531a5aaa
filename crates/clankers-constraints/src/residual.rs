//! Residual providers: task-space error and its Jacobian per variant.
//!
//! Every variant maps a link pose (and its geometric Jacobian) to a
//! 3-vector error. Bounded position and orientation pass that error through
//! per-axis [`Bound`] penalties; equality and linear-system position emit
//! the raw error on constrained dimensions and zero elsewhere.

use std::fmt;

use nalgebra::{Isometry3, Matrix3, Matrix3xX, Matrix6xX, UnitQuaternion, Vector3};
use tracing::{info, warn};

use crate::bound::{Bound, BoundSet};
use crate::config::ConstraintConfig;
use crate::description::{OrientationConstraint, PositionConstraint};
use crate::error::ConfigError;
use crate::extraction::{box_extents, is_unconstrained, orientation_bounds, position_bounds};
use crate::math::{angle_axis, angular_velocity_to_angle_axis, rotation_log, skew};

/// Which task dimensions are equality-constrained, in axis order.
pub type DimensionMask = [bool; 3];

const AXES: [&str; 3] = ["x", "y", "z"];

// ---------------------------------------------------------------------------
// ConstraintKind
// ---------------------------------------------------------------------------

/// The residual variant a constraint evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Link origin inside a box around a target pose.
    BoundedPosition,
    /// Link origin on selected target coordinates exactly.
    EqualityPosition,
    /// Link origin on the line through two points.
    LinearSystemPosition,
    /// Link orientation within per-axis tolerances of a target.
    Orientation,
}

impl ConstraintKind {
    /// Name tag selecting [`EqualityPosition`](Self::EqualityPosition).
    pub const EQUALITY_TAG: &'static str = "use_equality_constraints";
    /// Name tag selecting [`LinearSystemPosition`](Self::LinearSystemPosition).
    pub const LINEAR_SYSTEM_TAG: &'static str = "linear_system_constraints";

    /// Select the position variant for a description's name tag. Unknown
    /// tags select [`BoundedPosition`](Self::BoundedPosition).
    pub fn from_position_tag(tag: &str) -> Self {
        match tag {
            Self::EQUALITY_TAG => Self::EqualityPosition,
            Self::LINEAR_SYSTEM_TAG => Self::LinearSystemPosition,
            _ => Self::BoundedPosition,
        }
    }

    /// Name used in log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BoundedPosition => "bounded_position",
            Self::EqualityPosition => "equality_position",
            Self::LinearSystemPosition => "linear_system_position",
            Self::Orientation => "orientation",
        }
    }

    /// True for every variant except orientation.
    pub const fn is_position(self) -> bool {
        !matches!(self, Self::Orientation)
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Residual
// ---------------------------------------------------------------------------

/// F(q) and dF/dq for one joint configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Residual {
    pub value: Vector3<f64>,
    pub jacobian: Matrix3xX<f64>,
}

// ---------------------------------------------------------------------------
// ResidualModel
// ---------------------------------------------------------------------------

/// Variant data, fixed once the constraint is initialized.
#[derive(Debug, Clone, PartialEq)]
pub enum ResidualModel {
    BoundedPosition {
        bounds: BoundSet,
        target_position: Vector3<f64>,
        target_orientation: UnitQuaternion<f64>,
    },
    EqualityPosition {
        mask: DimensionMask,
        target_position: Vector3<f64>,
        target_orientation: UnitQuaternion<f64>,
    },
    LinearSystemPosition {
        mask: DimensionMask,
        start: Vector3<f64>,
        end: Vector3<f64>,
        target_orientation: UnitQuaternion<f64>,
    },
    Orientation {
        bounds: BoundSet,
        target_orientation: UnitQuaternion<f64>,
    },
}

/// Classify box extents into equality-constrained and free axes.
///
/// Extents below `config.equality_threshold` are constrained. The `-1`
/// sentinel leaves an axis free. An extent thinner than `config.tolerance`
/// could never be satisfied and is rejected.
pub fn classify_dimensions(
    extents: [f64; 3],
    config: &ConstraintConfig,
) -> Result<DimensionMask, ConfigError> {
    let mut mask = [false; 3];
    for (dim, &value) in extents.iter().enumerate() {
        if is_unconstrained(value) {
            continue;
        }
        if value.is_nan() || value < 0.0 {
            return Err(ConfigError::invalid(
                "constraint_region.primitives.dimensions",
                format!("dimension {dim} is {value}"),
            ));
        }
        if value < config.equality_threshold {
            if value < config.tolerance {
                return Err(ConfigError::DimensionBelowTolerance {
                    dim,
                    value,
                    tolerance: config.tolerance,
                    threshold: config.equality_threshold,
                });
            }
            mask[dim] = true;
        }
    }
    Ok(mask)
}

fn first_pose(
    constraint: &PositionConstraint,
) -> Result<(Vector3<f64>, UnitQuaternion<f64>), ConfigError> {
    let pose = constraint
        .constraint_region
        .primitive_poses
        .first()
        .ok_or_else(|| ConfigError::MissingField("constraint_region.primitive_poses".into()))?;
    Ok((pose.translation(), pose.rotation()?))
}

fn log_mask(mask: &DimensionMask) {
    for (axis, constrained) in AXES.iter().zip(mask) {
        info!("{axis} dimension constrained? {constrained}");
    }
    if !mask.iter().any(|&c| c) {
        warn!("No dimension is below the equality threshold; the constraint is always satisfied");
    }
}

impl ResidualModel {
    /// Box around the first primitive pose.
    pub fn bounded_position(constraint: &PositionConstraint) -> Result<Self, ConfigError> {
        info!("Parsing position constraint");
        let bounds = position_bounds(constraint)?;
        for (axis, bound) in AXES.iter().zip(&bounds) {
            info!("Parsed {axis} constraints {bound}");
        }
        let (target_position, target_orientation) = first_pose(constraint)?;
        Ok(Self::BoundedPosition {
            bounds,
            target_position,
            target_orientation,
        })
    }

    /// Exact position on the thin axes of the first primitive.
    pub fn equality_position(
        constraint: &PositionConstraint,
        config: &ConstraintConfig,
    ) -> Result<Self, ConfigError> {
        info!("Parsing equality position constraint");
        let mask = classify_dimensions(box_extents(constraint)?, config)?;
        log_mask(&mask);
        let (target_position, target_orientation) = first_pose(constraint)?;
        Ok(Self::EqualityPosition {
            mask,
            target_position,
            target_orientation,
        })
    }

    /// Line from the first to the second primitive pose, expressed in the
    /// first pose's orientation.
    pub fn linear_system(
        constraint: &PositionConstraint,
        config: &ConstraintConfig,
    ) -> Result<Self, ConfigError> {
        info!("Parsing linear system position constraint");
        let mask = classify_dimensions(box_extents(constraint)?, config)?;
        log_mask(&mask);
        let (start, target_orientation) = first_pose(constraint)?;
        let end = constraint
            .constraint_region
            .primitive_poses
            .get(1)
            .ok_or_else(|| ConfigError::MissingField("constraint_region.primitive_poses[1]".into()))?
            .translation();
        if (end - start).norm() < config.tolerance {
            return Err(ConfigError::DegenerateLine);
        }
        Ok(Self::LinearSystemPosition {
            mask,
            start,
            end,
            target_orientation,
        })
    }

    /// Per-axis tolerances around a target orientation.
    pub fn orientation(constraint: &OrientationConstraint) -> Result<Self, ConfigError> {
        info!("Parsing orientation constraint");
        let bounds = orientation_bounds(constraint)?;
        for (axis, bound) in ["rx / roll", "ry / pitch", "rz / yaw"].iter().zip(&bounds) {
            info!("Parsed {axis} constraints {bound}");
        }
        Ok(Self::Orientation {
            bounds,
            target_orientation: constraint.rotation()?,
        })
    }

    /// Variant this model implements.
    pub const fn kind(&self) -> ConstraintKind {
        match self {
            Self::BoundedPosition { .. } => ConstraintKind::BoundedPosition,
            Self::EqualityPosition { .. } => ConstraintKind::EqualityPosition,
            Self::LinearSystemPosition { .. } => ConstraintKind::LinearSystemPosition,
            Self::Orientation { .. } => ConstraintKind::Orientation,
        }
    }

    /// Per-axis bounds of the penalty-composed variants.
    pub const fn bounds(&self) -> Option<&BoundSet> {
        match self {
            Self::BoundedPosition { bounds, .. } | Self::Orientation { bounds, .. } => Some(bounds),
            Self::EqualityPosition { .. } | Self::LinearSystemPosition { .. } => None,
        }
    }

    /// Constrained-axis mask of the equality-style variants.
    pub const fn dimension_mask(&self) -> Option<&DimensionMask> {
        match self {
            Self::EqualityPosition { mask, .. } | Self::LinearSystemPosition { mask, .. } => {
                Some(mask)
            }
            Self::BoundedPosition { .. } | Self::Orientation { .. } => None,
        }
    }

    /// Rotation of the target frame.
    pub const fn target_orientation(&self) -> &UnitQuaternion<f64> {
        match self {
            Self::BoundedPosition {
                target_orientation, ..
            }
            | Self::EqualityPosition {
                target_orientation, ..
            }
            | Self::LinearSystemPosition {
                target_orientation, ..
            }
            | Self::Orientation {
                target_orientation, ..
            } => target_orientation,
        }
    }

    /// Target point of the point-position variants; line start for the
    /// linear-system variant.
    pub const fn target_position(&self) -> Option<&Vector3<f64>> {
        match self {
            Self::BoundedPosition {
                target_position, ..
            }
            | Self::EqualityPosition {
                target_position, ..
            } => Some(target_position),
            Self::LinearSystemPosition { start, .. } => Some(start),
            Self::Orientation { .. } => None,
        }
    }

    /// Start and end of the linear-system variant's line.
    pub const fn line(&self) -> Option<(&Vector3<f64>, &Vector3<f64>)> {
        match self {
            Self::LinearSystemPosition { start, end, .. } => Some((start, end)),
            _ => None,
        }
    }

    /// Task error before any penalty or masking.
    ///
    /// Point variants: link origin offset from the target in the target
    /// frame. Line variant: `d × v` with `d` the unit line direction and `v`
    /// the offset from the line start, both in the target frame; its norm is
    /// the distance to the line. Orientation:
    /// exponential coordinates of `R_actualᵀ · R_target`.
    pub fn error(&self, pose: &Isometry3<f64>) -> Vector3<f64> {
        match self {
            Self::BoundedPosition {
                target_position,
                target_orientation,
                ..
            }
            | Self::EqualityPosition {
                target_position,
                target_orientation,
                ..
            } => target_orientation
                .inverse_transform_vector(&(pose.translation.vector - target_position)),
            Self::LinearSystemPosition {
                start,
                end,
                target_orientation,
                ..
            } => {
                let direction = line_direction(start, end, target_orientation);
                let offset =
                    target_orientation.inverse_transform_vector(&(pose.translation.vector - start));
                direction.cross(&offset)
            }
            Self::Orientation {
                target_orientation, ..
            } => rotation_log(&(pose.rotation.inverse() * target_orientation)),
        }
    }

    /// Jacobian of [`error`](Self::error) with respect to joint values.
    pub fn error_jacobian(&self, pose: &Isometry3<f64>, jacobian: &Matrix6xX<f64>) -> Matrix3xX<f64> {
        let linear = jacobian.fixed_rows::<3>(0);
        match self {
            Self::BoundedPosition {
                target_orientation, ..
            }
            | Self::EqualityPosition {
                target_orientation, ..
            } => frame_transpose(target_orientation) * linear,
            Self::LinearSystemPosition {
                start,
                end,
                target_orientation,
                ..
            } => {
                // d(d × v)/dp = skew(d) · Rᵀ
                let direction = line_direction(start, end, target_orientation);
                skew(&direction) * frame_transpose(target_orientation) * linear
            }
            Self::Orientation {
                target_orientation, ..
            } => {
                // Rotating the link by ω (base frame) perturbs R_err on the
                // left by −R_actualᵀ·ω.
                let difference = pose.rotation.inverse() * target_orientation;
                let operator = match angle_axis(&difference) {
                    (angle, Some(axis)) => angular_velocity_to_angle_axis(angle, &axis),
                    (_, None) => Matrix3::identity(),
                };
                -(operator * frame_transpose(&pose.rotation)) * jacobian.fixed_rows::<3>(3)
            }
        }
    }

    /// F(q) from the task error.
    pub fn residual(&self, error: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::BoundedPosition { bounds, .. } | Self::Orientation { bounds, .. } => {
                Vector3::from_fn(|i, _| bounds[i].penalty(error[i]))
            }
            Self::EqualityPosition { mask, .. } => {
                Vector3::from_fn(|i, _| if mask[i] { error[i] } else { 0.0 })
            }
            Self::LinearSystemPosition { mask, .. } => {
                Vector3::from_fn(|i, _| if row_active(mask, i) { error[i] } else { 0.0 })
            }
        }
    }

    /// dF/dq from the task error and its Jacobian.
    pub fn residual_jacobian(
        &self,
        error: &Vector3<f64>,
        mut error_jacobian: Matrix3xX<f64>,
    ) -> Matrix3xX<f64> {
        for i in 0..3 {
            let active = match self {
                Self::BoundedPosition { .. } | Self::Orientation { .. } => true,
                Self::EqualityPosition { mask, .. } => mask[i],
                Self::LinearSystemPosition { mask, .. } => row_active(mask, i),
            };
            let factor = match self.bounds() {
                Some(bounds) => bounds[i].derivative(error[i]),
                None => 1.0,
            };
            if !active || factor == 0.0 {
                error_jacobian.row_mut(i).fill(0.0);
            } else {
                error_jacobian.row_mut(i).scale_mut(factor);
            }
        }
        error_jacobian
    }
}

/// Row `i` of the line residual pairs the two axes other than `i`; it is
/// active when either of them is constrained.
const fn row_active(mask: &DimensionMask, i: usize) -> bool {
    mask[(i + 1) % 3] || mask[(i + 2) % 3]
}

/// Unit direction `start → end` in the target frame. Init rejects lines
/// shorter than the tolerance.
fn line_direction(
    start: &Vector3<f64>,
    end: &Vector3<f64>,
    target_orientation: &UnitQuaternion<f64>,
) -> Vector3<f64> {
    target_orientation.inverse_transform_vector(&(end - start)).normalize()
}

/// `Rᵀ` as a matrix.
fn frame_transpose(rotation: &UnitQuaternion<f64>) -> Matrix3<f64> {
    rotation.to_rotation_matrix().into_inner().transpose()
}

impl fmt::Display for ResidualModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        if let Some(bounds) = self.bounds() {
            let [x, y, z]: &[Bound; 3] = bounds;
            write!(f, " [{x}; {y}; {z}]")?;
        }
        if let Some(mask) = self.dimension_mask() {
            write!(f, " mask {mask:?}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
