//! Constraint description records consumed by the factory.
//!
//! These mirror the planning-request constraint message: position entries
//! with a bounding region, orientation entries with per-axis tolerances, and
//! a free-text name tag used for variant selection. Quaternions are stored
//! as `[x, y, z, w]`.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Position plus `[x, y, z, w]` quaternion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: default_orientation(),
        }
    }
}

impl Pose {
    pub const fn new(position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose with identity orientation.
    pub const fn from_position(position: [f64; 3]) -> Self {
        Self::new(position, default_orientation())
    }

    pub fn translation(&self) -> Vector3<f64> {
        Vector3::from(self.position)
    }

    /// Normalized orientation.
    pub fn rotation(&self) -> Result<UnitQuaternion<f64>, ConfigError> {
        quaternion_from_xyzw(self.orientation, "orientation")
    }
}

/// Normalize an `[x, y, z, w]` quaternion, rejecting zero or non-finite
/// input.
pub(crate) fn quaternion_from_xyzw(
    xyzw: [f64; 4],
    field: &str,
) -> Result<UnitQuaternion<f64>, ConfigError> {
    let [x, y, z, w] = xyzw;
    let q = Quaternion::new(w, x, y, z);
    let norm = q.norm();
    if !norm.is_finite() || norm < 1e-12 {
        return Err(ConfigError::invalid(
            field,
            format!("quaternion {xyzw:?} cannot be normalized"),
        ));
    }
    Ok(UnitQuaternion::from_quaternion(q))
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// Shape of a solid primitive. Only boxes carry per-axis extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    #[default]
    Box,
    Sphere,
    Cylinder,
    Cone,
}

/// A solid primitive and its dimension list. For a box, the dimensions are
/// the full extents along x, y and z; `-1` marks an unconstrained axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidPrimitive {
    #[serde(default)]
    pub kind: PrimitiveKind,
    pub dimensions: Vec<f64>,
}

impl SolidPrimitive {
    pub fn boxed(dimensions: [f64; 3]) -> Self {
        Self {
            kind: PrimitiveKind::Box,
            dimensions: dimensions.to_vec(),
        }
    }
}

/// Region made of primitives, each placed by the pose at the same index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    #[serde(default)]
    pub primitives: Vec<SolidPrimitive>,
    #[serde(default)]
    pub primitive_poses: Vec<Pose>,
}

// ---------------------------------------------------------------------------
// Constraint entries
// ---------------------------------------------------------------------------

/// Keep the origin of `link_name` inside `constraint_region`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConstraint {
    pub link_name: String,
    pub constraint_region: BoundingVolume,
}

impl PositionConstraint {
    /// A single box of full extents `dimensions`, centred and oriented by
    /// `pose`.
    pub fn box_region(link_name: impl Into<String>, dimensions: [f64; 3], pose: Pose) -> Self {
        Self {
            link_name: link_name.into(),
            constraint_region: BoundingVolume {
                primitives: vec![SolidPrimitive::boxed(dimensions)],
                primitive_poses: vec![pose],
            },
        }
    }

    /// A line from `start` to `end`. The box `dimensions` classify which
    /// axes are constrained; `orientation` is the frame the line residual
    /// is expressed in.
    pub fn line(
        link_name: impl Into<String>,
        dimensions: [f64; 3],
        start: [f64; 3],
        end: [f64; 3],
        orientation: [f64; 4],
    ) -> Self {
        Self {
            link_name: link_name.into(),
            constraint_region: BoundingVolume {
                primitives: vec![SolidPrimitive::boxed(dimensions)],
                primitive_poses: vec![Pose::new(start, orientation), Pose::new(end, orientation)],
            },
        }
    }
}

/// Keep the orientation of `link_name` within per-axis tolerances of
/// `orientation`. A tolerance of `-1` leaves that axis free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationConstraint {
    pub link_name: String,
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 4],
    pub absolute_x_axis_tolerance: f64,
    pub absolute_y_axis_tolerance: f64,
    pub absolute_z_axis_tolerance: f64,
}

impl OrientationConstraint {
    pub fn new(link_name: impl Into<String>, orientation: [f64; 4], tolerances: [f64; 3]) -> Self {
        Self {
            link_name: link_name.into(),
            orientation,
            absolute_x_axis_tolerance: tolerances[0],
            absolute_y_axis_tolerance: tolerances[1],
            absolute_z_axis_tolerance: tolerances[2],
        }
    }

    pub const fn tolerances(&self) -> [f64; 3] {
        [
            self.absolute_x_axis_tolerance,
            self.absolute_y_axis_tolerance,
            self.absolute_z_axis_tolerance,
        ]
    }

    pub fn rotation(&self) -> Result<UnitQuaternion<f64>, ConfigError> {
        quaternion_from_xyzw(self.orientation, "orientation")
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// A full constraint description from a planning request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Free-text tag; selects the position variant.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position_constraints: Vec<PositionConstraint>,
    #[serde(default)]
    pub orientation_constraints: Vec<OrientationConstraint>,
}

impl Constraints {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_position(mut self, constraint: PositionConstraint) -> Self {
        self.position_constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, constraint: OrientationConstraint) -> Self {
        self.orientation_constraints.push(constraint);
        self
    }

    /// Whether neither constraint list has an entry.
    pub fn is_empty(&self) -> bool {
        self.position_constraints.is_empty() && self.orientation_constraints.is_empty()
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quaternion_is_normalized() {
        let pose = Pose::new([0.0; 3], [0.0, 0.0, 2.0, 2.0]);
        let q = pose.rotation().unwrap();
        assert_relative_eq!(q.angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn zero_quaternion_rejected() {
        let pose = Pose::new([0.0; 3], [0.0; 4]);
        assert!(matches!(
            pose.rotation(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn builders_populate_lists() {
        let c = Constraints::new("box")
            .with_position(PositionConstraint::box_region(
                "tool",
                [0.1, 0.2, 0.3],
                Pose::from_position([1.0, 0.0, 0.5]),
            ))
            .with_orientation(OrientationConstraint::new(
                "tool",
                [0.0, 0.0, 0.0, 1.0],
                [0.1, 0.1, -1.0],
            ));
        assert!(!c.is_empty());
        assert_eq!(c.position_constraints.len(), 1);
        assert_eq!(c.orientation_constraints[0].tolerances(), [0.1, 0.1, -1.0]);
        assert!(Constraints::default().is_empty());
    }

    #[test]
    fn line_has_two_poses() {
        let line = PositionConstraint::line(
            "tool",
            [-1.0, 0.0005, 0.0005],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(line.constraint_region.primitive_poses.len(), 2);
        assert_eq!(line.constraint_region.primitive_poses[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn parse_from_toml() {
        let toml = r#"
            name = "use_equality_constraints"

            [[position_constraints]]
            link_name = "panda_link8"

            [[position_constraints.constraint_region.primitives]]
            dimensions = [0.1, 0.0005, -1.0]

            [[position_constraints.constraint_region.primitive_poses]]
            position = [0.3, -0.2, 0.6]
        "#;
        let c = Constraints::from_toml_str(toml).unwrap();
        assert_eq!(c.name, "use_equality_constraints");
        let region = &c.position_constraints[0].constraint_region;
        assert_eq!(region.primitives[0].kind, PrimitiveKind::Box);
        assert_eq!(region.primitives[0].dimensions, vec![0.1, 0.0005, -1.0]);
        assert_eq!(region.primitive_poses[0].orientation, [0.0, 0.0, 0.0, 1.0]);
        assert!(c.orientation_constraints.is_empty());
    }

    #[test]
    fn parse_orientation_from_toml() {
        let toml = r#"
            [[orientation_constraints]]
            link_name = "tool"
            orientation = [0.0, 0.0, 0.7071067811865476, 0.7071067811865476]
            absolute_x_axis_tolerance = 0.1
            absolute_y_axis_tolerance = 0.1
            absolute_z_axis_tolerance = -1.0
        "#;
        let c = Constraints::from_toml_str(toml).unwrap();
        assert!(c.name.is_empty());
        assert_eq!(c.orientation_constraints[0].tolerances()[2], -1.0);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = Constraints::from_toml_str("position_constraints = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
