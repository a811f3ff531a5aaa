//! Constraint-description builders for tests.

use clankers_constraints::{ConstraintKind, Constraints, OrientationConstraint, Pose, PositionConstraint};

/// Untagged description with one box around `position`.
pub fn bounded_box(link: &str, dimensions: [f64; 3], position: [f64; 3]) -> Constraints {
    Constraints::new("").with_position(PositionConstraint::box_region(
        link,
        dimensions,
        Pose::from_position(position),
    ))
}

/// Equality-tagged description with one box around `pose`.
pub fn equality_box(link: &str, dimensions: [f64; 3], pose: Pose) -> Constraints {
    Constraints::new(ConstraintKind::EQUALITY_TAG)
        .with_position(PositionConstraint::box_region(link, dimensions, pose))
}

/// Linear-system-tagged description for the line `start → end`, with the
/// line frame rotated by `orientation` (`[x, y, z, w]`).
pub fn line(
    link: &str,
    dimensions: [f64; 3],
    start: [f64; 3],
    end: [f64; 3],
    orientation: [f64; 4],
) -> Constraints {
    Constraints::new(ConstraintKind::LINEAR_SYSTEM_TAG).with_position(PositionConstraint::line(
        link,
        dimensions,
        start,
        end,
        orientation,
    ))
}

/// Orientation description with per-axis tolerances.
pub fn orientation(link: &str, target: [f64; 4], tolerances: [f64; 3]) -> Constraints {
    Constraints::new("").with_orientation(OrientationConstraint::new(link, target, tolerances))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
