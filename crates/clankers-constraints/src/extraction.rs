//! Map constraint descriptions to per-axis bounds.
//!
//! A dimension of `-1` is the description's sentinel for an unconstrained
//! axis and becomes an infinite bound.

use tracing::warn;

use crate::bound::{Bound, BoundSet};
use crate::description::{OrientationConstraint, PositionConstraint, PrimitiveKind};
use crate::error::ConfigError;

/// Description value marking an axis as unconstrained.
pub const UNCONSTRAINED_SENTINEL: f64 = -1.0;

#[allow(clippy::float_cmp)]
pub(crate) fn is_unconstrained(value: f64) -> bool {
    value == UNCONSTRAINED_SENTINEL
}

fn resolve_sentinel(value: f64) -> f64 {
    if is_unconstrained(value) {
        f64::INFINITY
    } else {
        value
    }
}

/// Full box extents `[x, y, z]` of the first primitive of a position
/// constraint's region.
///
/// Only the first primitive is used; extra primitives are logged.
pub fn box_extents(constraint: &PositionConstraint) -> Result<[f64; 3], ConfigError> {
    let region = &constraint.constraint_region;
    let primitive = region
        .primitives
        .first()
        .ok_or_else(|| ConfigError::MissingField("constraint_region.primitives".into()))?;
    if region.primitives.len() > 1 {
        warn!(
            count = region.primitives.len(),
            "Only a single primitive per position constraint is supported. Using the first one."
        );
    }
    if primitive.kind != PrimitiveKind::Box {
        return Err(ConfigError::invalid(
            "constraint_region.primitives",
            format!("{:?} primitives are not supported, use a box", primitive.kind),
        ));
    }
    match primitive.dimensions.as_slice() {
        [x, y, z, ..] => Ok([*x, *y, *z]),
        dims => Err(ConfigError::invalid(
            "constraint_region.primitives.dimensions",
            format!("expected 3 box dimensions, got {}", dims.len()),
        )),
    }
}

/// Bounds `(-extent / 2, extent / 2)` per axis of a position constraint.
pub fn position_bounds(constraint: &PositionConstraint) -> Result<BoundSet, ConfigError> {
    let [x, y, z] = box_extents(constraint)?.map(resolve_sentinel);
    Ok([
        Bound::new(-x / 2.0, x / 2.0)?,
        Bound::new(-y / 2.0, y / 2.0)?,
        Bound::new(-z / 2.0, z / 2.0)?,
    ])
}

/// Bounds `(-tolerance, tolerance)` per axis of an orientation constraint.
pub fn orientation_bounds(constraint: &OrientationConstraint) -> Result<BoundSet, ConfigError> {
    let [x, y, z] = constraint.tolerances().map(resolve_sentinel);
    Ok([
        Bound::symmetric(x)?,
        Bound::symmetric(y)?,
        Bound::symmetric(z)?,
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
