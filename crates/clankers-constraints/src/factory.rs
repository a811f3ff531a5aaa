//! Select and initialize the constraint variant for a description.

use std::sync::Arc;

use clankers_kinematics::KinematicsProvider;
use tracing::{error, info, warn};

use crate::config::ConstraintConfig;
use crate::constraint::{Constraint, PendingConstraint};
use crate::description::Constraints;
use crate::error::ConstraintError;
use crate::residual::ConstraintKind;

/// Choose the variant for `constraints` without initializing it.
///
/// Position entries select by the description's name tag; orientation
/// entries always select [`ConstraintKind::Orientation`].
///
/// # Errors
///
/// [`ConstraintError::Unsupported`] when both lists are populated,
/// [`ConstraintError::NoConstraints`] when both are empty.
pub fn select_kind(constraints: &Constraints) -> Result<ConstraintKind, ConstraintError> {
    let positions = constraints.position_constraints.len();
    let orientations = constraints.orientation_constraints.len();
    if positions > 1 {
        warn!(count = positions, "Only a single position constraint is supported. Using the first one.");
    }
    if orientations > 1 {
        warn!(
            count = orientations,
            "Only a single orientation constraint is supported. Using the first one."
        );
    }

    if constraints.is_empty() {
        return Err(ConstraintError::NoConstraints);
    }
    if positions > 0 && orientations > 0 {
        return Err(ConstraintError::Unsupported(
            "combined position and orientation constraints".into(),
        ));
    }
    if positions > 0 {
        Ok(ConstraintKind::from_position_tag(&constraints.name))
    } else {
        Ok(ConstraintKind::Orientation)
    }
}

/// Build and initialize the constraint described by `constraints` for the
/// joint group behind `provider`.
///
/// Orientation constraints are returned even when
/// `config.orientation_supported` is false; the limitation is only
/// reported.
///
/// # Errors
///
/// Fails if no variant can be selected (see [`select_kind`]) or if
/// initialization of the selected variant fails.
pub fn create_constraint<P: KinematicsProvider>(
    provider: Arc<P>,
    constraints: &Constraints,
    config: &ConstraintConfig,
) -> Result<Constraint<P>, ConstraintError> {
    let kind = select_kind(constraints)?;
    info!(%kind, name = %constraints.name, "Creating path constraint");
    if kind == ConstraintKind::Orientation {
        if config.orientation_supported {
            info!("Orientation constraints enabled by configuration");
        } else {
            error!("Orientation constraints are not fully supported by the planner integration");
        }
    }
    PendingConstraint::new(kind, provider, config.clone()).init(constraints)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
