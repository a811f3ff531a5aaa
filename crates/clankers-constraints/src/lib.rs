//! Task-space path constraints for joint-space motion planners.
//!
//! Turns "keep this link inside a box", "on this line" or "within these
//! orientation tolerances" into a residual F(q) that is zero exactly on the
//! constraint manifold, together with its Jacobian dF/dq, for use in the
//! projection step of a constrained sampling-based planner.
//!
//! # Architecture
//!
//! ```text
//! Constraints ──► create_constraint ──► PendingConstraint ──init──► Constraint
//!                                                                      │
//!            q + KinematicsProvider::State ──► ResidualModel ──► F(q), dF/dq
//! ```
//!
//! A [`Constraint`] is read-only after initialization and may be shared
//! between threads; each thread evaluates with its own kinematic
//! scratchpad.

pub mod bound;
pub mod config;
pub mod constraint;
pub mod description;
pub mod error;
pub mod extraction;
pub mod factory;
pub mod math;
pub mod residual;

pub use bound::{Bound, BoundSet};
pub use config::{ConstraintConfig, DEFAULT_TOLERANCE, EQUALITY_DIMENSION_THRESHOLD};
pub use constraint::{Constraint, PendingConstraint, CO_DIMENSION};
pub use description::{
    BoundingVolume, Constraints, OrientationConstraint, Pose, PositionConstraint, PrimitiveKind,
    SolidPrimitive,
};
pub use error::{ConfigError, ConstraintError};
pub use extraction::{orientation_bounds, position_bounds, UNCONSTRAINED_SENTINEL};
pub use factory::{create_constraint, select_kind};
pub use residual::{ConstraintKind, DimensionMask, Residual, ResidualModel};

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        create_constraint, Bound, ConstraintConfig, ConstraintError, ConstraintKind, Constraints,
        OrientationConstraint, Pose, PositionConstraint,
    };
    pub use clankers_kinematics::KinematicsProvider;
}
