//! Shared test fixtures and utilities for Clankers constraint crates.
//!
//! Provides canned kinematic chains, constraint-description builders,
//! deterministic joint sampling and a finite-difference Jacobian helper.

pub mod descriptions;
pub mod numeric;
pub mod rng;
pub mod robots;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use descriptions::{bounded_box, equality_box, line, orientation};
pub use numeric::finite_difference_jacobian;
pub use rng::{random_configuration, random_configurations, seeded_rng};
pub use robots::{cartesian_wrist, planar_arm, six_dof_arm};
