//! Constraint evaluator: F(q) and dF/dq for a host planner.
//!
//! A constraint is built in two phases. [`PendingConstraint`] fixes the
//! variant, the kinematics provider and the numeric configuration;
//! [`PendingConstraint::init`] parses a [`Constraints`] description and
//! returns a read-only [`Constraint`]. Initialization consumes the pending
//! value, so a constraint cannot be re-initialized.
//!
//! Evaluation takes the caller's kinematic scratchpad explicitly:
//!
//! ```text
//! q ──► provider.link_pose / geometric_jacobian (state) ──► ResidualModel ──► F, dF/dq
//! ```

use std::fmt;
use std::sync::Arc;

use clankers_kinematics::KinematicsProvider;
use nalgebra::{Isometry3, Matrix3xX, UnitQuaternion, Vector3};
use tracing::info;

use crate::bound::BoundSet;
use crate::config::ConstraintConfig;
use crate::description::{Constraints, PositionConstraint};
use crate::error::{ConfigError, ConstraintError};
use crate::residual::{ConstraintKind, DimensionMask, Residual, ResidualModel};

/// Number of residual rows every constraint produces.
pub const CO_DIMENSION: usize = 3;

// ---------------------------------------------------------------------------
// PendingConstraint
// ---------------------------------------------------------------------------

fn first_position(constraints: &Constraints) -> Result<&PositionConstraint, ConfigError> {
    constraints
        .position_constraints
        .first()
        .ok_or_else(|| ConfigError::MissingField("position_constraints".into()))
}

/// A constraint whose variant is chosen but whose targets are not yet parsed.
pub struct PendingConstraint<P: KinematicsProvider> {
    kind: ConstraintKind,
    provider: Arc<P>,
    config: ConstraintConfig,
}

impl<P: KinematicsProvider> PendingConstraint<P> {
    /// Fix the variant, provider and numeric settings.
    pub const fn new(kind: ConstraintKind, provider: Arc<P>, config: ConstraintConfig) -> Self {
        Self {
            kind,
            provider,
            config,
        }
    }

    /// Variant chosen at construction.
    pub const fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Parse the first entry of the matching constraint list.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::Config`] if the configuration is invalid,
    /// the description lacks an entry for this variant, a field is
    /// malformed, or the link is not part of the provider's joint group.
    pub fn init(self, constraints: &Constraints) -> Result<Constraint<P>, ConstraintError> {
        self.config.validate()?;

        let (link_name, model) = match self.kind {
            ConstraintKind::BoundedPosition => {
                let entry = first_position(constraints)?;
                (entry.link_name.clone(), ResidualModel::bounded_position(entry)?)
            }
            ConstraintKind::EqualityPosition => {
                let entry = first_position(constraints)?;
                let model = ResidualModel::equality_position(entry, &self.config)?;
                (entry.link_name.clone(), model)
            }
            ConstraintKind::LinearSystemPosition => {
                let entry = first_position(constraints)?;
                let model = ResidualModel::linear_system(entry, &self.config)?;
                (entry.link_name.clone(), model)
            }
            ConstraintKind::Orientation => {
                let entry = constraints
                    .orientation_constraints
                    .first()
                    .ok_or_else(|| ConfigError::MissingField("orientation_constraints".into()))?;
                (entry.link_name.clone(), ResidualModel::orientation(entry)?)
            }
        };

        if !self.provider.has_link(&link_name) {
            return Err(ConfigError::UnknownLink(link_name).into());
        }
        info!(kind = %self.kind, "Constraints applied to link: {link_name}");

        Ok(Constraint {
            provider: self.provider,
            config: self.config,
            link_name,
            model,
        })
    }
}

// ---------------------------------------------------------------------------
// Constraint
// ---------------------------------------------------------------------------

/// An initialized, read-only constraint.
///
/// Safe to share between threads; each thread passes its own
/// `P::State` to the evaluation methods.
pub struct Constraint<P: KinematicsProvider> {
    provider: Arc<P>,
    config: ConstraintConfig,
    link_name: String,
    model: ResidualModel,
}

impl<P: KinematicsProvider> Constraint<P> {
    fn check_joints(&self, q: &[f64]) -> Result<(), ConstraintError> {
        let expected = self.provider.dof();
        if q.len() == expected {
            Ok(())
        } else {
            Err(ConstraintError::JointDimension {
                expected,
                got: q.len(),
            })
        }
    }

    fn pose(&self, q: &[f64], state: &mut P::State) -> Result<Isometry3<f64>, ConstraintError> {
        self.check_joints(q)?;
        Ok(self.provider.link_pose(state, q, &self.link_name)?)
    }

    /// Task error before bound penalties or masking.
    pub fn calc_error(&self, q: &[f64], state: &mut P::State) -> Result<Vector3<f64>, ConstraintError> {
        let pose = self.pose(q, state)?;
        Ok(self.model.error(&pose))
    }

    /// Jacobian of [`calc_error`](Self::calc_error).
    pub fn calc_error_jacobian(
        &self,
        q: &[f64],
        state: &mut P::State,
    ) -> Result<Matrix3xX<f64>, ConstraintError> {
        let pose = self.pose(q, state)?;
        let jacobian = self.provider.geometric_jacobian(state, q, &self.link_name)?;
        Ok(self.model.error_jacobian(&pose, &jacobian))
    }

    /// F(q). Zero exactly when `q` satisfies the constraint.
    pub fn function(&self, q: &[f64], state: &mut P::State) -> Result<Vector3<f64>, ConstraintError> {
        let error = self.calc_error(q, state)?;
        Ok(self.model.residual(&error))
    }

    /// dF/dq, a 3xN matrix.
    pub fn jacobian(&self, q: &[f64], state: &mut P::State) -> Result<Matrix3xX<f64>, ConstraintError> {
        Ok(self.evaluate(q, state)?.jacobian)
    }

    /// F(q) and dF/dq from one kinematics pass.
    pub fn evaluate(&self, q: &[f64], state: &mut P::State) -> Result<Residual, ConstraintError> {
        let pose = self.pose(q, state)?;
        let geometric = self.provider.geometric_jacobian(state, q, &self.link_name)?;
        let error = self.model.error(&pose);
        let error_jacobian = self.model.error_jacobian(&pose, &geometric);
        Ok(Residual {
            value: self.model.residual(&error),
            jacobian: self.model.residual_jacobian(&error, error_jacobian),
        })
    }

    /// Whether `‖F(q)‖∞` is within [`tolerance`](Self::tolerance).
    pub fn is_satisfied(&self, q: &[f64], state: &mut P::State) -> Result<bool, ConstraintError> {
        Ok(self.function(q, state)?.amax() <= self.config.tolerance)
    }

    /// Rows of F(q).
    pub const fn co_dimension(&self) -> usize {
        CO_DIMENSION
    }

    /// Joint-space dimension.
    pub fn ambient_dimension(&self) -> usize {
        self.provider.dof()
    }

    /// Tolerance used to decide F(q) ≈ 0.
    pub const fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    /// Numeric settings fixed at construction.
    pub const fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Variant of the residual model.
    pub fn kind(&self) -> ConstraintKind {
        self.model.kind()
    }

    /// Link whose pose is constrained.
    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    /// Parsed residual model.
    pub const fn model(&self) -> &ResidualModel {
        &self.model
    }

    /// Per-axis bounds of the bounded and orientation variants.
    pub const fn bounds(&self) -> Option<&BoundSet> {
        self.model.bounds()
    }

    /// Constrained axes of the equality and line variants.
    pub const fn dimension_mask(&self) -> Option<&DimensionMask> {
        self.model.dimension_mask()
    }

    /// Target origin, `None` for orientation constraints.
    pub const fn target_position(&self) -> Option<&Vector3<f64>> {
        self.model.target_position()
    }

    /// Rotation of the target frame.
    pub const fn target_orientation(&self) -> &UnitQuaternion<f64> {
        self.model.target_orientation()
    }

    /// Line end points for the line variant.
    pub const fn line(&self) -> Option<(&Vector3<f64>, &Vector3<f64>)> {
        self.model.line()
    }

    /// False for orientation constraints unless the configuration declares
    /// that the host accepts them.
    pub fn is_supported(&self) -> bool {
        self.kind().is_position() || self.config.orientation_supported
    }

    /// Shared kinematics provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// A fresh kinematic scratchpad for this constraint's provider.
    pub fn new_state(&self) -> P::State {
        self.provider.new_state()
    }
}

impl<P: KinematicsProvider> fmt::Debug for Constraint<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("link_name", &self.link_name)
            .field("model", &self.model)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
