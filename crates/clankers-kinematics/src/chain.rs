//! Serial kinematic chain used as the reference [`KinematicsProvider`].
//!
//! A [`KinematicChain`] is an ordered list of actuated joints from the base
//! link to an optional fixed tip link. Every joint names the child link it
//! moves, so any link along the chain can be queried for its pose and
//! geometric Jacobian.
//!
//! [`KinematicsProvider`]: crate::KinematicsProvider

use nalgebra::{Isometry3, Matrix6xX, Translation3, UnitQuaternion, UnitVector3, Vector3};

use crate::state::ChainState;

/// How a joint moves its child link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// Rotation about the joint axis.
    Revolute,
    /// Translation along the joint axis.
    Prismatic,
}

/// A single actuated joint in the kinematic chain.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    /// Name of this joint.
    pub name: String,
    /// Name of the link this joint moves.
    pub child_link: String,
    /// Static transform from the parent link frame to this joint frame.
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint's local frame.
    pub axis: UnitVector3<f64>,
    /// Revolute or prismatic.
    pub kind: JointKind,
    /// Lower position limit (rad or m).
    pub lower_limit: f64,
    /// Upper position limit (rad or m).
    pub upper_limit: f64,
}

impl ChainJoint {
    /// A revolute joint with limits of `[-pi, pi]`.
    pub fn revolute(
        name: impl Into<String>,
        child_link: impl Into<String>,
        origin: Isometry3<f64>,
        axis: Vector3<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            child_link: child_link.into(),
            origin,
            axis: UnitVector3::new_normalize(axis),
            kind: JointKind::Revolute,
            lower_limit: -std::f64::consts::PI,
            upper_limit: std::f64::consts::PI,
        }
    }

    /// A prismatic joint with limits of `[-1, 1]` m.
    pub fn prismatic(
        name: impl Into<String>,
        child_link: impl Into<String>,
        origin: Isometry3<f64>,
        axis: Vector3<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            child_link: child_link.into(),
            origin,
            axis: UnitVector3::new_normalize(axis),
            kind: JointKind::Prismatic,
            lower_limit: -1.0,
            upper_limit: 1.0,
        }
    }

    /// Override the position limits.
    #[must_use]
    pub const fn with_limits(mut self, lower: f64, upper: f64) -> Self {
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    /// Transform produced by this joint at `position`.
    pub(crate) fn motion(&self, position: f64) -> Isometry3<f64> {
        match self.kind {
            JointKind::Prismatic => Isometry3::from_parts(
                Translation3::from(self.axis.into_inner() * position),
                UnitQuaternion::identity(),
            ),
            JointKind::Revolute => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, position),
            ),
        }
    }
}

/// Where a named link sits in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkIndex {
    /// The fixed base link.
    Base,
    /// The child link of the joint at this index.
    Joint(usize),
    /// The fixed tip link after the last joint.
    Tip,
}

/// An ordered kinematic chain from base to tip.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    base_link: String,
    joints: Vec<ChainJoint>,
    /// Fixed link rigidly attached after the last joint.
    tip: Option<(String, Isometry3<f64>)>,
}

impl KinematicChain {
    /// Start an empty chain rooted at `base_link`.
    pub fn new(base_link: impl Into<String>) -> Self {
        Self {
            base_link: base_link.into(),
            joints: Vec::new(),
            tip: None,
        }
    }

    /// Append an actuated joint.
    #[must_use]
    pub fn with_joint(mut self, joint: ChainJoint) -> Self {
        self.joints.push(joint);
        self
    }

    /// Attach a fixed tip link at `offset` from the last joint's child link.
    #[must_use]
    pub fn with_tip(mut self, link: impl Into<String>, offset: Isometry3<f64>) -> Self {
        self.tip = Some((link.into(), offset));
        self
    }

    /// Number of actuated degrees of freedom.
    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Name of the base link.
    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    /// Joint names in chain order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }

    /// Access the joint definitions.
    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    /// Name of the tip link, if one is attached.
    pub fn tip_link(&self) -> Option<&str> {
        self.tip.as_ref().map(|(name, _)| name.as_str())
    }

    pub(crate) fn tip_offset(&self) -> Isometry3<f64> {
        self.tip.as_ref().map_or_else(Isometry3::identity, |(_, offset)| *offset)
    }

    /// Resolve a link name to its position in the chain.
    pub fn link_index(&self, link: &str) -> Option<LinkIndex> {
        if let Some((tip, _)) = &self.tip {
            if tip == link {
                return Some(LinkIndex::Tip);
            }
        }
        if link == self.base_link {
            return Some(LinkIndex::Base);
        }
        self.joints
            .iter()
            .position(|j| j.child_link == link)
            .map(LinkIndex::Joint)
    }

    /// Pose of the last link (tip if attached) in the base frame.
    ///
    /// Stateless convenience over [`ChainState`]; allocates a scratchpad.
    ///
    /// # Panics
    ///
    /// Panics if `q.len() != self.dof()`.
    pub fn forward_kinematics(&self, q: &[f64]) -> Isometry3<f64> {
        assert_eq!(q.len(), self.dof(), "q.len() must equal chain DOF");
        let mut state = ChainState::new(self.dof());
        state.update(self, q);
        state.tip_frame()
    }

    /// Pose of the link at `index`, read from an updated `state`.
    pub(crate) fn link_frame(state: &ChainState, index: LinkIndex) -> Isometry3<f64> {
        match index {
            LinkIndex::Base => Isometry3::identity(),
            LinkIndex::Joint(i) => state.link_frames()[i],
            LinkIndex::Tip => state.tip_frame(),
        }
    }

    /// 6xN geometric Jacobian of the link at `index`, read from an updated
    /// `state`. Rows 0..3 are linear velocity, rows 3..6 angular velocity,
    /// both in the base frame at the link origin.
    pub(crate) fn jacobian_at(&self, state: &ChainState, index: LinkIndex) -> Matrix6xX<f64> {
        let n = self.dof();
        let mut jacobian = Matrix6xX::zeros(n);

        let active = match index {
            LinkIndex::Base => return jacobian,
            LinkIndex::Joint(i) => i + 1,
            LinkIndex::Tip => n,
        };
        let link_pos = Self::link_frame(state, index).translation.vector;

        for (i, joint) in self.joints.iter().enumerate().take(active) {
            let z_i = state.joint_axes()[i];
            let o_i = state.joint_origins()[i];

            match joint.kind {
                JointKind::Prismatic => {
                    jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&z_i);
                }
                JointKind::Revolute => {
                    let cross = z_i.cross(&(link_pos - o_i));
                    jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&cross);
                    jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&z_i);
                }
            }
        }

        jacobian
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn up(z: f64) -> Isometry3<f64> {
        Isometry3::translation(0.0, 0.0, z)
    }

    /// Two Z-axis revolute joints with links extending along X.
    fn planar_arm() -> KinematicChain {
        KinematicChain::new("base")
            .with_joint(
                ChainJoint::revolute("shoulder", "upper_arm", up(0.05), Vector3::z())
                    .with_limits(-2.617, 2.617),
            )
            .with_joint(
                ChainJoint::revolute(
                    "elbow",
                    "forearm",
                    Isometry3::translation(0.3, 0.0, 0.0),
                    Vector3::z(),
                )
                .with_limits(-2.094, 2.094),
            )
            .with_tip("end_effector", Isometry3::translation(0.25, 0.0, 0.0))
    }

    #[test]
    fn chain_reports_dof_and_names() {
        let chain = planar_arm();
        assert_eq!(chain.dof(), 2);
        assert_eq!(chain.joint_names(), vec!["shoulder", "elbow"]);
        assert_eq!(chain.tip_link(), Some("end_effector"));
        assert_eq!(chain.base_link(), "base");
    }

    #[test]
    fn link_index_resolves_every_link() {
        let chain = planar_arm();
        assert_eq!(chain.link_index("base"), Some(LinkIndex::Base));
        assert_eq!(chain.link_index("upper_arm"), Some(LinkIndex::Joint(0)));
        assert_eq!(chain.link_index("forearm"), Some(LinkIndex::Joint(1)));
        assert_eq!(chain.link_index("end_effector"), Some(LinkIndex::Tip));
        assert_eq!(chain.link_index("nonexistent"), None);
    }

    #[test]
    fn fk_zero_position() {
        let ee = planar_arm().forward_kinematics(&[0.0, 0.0]);
        assert_relative_eq!(ee.translation.x, 0.55, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.z, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn fk_shoulder_90_deg() {
        let ee = planar_arm().forward_kinematics(&[std::f64::consts::FRAC_PI_2, 0.0]);
        assert_relative_eq!(ee.translation.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.y, 0.55, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.z, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn prismatic_joint_translates_along_axis() {
        let chain = KinematicChain::new("world").with_joint(ChainJoint::prismatic(
            "slide",
            "carriage",
            Isometry3::identity(),
            Vector3::new(0.0, 2.0, 0.0),
        ));
        let ee = chain.forward_kinematics(&[0.4]);
        assert_relative_eq!(ee.translation.y, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn tip_jacobian_matches_planar_closed_form() {
        let chain = planar_arm();
        let q = [0.3, -0.5];
        let mut state = ChainState::new(chain.dof());
        state.update(&chain, &q);
        let jac = chain.jacobian_at(&state, LinkIndex::Tip);

        // Planar 2R: x = l1 c1 + l2 c12, y = l1 s1 + l2 s12
        let (l1, l2) = (0.3, 0.25);
        let (s1, c1) = q[0].sin_cos();
        let (s12, c12) = (q[0] + q[1]).sin_cos();
        assert_relative_eq!(jac[(0, 0)], -l1 * s1 - l2 * s12, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 0)], l1 * c1 + l2 * c12, epsilon = 1e-12);
        assert_relative_eq!(jac[(0, 1)], -l2 * s12, epsilon = 1e-12);
        assert_relative_eq!(jac[(1, 1)], l2 * c12, epsilon = 1e-12);
        // Angular rows: both joints spin about base Z.
        assert_relative_eq!(jac[(5, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(5, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn intermediate_link_ignores_downstream_joints() {
        let chain = planar_arm();
        let mut state = ChainState::new(chain.dof());
        state.update(&chain, &[0.2, 0.7]);
        let jac = chain.jacobian_at(&state, LinkIndex::Joint(0));
        for row in 0..6 {
            assert_relative_eq!(jac[(row, 1)], 0.0);
        }
        // upper_arm origin sits on the shoulder axis: no linear velocity.
        assert_relative_eq!(jac[(0, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(jac[(5, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn base_jacobian_is_zero() {
        let chain = planar_arm();
        let mut state = ChainState::new(chain.dof());
        state.update(&chain, &[0.2, 0.7]);
        let jac = chain.jacobian_at(&state, LinkIndex::Base);
        assert_relative_eq!(jac.norm(), 0.0);
    }
}
