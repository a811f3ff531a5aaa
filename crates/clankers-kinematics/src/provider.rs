//! The kinematics-provider boundary consumed by constraint evaluation.

use nalgebra::{Isometry3, Matrix6xX};

use crate::chain::KinematicChain;
use crate::error::KinematicsError;
use crate::state::ChainState;

/// Forward kinematics and geometric Jacobians for one joint group.
///
/// The provider itself is immutable and shared; all mutation happens in the
/// caller-owned [`State`](Self::State) scratchpad. Callers that evaluate
/// from several threads create one state per thread with
/// [`new_state`](Self::new_state).
pub trait KinematicsProvider: Send + Sync {
    /// Mutable working storage for kinematic queries.
    type State: Send;

    /// Number of joint variables in the group.
    fn dof(&self) -> usize;

    /// Whether `link` belongs to the group.
    fn has_link(&self, link: &str) -> bool;

    /// Allocate a fresh scratchpad.
    fn new_state(&self) -> Self::State;

    /// Pose of `link` in the base frame at joint values `q`.
    fn link_pose(
        &self,
        state: &mut Self::State,
        q: &[f64],
        link: &str,
    ) -> Result<Isometry3<f64>, KinematicsError>;

    /// 6xN geometric Jacobian of `link` at joint values `q`.
    ///
    /// Rows 0..3 map joint velocity to the linear velocity of the link
    /// origin, rows 3..6 to its angular velocity, both in the base frame.
    fn geometric_jacobian(
        &self,
        state: &mut Self::State,
        q: &[f64],
        link: &str,
    ) -> Result<Matrix6xX<f64>, KinematicsError>;
}

impl KinematicChain {
    fn check_dimension(&self, q: &[f64]) -> Result<(), KinematicsError> {
        if q.len() == self.dof() {
            Ok(())
        } else {
            Err(KinematicsError::JointDimension {
                expected: self.dof(),
                got: q.len(),
            })
        }
    }
}

impl KinematicsProvider for KinematicChain {
    type State = ChainState;

    fn dof(&self) -> usize {
        Self::dof(self)
    }

    fn has_link(&self, link: &str) -> bool {
        self.link_index(link).is_some()
    }

    fn new_state(&self) -> ChainState {
        ChainState::new(Self::dof(self))
    }

    fn link_pose(
        &self,
        state: &mut ChainState,
        q: &[f64],
        link: &str,
    ) -> Result<Isometry3<f64>, KinematicsError> {
        self.check_dimension(q)?;
        let index = self
            .link_index(link)
            .ok_or_else(|| KinematicsError::UnknownLink(link.to_owned()))?;
        state.update(self, q);
        Ok(Self::link_frame(state, index))
    }

    fn geometric_jacobian(
        &self,
        state: &mut ChainState,
        q: &[f64],
        link: &str,
    ) -> Result<Matrix6xX<f64>, KinematicsError> {
        self.check_dimension(q)?;
        let index = self
            .link_index(link)
            .ok_or_else(|| KinematicsError::UnknownLink(link.to_owned()))?;
        state.update(self, q);
        Ok(self.jacobian_at(state, index))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainJoint;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// Shoulder yaw, shoulder pitch, elbow pitch, wrist roll.
    fn spatial_arm() -> KinematicChain {
        KinematicChain::new("base")
            .with_joint(ChainJoint::revolute(
                "yaw",
                "shoulder",
                Isometry3::translation(0.0, 0.0, 0.1),
                Vector3::z(),
            ))
            .with_joint(ChainJoint::revolute(
                "pitch",
                "upper_arm",
                Isometry3::translation(0.0, 0.0, 0.2),
                Vector3::y(),
            ))
            .with_joint(ChainJoint::revolute(
                "elbow",
                "forearm",
                Isometry3::translation(0.0, 0.0, 0.3),
                Vector3::y(),
            ))
            .with_joint(ChainJoint::revolute(
                "roll",
                "wrist",
                Isometry3::translation(0.0, 0.0, 0.2),
                Vector3::z(),
            ))
            .with_tip("tool", Isometry3::translation(0.05, 0.0, 0.1))
    }

    #[test]
    fn unknown_link_is_rejected() {
        let chain = spatial_arm();
        let mut state = chain.new_state();
        let err = chain
            .link_pose(&mut state, &[0.0; 4], "gripper")
            .unwrap_err();
        assert_eq!(err, KinematicsError::UnknownLink("gripper".into()));
        assert!(!chain.has_link("gripper"));
        assert!(chain.has_link("tool"));
    }

    #[test]
    fn wrong_joint_count_is_rejected() {
        let chain = spatial_arm();
        let mut state = chain.new_state();
        let err = chain
            .geometric_jacobian(&mut state, &[0.0; 3], "tool")
            .unwrap_err();
        assert_eq!(
            err,
            KinematicsError::JointDimension {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn linear_rows_match_finite_differences() {
        let chain = spatial_arm();
        let mut state = chain.new_state();
        let q = [0.4, -0.3, 0.8, 1.1];
        let jac = chain.geometric_jacobian(&mut state, &q, "tool").unwrap();

        let h = 1e-7;
        for j in 0..4 {
            let mut plus = q;
            let mut minus = q;
            plus[j] += h;
            minus[j] -= h;
            let p_plus = chain.link_pose(&mut state, &plus, "tool").unwrap();
            let p_minus = chain.link_pose(&mut state, &minus, "tool").unwrap();
            let numeric =
                (p_plus.translation.vector - p_minus.translation.vector) / (2.0 * h);
            for row in 0..3 {
                assert_relative_eq!(jac[(row, j)], numeric[row], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn angular_rows_match_finite_differences() {
        let chain = spatial_arm();
        let mut state = chain.new_state();
        let q = [0.4, -0.3, 0.8, 1.1];
        let jac = chain.geometric_jacobian(&mut state, &q, "tool").unwrap();

        let h = 1e-6;
        for j in 0..4 {
            let mut plus = q;
            let mut minus = q;
            plus[j] += h;
            minus[j] -= h;
            let r_plus = chain.link_pose(&mut state, &plus, "tool").unwrap().rotation;
            let r_minus = chain.link_pose(&mut state, &minus, "tool").unwrap().rotation;
            // World-frame angular velocity: R+ R-^T = exp(2h [w]x)
            let d = (r_plus.to_rotation_matrix() * r_minus.to_rotation_matrix().transpose())
                .into_inner();
            let omega = Vector3::new(d[(2, 1)] - d[(1, 2)], d[(0, 2)] - d[(2, 0)], d[(1, 0)] - d[(0, 1)])
                / (4.0 * h);
            for row in 0..3 {
                assert_relative_eq!(jac[(3 + row, j)], omega[row], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn state_from_shorter_chain_is_usable() {
        let chain = spatial_arm();
        let short = KinematicChain::new("base").with_joint(ChainJoint::revolute(
            "yaw",
            "shoulder",
            Isometry3::identity(),
            Vector3::z(),
        ));
        let q = [0.4, -0.3, 0.8, 1.1];
        let mut own = chain.new_state();
        let mut foreign = short.new_state();
        short.link_pose(&mut foreign, &[0.2], "shoulder").unwrap();

        let expected = chain.geometric_jacobian(&mut own, &q, "tool").unwrap();
        let jac = chain.geometric_jacobian(&mut foreign, &q, "tool").unwrap();
        assert_eq!(jac, expected);
        assert_eq!(
            chain.link_pose(&mut foreign, &q, "tool").unwrap(),
            chain.link_pose(&mut own, &q, "tool").unwrap()
        );
    }

    #[test]
    fn pose_is_repeatable_across_states() {
        let chain = spatial_arm();
        let q = [0.1, 0.2, 0.3, 0.4];
        let mut a = chain.new_state();
        let mut b = chain.new_state();
        let pa = chain.link_pose(&mut a, &q, "forearm").unwrap();
        // Pollute `b` with another configuration first.
        chain.link_pose(&mut b, &[1.0; 4], "tool").unwrap();
        let pb = chain.link_pose(&mut b, &q, "forearm").unwrap();
        assert_eq!(pa, pb);
    }
}
