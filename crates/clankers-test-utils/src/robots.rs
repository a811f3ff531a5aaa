//! Canned kinematic chains for tests.
//!
//! All chains end in a fixed tip link named [`TOOL_LINK`].

use clankers_kinematics::{ChainJoint, KinematicChain};
use nalgebra::{Isometry3, Vector3};

/// Tip link name shared by every canned chain.
pub const TOOL_LINK: &str = "tool";

/// Three prismatic joints along x, y, z followed by revolute joints about
/// z, y, x, all sharing one origin.
///
/// The tool position equals `q[0..3]` and its rotation is
/// `Rz(q[3]) · Ry(q[4]) · Rx(q[5])`, which makes expected residuals easy to
/// write by hand.
pub fn cartesian_wrist() -> KinematicChain {
    KinematicChain::new("base")
        .with_joint(ChainJoint::prismatic(
            "slide_x",
            "carriage_x",
            Isometry3::identity(),
            Vector3::x(),
        ))
        .with_joint(ChainJoint::prismatic(
            "slide_y",
            "carriage_y",
            Isometry3::identity(),
            Vector3::y(),
        ))
        .with_joint(ChainJoint::prismatic(
            "slide_z",
            "carriage_z",
            Isometry3::identity(),
            Vector3::z(),
        ))
        .with_joint(ChainJoint::revolute(
            "wrist_yaw",
            "yaw_link",
            Isometry3::identity(),
            Vector3::z(),
        ))
        .with_joint(ChainJoint::revolute(
            "wrist_pitch",
            "pitch_link",
            Isometry3::identity(),
            Vector3::y(),
        ))
        .with_joint(ChainJoint::revolute(
            "wrist_roll",
            "roll_link",
            Isometry3::identity(),
            Vector3::x(),
        ))
        .with_tip(TOOL_LINK, Isometry3::identity())
}

/// Two z-axis revolute joints with 0.3 m and 0.25 m links along x.
pub fn planar_arm() -> KinematicChain {
    KinematicChain::new("base")
        .with_joint(
            ChainJoint::revolute(
                "shoulder",
                "upper_arm",
                Isometry3::translation(0.0, 0.0, 0.05),
                Vector3::z(),
            )
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
        .with_tip(TOOL_LINK, Isometry3::translation(0.25, 0.0, 0.0))
}

/// A six-revolute arm with a spherical-ish wrist, roughly the proportions of
/// a small industrial manipulator.
pub fn six_dof_arm() -> KinematicChain {
    KinematicChain::new("base_link")
        .with_joint(ChainJoint::revolute(
            "shoulder_pan",
            "shoulder_link",
            Isometry3::translation(0.0, 0.0, 0.1),
            Vector3::z(),
        ))
        .with_joint(
            ChainJoint::revolute(
                "shoulder_lift",
                "upper_arm_link",
                Isometry3::translation(0.0, 0.0, 0.1),
                Vector3::y(),
            )
            .with_limits(-2.0, 2.0),
        )
        .with_joint(
            ChainJoint::revolute(
                "elbow",
                "forearm_link",
                Isometry3::translation(0.4, 0.0, 0.0),
                Vector3::y(),
            )
            .with_limits(-2.5, 2.5),
        )
        .with_joint(ChainJoint::revolute(
            "wrist_1",
            "wrist_1_link",
            Isometry3::translation(0.35, 0.0, 0.0),
            Vector3::y(),
        ))
        .with_joint(ChainJoint::revolute(
            "wrist_2",
            "wrist_2_link",
            Isometry3::translation(0.0, 0.0, -0.1),
            Vector3::z(),
        ))
        .with_joint(ChainJoint::revolute(
            "wrist_3",
            "wrist_3_link",
            Isometry3::translation(0.08, 0.0, 0.0),
            Vector3::x(),
        ))
        .with_tip(TOOL_LINK, Isometry3::translation(0.1, 0.0, 0.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
