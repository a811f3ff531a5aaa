//! Mutable scratchpad for chain kinematics.
//!
//! A [`ChainState`] caches the frames computed for the most recent joint
//! vector. Every forward-kinematics or Jacobian query writes into it, so a
//! state must never be shared between threads; give each worker its own.

use nalgebra::{Isometry3, Vector3};

use crate::chain::KinematicChain;

/// Per-thread kinematic working storage for a [`KinematicChain`].
#[derive(Debug, Clone)]
pub struct ChainState {
    /// Joint vector the cached frames were computed for.
    q: Vec<f64>,
    /// Whether the cached frames correspond to `q`.
    valid: bool,
    /// Child-link pose of every joint, in the base frame.
    link_frames: Vec<Isometry3<f64>>,
    /// Joint origins in the base frame, recorded before the joint moves.
    joint_origins: Vec<Vector3<f64>>,
    /// Joint axes in the base frame.
    joint_axes: Vec<Vector3<f64>>,
    tip_frame: Isometry3<f64>,
}

impl ChainState {
    /// Allocate storage for a chain with `dof` joints.
    pub fn new(dof: usize) -> Self {
        Self {
            q: vec![0.0; dof],
            valid: false,
            link_frames: vec![Isometry3::identity(); dof],
            joint_origins: vec![Vector3::zeros(); dof],
            joint_axes: vec![Vector3::zeros(); dof],
            tip_frame: Isometry3::identity(),
        }
    }

    /// Recompute all frames for `q`, unless they are already cached.
    ///
    /// A state allocated for a chain of another size is resized first.
    pub(crate) fn update(&mut self, chain: &KinematicChain, q: &[f64]) {
        let dof = chain.dof();
        if self.link_frames.len() != dof {
            self.resize(dof);
        }
        if self.valid && self.q.as_slice() == q {
            return;
        }

        let mut transform = Isometry3::identity();
        for (i, (joint, &position)) in chain.joints().iter().zip(q).enumerate() {
            transform *= joint.origin;
            self.joint_origins[i] = transform.translation.vector;
            self.joint_axes[i] = transform.rotation * joint.axis.into_inner();
            transform *= joint.motion(position);
            self.link_frames[i] = transform;
        }
        self.tip_frame = transform * chain.tip_offset();

        self.q.clear();
        self.q.extend_from_slice(q);
        self.valid = true;
    }

    fn resize(&mut self, dof: usize) {
        self.valid = false;
        self.link_frames.resize(dof, Isometry3::identity());
        self.joint_origins.resize(dof, Vector3::zeros());
        self.joint_axes.resize(dof, Vector3::zeros());
    }

    pub(crate) fn link_frames(&self) -> &[Isometry3<f64>] {
        &self.link_frames
    }

    pub(crate) fn joint_origins(&self) -> &[Vector3<f64>] {
        &self.joint_origins
    }

    pub(crate) fn joint_axes(&self) -> &[Vector3<f64>] {
        &self.joint_axes
    }

    pub(crate) const fn tip_frame(&self) -> Isometry3<f64> {
        self.tip_frame
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
