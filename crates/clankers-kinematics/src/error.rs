//! Error types for kinematics queries.

/// Errors returned by a [`KinematicsProvider`](crate::KinematicsProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KinematicsError {
    /// The requested link is not part of the joint group.
    #[error("unknown link: {0}")]
    UnknownLink(String),

    /// The joint vector does not match the group's degrees of freedom.
    #[error("joint dimension mismatch: expected {expected}, got {got}")]
    JointDimension { expected: usize, got: usize },
}
