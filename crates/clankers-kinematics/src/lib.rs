//! Kinematics for Clankers task-space constraints.
//!
//! Defines the [`KinematicsProvider`] boundary that constraint evaluation
//! consumes, and a reference implementation over a serial
//! [`KinematicChain`].
//!
//! # Architecture
//!
//! ```text
//! KinematicChain ──► KinematicsProvider ──► (pose, 6xN Jacobian)
//!                          ▲
//!                     ChainState (one per worker thread)
//! ```
//!
//! The chain is immutable and shared; each evaluating thread owns a
//! [`ChainState`] scratchpad that every query writes into.

pub mod chain;
pub mod error;
pub mod provider;
pub mod state;

pub use chain::{ChainJoint, JointKind, KinematicChain, LinkIndex};
pub use error::KinematicsError;
pub use provider::KinematicsProvider;
pub use state::ChainState;
