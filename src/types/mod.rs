//! Core types for pose data representation.
//!
//! - [`JointId`] names the 91 tracked joints in wire order
//! - [`JointPose`] is one joint's local position and rotation
//! - [`Snapshot`] is one decoded datagram: poses in wire order
//! - [`Clip`] is a recorded animation with named joints per frame
//! - [`UpdateRate`] controls how often stream subscribers see snapshots
//!
//! ## Usage Example
//!
//! ```rust
//! use posecast::types::{JointId, JointPose, Quat, Snapshot, Vec3};
//!
//! let mut joints = vec![JointPose::IDENTITY; posecast::JOINT_COUNT];
//! joints[JointId::Hips.ordinal()] = JointPose::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY);
//!
//! let snapshot = Snapshot::new(joints);
//! assert_eq!(snapshot.get(JointId::Hips.ordinal()).unwrap().position.y, 1.0);
//! ```

mod clip;
mod joint;
mod pose;
mod update_rate;

pub use clip::{BoneData, Clip, Frame};
pub use joint::{JOINT_COUNT, JointId};
pub use pose::{JointPose, Quat, Snapshot, Vec3};
pub use update_rate::UpdateRate;
