//! Synthetic pose data for tests and benchmarks
//!
//! Everything here is deterministic so assertions can compare exact values.

#![cfg(any(test, feature = "benchmark"))]

use std::net::{IpAddr, Ipv4Addr};

use crate::config::IngestConfig;
use crate::skeleton::{Skeleton, SkeletonState};
use crate::types::{Clip, Frame, JOINT_COUNT, JointId, JointPose, Quat, Snapshot, Vec3};

/// Ingest settings bound to an ephemeral loopback port.
pub fn loopback_config() -> IngestConfig {
    IngestConfig { bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: 0, ..IngestConfig::default() }
}

/// Pose of `joint` at time `t` in a simple periodic motion.
pub fn sample_pose(joint: JointId, t: f32) -> JointPose {
    let phase = t * std::f32::consts::TAU + joint.ordinal() as f32 * 0.1;
    JointPose::new(
        Vec3::new(phase.sin() * 0.1, joint.ordinal() as f32 * 0.01, phase.cos() * 0.1),
        Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), phase.sin() * 0.5),
    )
}

/// A full skeleton posed at time `t`.
pub fn posed_skeleton(t: f32) -> SkeletonState {
    let mut skeleton = SkeletonState::full();
    for joint in JointId::ALL {
        skeleton.set(joint, sample_pose(joint, t));
    }
    skeleton
}

/// A full-length snapshot posed at time `t`.
pub fn sample_snapshot(t: f32) -> Snapshot {
    Snapshot::new(JointId::ALL.iter().map(|joint| sample_pose(*joint, t)).collect())
}

/// A clip of `frames` full-skeleton frames sampled at `frame_rate`.
pub fn sample_clip(frames: usize, frame_rate: f32) -> Clip {
    let mut clip = Clip::new("synthetic", frame_rate);
    clip.frames = (0..frames)
        .map(|i| {
            let t = i as f32 / frame_rate;
            Frame::capture(&posed_skeleton(t), t)
        })
        .collect();
    debug_assert!(clip.frames.iter().all(|f| f.bone_data.len() == JOINT_COUNT));
    clip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_deterministic() {
        assert_eq!(sample_snapshot(0.25), sample_snapshot(0.25));
        assert_ne!(sample_snapshot(0.25), sample_snapshot(0.5));
        assert_eq!(sample_clip(4, 30.0).total_frames(), 4);
    }

    #[test]
    fn snapshot_matches_posed_skeleton() {
        assert_eq!(Snapshot::capture(&posed_skeleton(0.4)), sample_snapshot(0.4));
    }
}
