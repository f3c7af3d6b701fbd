//! Per-joint speed estimation

use crate::skeleton::Skeleton;
use crate::types::{JOINT_COUNT, JointId, Vec3};

/// Tracks each joint's local-position speed between successive ticks
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    last_positions: [Option<Vec3>; JOINT_COUNT],
    speeds: [f32; JOINT_COUNT],
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self { last_positions: [None; JOINT_COUNT], speeds: [0.0; JOINT_COUNT] }
    }
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample every joint of `skeleton` after `dt` seconds.
    ///
    /// Non-positive `dt` is ignored. A joint seen for the first time has
    /// speed zero.
    pub fn update<S: Skeleton + ?Sized>(&mut self, dt: f32, skeleton: &S) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }

        for joint in JointId::ALL.iter().take(skeleton.joint_count()) {
            let i = joint.ordinal();
            match skeleton.get(*joint) {
                Some(pose) => {
                    self.speeds[i] = self.last_positions[i]
                        .map_or(0.0, |last| pose.position.distance(last) / dt);
                    self.last_positions[i] = Some(pose.position);
                }
                None => {
                    self.speeds[i] = 0.0;
                    self.last_positions[i] = None;
                }
            }
        }
    }

    /// Speed of `joint` in units per second as of the last update.
    pub fn speed(&self, joint: JointId) -> f32 {
        self.speeds[joint.ordinal()]
    }

    /// The fastest joint, if any is moving.
    pub fn fastest(&self) -> Option<(JointId, f32)> {
        JointId::ALL
            .iter()
            .zip(self.speeds)
            .filter(|(_, speed)| *speed > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(joint, speed)| (*joint, speed))
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
