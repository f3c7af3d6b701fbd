//! Skeleton accessor trait and an array-backed implementation
//!
//! Every engine in the crate reads and writes joints through [`Skeleton`].
//! Joints a concrete skeleton does not have are reported as absent and are
//! skipped by callers; absence is never an error.

use crate::types::{JOINT_COUNT, JointId, JointPose};

/// Access to the local transforms of a skeleton's joints.
pub trait Skeleton {
    /// Number of leading joint slots this skeleton maps.
    ///
    /// Wire snapshot entries at or beyond this index are ignored.
    fn joint_count(&self) -> usize {
        JOINT_COUNT
    }

    /// Local transform of `joint`, or `None` when the skeleton lacks it.
    fn get(&self, joint: JointId) -> Option<JointPose>;

    /// Write the local transform of `joint`.
    ///
    /// Returns `false` when the skeleton lacks the joint.
    fn set(&mut self, joint: JointId, pose: JointPose) -> bool;

    /// Enable or disable whatever else animates this skeleton.
    ///
    /// Playback disables the external driver while a clip is loaded and
    /// re-enables it on stop. The default does nothing.
    fn set_external_driver(&mut self, _enabled: bool) {}
}

impl<S: Skeleton + ?Sized> Skeleton for &mut S {
    fn joint_count(&self) -> usize {
        (**self).joint_count()
    }

    fn get(&self, joint: JointId) -> Option<JointPose> {
        (**self).get(joint)
    }

    fn set(&mut self, joint: JointId, pose: JointPose) -> bool {
        (**self).set(joint, pose)
    }

    fn set_external_driver(&mut self, enabled: bool) {
        (**self).set_external_driver(enabled)
    }
}

/// Skeleton state stored in a fixed array indexed by joint ordinal.
#[derive(Debug, Clone)]
pub struct SkeletonState {
    joints: [Option<JointPose>; JOINT_COUNT],
    external_driver: bool,
}

impl Default for SkeletonState {
    fn default() -> Self {
        Self::full()
    }
}

impl SkeletonState {
    /// A skeleton with every joint present at the identity pose.
    pub fn full() -> Self {
        Self { joints: [Some(JointPose::IDENTITY); JOINT_COUNT], external_driver: true }
    }

    /// A skeleton with only the listed joints present.
    pub fn with_joints(present: &[JointId]) -> Self {
        let mut joints = [None; JOINT_COUNT];
        for joint in present {
            joints[joint.ordinal()] = Some(JointPose::IDENTITY);
        }
        Self { joints, external_driver: true }
    }

    /// Whether the external driver is currently allowed to animate this skeleton.
    pub fn external_driver_enabled(&self) -> bool {
        self.external_driver
    }

    pub fn has_joint(&self, joint: JointId) -> bool {
        self.joints[joint.ordinal()].is_some()
    }

    /// Present joints and their poses, in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, JointPose)> + '_ {
        JointId::ALL
            .iter()
            .zip(self.joints.iter())
            .filter_map(|(joint, pose)| pose.map(|pose| (*joint, pose)))
    }

    pub fn present_count(&self) -> usize {
        self.joints.iter().filter(|pose| pose.is_some()).count()
    }
}

impl Skeleton for SkeletonState {
    fn get(&self, joint: JointId) -> Option<JointPose> {
        self.joints[joint.ordinal()]
    }

    fn set(&mut self, joint: JointId, pose: JointPose) -> bool {
        match &mut self.joints[joint.ordinal()] {
            Some(slot) => {
                *slot = pose;
                true
            }
            None => false,
        }
    }

    fn set_external_driver(&mut self, enabled: bool) {
        self.external_driver = enabled;
    }
}
