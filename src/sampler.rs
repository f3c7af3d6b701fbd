//! Tick-driven consumer of the ingest mailbox

use tracing::{trace, warn};

use crate::mailbox::Mailbox;
use crate::skeleton::Skeleton;
use crate::types::{JOINT_COUNT, JointId, Snapshot};

/// Applies at most one received snapshot per tick to a skeleton
#[derive(Debug)]
pub struct Sampler {
    mailbox: Mailbox,
    applied: u64,
    warned_count_mismatch: bool,
}

impl Sampler {
    pub fn new(mailbox: Mailbox) -> Self {
        Self { mailbox, applied: 0, warned_count_mismatch: false }
    }

    /// Drain the mailbox once and apply the snapshot, if any.
    ///
    /// Returns whether a snapshot was applied.
    pub fn tick<S: Skeleton + ?Sized>(&mut self, skeleton: &mut S) -> bool {
        let Some(snapshot) = self.mailbox.drain() else {
            return false;
        };

        if snapshot.len() != JOINT_COUNT && !self.warned_count_mismatch {
            self.warned_count_mismatch = true;
            warn!(
                received = snapshot.len(),
                expected = JOINT_COUNT,
                "Snapshot joint count differs from the local skeleton; sender may use a different joint order"
            );
        }

        let written = apply_snapshot(&snapshot, skeleton);
        self.applied += 1;
        trace!(written, applied = self.applied, "Applied snapshot");
        true
    }

    /// Number of snapshots applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

/// Write entry `i` of `snapshot` to the joint with ordinal `i`.
///
/// Entries beyond the skeleton's joint count are ignored, as are joints the
/// skeleton lacks. Returns how many joints were written.
pub fn apply_snapshot<S: Skeleton + ?Sized>(snapshot: &Snapshot, skeleton: &mut S) -> usize {
    let limit = snapshot.len().min(skeleton.joint_count());
    snapshot
        .iter()
        .take(limit)
        .zip(JointId::ALL)
        .filter(|(pose, joint)| skeleton.set(*joint, **pose))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::mailbox;
    use crate::skeleton::SkeletonState;
    use crate::types::{JointPose, Quat, Vec3};

    fn pose(x: f32) -> JointPose {
        JointPose::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)
    }

    fn full_snapshot(x: f32) -> Snapshot {
        Snapshot::new((0..JOINT_COUNT).map(|i| pose(x + i as f32)).collect())
    }

    #[test]
    fn applies_latest_snapshot_once() {
        let (publisher, mailbox) = mailbox();
        let mut sampler = Sampler::new(mailbox);
        let mut skeleton = SkeletonState::full();

        assert!(!sampler.tick(&mut skeleton));

        publisher.publish(full_snapshot(0.0));
        publisher.publish(full_snapshot(100.0));
        assert!(sampler.tick(&mut skeleton));
        assert!(!sampler.tick(&mut skeleton));

        assert_eq!(skeleton.get(JointId::Root), Some(pose(100.0)));
        assert_eq!(skeleton.get(JointId::Hips), Some(pose(101.0)));
        assert_eq!(sampler.applied(), 1);
    }

    #[test]
    fn short_snapshot_leaves_remaining_joints() {
        let mut skeleton = SkeletonState::full();
        let snapshot = Snapshot::new(vec![pose(1.0), pose(2.0)]);

        assert_eq!(apply_snapshot(&snapshot, &mut skeleton), 2);
        assert_eq!(skeleton.get(JointId::Hips), Some(pose(2.0)));
        assert_eq!(skeleton.get(JointId::LeftUpLeg), Some(JointPose::IDENTITY));
    }

    #[test]
    fn oversized_snapshot_is_truncated() {
        let mut skeleton = SkeletonState::full();
        let snapshot = Snapshot::new((0..JOINT_COUNT + 10).map(|i| pose(i as f32)).collect());

        assert_eq!(apply_snapshot(&snapshot, &mut skeleton), JOINT_COUNT);
        assert_eq!(skeleton.get(JointId::ALL[JOINT_COUNT - 1]), Some(pose((JOINT_COUNT - 1) as f32)));
    }

    #[test]
    fn absent_joints_are_skipped() {
        let mut skeleton = SkeletonState::with_joints(&[JointId::Hips]);
        let written = apply_snapshot(&full_snapshot(0.0), &mut skeleton);

        assert_eq!(written, 1);
        assert_eq!(skeleton.get(JointId::Hips), Some(pose(1.0)));
        assert_eq!(skeleton.get(JointId::Root), None);
    }
}
