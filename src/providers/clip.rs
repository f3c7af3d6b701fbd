//! Clip replay provider
//!
//! Emits the frames of a recorded clip as wire snapshots, paced at the
//! clip's frame rate. Used to drive a receiver from a recording without a
//! live sender.

use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::playback::{MAX_SPEED, MIN_SPEED};
use crate::provider::PoseProvider;
use crate::types::{Clip, Snapshot};
use crate::{PoseError, Result};

/// Provider that replays a clip frame by frame
pub struct ClipProvider {
    clip: Clip,

    /// Next frame to emit
    position: usize,

    /// Playback speed multiplier (1.0 = recorded rate)
    speed: f64,

    /// Restart from the first frame after the last
    looping: bool,

    /// Frame pacing interval
    interval: Interval,
}

impl ClipProvider {
    /// Create a provider for a non-empty clip.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(clip: Clip) -> Result<Self> {
        if clip.is_empty() {
            return Err(PoseError::EmptyClip);
        }
        if !clip.frame_rate.is_finite() || clip.frame_rate <= 0.0 {
            return Err(PoseError::InvalidFrameRate { rate: clip.frame_rate });
        }

        let interval = pacing(clip.frame_rate, 1.0)?;
        info!(clip = %clip.clip_name, frames = clip.total_frames(), frame_rate = clip.frame_rate, "Replaying clip");
        Ok(Self { clip, position: 0, speed: 1.0, looping: false, interval })
    }

    /// Restart from the first frame instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set playback speed, clamped to the playback engine's range.
    ///
    /// Fails, leaving the current speed in place, when the resulting frame
    /// period is not representable.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        let speed = speed.clamp(MIN_SPEED as f64, MAX_SPEED as f64);
        self.interval = pacing(self.clip.frame_rate, speed)?;
        self.speed = speed;
        debug!("Clip replay speed set to {}x", self.speed);
        Ok(())
    }

    /// Index of the next frame to emit
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Frame interval at `frame_rate * speed`. The period must be non-zero and fit a `Duration`.
fn pacing(frame_rate: f32, speed: f64) -> Result<Interval> {
    let period = Duration::try_from_secs_f64(1.0 / (frame_rate as f64 * speed))
        .ok()
        .filter(|period| !period.is_zero())
        .ok_or(PoseError::InvalidFrameRate { rate: frame_rate })?;

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Ok(interval)
}

#[async_trait::async_trait]
impl PoseProvider for ClipProvider {
    async fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        if self.position >= self.clip.total_frames() {
            if !self.looping {
                debug!("Reached end of clip");
                return Ok(None);
            }
            self.position = 0;
        }

        self.interval.tick().await;

        let frame = &self.clip.frames[self.position];
        trace!(frame = self.position, total = self.clip.total_frames(), time_stamp = frame.time_stamp, "Replaying frame");
        self.position += 1;
        Ok(Some(frame.to_snapshot()))
    }

    fn describe(&self) -> String {
        format!("clip://{}", self.clip.clip_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoneData, Frame, JOINT_COUNT, JointId, JointPose, Quat, Vec3};

    fn clip(frames: usize) -> Clip {
        let mut clip = Clip::new("walk", 30.0);
        for i in 0..frames {
            clip.frames.push(Frame {
                time_stamp: i as f32 / 30.0,
                bone_data: vec![BoneData::new(
                    JointId::Hips,
                    JointPose::new(Vec3::new(i as f32, 0.0, 0.0), Quat::IDENTITY),
                )],
            });
        }
        clip
    }

    #[tokio::test(start_paused = true)]
    async fn emits_each_frame_then_ends() {
        let mut provider = ClipProvider::new(clip(3)).unwrap();

        for i in 0..3 {
            let snapshot = provider.next_snapshot().await.unwrap().unwrap();
            assert_eq!(snapshot.len(), JOINT_COUNT);
            assert_eq!(snapshot.get(JointId::Hips.ordinal()).unwrap().position.x, i as f32);
            assert_eq!(snapshot.get(JointId::Root.ordinal()), Some(&JointPose::IDENTITY));
        }
        assert!(provider.next_snapshot().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn looping_restarts() {
        let mut provider = ClipProvider::new(clip(2)).unwrap().looping(true);
        for _ in 0..5 {
            assert!(provider.next_snapshot().await.unwrap().is_some());
        }
        assert_eq!(provider.position(), 1);
    }

    #[tokio::test]
    async fn rejects_unrepresentable_frame_periods() {
        for rate in [1e10, 1e-30, f32::MAX] {
            let mut extreme = clip(1);
            extreme.frame_rate = rate;
            assert!(
                matches!(ClipProvider::new(extreme), Err(PoseError::InvalidFrameRate { .. })),
                "frame rate {} should be rejected",
                rate
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_keeps_pacing_when_period_collapses() {
        let mut fast = clip(2);
        fast.frame_rate = 5e8;
        let mut provider = ClipProvider::new(fast).unwrap();

        // 5e8 fps at 10x would need a sub-nanosecond period.
        assert!(matches!(provider.set_speed(10.0), Err(PoseError::InvalidFrameRate { .. })));
        assert!(provider.set_speed(0.5).is_ok());
        assert!(provider.next_snapshot().await.unwrap().is_some());
    }

    #[test]
    fn rejects_empty_clip() {
        assert!(matches!(ClipProvider::new(Clip::new("empty", 30.0)), Err(PoseError::EmptyClip)));
    }
}
