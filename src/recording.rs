//! Fixed-rate clip recording
//!
//! The recorder rides on a variable-rate tick: each [`RecordingEngine::update`]
//! adds the tick's elapsed time to an accumulator, and a frame is captured
//! whenever a full sampling period has built up. Overshoot past the period
//! carries into the next one so irregular ticks still average out to the
//! requested rate.

use chrono::Local;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::skeleton::Skeleton;
use crate::types::{Clip, Frame};
use crate::{PoseError, Result};

/// Slack when comparing the accumulator against one period, in seconds
const PERIOD_EPSILON: f64 = 1e-6;

/// Recorder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

impl RecordingState {
    fn name(self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
        }
    }
}

#[derive(Debug)]
struct Session {
    clip: Clip,
    period: f64,
    accumulator: f64,
    clock: f64,
}

/// Samples a skeleton into a [`Clip`] at a fixed rate
#[derive(Debug, Default)]
pub struct RecordingEngine {
    session: Option<Session>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Record_YYYYMMDD_HHMMSS` in local time.
    pub fn default_clip_name() -> String {
        format!("Record_{}", Local::now().format("%Y%m%d_%H%M%S"))
    }

    pub fn state(&self) -> RecordingState {
        if self.session.is_some() { RecordingState::Recording } else { RecordingState::Idle }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a new clip.
    pub fn start(&mut self, frame_rate: f32, clip_name: impl Into<String>) -> Result<()> {
        if self.session.is_some() {
            return Err(PoseError::invalid_state("start recording", self.state().name()));
        }
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(PoseError::InvalidFrameRate { rate: frame_rate });
        }

        let clip = Clip::new(clip_name, frame_rate);
        info!(clip = %clip.clip_name, frame_rate, "Recording started");
        self.session = Some(Session { clip, period: 1.0 / frame_rate as f64, accumulator: 0.0, clock: 0.0 });
        Ok(())
    }

    /// Advance by `dt` seconds, capturing a frame when a period has elapsed.
    ///
    /// At most one frame is captured per call. Returns whether one was.
    pub fn update<S: Skeleton + ?Sized>(&mut self, dt: f32, skeleton: &S) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }

        session.clock += dt as f64;
        session.accumulator += dt as f64;
        if session.accumulator + PERIOD_EPSILON < session.period {
            return false;
        }

        // Keep the overshoot, but never more than one period of backlog.
        session.accumulator = (session.accumulator - session.period).clamp(0.0, session.period);

        let frame = Frame::capture(skeleton, session.clock as f32);
        debug!(
            frame = session.clip.frames.len(),
            time_stamp = frame.time_stamp,
            joints = frame.bone_data.len(),
            "Captured frame"
        );
        session.clip.frames.push(frame);
        true
    }

    /// Frames captured in the current session
    pub fn frame_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.clip.frames.len())
    }

    /// The clip being recorded
    pub fn clip(&self) -> Option<&Clip> {
        self.session.as_ref().map(|s| &s.clip)
    }

    /// End the session and write the clip to `destination`.
    ///
    /// The recorder is idle afterwards even when the write fails.
    pub fn stop<P: AsRef<Path>>(&mut self, destination: P) -> Result<Clip> {
        let clip = self
            .stop_discard()
            .ok_or_else(|| PoseError::invalid_state("stop recording", RecordingState::Idle.name()))?;

        if let Err(e) = clip.save(destination.as_ref()) {
            warn!(clip = %clip.clip_name, "Failed to save recording: {}", e);
            return Err(e);
        }
        Ok(clip)
    }

    /// End the session without writing anything.
    pub fn stop_discard(&mut self) -> Option<Clip> {
        let session = self.session.take()?;
        info!(
            clip = %session.clip.clip_name,
            frames = session.clip.frames.len(),
            seconds = session.clock,
            "Recording stopped"
        );
        Some(session.clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::SkeletonState;
    use crate::types::{JOINT_COUNT, JointId, JointPose, Quat, Vec3};
    use proptest::prelude::*;

    fn recording(rate: f32) -> RecordingEngine {
        let mut engine = RecordingEngine::new();
        engine.start(rate, "test").unwrap();
        engine
    }

    #[test]
    fn captures_at_fixed_rate() {
        let mut engine = recording(30.0);
        let skeleton = SkeletonState::full();

        let captured = (0..60).filter(|_| engine.update(1.0 / 30.0, &skeleton)).count();
        assert_eq!(captured, 60);

        let clip = engine.stop_discard().unwrap();
        assert_eq!(clip.frame_rate, 30.0);
        assert_eq!(clip.frames.len(), 60);
        assert!(clip.frames.iter().all(|f| f.bone_data.len() == JOINT_COUNT));
        assert!((clip.frames[59].time_stamp - 2.0).abs() < 1e-4);
    }

    #[test]
    fn fast_ticks_capture_once_per_period() {
        let mut engine = recording(10.0);
        let skeleton = SkeletonState::full();

        let captured = (0..100).filter(|_| engine.update(0.01, &skeleton)).count();
        assert_eq!(captured, 10);
    }

    #[test]
    fn timestamps_increase() {
        let mut engine = recording(20.0);
        let skeleton = SkeletonState::full();
        for dt in [0.03, 0.02, 0.07, 0.01, 0.05, 0.04] {
            engine.update(dt, &skeleton);
        }

        let clip = engine.clip().unwrap();
        assert!(clip.frames.windows(2).all(|w| w[0].time_stamp < w[1].time_stamp));
    }

    #[test]
    fn timestamps_restart_with_each_session() {
        let mut engine = recording(10.0);
        let skeleton = SkeletonState::full();
        for _ in 0..50 {
            engine.update(0.1, &skeleton);
        }
        engine.stop_discard().unwrap();

        engine.start(10.0, "second").unwrap();
        engine.update(0.1, &skeleton);
        let clip = engine.stop_discard().unwrap();
        assert!((clip.frames[0].time_stamp - 0.1).abs() < 1e-4);
    }

    #[test]
    fn captures_only_present_joints() {
        let mut engine = recording(1.0);
        let mut skeleton = SkeletonState::with_joints(&[JointId::Hips, JointId::Head]);
        let pose = JointPose::new(Vec3::new(0.0, 1.5, 0.0), Quat::IDENTITY);
        skeleton.set(JointId::Head, pose);

        assert!(engine.update(1.0, &skeleton));
        let frame = &engine.clip().unwrap().frames[0];
        assert_eq!(frame.bone_data.len(), 2);
        assert_eq!(frame.find(JointId::Head, 1).map(|b| b.pose()), Some(pose));
    }

    #[test]
    fn idle_update_is_a_no_op() {
        let mut engine = RecordingEngine::new();
        assert!(!engine.update(1.0, &SkeletonState::full()));
        assert_eq!(engine.state(), RecordingState::Idle);
        assert!(engine.stop_discard().is_none());
    }

    #[test]
    fn rejects_bad_frame_rates() {
        let mut engine = RecordingEngine::new();
        for rate in [0.0, -30.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(engine.start(rate, "bad"), Err(PoseError::InvalidFrameRate { .. })));
        }
        assert_eq!(engine.state(), RecordingState::Idle);
    }

    #[test]
    fn rejects_double_start() {
        let mut engine = recording(30.0);
        let err = engine.start(30.0, "again").unwrap_err();
        assert!(matches!(err, PoseError::InvalidState { .. }));
        assert_eq!(engine.clip().unwrap().clip_name, "test");
    }

    #[test]
    fn stop_writes_clip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("take.yaml");
        let mut engine = recording(30.0);
        let skeleton = SkeletonState::full();
        for _ in 0..3 {
            engine.update(1.0 / 30.0, &skeleton);
        }

        let clip = engine.stop(&path)?;
        assert_eq!(engine.state(), RecordingState::Idle);
        assert_eq!(Clip::load(&path)?, clip);
        Ok(())
    }

    #[test]
    fn failed_write_still_goes_idle() {
        let mut engine = recording(30.0);
        let err = engine.stop("/nonexistent-dir/take.yaml").unwrap_err();
        assert!(matches!(err, PoseError::File { .. }));
        assert_eq!(engine.state(), RecordingState::Idle);
    }

    #[test]
    fn stop_while_idle_is_invalid() {
        let mut engine = RecordingEngine::new();
        assert!(matches!(engine.stop("unused.yaml"), Err(PoseError::InvalidState { .. })));
    }

    #[test]
    fn default_name_has_timestamp_shape() {
        let name = RecordingEngine::default_clip_name();
        let stamp = name.strip_prefix("Record_").unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    proptest! {
        #[test]
        fn irregular_ticks_keep_the_rate(
            rate in prop::sample::select(vec![10.0f32, 24.0, 30.0, 60.0]),
            k in 1usize..120,
            weights in prop::collection::vec(0.2f64..1.0, 1..400),
        ) {
            // Ticks no longer than one period, summing to k periods.
            let total = k as f64 / rate as f64;
            let period = 1.0 / rate as f64;
            let mut ticks = Vec::new();
            let mut remaining = total;
            let mut i = 0;
            while remaining > 1e-9 {
                let dt = (weights[i % weights.len()] * period).min(remaining);
                ticks.push(dt as f32);
                remaining -= dt;
                i += 1;
            }

            let mut engine = recording(rate);
            let skeleton = SkeletonState::with_joints(&[JointId::Hips]);
            for dt in ticks {
                engine.update(dt, &skeleton);
            }

            let frames = engine.frame_count() as i64;
            prop_assert!((frames - k as i64).abs() <= 1, "expected {} ± 1 frames, got {}", k, frames);
        }
    }
}
