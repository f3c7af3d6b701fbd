//! Clip playback state machine
//!
//! The engine keeps a playback clock in seconds. Each unpaused
//! [`PlaybackEngine::update`] advances it, converts it to a real-valued frame
//! index (`clock * frame_rate`), and applies either the frame at that index
//! (discrete mode) or a blend of it and the next frame (interpolated mode).
//! Steps and seeks always land exactly on a recorded frame.

use std::path::Path;
use tracing::{debug, info};

use crate::config::PlaybackConfig;
use crate::skeleton::Skeleton;
use crate::types::{Clip, Frame};
use crate::{PoseError, Result};

/// Slowest allowed playback speed multiplier
pub const MIN_SPEED: f32 = 0.1;

/// Fastest allowed playback speed multiplier
pub const MAX_SPEED: f32 = 10.0;

/// Frame indices this close to an integer are treated as that integer.
const FRAME_SNAP_EPSILON: f64 = 1e-4;

/// Player state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing { paused: bool },
}

impl PlaybackState {
    fn name(self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing { paused: false } => "playing",
            PlaybackState::Playing { paused: true } => "paused",
        }
    }
}

/// What a single [`PlaybackEngine::update`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackStatus {
    /// No clip is playing
    Stopped,
    /// Playing but paused; the clock did not move
    Paused,
    /// Frame `index` was applied verbatim
    Frame { index: usize },
    /// Frames `index` and `index + 1` were blended by `fraction`
    Blended { index: usize, fraction: f32 },
    /// The clip ran out during this update and playback stopped
    Finished,
}

/// Plays a [`Clip`] back onto a skeleton
#[derive(Debug)]
pub struct PlaybackEngine {
    clip: Option<Clip>,
    state: PlaybackState,
    clock: f64,
    current_frame: usize,
    interpolation: bool,
    speed: f32,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::with_config(&PlaybackConfig::default())
    }
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &PlaybackConfig) -> Self {
        Self {
            clip: None,
            state: PlaybackState::Stopped,
            clock: 0.0,
            current_frame: 0,
            interpolation: config.interpolation,
            speed: config.speed.clamp(MIN_SPEED, MAX_SPEED),
        }
    }

    /// Load a clip file and start playing it.
    ///
    /// On failure the engine is left exactly as it was.
    pub fn load<P: AsRef<Path>, S: Skeleton + ?Sized>(&mut self, source: P, skeleton: &mut S) -> Result<()> {
        let clip = Clip::load(source)?;
        self.load_clip(clip, skeleton)
    }

    /// Start playing an in-memory clip.
    ///
    /// The first frame is applied immediately and the skeleton's external
    /// driver is disabled until [`PlaybackEngine::stop`].
    pub fn load_clip<S: Skeleton + ?Sized>(&mut self, clip: Clip, skeleton: &mut S) -> Result<()> {
        if clip.is_empty() {
            return Err(PoseError::EmptyClip);
        }
        if !clip.frame_rate.is_finite() || clip.frame_rate <= 0.0 {
            return Err(PoseError::InvalidFrameRate { rate: clip.frame_rate });
        }

        info!(clip = %clip.clip_name, frames = clip.total_frames(), frame_rate = clip.frame_rate, "Playback started");

        skeleton.set_external_driver(false);
        clip.frames[0].apply(skeleton);

        self.clip = Some(clip);
        self.state = PlaybackState::Playing { paused: false };
        self.clock = 0.0;
        self.current_frame = 0;
        Ok(())
    }

    pub fn pause(&mut self) {
        if let PlaybackState::Playing { paused } = &mut self.state {
            *paused = true;
            debug!(frame = self.current_frame, "Playback paused");
        }
    }

    pub fn resume(&mut self) {
        if let PlaybackState::Playing { paused } = &mut self.state {
            *paused = false;
            debug!(frame = self.current_frame, "Playback resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing { paused: true } => self.resume(),
            PlaybackState::Playing { paused: false } => self.pause(),
            PlaybackState::Stopped => {}
        }
    }

    /// Pause and move one frame forward, stopping at the last frame.
    pub fn step_forward<S: Skeleton + ?Sized>(&mut self, skeleton: &mut S) -> Result<usize> {
        self.seek(self.current_frame.saturating_add(1), skeleton)
    }

    /// Pause and move one frame back, stopping at the first frame.
    pub fn step_backward<S: Skeleton + ?Sized>(&mut self, skeleton: &mut S) -> Result<usize> {
        self.seek(self.current_frame.saturating_sub(1), skeleton)
    }

    /// Pause on frame `index` (clamped to the clip) and apply it.
    ///
    /// Returns the frame index landed on.
    pub fn seek<S: Skeleton + ?Sized>(&mut self, index: usize, skeleton: &mut S) -> Result<usize> {
        let clip = match (&self.state, &self.clip) {
            (PlaybackState::Playing { .. }, Some(clip)) => clip,
            _ => return Err(PoseError::invalid_state("seek", self.state.name())),
        };

        let index = index.min(clip.total_frames() - 1);
        clip.frames[index].apply(skeleton);

        self.state = PlaybackState::Playing { paused: true };
        self.current_frame = index;
        self.clock = index as f64 / clip.frame_rate as f64;
        debug!(frame = index, clock = self.clock, "Seeked");
        Ok(index)
    }

    /// Stop playback and hand the skeleton back to its external driver.
    pub fn stop<S: Skeleton + ?Sized>(&mut self, skeleton: &mut S) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        self.state = PlaybackState::Stopped;
        skeleton.set_external_driver(true);
        info!(frame = self.current_frame, "Playback stopped");
    }

    /// Advance the clock by `dt` seconds (scaled by speed) and apply the result.
    pub fn update<S: Skeleton + ?Sized>(&mut self, dt: f32, skeleton: &mut S) -> PlaybackStatus {
        let (clip, paused) = match (&self.state, &self.clip) {
            (PlaybackState::Playing { paused }, Some(clip)) => (clip, *paused),
            _ => return PlaybackStatus::Stopped,
        };
        if paused {
            return PlaybackStatus::Paused;
        }

        if dt.is_finite() && dt > 0.0 {
            self.clock += dt as f64 * self.speed as f64;
        }

        let total = clip.total_frames();
        // Bounded before the cast so a huge clock cannot saturate the index.
        let exact = snap(self.clock * clip.frame_rate as f64).min(total as f64);
        let index = exact.floor() as usize;
        let last = if self.interpolation { index.saturating_add(1) } else { index };

        if last >= total {
            self.current_frame = total - 1;
            self.stop(skeleton);
            return PlaybackStatus::Finished;
        }
        self.current_frame = index;

        if self.interpolation {
            let fraction = (exact - index as f64) as f32;
            apply_blended(&clip.frames[index], &clip.frames[index + 1], fraction, skeleton);
            PlaybackStatus::Blended { index, fraction }
        } else {
            clip.frames[index].apply(skeleton);
            PlaybackStatus::Frame { index }
        }
    }

    pub fn set_interpolation(&mut self, enabled: bool) {
        self.interpolation = enabled;
    }

    pub fn interpolation(&self) -> bool {
        self.interpolation
    }

    /// Set the clock multiplier, clamped to `[MIN_SPEED, MAX_SPEED]`.
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_nan() {
            return;
        }
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    /// Frame index from the last update or step
    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    /// Frames in the loaded clip, 0 when nothing has been loaded
    pub fn total_frames(&self) -> usize {
        self.clip.as_ref().map_or(0, Clip::total_frames)
    }

    /// Playback clock in seconds
    pub fn playback_time(&self) -> f32 {
        self.clock as f32
    }

    pub fn duration(&self) -> f32 {
        self.clip.as_ref().map_or(0.0, Clip::duration)
    }

    /// Most recently loaded clip; kept after stop
    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }
}

fn snap(exact: f64) -> f64 {
    let nearest = exact.round();
    if (exact - nearest).abs() < FRAME_SNAP_EPSILON { nearest } else { exact }
}

/// Blend `from` towards `to` joint by joint.
///
/// Entries are matched by joint; entries of `from` with no counterpart in
/// `to` are skipped.
fn apply_blended<S: Skeleton + ?Sized>(from: &Frame, to: &Frame, fraction: f32, skeleton: &mut S) {
    for (position, bone) in from.bone_data.iter().enumerate() {
        if let Some(next) = to.find(bone.joint, position) {
            skeleton.set(bone.joint, bone.pose().interpolate(&next.pose(), fraction));
        }
    }
}
