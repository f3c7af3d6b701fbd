//! Skeleton pose streaming, recording and playback.
//!
//! posecast moves full-body pose snapshots between processes over UDP and
//! records them to clip files that can be replayed with discrete or
//! interpolated playback.
//!
//! # Features
//!
//! - **Wire codec**: compact little-endian snapshot format, 91 joints per datagram
//! - **Live ingest**: background receive task with a latest-wins mailbox
//! - **Recording**: fixed-rate sampling on top of a variable-rate tick
//! - **Playback**: pause, step, seek, speed and interpolation control
//!
//! # Quick Start
//!
//! The tick loop drains at most one snapshot per tick:
//!
//! ```rust,no_run
//! use posecast::{Posecast, Sampler, SkeletonState};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> posecast::Result<()> {
//!     let ingestor = Posecast::listen(posecast::DEFAULT_PORT).await?;
//!     let mut sampler = Sampler::new(ingestor.mailbox());
//!     let mut skeleton = SkeletonState::full();
//!
//!     let mut tick = tokio::time::interval(Duration::from_millis(16));
//!     loop {
//!         tick.tick().await;
//!         if sampler.tick(&mut skeleton) {
//!             // render skeleton...
//!         }
//!     }
//! }
//! ```

// Core types and error handling
pub mod codec;
pub mod config;
mod error;
pub mod skeleton;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Network ingestion
pub mod ingestor;
pub mod mailbox;
pub mod provider;
pub mod providers;
pub mod sampler;
pub mod sender;
pub mod stream;

// Tick-driven engines
pub mod motion;
pub mod playback;
pub mod recording;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use config::{IngestConfig, PlaybackConfig, PosecastConfig, RecordingConfig};
pub use ingestor::{IngestStats, Ingestor};
pub use mailbox::Mailbox;
pub use motion::VelocityTracker;
pub use playback::{PlaybackEngine, PlaybackState, PlaybackStatus};
pub use recording::{RecordingEngine, RecordingState};
pub use sampler::Sampler;
pub use sender::PoseSender;
pub use skeleton::{Skeleton, SkeletonState};

/// UDP port senders and receivers use unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8080;

/// Unified entry point for pose sources.
///
/// Both constructors return an [`Ingestor`], so a tick loop consumes a live
/// sender and a recorded clip the same way.
pub struct Posecast;

impl Posecast {
    /// Receive live snapshots on `0.0.0.0:port`.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::Bind`] if the port is unavailable.
    pub async fn listen(port: u16) -> Result<Ingestor> {
        Ingestor::start(port).await
    }

    /// Receive live snapshots with full ingest settings.
    pub async fn listen_with(config: &IngestConfig) -> Result<Ingestor> {
        Ingestor::start_with(config).await
    }

    /// Replay a clip file as if it were a live sender.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a clip, or has no
    /// frames.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use posecast::Posecast;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> posecast::Result<()> {
    /// let mut ingestor = Posecast::replay("Record_20260101_120000.yaml")?;
    /// let latest = ingestor.drain();
    /// # Ok(())
    /// # }
    /// ```
    pub fn replay<P: AsRef<std::path::Path>>(path: P) -> Result<Ingestor> {
        let clip = Clip::load(path)?;
        let provider = providers::ClipProvider::new(clip)?;
        Ok(Ingestor::spawn(provider))
    }
}
