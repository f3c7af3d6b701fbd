//! Runtime configuration
//!
//! Every section has defaults, so a config file only needs the keys it
//! changes:
//!
//! ```yaml
//! ingest:
//!   port: 9000
//! recording:
//!   frameRate: 60.0
//!   outputDir: captures
//! playback:
//!   interpolation: false
//! ```

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::codec::{self, MAX_DATAGRAM_SIZE};
use crate::playback::{MAX_SPEED, MIN_SPEED};
use crate::{DEFAULT_PORT, PoseError, Result};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PosecastConfig {
    pub ingest: IngestConfig,
    pub recording: RecordingConfig,
    pub playback: PlaybackConfig,
}

impl PosecastConfig {
    /// Load and validate a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document =
            std::fs::read_to_string(path).map_err(|e| PoseError::file_error(path.to_path_buf(), e))?;
        let config = Self::from_yaml(&document)?;
        debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(document: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(document)
            .map_err(|e| PoseError::config(format!("invalid config document: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.ingest.validate()?;
        self.recording.validate()?;
        self.playback.validate()
    }
}

/// Network receive settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestConfig {
    /// Address to bind; all interfaces by default
    pub bind_address: IpAddr,

    /// UDP port; 0 picks an ephemeral port
    pub port: u16,

    /// Receive buffer size in bytes
    pub receive_buffer: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            receive_buffer: MAX_DATAGRAM_SIZE,
        }
    }
}

impl IngestConfig {
    fn validate(&self) -> Result<()> {
        let min = codec::encoded_len(0);
        if !(min..=MAX_DATAGRAM_SIZE).contains(&self.receive_buffer) {
            return Err(PoseError::config(format!(
                "ingest.receiveBuffer must be between {} and {} bytes, got {}",
                min, MAX_DATAGRAM_SIZE, self.receive_buffer
            )));
        }
        Ok(())
    }
}

/// Recording settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordingConfig {
    /// Frames captured per second of recording
    pub frame_rate: f32,

    /// Directory new clips are written to
    pub output_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self { frame_rate: 30.0, output_dir: PathBuf::from(".") }
    }
}

impl RecordingConfig {
    /// Destination for a clip named `clip_name`.
    pub fn clip_path(&self, clip_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.yaml", clip_name))
    }

    fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(PoseError::config(format!(
                "recording.frameRate must be a positive number, got {}",
                self.frame_rate
            )));
        }
        Ok(())
    }
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackConfig {
    /// Blend neighbouring frames instead of stepping
    pub interpolation: bool,

    /// Clock multiplier
    pub speed: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { interpolation: true, speed: 1.0 }
    }
}

impl PlaybackConfig {
    fn validate(&self) -> Result<()> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(PoseError::config(format!(
                "playback.speed must be between {} and {}, got {}",
                MIN_SPEED, MAX_SPEED, self.speed
            )));
        }
        Ok(())
    }
}
