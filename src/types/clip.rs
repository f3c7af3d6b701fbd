//! Recorded clips and their persisted document format
//!
//! A clip is written as a YAML document with camelCase keys:
//!
//! ```text
//! clipName: Record_20260101_120000
//! frameRate: 30.0
//! frames:
//!   - timeStamp: 0.033333335
//!     boneDataList:
//!       - boneType: hips_joint
//!         localPosition: { x: 0.0, y: 1.0, z: 0.0 }
//!         localRotation: { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
//! ```
//!
//! `boneType` may be a joint name or an integer ordinal. Entries whose
//! `boneType` is missing or not a known joint are dropped on load rather than
//! failing the whole clip. JSON documents with the same keys load as well.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::joint::{JOINT_COUNT, JointId};
use super::pose::{JointPose, Quat, Snapshot, Vec3};
use crate::skeleton::Skeleton;
use crate::{PoseError, Result};

/// Transform of one joint inside a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoneData {
    #[serde(rename = "boneType")]
    pub joint: JointId,
    pub local_position: Vec3,
    pub local_rotation: Quat,
}

impl BoneData {
    pub fn new(joint: JointId, pose: JointPose) -> Self {
        Self { joint, local_position: pose.position, local_rotation: pose.rotation }
    }

    pub fn pose(&self) -> JointPose {
        JointPose::new(self.local_position, self.local_rotation)
    }
}

/// One timestamped full-skeleton sample, tagged per joint.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Seconds since the recording started. Clip-relative, not scene time.
    pub time_stamp: f32,
    #[serde(rename = "boneDataList")]
    pub bone_data: Vec<BoneData>,
}

impl Frame {
    /// Capture every joint the skeleton currently exposes.
    pub fn capture<S: Skeleton + ?Sized>(skeleton: &S, time_stamp: f32) -> Self {
        let bone_data = JointId::ALL
            .iter()
            .take(skeleton.joint_count())
            .filter_map(|joint| skeleton.get(*joint).map(|pose| BoneData::new(*joint, pose)))
            .collect();
        Self { time_stamp, bone_data }
    }

    /// Write every entry verbatim; joints the skeleton lacks are skipped.
    pub fn apply<S: Skeleton + ?Sized>(&self, skeleton: &mut S) {
        for bone in &self.bone_data {
            skeleton.set(bone.joint, bone.pose());
        }
    }

    /// Lay the frame out positionally for the wire.
    ///
    /// Joints the frame does not mention are sent as [`JointPose::IDENTITY`].
    pub fn to_snapshot(&self) -> Snapshot {
        let mut joints = vec![JointPose::IDENTITY; JOINT_COUNT];
        for bone in &self.bone_data {
            joints[bone.joint.ordinal()] = bone.pose();
        }
        Snapshot::new(joints)
    }

    /// Entry for `joint`, checking `hint` first.
    pub(crate) fn find(&self, joint: JointId, hint: usize) -> Option<&BoneData> {
        match self.bone_data.get(hint) {
            Some(bone) if bone.joint == joint => Some(bone),
            _ => self.bone_data.iter().find(|bone| bone.joint == joint),
        }
    }
}

/// A named, rate-tagged sequence of frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub clip_name: String,
    /// Intended sampling rate in Hz
    pub frame_rate: f32,
    pub frames: Vec<Frame>,
}

impl Clip {
    /// Create an empty clip.
    pub fn new(clip_name: impl Into<String>, frame_rate: f32) -> Self {
        Self { clip_name: clip_name.into(), frame_rate, frames: Vec::new() }
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Nominal duration in seconds at the clip's frame rate.
    pub fn duration(&self) -> f32 {
        if self.frame_rate > 0.0 { self.frames.len() as f32 / self.frame_rate } else { 0.0 }
    }

    /// Parse a clip document.
    pub fn from_yaml(document: &str) -> Result<Self> {
        let raw: RawClip = serde_yaml_ng::from_str(document)
            .map_err(|e| PoseError::parse("clip document", e.to_string()))?;
        raw.resolve()
    }

    /// Serialize to the clip document format.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| PoseError::parse("clip serialization", e.to_string()))
    }

    /// Load a clip from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = fs::read_to_string(path)
            .map_err(|e| PoseError::file_error(path.to_path_buf(), e))?;
        let clip = Self::from_yaml(&document)?;
        info!(
            clip = %clip.clip_name,
            frames = clip.frames.len(),
            frame_rate = clip.frame_rate,
            "Loaded clip from {}",
            path.display()
        );
        Ok(clip)
    }

    /// Write the clip to disk, replacing any existing file.
    ///
    /// A failed write may leave the destination absent or truncated.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let document = self.to_yaml()?;
        fs::write(path, document).map_err(|e| PoseError::file_error(path.to_path_buf(), e))?;
        info!(clip = %self.clip_name, frames = self.frames.len(), "Saved clip to {}", path.display());
        Ok(())
    }
}

// On-disk shape, tolerant of unknown joints.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClip {
    #[serde(default)]
    clip_name: String,
    frame_rate: f32,
    #[serde(default)]
    frames: Vec<RawFrame>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    #[serde(default)]
    time_stamp: f32,
    #[serde(default)]
    bone_data_list: Vec<RawBoneData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoneData {
    #[serde(default)]
    bone_type: Option<serde_yaml_ng::Value>,
    #[serde(default)]
    local_position: Vec3,
    #[serde(default)]
    local_rotation: Quat,
}

impl RawClip {
    fn resolve(self) -> Result<Clip> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(PoseError::parse(
                "clip document",
                format!("frameRate must be positive, found {}", self.frame_rate),
            ));
        }

        let mut skipped = 0usize;
        let frames = self
            .frames
            .into_iter()
            .map(|raw| {
                let bone_data = raw
                    .bone_data_list
                    .into_iter()
                    .filter_map(|bone| {
                        let joint = bone
                            .bone_type
                            .and_then(|value| serde_yaml_ng::from_value::<JointId>(value).ok());
                        match joint {
                            Some(joint) => Some(BoneData {
                                joint,
                                local_position: bone.local_position,
                                local_rotation: bone.local_rotation,
                            }),
                            None => {
                                skipped += 1;
                                None
                            }
                        }
                    })
                    .collect();
                Frame { time_stamp: raw.time_stamp, bone_data }
            })
            .collect();

        if skipped > 0 {
            warn!(skipped, "Dropped clip entries with missing or unknown boneType");
        } else {
            debug!("All clip entries resolved to known joints");
        }

        Ok(Clip { clip_name: self.clip_name, frame_rate: self.frame_rate, frames })
    }
}
