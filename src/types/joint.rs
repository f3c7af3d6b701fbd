//! Joint identifiers for the 91-slot body skeleton
//!
//! The ordinal of each [`JointId`] is its position in a wire snapshot and its
//! index into per-joint arrays. Reordering or inserting variants is a
//! breaking change for both the wire protocol and stored clips.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{PoseError, Result};

/// Number of joint slots shared by the encoder, decoder and clip format.
pub const JOINT_COUNT: usize = 91;

macro_rules! joints {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One slot of the body skeleton, in the ARKit full-body joint order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum JointId {
            $($variant),+
        }

        impl JointId {
            /// Every joint in ordinal order.
            pub const ALL: [JointId; JOINT_COUNT] = [$(JointId::$variant),+];

            const NAMES: [&'static str; JOINT_COUNT] = [$($name),+];
        }
    };
}

joints! {
    Root => "root",
    Hips => "hips_joint",
    LeftUpLeg => "left_upLeg_joint",
    LeftLeg => "left_leg_joint",
    LeftFoot => "left_foot_joint",
    LeftToes => "left_toes_joint",
    LeftToesEnd => "left_toesEnd_joint",
    RightUpLeg => "right_upLeg_joint",
    RightLeg => "right_leg_joint",
    RightFoot => "right_foot_joint",
    RightToes => "right_toes_joint",
    RightToesEnd => "right_toesEnd_joint",
    Spine1 => "spine_1_joint",
    Spine2 => "spine_2_joint",
    Spine3 => "spine_3_joint",
    Spine4 => "spine_4_joint",
    Spine5 => "spine_5_joint",
    Spine6 => "spine_6_joint",
    Spine7 => "spine_7_joint",
    LeftShoulder1 => "left_shoulder_1_joint",
    LeftArm => "left_arm_joint",
    LeftForearm => "left_forearm_joint",
    LeftHand => "left_hand_joint",
    LeftHandIndexStart => "left_handIndexStart_joint",
    LeftHandIndex1 => "left_handIndex_1_joint",
    LeftHandIndex2 => "left_handIndex_2_joint",
    LeftHandIndex3 => "left_handIndex_3_joint",
    LeftHandIndexEnd => "left_handIndexEnd_joint",
    LeftHandMidStart => "left_handMidStart_joint",
    LeftHandMid1 => "left_handMid_1_joint",
    LeftHandMid2 => "left_handMid_2_joint",
    LeftHandMid3 => "left_handMid_3_joint",
    LeftHandMidEnd => "left_handMidEnd_joint",
    LeftHandPinkyStart => "left_handPinkyStart_joint",
    LeftHandPinky1 => "left_handPinky_1_joint",
    LeftHandPinky2 => "left_handPinky_2_joint",
    LeftHandPinky3 => "left_handPinky_3_joint",
    LeftHandPinkyEnd => "left_handPinkyEnd_joint",
    LeftHandRingStart => "left_handRingStart_joint",
    LeftHandRing1 => "left_handRing_1_joint",
    LeftHandRing2 => "left_handRing_2_joint",
    LeftHandRing3 => "left_handRing_3_joint",
    LeftHandRingEnd => "left_handRingEnd_joint",
    LeftHandThumbStart => "left_handThumbStart_joint",
    LeftHandThumb1 => "left_handThumb_1_joint",
    LeftHandThumb2 => "left_handThumb_2_joint",
    LeftHandThumbEnd => "left_handThumbEnd_joint",
    Neck1 => "neck_1_joint",
    Neck2 => "neck_2_joint",
    Neck3 => "neck_3_joint",
    Neck4 => "neck_4_joint",
    Head => "head_joint",
    Jaw => "jaw_joint",
    Chin => "chin_joint",
    LeftEye => "left_eye_joint",
    LeftEyeLowerLid => "left_eyeLowerLid_joint",
    LeftEyeUpperLid => "left_eyeUpperLid_joint",
    LeftEyeball => "left_eyeball_joint",
    Nose => "nose_joint",
    RightEye => "right_eye_joint",
    RightEyeLowerLid => "right_eyeLowerLid_joint",
    RightEyeUpperLid => "right_eyeUpperLid_joint",
    RightEyeball => "right_eyeball_joint",
    RightShoulder1 => "right_shoulder_1_joint",
    RightArm => "right_arm_joint",
    RightForearm => "right_forearm_joint",
    RightHand => "right_hand_joint",
    RightHandIndexStart => "right_handIndexStart_joint",
    RightHandIndex1 => "right_handIndex_1_joint",
    RightHandIndex2 => "right_handIndex_2_joint",
    RightHandIndex3 => "right_handIndex_3_joint",
    RightHandIndexEnd => "right_handIndexEnd_joint",
    RightHandMidStart => "right_handMidStart_joint",
    RightHandMid1 => "right_handMid_1_joint",
    RightHandMid2 => "right_handMid_2_joint",
    RightHandMid3 => "right_handMid_3_joint",
    RightHandMidEnd => "right_handMidEnd_joint",
    RightHandPinkyStart => "right_handPinkyStart_joint",
    RightHandPinky1 => "right_handPinky_1_joint",
    RightHandPinky2 => "right_handPinky_2_joint",
    RightHandPinky3 => "right_handPinky_3_joint",
    RightHandPinkyEnd => "right_handPinkyEnd_joint",
    RightHandRingStart => "right_handRingStart_joint",
    RightHandRing1 => "right_handRing_1_joint",
    RightHandRing2 => "right_handRing_2_joint",
    RightHandRing3 => "right_handRing_3_joint",
    RightHandRingEnd => "right_handRingEnd_joint",
    RightHandThumbStart => "right_handThumbStart_joint",
    RightHandThumb1 => "right_handThumb_1_joint",
    RightHandThumb2 => "right_handThumb_2_joint",
    RightHandThumbEnd => "right_handThumbEnd_joint",
}

impl JointId {
    /// Position of this joint in snapshots and per-joint arrays.
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Joint at the given ordinal, if it is within the enumeration.
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    /// Stable name used in clip files.
    pub fn name(self) -> &'static str {
        Self::NAMES[self.ordinal()]
    }

    /// Look up a joint by its clip-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES.iter().position(|candidate| *candidate == name).and_then(Self::from_ordinal)
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JointId {
    type Err = PoseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| PoseError::parse("joint name", format!("unknown joint '{}'", s)))
    }
}

impl Serialize for JointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Accepts either a joint name or an integer ordinal.
impl<'de> Deserialize<'de> for JointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct JointVisitor;

        impl Visitor<'_> for JointVisitor {
            type Value = JointId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a joint name or an ordinal below {}", JOINT_COUNT)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<JointId, E> {
                JointId::from_name(value)
                    .ok_or_else(|| E::custom(format!("unknown joint '{}'", value)))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<JointId, E> {
                usize::try_from(value)
                    .ok()
                    .and_then(JointId::from_ordinal)
                    .ok_or_else(|| E::custom(format!("joint ordinal {} out of range", value)))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<JointId, E> {
                match u64::try_from(value) {
                    Ok(value) => self.visit_u64(value),
                    Err(_) => Err(E::custom(format!("joint ordinal {} out of range", value))),
                }
            }
        }

        deserializer.deserialize_any(JointVisitor)
    }
}
