//! Pose value types: vectors, quaternions, joint poses and wire snapshots

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use super::joint::JointId;
use crate::skeleton::Skeleton;

/// Dot product above which slerp falls back to normalized lerp.
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// 3D vector (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unclamped linear interpolation.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

/// Rotation quaternion (16 bytes)
///
/// Components are stored exactly as received; nothing here renormalizes a
/// stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about a unit `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self { x: axis.x * sin, y: axis.y * sin, z: axis.z * sin, w: cos }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < 1e-10 {
            return Self::IDENTITY;
        }
        let inv = 1.0 / len;
        Self { x: self.x * inv, y: self.y * inv, z: self.z * inv, w: self.w * inv }
    }

    /// Angle in radians between two rotations.
    pub fn angle_to(self, other: Self) -> f32 {
        let dot = self.normalize().dot(other.normalize()).abs().min(1.0);
        2.0 * dot.acos()
    }

    /// Spherical interpolation along the shortest arc, `t` clamped to `[0, 1]`.
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut end = other;
        let mut cos = self.dot(other);
        if cos < 0.0 {
            end = Self { x: -other.x, y: -other.y, z: -other.z, w: -other.w };
            cos = -cos;
        }

        if cos > SLERP_LINEAR_THRESHOLD {
            return Self {
                x: self.x + (end.x - self.x) * t,
                y: self.y + (end.y - self.y) * t,
                z: self.z + (end.z - self.z) * t,
                w: self.w + (end.w - self.w) * t,
            }
            .normalize();
        }

        let theta = cos.acos();
        let sin = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin;
        let b = (t * theta).sin() / sin;
        Self {
            x: self.x * a + end.x * b,
            y: self.y * a + end.y * b,
            z: self.z * a + end.z * b,
            w: self.w * a + end.w * b,
        }
    }
}

/// Local transform of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl JointPose {
    pub const IDENTITY: Self = Self { position: Vec3::ZERO, rotation: Quat::IDENTITY };

    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Blend towards `other`: lerp for position, slerp for rotation.
    pub fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

/// One full-skeleton pose sample as carried on the wire.
///
/// Entries are positional: entry `i` belongs to the joint with ordinal `i`
/// on the sending side.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    joints: Vec<JointPose>,
}

impl Snapshot {
    pub fn new(joints: Vec<JointPose>) -> Self {
        Self { joints }
    }

    /// Capture every joint slot of `skeleton` in ordinal order.
    ///
    /// Joints the skeleton lacks are sent as [`JointPose::IDENTITY`] so the
    /// positions of the remaining joints are preserved.
    pub fn capture<S: Skeleton + ?Sized>(skeleton: &S) -> Self {
        let joints = JointId::ALL
            .iter()
            .take(skeleton.joint_count())
            .map(|joint| skeleton.get(*joint).unwrap_or(JointPose::IDENTITY))
            .collect();
        Self { joints }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JointPose> {
        self.joints.get(index)
    }

    pub fn joints(&self) -> &[JointPose] {
        &self.joints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointPose> {
        self.joints.iter()
    }

    pub fn into_inner(self) -> Vec<JointPose> {
        self.joints
    }
}

impl From<Vec<JointPose>> for Snapshot {
    fn from(joints: Vec<JointPose>) -> Self {
        Self::new(joints)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a JointPose;
    type IntoIter = std::slice::Iter<'a, JointPose>;

    fn into_iter(self) -> Self::IntoIter {
        self.joints.iter()
    }
}
