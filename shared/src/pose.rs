//! Pose data model and wire records.
//!
//! A [`Pose`] is a rigid transform (position + orientation) in the shared
//! reference frame. On the wire it travels as [`WirePose`], a flat record of
//! seven named floats; a full 4x4 world matrix travels as [`WireTransform`],
//! sixteen floats in column-major order. Round-tripping either record is
//! lossless to floating-point precision, and the orientation is deliberately
//! not re-normalized in transport.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a wire record cannot be decoded into a usable value.
#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("transform record has {got} values, expected {expected}")]
    BadLength { expected: usize, got: usize },

    #[error("non-finite value in field '{0}'")]
    NonFinite(&'static str),
}

/// A rigid body placement: position + unit quaternion orientation.
///
/// Immutable value type; two poses with the same numeric content are the
/// same pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Flattens the pose into its wire record.
    pub fn to_wire(&self) -> WirePose {
        WirePose {
            pos_x: self.position.x,
            pos_y: self.position.y,
            pos_z: self.position.z,
            rot_x: self.orientation.x,
            rot_y: self.orientation.y,
            rot_z: self.orientation.z,
            rot_w: self.orientation.w,
        }
    }

    /// Rebuilds a pose from its wire record.
    ///
    /// Rejects non-finite components instead of letting them corrupt game
    /// state downstream. The quaternion is taken as-is: a non-unit value sent
    /// by a buggy peer propagates uncorrected.
    pub fn from_wire(wire: &WirePose) -> Result<Pose, DecodeError> {
        wire.check_finite()?;
        Ok(Pose {
            position: Vec3::new(wire.pos_x, wire.pos_y, wire.pos_z),
            orientation: Quat::from_xyzw(wire.rot_x, wire.rot_y, wire.rot_z, wire.rot_w),
        })
    }
}

/// Serialized pose: seven named floats, no version field.
///
/// Serialized as a field-name-keyed MessagePack map, so the record tolerates
/// field-order drift between peers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WirePose {
    pub pos_x: f32,
    pub pos_y: f32,
    pub pos_z: f32,
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    pub rot_w: f32,
}

impl WirePose {
    fn check_finite(&self) -> Result<(), DecodeError> {
        let fields = [
            (self.pos_x, "pos_x"),
            (self.pos_y, "pos_y"),
            (self.pos_z, "pos_z"),
            (self.rot_x, "rot_x"),
            (self.rot_y, "rot_y"),
            (self.rot_z, "rot_z"),
            (self.rot_w, "rot_w"),
        ];
        for (value, name) in fields {
            if !value.is_finite() {
                return Err(DecodeError::NonFinite(name));
            }
        }
        Ok(())
    }
}

/// Serialized 4x4 world matrix: sixteen floats, column-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTransform {
    pub values: Vec<f32>,
}

impl WireTransform {
    pub const LEN: usize = 16;

    /// The never-written default: a zero-filled record.
    pub fn zeroed() -> Self {
        Self { values: vec![0.0; Self::LEN] }
    }

    /// Flattens a matrix in column-major element order.
    pub fn from_matrix(mat: &Mat4) -> Self {
        Self { values: mat.to_cols_array().to_vec() }
    }

    /// Reconstructs the matrix, failing on wrong-length or non-finite input
    /// rather than silently reinterpreting garbage.
    pub fn to_matrix(&self) -> Result<Mat4, DecodeError> {
        let values: &[f32; 16] = self
            .values
            .as_slice()
            .try_into()
            .map_err(|_| DecodeError::BadLength {
                expected: Self::LEN,
                got: self.values.len(),
            })?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DecodeError::NonFinite("values"));
        }
        Ok(Mat4::from_cols_array(values))
    }
}

impl Default for WireTransform {
    fn default() -> Self {
        Self::zeroed()
    }
}
