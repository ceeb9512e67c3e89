//! Math type aliases and helper functions.
//!
//! Scene data produced by importers uses plain arrays (`[f32; 3]`,
//! `[f32; 4]`, column-major `[f32; 16]`). Everything that computes with
//! transforms converts to `glam` types through the helpers here.

pub use glam;

/// 2D vector (f32).
pub type Vec2 = glam::Vec2;

/// 3D vector (f32).
pub type Vec3 = glam::Vec3;

/// 4D vector (f32).
pub type Vec4 = glam::Vec4;

/// 4x4 matrix (f32, column-major).
pub type Mat4 = glam::Mat4;

/// Quaternion (f32). Stored as `[x, y, z, w]`.
pub type Quat = glam::Quat;

/// Column-major identity matrix as a plain array.
#[rustfmt::skip]
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Create a matrix from a column-major `[f32; 16]` array.
pub fn mat4_from_array(m: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(m)
}

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    Quat::from_array(a)
}

/// Convert a quaternion to a `[x, y, z, w]` array.
pub fn quat_to_array(q: Quat) -> [f32; 4] {
    q.to_array()
}

/// Translation part of an affine matrix.
pub fn mat4_translation(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}
