//! Cameras supplying view and projection matrices to skinned models.

use ossa_core::math::{Mat4, Vec3};

/// Source of the view and projection matrices written each frame.
pub trait Camera {
    /// World-to-camera matrix.
    fn view(&self) -> Mat4;

    /// Projection matrix with `[0, 1]` depth range.
    fn projection(&self) -> Mat4;

    /// Combined view-projection matrix (projection * view).
    fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Right-handed perspective camera looking at a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up direction.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub yfov: f32,
    /// Width over height.
    pub aspect: f32,
    /// Near plane distance.
    pub znear: f32,
    /// Far plane distance.
    pub zfar: f32,
}

impl PerspectiveCamera {
    /// Create a camera at `position` looking at the origin.
    pub fn new(position: Vec3, yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            yfov,
            aspect,
            znear,
            zfar,
        }
    }

    /// Set the point the camera looks at.
    #[must_use]
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Set the up direction.
    #[must_use]
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 5.0), 45f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }
}

impl Camera for PerspectiveCamera {
    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.yfov, self.aspect, self.znear, self.zfar)
    }
}
