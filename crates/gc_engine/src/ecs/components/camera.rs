//! Orthographic camera component
//!
//! Each Update the camera compares the owner's position and up vector with
//! the values it last pushed; when either changed it rebuilds the view and
//! projection matrices and hands them to the graphics service.
//! Left-handed, +Z forward, depth mapped to `[0, 1]`.

use nalgebra::Point3;

use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::Graphics;

/// Orthographic camera following its owner
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view_width: f32,
    view_height: f32,
    near_z: f32,
    far_z: f32,
    last_position: Option<Vec3>,
    last_up: Option<Vec3>,
    view: Mat4,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            view_width: 20.0,
            view_height: 20.0,
            near_z: 1.0,
            far_z: 1000.0,
            last_position: None,
            last_up: None,
            view: Mat4::identity(),
            projection: Mat4::identity(),
        }
    }
}

impl Camera {
    /// 20x20 view, depth range `[1, 1000]`
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: visible area in world units
    pub fn with_view_size(mut self, width: f32, height: f32) -> Self {
        self.set_view_size(width, height);
        self
    }

    /// Set the visible area; matrices are rebuilt on the next Update
    pub fn set_view_size(&mut self, width: f32, height: f32) {
        self.view_width = width;
        self.view_height = height;
        self.invalidate();
    }

    /// Set the depth range; matrices are rebuilt on the next Update
    pub fn set_depth_range(&mut self, near_z: f32, far_z: f32) {
        self.near_z = near_z;
        self.far_z = far_z;
        self.invalidate();
    }

    /// Visible area in world units
    pub fn view_size(&self) -> (f32, f32) {
        (self.view_width, self.view_height)
    }

    /// Near and far planes
    pub fn depth_range(&self) -> (f32, f32) {
        (self.near_z, self.far_z)
    }

    /// Last view matrix built
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    /// Last projection matrix built
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Force a rebuild on the next Update
    pub fn invalidate(&mut self) {
        self.last_position = None;
        self.last_up = None;
    }

    /// Rebuild and upload the matrices if the owner moved; returns whether
    /// anything was uploaded
    pub fn update(&mut self, transform: &Transform, graphics: &mut dyn Graphics) -> bool {
        let position = transform.position;
        let up = transform.up();
        if self.last_position == Some(position) && self.last_up == Some(up) {
            return false;
        }
        self.last_position = Some(position);
        self.last_up = Some(up);

        let eye = Point3::from(position);
        let forward = transform.rotation * Vec3::z();
        self.view = Mat4::look_at_lh(&eye, &(eye + forward), &up);
        self.projection = orthographic_lh(self.view_width, self.view_height, self.near_z, self.far_z);

        graphics.set_view_projection(&self.view, &self.projection);
        true
    }

    /// Copy for a duplicated GameObject; the copy rebuilds its matrices
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            view_width: self.view_width,
            view_height: self.view_height,
            near_z: self.near_z,
            far_z: self.far_z,
            ..Self::default()
        }
    }
}

fn orthographic_lh(width: f32, height: f32, near_z: f32, far_z: f32) -> Mat4 {
    let depth = far_z - near_z;
    Mat4::new(
        2.0 / width, 0.0, 0.0, 0.0,
        0.0, 2.0 / height, 0.0, 0.0,
        0.0, 0.0, 1.0 / depth, -near_z / depth,
        0.0, 0.0, 0.0, 1.0,
    )
}
