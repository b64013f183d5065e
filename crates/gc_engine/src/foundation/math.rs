//! Math utilities and types
//!
//! Provides the vector/matrix aliases used by the engine and the
//! [`Transform`] value type every GameObject carries.

pub use nalgebra::{Vector2, Vector3, Matrix4, Quaternion, Unit};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
///
/// Collider geometry is never stored separately; it is derived from
/// `position` and `scale` every time a collision check runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from a 2D position and 2D scale (z = 0, scale.z = 1)
    pub fn from_position_scale_2d(x: f32, y: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            scale: Vec3::new(scale_x, scale_y, 1.0),
            ..Default::default()
        }
    }

    /// Move the transform by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Local up direction after rotation
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    /// World matrix (translation * rotation * scale)
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Position projected onto the XY plane
    pub fn position_2d(&self) -> Vec2 {
        self.position.xy()
    }

    /// Scale projected onto the XY plane
    pub fn scale_2d(&self) -> Vec2 {
        self.scale.xy()
    }
}
