//! Box and circle colliders
//!
//! A collider is a shape plus two flags. The physics manager reads the
//! shape every fixed step; the render pass draws a gizmo for visible
//! colliders. Outline meshes span the unit square `[0, 1]²`, so the gizmo
//! world matrix is the collider's world bounds.

use crate::engine::EngineError;
use crate::foundation::math::{Mat4, Transform, Vec2, Vec3};
use crate::physics::collision::{ColliderShape, WorldShape};
use crate::render::{Color, Graphics, MaterialDesc, MaterialHandle, MeshHandle, MeshKind};

/// Collider data shared by both collider kinds
#[derive(Debug, Clone)]
pub struct Collider {
    shape: ColliderShape,
    trigger: bool,
    visible: bool,
    mesh: Option<MeshHandle>,
    material: Option<MaterialHandle>,
}

impl Collider {
    /// Collider with an explicit shape, neither trigger nor visible
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            trigger: false,
            visible: false,
            mesh: None,
            material: None,
        }
    }

    /// Box covering the owner's scale
    pub fn boxed() -> Self {
        Self::new(ColliderShape::unit_box())
    }

    /// Circle inscribed in the owner's scale
    pub fn circle() -> Self {
        Self::new(ColliderShape::unit_circle())
    }

    /// Builder: set the trigger flag
    pub fn with_trigger(mut self, trigger: bool) -> Self {
        self.trigger = trigger;
        self
    }

    /// Builder: set the gizmo visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Local shape
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Replace the local shape
    ///
    /// Switching between box and circle changes the component kind, so it
    /// is rejected.
    pub fn set_shape(&mut self, shape: ColliderShape) -> Result<(), EngineError> {
        if std::mem::discriminant(&shape) != std::mem::discriminant(&self.shape) {
            return Err(EngineError::TypeMismatch(format!(
                "cannot turn a {:?} collider into {:?}",
                self.shape, shape
            )));
        }
        self.shape = shape;
        Ok(())
    }

    /// Mark as trigger
    pub fn set_trigger(&mut self, trigger: bool) {
        self.trigger = trigger;
    }

    /// Show or hide the gizmo
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether this collider is a trigger
    pub fn is_trigger(&self) -> bool {
        self.trigger
    }

    /// Whether the gizmo is drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether this is a circle collider
    pub fn is_circle(&self) -> bool {
        matches!(self.shape, ColliderShape::Circle { .. })
    }

    /// World-space shape for `transform`
    pub fn world_shape(&self, transform: &Transform) -> WorldShape {
        self.shape.to_world_space(transform)
    }

    pub(crate) fn create_resources(&mut self, graphics: &mut dyn Graphics) -> Result<(), EngineError> {
        if self.mesh.is_none() {
            let kind = if self.is_circle() { MeshKind::CircleOutline } else { MeshKind::BoxOutline };
            self.mesh = Some(graphics.create_mesh(kind)?);
        }
        if self.material.is_none() {
            self.material = Some(graphics.create_material(MaterialDesc::Color(Color::GREEN))?);
        }
        Ok(())
    }

    /// Draw the gizmo if visible; returns whether anything was drawn
    pub(crate) fn render(&mut self, graphics: &mut dyn Graphics, transform: &Transform) -> Result<bool, EngineError> {
        if !self.visible {
            return Ok(false);
        }
        self.create_resources(graphics)?;

        let (Some(mesh), Some(material)) = (self.mesh, self.material) else {
            return Ok(false);
        };
        graphics.update_world_constant_buffer(material, &gizmo_matrix(&self.world_shape(transform), transform.position.z));
        graphics.draw_object(mesh, material, true);
        Ok(true)
    }

    /// Copy for a duplicated GameObject; graphics resources are rebuilt
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            mesh: None,
            material: None,
            ..self.clone()
        }
    }
}

fn gizmo_matrix(shape: &WorldShape, z: f32) -> Mat4 {
    let (min, size) = match shape {
        WorldShape::Box(aabb) => (aabb.min, aabb.max - aabb.min),
        WorldShape::Circle(circle) => {
            let diameter = circle.radius * 2.0;
            (circle.center.add_scalar(-circle.radius), Vec2::new(diameter, diameter))
        }
    };
    Mat4::new_translation(&Vec3::new(min.x, min.y, z)) * Mat4::new_nonuniform_scaling(&Vec3::new(size.x, size.y, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{GraphicsCall, HeadlessGraphics};
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let collider = Collider::boxed();
        assert!(!collider.is_trigger());
        assert!(!collider.is_visible());
        assert!(!collider.is_circle());
        assert!(Collider::circle().is_circle());
    }

    #[test]
    fn test_shape_kind_cannot_change() {
        let mut collider = Collider::boxed();
        assert!(collider.set_shape(ColliderShape::Box { size: Vec2::new(2.0, 2.0) }).is_ok());
        assert!(matches!(
            collider.set_shape(ColliderShape::unit_circle()),
            Err(EngineError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_hidden_collider_draws_nothing() {
        let mut graphics = HeadlessGraphics::new();
        let mut collider = Collider::boxed();
        assert!(!collider.render(&mut graphics, &Transform::identity()).unwrap());
        assert!(graphics.calls().is_empty());
    }

    #[test]
    fn test_visible_circle_gizmo_covers_its_bounds() {
        let mut graphics = HeadlessGraphics::new();
        let mut collider = Collider::circle().with_visible(true);
        let transform = Transform::from_position_scale_2d(1.0, 1.0, 4.0, 4.0);

        assert!(collider.render(&mut graphics, &transform).unwrap());
        assert_eq!(graphics.mesh_kind(collider.mesh.unwrap()), Some(MeshKind::CircleOutline));

        let Some(GraphicsCall::UpdateWorld { world, .. }) = graphics.calls().first() else {
            panic!("expected a world matrix upload");
        };
        let far_corner = world.transform_point(&nalgebra::Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(far_corner.coords, Vec3::new(5.0, 5.0, 0.0), epsilon = 1e-6);
    }
}
