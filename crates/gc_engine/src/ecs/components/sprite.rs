//! Sprite renderer component

use crate::engine::EngineError;
use crate::foundation::math::Transform;
use crate::render::{Color, Graphics, MaterialDesc, MaterialHandle, MeshHandle, MeshKind};

/// Draws a quad at the owner's transform, flat colored or textured
#[derive(Debug, Clone, Default)]
pub struct SpriteRenderer {
    color: Color,
    texture_path: Option<String>,
    mesh: Option<MeshHandle>,
    material: Option<MaterialHandle>,
}

impl SpriteRenderer {
    /// White flat-colored sprite
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat-colored sprite
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Flat color used when no texture is set
    pub fn color(&self) -> Color {
        self.color
    }

    /// Change the flat color; the material is rebuilt on the next draw
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        if self.texture_path.is_none() {
            self.material = None;
        }
    }

    /// Texture currently shown, if any
    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }

    /// Mesh handle once graphics resources exist
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// Material handle once graphics resources exist
    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// Switch to a textured quad showing `path`
    ///
    /// Fails without touching the current look if the texture cannot be
    /// created.
    pub fn set_sprite(&mut self, graphics: &mut dyn Graphics, path: &str) -> Result<(), EngineError> {
        let texture = graphics.create_texture(path)?;
        let mesh = graphics.create_mesh(MeshKind::TexturedQuad)?;
        let material = graphics.create_material(MaterialDesc::Texture(texture))?;

        self.texture_path = Some(path.to_string());
        self.mesh = Some(mesh);
        self.material = Some(material);
        Ok(())
    }

    pub(crate) fn create_resources(&mut self, graphics: &mut dyn Graphics) -> Result<(), EngineError> {
        if self.mesh.is_some() && self.material.is_some() {
            return Ok(());
        }
        if let Some(path) = self.texture_path.clone() {
            return self.set_sprite(graphics, &path);
        }

        if self.mesh.is_none() {
            self.mesh = Some(graphics.create_mesh(MeshKind::ColoredQuad)?);
        }
        self.material = Some(graphics.create_material(MaterialDesc::Color(self.color))?);
        Ok(())
    }

    pub(crate) fn render(&mut self, graphics: &mut dyn Graphics, transform: &Transform) -> Result<(), EngineError> {
        self.create_resources(graphics)?;
        if let (Some(mesh), Some(material)) = (self.mesh, self.material) {
            graphics.update_world_constant_buffer(material, &transform.world_matrix());
            graphics.draw_object(mesh, material, true);
        }
        Ok(())
    }

    /// Copy for a duplicated GameObject; graphics resources are rebuilt
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            color: self.color,
            texture_path: self.texture_path.clone(),
            mesh: None,
            material: None,
        }
    }
}
