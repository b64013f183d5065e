//! Renderer boundary
//!
//! The engine core never talks to a graphics API directly. Components that
//! draw (sprites, collider gizmos, cameras) go through the [`Graphics`]
//! trait, which hands out opaque resource handles and accepts draw calls.
//! [`HeadlessGraphics`] is an implementation that only records what it was
//! asked to do; tests and the headless demo run against it.

use std::collections::HashSet;

use thiserror::Error;

use crate::foundation::math::Mat4;

/// Handle to a mesh created by a [`Graphics`] service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Handle to a material created by a [`Graphics`] service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Handle to a texture created by a [`Graphics`] service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// RGBA color, components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque green, used for collider gizmos
    pub const GREEN: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);

    /// Build a color from components
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Geometry a mesh is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit quad with per-vertex color
    ColoredQuad,
    /// Unit quad with texture coordinates
    TexturedQuad,
    /// Unit square outline (box collider gizmo)
    BoxOutline,
    /// Unit circle outline (circle collider gizmo)
    CircleOutline,
}

/// Description of a material to create
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialDesc {
    /// Flat color shader
    Color(Color),
    /// Texture shader
    Texture(TextureHandle),
}

/// Graphics errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// The texture file could not be found or decoded
    #[error("Texture not found: {0}")]
    TextureNotFound(String),

    /// The backend failed to create a resource
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),
}

/// Graphics service consumed by the engine core
///
/// Implementations own every resource behind the handles they return.
pub trait Graphics {
    /// Start a new frame; the engine calls this once per frame before any pass
    fn begin_frame(&mut self) {}

    /// Create a mesh
    fn create_mesh(&mut self, kind: MeshKind) -> Result<MeshHandle, GraphicsError>;

    /// Create a material
    fn create_material(&mut self, desc: MaterialDesc) -> Result<MaterialHandle, GraphicsError>;

    /// Create a texture from a file path
    fn create_texture(&mut self, path: &str) -> Result<TextureHandle, GraphicsError>;

    /// Upload the world matrix used by the next draw with `material`
    fn update_world_constant_buffer(&mut self, material: MaterialHandle, world: &Mat4);

    /// Queue a draw of `mesh` with `material`
    fn draw_object(&mut self, mesh: MeshHandle, material: MaterialHandle, alpha: bool);

    /// Upload the camera matrices
    fn set_view_projection(&mut self, view: &Mat4, projection: &Mat4);
}

/// A call recorded by [`HeadlessGraphics`]
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCall {
    /// `update_world_constant_buffer`
    UpdateWorld {
        /// Material the matrix was bound to
        material: MaterialHandle,
        /// Uploaded matrix
        world: Mat4,
    },
    /// `draw_object`
    Draw {
        /// Mesh drawn
        mesh: MeshHandle,
        /// Material used
        material: MaterialHandle,
        /// Alpha blending flag
        alpha: bool,
    },
    /// `set_view_projection`
    ViewProjection {
        /// View matrix
        view: Mat4,
        /// Projection matrix
        projection: Mat4,
    },
}

/// Recording graphics backend with no GPU behind it
///
/// Only the current frame's calls are kept; [`Graphics::begin_frame`]
/// discards the previous frame's.
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    next_handle: u32,
    frames: u64,
    meshes: Vec<(MeshHandle, MeshKind)>,
    materials: Vec<(MaterialHandle, MaterialDesc)>,
    known_textures: Option<HashSet<String>>,
    calls: Vec<GraphicsCall>,
}

impl HeadlessGraphics {
    /// Create a backend that accepts every texture path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that only accepts the listed texture paths
    pub fn with_textures<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_textures: Some(paths.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Calls recorded this frame, or since the last [`Self::take_calls`]
    pub fn calls(&self) -> &[GraphicsCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<GraphicsCall> {
        std::mem::take(&mut self.calls)
    }

    /// Meshes drawn, in submission order
    pub fn drawn_meshes(&self) -> Vec<MeshHandle> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GraphicsCall::Draw { mesh, .. } => Some(*mesh),
                _ => None,
            })
            .collect()
    }

    /// Kind a mesh was created with
    pub fn mesh_kind(&self, mesh: MeshHandle) -> Option<MeshKind> {
        self.meshes.iter().find(|(handle, _)| *handle == mesh).map(|(_, kind)| *kind)
    }

    /// Description a material was created with
    pub fn material_desc(&self, material: MaterialHandle) -> Option<&MaterialDesc> {
        self.materials.iter().find(|(handle, _)| *handle == material).map(|(_, desc)| desc)
    }

    /// Number of meshes created so far
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Frames started so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl Graphics for HeadlessGraphics {
    fn begin_frame(&mut self) {
        self.frames += 1;
        log::trace!("Begin frame {} ({} calls last frame)", self.frames, self.calls.len());
        self.calls.clear();
    }

    fn create_mesh(&mut self, kind: MeshKind) -> Result<MeshHandle, GraphicsError> {
        let handle = MeshHandle(self.allocate());
        self.meshes.push((handle, kind));
        Ok(handle)
    }

    fn create_material(&mut self, desc: MaterialDesc) -> Result<MaterialHandle, GraphicsError> {
        let handle = MaterialHandle(self.allocate());
        self.materials.push((handle, desc));
        Ok(handle)
    }

    fn create_texture(&mut self, path: &str) -> Result<TextureHandle, GraphicsError> {
        if let Some(known) = &self.known_textures {
            if !known.contains(path) {
                return Err(GraphicsError::TextureNotFound(path.to_string()));
            }
        }
        Ok(TextureHandle(self.allocate()))
    }

    fn update_world_constant_buffer(&mut self, material: MaterialHandle, world: &Mat4) {
        self.calls.push(GraphicsCall::UpdateWorld { material, world: *world });
    }

    fn draw_object(&mut self, mesh: MeshHandle, material: MaterialHandle, alpha: bool) {
        self.calls.push(GraphicsCall::Draw { mesh, material, alpha });
    }

    fn set_view_projection(&mut self, view: &Mat4, projection: &Mat4) {
        self.calls.push(GraphicsCall::ViewProjection {
            view: *view,
            projection: *projection,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut graphics = HeadlessGraphics::new();
        let mesh = graphics.create_mesh(MeshKind::ColoredQuad).unwrap();
        let material = graphics.create_material(MaterialDesc::Color(Color::WHITE)).unwrap();
        assert_ne!(mesh.0, material.0);
        assert_eq!(graphics.mesh_kind(mesh), Some(MeshKind::ColoredQuad));
    }

    #[test]
    fn test_unknown_texture_fails() {
        let mut graphics = HeadlessGraphics::with_textures(["player.dds"]);
        assert!(graphics.create_texture("player.dds").is_ok());
        assert_eq!(
            graphics.create_texture("missing.dds"),
            Err(GraphicsError::TextureNotFound("missing.dds".to_string()))
        );
    }

    #[test]
    fn test_draw_calls_are_recorded_in_order() {
        let mut graphics = HeadlessGraphics::new();
        let a = graphics.create_mesh(MeshKind::ColoredQuad).unwrap();
        let b = graphics.create_mesh(MeshKind::BoxOutline).unwrap();
        let material = graphics.create_material(MaterialDesc::Color(Color::GREEN)).unwrap();

        graphics.draw_object(b, material, true);
        graphics.draw_object(a, material, false);
        assert_eq!(graphics.drawn_meshes(), vec![b, a]);

        assert_eq!(graphics.take_calls().len(), 2);
        assert!(graphics.calls().is_empty());
    }

    #[test]
    fn test_begin_frame_keeps_only_the_current_frame() {
        let mut graphics = HeadlessGraphics::new();
        let mesh = graphics.create_mesh(MeshKind::ColoredQuad).unwrap();
        let material = graphics.create_material(MaterialDesc::Color(Color::WHITE)).unwrap();

        for _ in 0..3 {
            graphics.begin_frame();
            graphics.draw_object(mesh, material, false);
            graphics.draw_object(mesh, material, true);
        }
        assert_eq!(graphics.frame_count(), 3);
        assert_eq!(graphics.calls().len(), 2);
        assert_eq!(graphics.mesh_count(), 1);
    }
}
