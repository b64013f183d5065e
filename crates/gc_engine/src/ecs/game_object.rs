//! GameObjects
//!
//! A GameObject is a named transform owning at most one component per
//! [`ComponentKind`]. Objects live in the [`World`](super::World) arena and
//! are addressed by [`GameObjectKey`]; the numeric [`GameObjectId`] is the
//! human-facing identifier handed out in creation order.

use std::collections::BTreeMap;
use std::fmt;

use slotmap::new_key_type;

use super::component::{Component, ComponentKind, ComponentPayload};
use super::components::Collider;
use crate::foundation::collections::RegistryHandle;
use crate::foundation::math::Transform;
use crate::scene::SceneKey;

new_key_type! {
    /// Arena key of a GameObject
    pub struct GameObjectKey;
}

/// Sequential GameObject identifier, unique within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId(pub u32);

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A GameObject and its components
#[derive(Debug)]
pub struct GameObject {
    pub(crate) id: GameObjectId,
    pub(crate) name: String,
    pub(crate) tag: String,
    pub(crate) layer: i32,
    pub(crate) active: bool,
    pub(crate) transform: Transform,
    pub(crate) scene: Option<SceneKey>,
    pub(crate) scene_entry: Option<RegistryHandle>,
    pub(crate) components: BTreeMap<ComponentKind, Component>,
}

impl GameObject {
    pub(crate) fn new(id: GameObjectId, name: &str, active: bool, tag: &str, layer: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            tag: tag.to_string(),
            layer,
            active,
            transform: Transform::default(),
            scene: None,
            scene_entry: None,
            components: BTreeMap::new(),
        }
    }

    /// Sequential ID
    pub fn id(&self) -> GameObjectId {
        self.id
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the object
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Change the tag
    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_string();
    }

    /// Layer
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Change the layer
    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    /// Own active flag; see [`World::set_game_object_active`](super::World::set_game_object_active)
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Scene the object belongs to, `None` once removed from its scene
    pub fn scene(&self) -> Option<SceneKey> {
        self.scene
    }

    /// Transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Transform, mutable
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Whether a component of `kind` is attached
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    /// Component of `kind`
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    /// Component of `kind`, mutable
    ///
    /// Payloads may be edited freely; activation goes through the world.
    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.get_mut(&kind)
    }

    /// Attached components, ordered by kind
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.values()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Typed payload
    pub fn get<T: ComponentPayload>(&self) -> Option<&T> {
        self.components.get(&T::KIND).and_then(Component::get::<T>)
    }

    /// Typed payload, mutable
    pub fn get_mut<T: ComponentPayload>(&mut self) -> Option<&mut T> {
        self.components.get_mut(&T::KIND).and_then(Component::get_mut::<T>)
    }

    /// Collider of `kind` (box or circle)
    pub fn collider(&self, kind: ComponentKind) -> Option<&Collider> {
        self.components.get(&kind).and_then(|component| component.data().as_collider())
    }

    /// Collider of `kind`, mutable
    pub fn collider_mut(&mut self, kind: ComponentKind) -> Option<&mut Collider> {
        self.components.get_mut(&kind).and_then(Component::collider_mut)
    }
}
