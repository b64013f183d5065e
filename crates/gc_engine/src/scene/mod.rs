//! Scenes
//!
//! A scene is a named, ordered list of GameObjects. Scenes start unloaded
//! (inactive); loading one activates every active object it contains.
//! Scene lifecycle operations live on [`World`](crate::ecs::World) because
//! they touch objects, components and managers at once.

use slotmap::new_key_type;

use crate::ecs::GameObjectKey;
use crate::foundation::collections::{Registry, RegistryHandle};

new_key_type! {
    /// Arena key of a scene
    pub struct SceneKey;
}

/// Named, ordered collection of GameObjects
#[derive(Debug)]
pub struct Scene {
    name: String,
    active: bool,
    objects: Registry<GameObjectKey>,
}

impl Scene {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            active: false,
            objects: Registry::new(),
        }
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the scene is loaded
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Objects in insertion order
    pub fn objects(&self) -> impl Iterator<Item = GameObjectKey> + '_ {
        self.objects.iter().copied()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene holds no object
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub(crate) fn object_keys(&self) -> Vec<GameObjectKey> {
        self.objects.snapshot()
    }

    pub(crate) fn push(&mut self, object: GameObjectKey) -> RegistryHandle {
        self.objects.insert(object)
    }

    pub(crate) fn remove(&mut self, entry: RegistryHandle) -> Option<GameObjectKey> {
        match self.objects.remove(entry) {
            Ok(object) => Some(object),
            Err(error) => {
                log::error!("Scene '{}': {error}", self.name);
                None
            }
        }
    }
}
