//! Component managers
//!
//! Managers hold weak [`ComponentRef`]s in insertion order. A component
//! enters a manager when it becomes effectively active after creation and
//! leaves it through the handle it got back, in O(1), without reordering the
//! others. Passes iterate a snapshot, so hooks may (un)register components
//! while a pass runs.

use super::component::ComponentRef;
use crate::engine::EngineError;
use crate::foundation::collections::{Registry, RegistryHandle};
use crate::physics::PhysicsManager;

/// Insertion-ordered list of component references
#[derive(Debug, Default)]
pub struct ComponentList {
    entries: Registry<ComponentRef>,
}

impl ComponentList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `component` and return its handle
    pub fn register(&mut self, component: ComponentRef) -> RegistryHandle {
        self.entries.insert(component)
    }

    /// Remove the entry behind `handle`
    pub fn unregister(&mut self, handle: RegistryHandle) -> Result<ComponentRef, EngineError> {
        Ok(self.entries.remove(handle)?)
    }

    /// Reference behind `handle`
    pub fn get(&self, handle: RegistryHandle) -> Option<ComponentRef> {
        self.entries.get(handle).copied()
    }

    /// Whether `component` is listed (linear scan)
    pub fn contains(&self, component: ComponentRef) -> bool {
        self.entries.iter().any(|entry| *entry == component)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = ComponentRef> + '_ {
        self.entries.iter().copied()
    }

    /// Copy of the entries in registration order
    pub fn snapshot(&self) -> Vec<ComponentRef> {
        self.entries.snapshot()
    }
}

/// Components taking part in the per-frame Update pass
#[derive(Debug, Default)]
pub struct UpdateManager {
    components: ComponentList,
}

impl UpdateManager {
    /// Register a component for Update
    pub fn register_component(&mut self, component: ComponentRef) -> RegistryHandle {
        self.components.register(component)
    }

    /// Unregister through the handle returned at registration
    pub fn unregister_component(&mut self, handle: RegistryHandle) -> Result<ComponentRef, EngineError> {
        self.components.unregister(handle)
    }

    /// Registered components
    pub fn components(&self) -> &ComponentList {
        &self.components
    }

    /// Whether `component` is registered
    pub fn contains(&self, component: ComponentRef) -> bool {
        self.components.contains(component)
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Components drawn by the render pass
#[derive(Debug, Default)]
pub struct RenderManager {
    components: ComponentList,
}

impl RenderManager {
    /// Register a component for rendering
    pub fn register_component(&mut self, component: ComponentRef) -> RegistryHandle {
        self.components.register(component)
    }

    /// Unregister through the handle returned at registration
    pub fn unregister_component(&mut self, handle: RegistryHandle) -> Result<ComponentRef, EngineError> {
        self.components.unregister(handle)
    }

    /// Registered components
    pub fn components(&self) -> &ComponentList {
        &self.components
    }

    /// Whether `component` is registered
    pub fn contains(&self, component: ComponentRef) -> bool {
        self.components.contains(component)
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// The three managers of a world
#[derive(Debug, Default)]
pub struct Managers {
    /// Update pass
    pub update: UpdateManager,
    /// Fixed-step pass and collision detection
    pub physics: PhysicsManager,
    /// Render pass
    pub render: RenderManager,
}
