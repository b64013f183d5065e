//! Gameplay scripts
//!
//! A script is a user type implementing [`Script`]. Script kinds are
//! registered by name in a [`ScriptRegistry`] at startup; each registered
//! kind gets its own [`ScriptKindId`], so a GameObject can carry one
//! instance of every script kind at once.
//!
//! Scripts never hold references into the world. Every hook receives a
//! [`ScriptContext`] giving access to the owner's transform, the input
//! state and a command queue. Commands (destroying objects, toggling
//! activation) are applied by the world once the running pass finishes.

use std::collections::HashMap;
use std::fmt;

use crate::ecs::component::ComponentKind;
use crate::ecs::game_object::{GameObjectId, GameObjectKey};
use crate::engine::EngineError;
use crate::foundation::math::Transform;
use crate::input::InputSystem;

/// Identifier of a registered script kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptKindId(pub(crate) u32);

impl fmt::Display for ScriptKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script#{}", self.0)
    }
}

/// What a trigger callback knows about the other collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderHit {
    /// GameObject owning the other collider
    pub object: GameObjectKey,
    /// ID of that GameObject
    pub id: GameObjectId,
    /// Kind of the other collider
    pub kind: ComponentKind,
    /// Whether the other collider is flagged as a trigger
    pub is_trigger: bool,
}

/// Deferred world mutation requested by a script
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WorldCommand {
    Destroy(GameObjectKey),
    SetActive(GameObjectKey, bool),
    SetComponentActive(GameObjectKey, ComponentKind, bool),
}

/// Per-call view of the world handed to component hooks
pub struct ScriptContext<'a> {
    object: GameObjectKey,
    id: GameObjectId,
    transform: &'a mut Transform,
    input: &'a InputSystem,
    delta_time: f32,
    commands: &'a mut Vec<WorldCommand>,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        object: GameObjectKey,
        id: GameObjectId,
        transform: &'a mut Transform,
        input: &'a InputSystem,
        delta_time: f32,
        commands: &'a mut Vec<WorldCommand>,
    ) -> Self {
        Self {
            object,
            id,
            transform,
            input,
            delta_time,
            commands,
        }
    }

    /// GameObject the running component belongs to
    pub fn object(&self) -> GameObjectKey {
        self.object
    }

    /// ID of the owning GameObject
    pub fn id(&self) -> GameObjectId {
        self.id
    }

    /// Owner's transform
    pub fn transform(&self) -> &Transform {
        self.transform
    }

    /// Owner's transform, mutable
    pub fn transform_mut(&mut self) -> &mut Transform {
        self.transform
    }

    /// Input state for the current frame
    pub fn input(&self) -> &InputSystem {
        self.input
    }

    /// Frame delta for Update hooks, fixed step for FixedUpdate and triggers
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Destroy a GameObject once the current pass ends
    pub fn destroy_game_object(&mut self, object: GameObjectKey) {
        self.commands.push(WorldCommand::Destroy(object));
    }

    /// Destroy the owning GameObject once the current pass ends
    pub fn destroy_self(&mut self) {
        self.destroy_game_object(self.object);
    }

    /// Toggle a GameObject once the current pass ends
    pub fn set_game_object_active(&mut self, object: GameObjectKey, active: bool) {
        self.commands.push(WorldCommand::SetActive(object, active));
    }

    /// Toggle one component once the current pass ends
    pub fn set_component_active(&mut self, object: GameObjectKey, kind: ComponentKind, active: bool) {
        self.commands.push(WorldCommand::SetComponentActive(object, kind, active));
    }
}

/// User gameplay behaviour
///
/// Every hook has an empty default so a script only implements what it
/// needs.
#[allow(unused_variables)]
pub trait Script: 'static {
    /// Called once when the component is created, before its first Update
    fn start(&mut self, ctx: &mut ScriptContext<'_>) {}

    /// Called every frame while registered with the update manager
    fn update(&mut self, ctx: &mut ScriptContext<'_>) {}

    /// Called every fixed step while registered with the physics manager
    fn fixed_update(&mut self, ctx: &mut ScriptContext<'_>) {}

    /// The owner's collider started overlapping `other`
    fn on_trigger_enter(&mut self, ctx: &mut ScriptContext<'_>, other: &ColliderHit) {}

    /// The owner's collider overlaps `other` during this fixed step
    fn on_trigger_stay(&mut self, ctx: &mut ScriptContext<'_>, other: &ColliderHit) {}

    /// The owner's collider stopped overlapping `other`
    fn on_trigger_exit(&mut self, ctx: &mut ScriptContext<'_>, other: &ColliderHit) {}

    /// The script became effectively active
    fn on_activate(&mut self) {}

    /// The script stopped being effectively active
    fn on_deactivate(&mut self) {}

    /// The component is about to be dropped
    fn on_destroy(&mut self) {}
}

/// Script instance attached to a GameObject
pub struct ScriptComponent {
    kind: ScriptKindId,
    behaviour: Box<dyn Script>,
}

impl ScriptComponent {
    pub(crate) fn new(kind: ScriptKindId, behaviour: Box<dyn Script>) -> Self {
        Self { kind, behaviour }
    }

    /// Registered kind of this script
    pub fn kind(&self) -> ScriptKindId {
        self.kind
    }

    /// The script itself
    pub fn behaviour(&self) -> &dyn Script {
        self.behaviour.as_ref()
    }

    /// The script itself, mutable
    pub fn behaviour_mut(&mut self) -> &mut dyn Script {
        self.behaviour.as_mut()
    }
}

impl fmt::Debug for ScriptComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptComponent").field("kind", &self.kind).finish_non_exhaustive()
    }
}

type ScriptFactory = Box<dyn Fn() -> Box<dyn Script>>;

struct ScriptKind {
    name: String,
    factory: ScriptFactory,
}

/// Name → factory table for script kinds
#[derive(Default)]
pub struct ScriptRegistry {
    kinds: Vec<ScriptKind>,
    by_name: HashMap<String, ScriptKindId>,
}

impl ScriptRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script type constructed through `Default`
    pub fn register<S: Script + Default>(&mut self, name: &str) -> ScriptKindId {
        self.register_with(name, || Box::new(S::default()))
    }

    /// Register a script kind with a custom factory
    ///
    /// Registering a name twice replaces the factory and keeps the ID.
    pub fn register_with<F>(&mut self, name: &str, factory: F) -> ScriptKindId
    where
        F: Fn() -> Box<dyn Script> + 'static,
    {
        if let Some(&id) = self.by_name.get(name) {
            log::warn!("Script kind '{name}' registered twice, replacing its factory");
            self.kinds[id.0 as usize].factory = Box::new(factory);
            return id;
        }

        let id = ScriptKindId(self.kinds.len() as u32);
        self.kinds.push(ScriptKind {
            name: name.to_string(),
            factory: Box::new(factory),
        });
        self.by_name.insert(name.to_string(), id);
        log::debug!("Registered script kind '{name}' as {id}");
        id
    }

    /// Look up a kind by name
    pub fn id_of(&self, name: &str) -> Option<ScriptKindId> {
        self.by_name.get(name).copied()
    }

    /// Name a kind was registered under
    pub fn name_of(&self, id: ScriptKindId) -> Option<&str> {
        self.kinds.get(id.0 as usize).map(|kind| kind.name.as_str())
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no kind is registered
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Build a fresh instance of `id`
    pub fn instantiate(&self, id: ScriptKindId) -> Result<ScriptComponent, EngineError> {
        let kind = self
            .kinds
            .get(id.0 as usize)
            .ok_or_else(|| EngineError::UnknownScriptKind(id.to_string()))?;
        Ok(ScriptComponent::new(id, (kind.factory)()))
    }

    /// Build a fresh instance of the kind registered as `name`
    pub fn instantiate_by_name(&self, name: &str) -> Result<ScriptComponent, EngineError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| EngineError::UnknownScriptKind(name.to_string()))?;
        self.instantiate(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Spinner;
    impl Script for Spinner {}

    #[derive(Default)]
    struct Mover;
    impl Script for Mover {}

    #[test]
    fn test_each_kind_gets_its_own_id() {
        let mut registry = ScriptRegistry::new();
        let spinner = registry.register::<Spinner>("Spinner");
        let mover = registry.register::<Mover>("Mover");

        assert_ne!(spinner, mover);
        assert_eq!(registry.id_of("Mover"), Some(mover));
        assert_eq!(registry.name_of(spinner), Some("Spinner"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reregistering_keeps_id() {
        let mut registry = ScriptRegistry::new();
        let first = registry.register::<Spinner>("Spinner");
        let second = registry.register::<Mover>("Spinner");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let registry = ScriptRegistry::new();
        assert!(matches!(
            registry.instantiate_by_name("Ghost"),
            Err(EngineError::UnknownScriptKind(name)) if name == "Ghost"
        ));
        assert!(matches!(
            registry.instantiate(ScriptKindId(3)),
            Err(EngineError::UnknownScriptKind(_))
        ));
    }

    #[test]
    fn test_instantiate_builds_the_registered_kind() {
        let mut registry = ScriptRegistry::new();
        let id = registry.register::<Spinner>("Spinner");
        let component = registry.instantiate(id).unwrap();
        assert_eq!(component.kind(), id);
    }
}
