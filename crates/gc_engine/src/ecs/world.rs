//! World: arena of GameObjects and scenes plus the managers
//!
//! Everything that touches more than one of objects, scenes, components and
//! managers lives here. Frame passes:
//!
//! 1. [`World::flush_pending_components`] creates components added since the
//!    last frame (resources, `start`, registration)
//! 2. [`World::update`] walks the update manager
//! 3. [`World::fixed_update`] walks the physics manager, then runs collision
//!    detection and the trigger callbacks
//! 4. [`World::render`] walks loaded scenes in load order
//!
//! Script commands queued during a pass are applied when the pass ends.

use slotmap::SlotMap;

use super::component::{Component, ComponentData, ComponentFlags, ComponentKind, ComponentPayload, ComponentRef};
use super::components::script::WorldCommand;
use super::components::{ColliderHit, ScriptContext, ScriptRegistry, SpriteRenderer};
use super::game_object::{GameObject, GameObjectId, GameObjectKey};
use super::managers::Managers;
use crate::core::config::EngineConfig;
use crate::engine::EngineError;
use crate::input::InputSystem;
use crate::physics::TriggerPhase;
use crate::render::Graphics;
use crate::scene::{Scene, SceneKey};

/// Owner of every GameObject, scene and manager
pub struct World {
    objects: SlotMap<GameObjectKey, GameObject>,
    scenes: SlotMap<SceneKey, Scene>,
    loaded_scenes: Vec<SceneKey>,
    managers: Managers,
    scripts: ScriptRegistry,
    input: InputSystem,
    pending: Vec<ComponentRef>,
    commands: Vec<WorldCommand>,
    next_object_id: u32,
    default_object_name: String,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world with default settings
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    /// Create an empty world configured from `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut managers = Managers::default();
        managers.physics.set_trigger_events(config.physics.trigger_events);

        Self {
            objects: SlotMap::with_key(),
            scenes: SlotMap::with_key(),
            loaded_scenes: Vec::new(),
            managers,
            scripts: ScriptRegistry::new(),
            input: InputSystem::new(),
            pending: Vec::new(),
            commands: Vec::new(),
            next_object_id: 0,
            default_object_name: config.scene.default_object_name.clone(),
        }
    }

    // ---------------------------------------------------------------
    // Scenes
    // ---------------------------------------------------------------

    /// Create an unloaded scene
    pub fn create_scene(&mut self, name: &str) -> SceneKey {
        let key = self.scenes.insert(Scene::new(name));
        log::info!("Created scene '{name}'");
        key
    }

    /// Load a scene: it becomes active and its active objects with it
    pub fn load_scene(&mut self, scene: SceneKey) -> Result<(), EngineError> {
        let entry = self.scenes.get_mut(scene).ok_or_else(|| missing_scene(scene))?;
        if entry.is_active() {
            return Ok(());
        }
        entry.set_active(true);
        log::info!("Loaded scene '{}'", entry.name());

        self.loaded_scenes.push(scene);
        self.refresh_scene(scene)
    }

    /// Unload a scene; its objects stay alive but globally inactive
    pub fn unload_scene(&mut self, scene: SceneKey) -> Result<(), EngineError> {
        let entry = self.scenes.get_mut(scene).ok_or_else(|| missing_scene(scene))?;
        if !entry.is_active() {
            return Ok(());
        }
        entry.set_active(false);
        log::info!("Unloaded scene '{}'", entry.name());

        self.loaded_scenes.retain(|loaded| *loaded != scene);
        self.refresh_scene(scene)
    }

    /// Destroy a scene and every object it contains
    pub fn destroy_scene(&mut self, scene: SceneKey) -> Result<(), EngineError> {
        let keys = self.scenes.get(scene).ok_or_else(|| missing_scene(scene))?.object_keys();

        let mut first_error = None;
        for key in keys {
            keep_first(&mut first_error, self.destroy_game_object(key));
        }

        self.loaded_scenes.retain(|loaded| *loaded != scene);
        if let Some(removed) = self.scenes.remove(scene) {
            log::info!("Destroyed scene '{}'", removed.name());
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Scene behind `key`
    pub fn scene(&self, key: SceneKey) -> Option<&Scene> {
        self.scenes.get(key)
    }

    /// First scene named `name`
    pub fn find_scene_by_name(&self, name: &str) -> Option<SceneKey> {
        self.scenes.iter().find(|(_, scene)| scene.name() == name).map(|(key, _)| key)
    }

    /// Loaded scenes in load order
    pub fn loaded_scenes(&self) -> &[SceneKey] {
        &self.loaded_scenes
    }

    /// Number of scenes, loaded or not
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    // ---------------------------------------------------------------
    // GameObjects
    // ---------------------------------------------------------------

    /// Create a GameObject at the end of `scene`
    pub fn create_game_object(
        &mut self,
        scene: SceneKey,
        name: &str,
        active: bool,
        tag: &str,
        layer: i32,
    ) -> Result<GameObjectKey, EngineError> {
        if !self.scenes.contains_key(scene) {
            return Err(missing_scene(scene));
        }

        let id = self.next_id();
        let key = self.objects.insert(GameObject::new(id, name, active, tag, layer));
        self.attach(key, scene)?;
        log::debug!("Created game object {id} '{name}'");
        Ok(key)
    }

    /// Create an active, untagged GameObject with the default name
    pub fn spawn(&mut self, scene: SceneKey) -> Result<GameObjectKey, EngineError> {
        let name = self.default_object_name.clone();
        self.create_game_object(scene, &name, true, "", 0)
    }

    /// Destroy a GameObject
    ///
    /// Every component leaves its managers before being dropped.
    pub fn destroy_game_object(&mut self, key: GameObjectKey) -> Result<(), EngineError> {
        if !self.objects.contains_key(key) {
            return Err(missing_object(key));
        }
        self.detach(key);

        let Some(mut object) = self.objects.remove(key) else {
            return Err(missing_object(key));
        };
        self.pending.retain(|reference| reference.object != key);

        let mut first_error = None;
        for component in object.components.values_mut() {
            keep_first(&mut first_error, component.destroy(&mut self.managers));
        }
        log::debug!("Destroyed game object {} '{}'", object.id, object.name);
        first_error.map_or(Ok(()), Err)
    }

    /// GameObject behind `key`
    pub fn game_object(&self, key: GameObjectKey) -> Option<&GameObject> {
        self.objects.get(key)
    }

    /// GameObject behind `key`, mutable
    pub fn game_object_mut(&mut self, key: GameObjectKey) -> Option<&mut GameObject> {
        self.objects.get_mut(key)
    }

    /// Every live GameObject, in arena order
    pub fn game_objects(&self) -> impl Iterator<Item = (GameObjectKey, &GameObject)> + '_ {
        self.objects.iter()
    }

    /// Number of live GameObjects
    pub fn game_object_count(&self) -> usize {
        self.objects.len()
    }

    /// First object of `scene` named `name`
    pub fn find_game_object_by_name(&self, scene: SceneKey, name: &str) -> Option<GameObjectKey> {
        self.scenes
            .get(scene)?
            .objects()
            .find(|key| self.objects.get(*key).is_some_and(|object| object.name == name))
    }

    /// Object of `scene` with ID `id`
    pub fn find_game_object_by_id(&self, scene: SceneKey, id: GameObjectId) -> Option<GameObjectKey> {
        self.scenes
            .get(scene)?
            .objects()
            .find(|key| self.objects.get(*key).is_some_and(|object| object.id == id))
    }

    /// Like [`find_game_object_by_name`](Self::find_game_object_by_name), failing with `NotFound`
    pub fn find_game_object_by_name_or_err(&self, scene: SceneKey, name: &str) -> Result<GameObjectKey, EngineError> {
        self.find_game_object_by_name(scene, name)
            .ok_or_else(|| EngineError::NotFound(format!("no game object named '{name}'")))
    }

    /// Like [`find_game_object_by_id`](Self::find_game_object_by_id), failing with `NotFound`
    pub fn find_game_object_by_id_or_err(&self, scene: SceneKey, id: GameObjectId) -> Result<GameObjectKey, EngineError> {
        self.find_game_object_by_id(scene, id)
            .ok_or_else(|| EngineError::NotFound(format!("no game object {id}")))
    }

    /// Copy a GameObject into its scene
    ///
    /// Name, flags, transform and every component are copied. Copied
    /// components start uncreated and go through the next
    /// [`flush_pending_components`](Self::flush_pending_components).
    pub fn duplicate_game_object(&mut self, key: GameObjectKey) -> Result<GameObjectKey, EngineError> {
        let source = self.objects.get(key).ok_or_else(|| missing_object(key))?;
        let components = source
            .components
            .values()
            .map(|component| Ok((component.data().duplicate(&self.scripts)?, component.is_self_active())))
            .collect::<Result<Vec<_>, EngineError>>()?;

        let id = GameObjectId(self.next_object_id);
        let mut copy = GameObject::new(id, &source.name, source.active, &source.tag, source.layer);
        copy.transform = source.transform.clone();
        let (source_id, scene) = (source.id, source.scene);
        self.next_object_id += 1;

        let copy_key = self.objects.insert(copy);
        if let Some(scene) = scene {
            self.attach(copy_key, scene)?;
        }

        let global_active = self.is_globally_active(copy_key);
        let object = self.objects.get_mut(copy_key).ok_or_else(|| missing_object(copy_key))?;
        for (data, self_active) in components {
            let component = Component::new(copy_key, data, global_active).with_self_active(self_active);
            let reference = component.reference();
            object.components.insert(reference.kind, component);
            self.pending.push(reference);
        }

        log::debug!("Duplicated game object {source_id} as {id}");
        Ok(copy_key)
    }

    /// Move a GameObject to the end of another scene
    pub fn move_game_object_to_scene(&mut self, key: GameObjectKey, scene: SceneKey) -> Result<(), EngineError> {
        if !self.objects.contains_key(key) {
            return Err(missing_object(key));
        }
        if !self.scenes.contains_key(scene) {
            return Err(missing_scene(scene));
        }

        self.detach(key);
        self.attach(key, scene)?;
        self.refresh_global(key)
    }

    /// Detach a GameObject from its scene; it stays alive, globally inactive
    pub fn remove_game_object_from_scene(&mut self, key: GameObjectKey) -> Result<(), EngineError> {
        if !self.objects.contains_key(key) {
            return Err(missing_object(key));
        }
        self.detach(key);
        self.refresh_global(key)
    }

    /// Toggle a GameObject; its components follow on their global axis
    pub fn set_game_object_active(&mut self, key: GameObjectKey, active: bool) -> Result<(), EngineError> {
        let object = self.objects.get_mut(key).ok_or_else(|| missing_object(key))?;
        if object.active == active {
            return Ok(());
        }
        object.active = active;
        self.refresh_global(key)
    }

    /// Whether the object is active and sits in a loaded scene
    pub fn is_globally_active(&self, key: GameObjectKey) -> bool {
        self.objects.get(key).is_some_and(|object| {
            object.active && object.scene.and_then(|scene| self.scenes.get(scene)).is_some_and(Scene::is_active)
        })
    }

    // ---------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------

    /// Attach a component
    ///
    /// The component is created by the next
    /// [`flush_pending_components`](Self::flush_pending_components); until
    /// then it sits in no manager.
    pub fn add_component(&mut self, key: GameObjectKey, data: impl Into<ComponentData>) -> Result<ComponentRef, EngineError> {
        let data = data.into();
        let global_active = self.is_globally_active(key);
        let object = self.objects.get_mut(key).ok_or_else(|| missing_object(key))?;

        let kind = data.kind();
        if object.components.contains_key(&kind) {
            return Err(EngineError::DuplicateComponent(format!("{kind:?} on {}", object.id)));
        }

        let component = Component::new(key, data, global_active);
        let reference = component.reference();
        object.components.insert(kind, component);
        self.pending.push(reference);
        Ok(reference)
    }

    /// Attach a new instance of the script kind registered as `name`
    pub fn add_script(&mut self, key: GameObjectKey, name: &str) -> Result<ComponentRef, EngineError> {
        let script = self.scripts.instantiate_by_name(name)?;
        self.add_component(key, script)
    }

    /// Detach and destroy a component
    pub fn remove_component(&mut self, key: GameObjectKey, kind: ComponentKind) -> Result<(), EngineError> {
        let object = self.objects.get_mut(key).ok_or_else(|| missing_object(key))?;
        let mut component = object
            .components
            .remove(&kind)
            .ok_or_else(|| missing_component(kind, object.id))?;

        self.pending.retain(|reference| *reference != component.reference());
        component.destroy(&mut self.managers)
    }

    /// Toggle a component's own activation axis
    pub fn set_component_active(&mut self, key: GameObjectKey, kind: ComponentKind, active: bool) -> Result<(), EngineError> {
        let World { objects, managers, .. } = self;
        let object = objects.get_mut(key).ok_or_else(|| missing_object(key))?;
        let id = object.id;
        let component = object
            .components
            .get_mut(&kind)
            .ok_or_else(|| missing_component(kind, id))?;
        component.set_active(active, managers)
    }

    /// Component of `kind` on `key`
    pub fn component(&self, key: GameObjectKey, kind: ComponentKind) -> Option<&Component> {
        self.objects.get(key)?.component(kind)
    }

    /// Typed payload on `key`
    pub fn get<T: ComponentPayload>(&self, key: GameObjectKey) -> Option<&T> {
        self.objects.get(key)?.get::<T>()
    }

    /// Typed payload on `key`, mutable
    pub fn get_mut<T: ComponentPayload>(&mut self, key: GameObjectKey) -> Option<&mut T> {
        self.objects.get_mut(key)?.get_mut::<T>()
    }

    /// Show the texture at `path` on the object's sprite renderer
    pub fn set_sprite(&mut self, key: GameObjectKey, graphics: &mut dyn Graphics, path: &str) -> Result<(), EngineError> {
        let object = self.objects.get_mut(key).ok_or_else(|| missing_object(key))?;
        let id = object.id;
        object
            .get_mut::<SpriteRenderer>()
            .ok_or_else(|| missing_component(ComponentKind::SpriteRenderer, id))?
            .set_sprite(graphics, path)
    }

    /// Test two colliders against each other right now
    pub fn check_collision(&self, a: ComponentRef, b: ComponentRef) -> Result<bool, EngineError> {
        self.managers.physics.check_collision(&self.objects, a, b)
    }

    /// Turn Enter/Exit trigger notifications on or off
    pub fn set_trigger_events(&mut self, enabled: bool) {
        self.managers.physics.set_trigger_events(enabled);
    }

    /// Number of components waiting for creation
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ---------------------------------------------------------------
    // Services
    // ---------------------------------------------------------------

    /// Managers, read-only
    pub fn managers(&self) -> &Managers {
        &self.managers
    }

    /// Script kinds
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    /// Script kinds, mutable (register kinds here at startup)
    pub fn scripts_mut(&mut self) -> &mut ScriptRegistry {
        &mut self.scripts
    }

    /// Input state seen by scripts
    pub fn input(&self) -> &InputSystem {
        &self.input
    }

    /// Input state, mutable
    pub fn input_mut(&mut self) -> &mut InputSystem {
        &mut self.input
    }

    // ---------------------------------------------------------------
    // Frame passes
    // ---------------------------------------------------------------

    /// Create every component added since the last call
    ///
    /// For each one: graphics resources are built, `start` runs for
    /// scripts, then the component registers if effectively active.
    pub fn flush_pending_components(&mut self, graphics: &mut dyn Graphics) -> Result<(), EngineError> {
        let pending = std::mem::take(&mut self.pending);
        let mut first_error = None;

        let World { objects, managers, input, commands, .. } = self;
        for reference in pending {
            let Some(object) = objects.get_mut(reference.object) else {
                continue;
            };
            let GameObject { id, transform, components, .. } = object;
            let Some(component) = components.get_mut(&reference.kind) else {
                continue;
            };

            if let Err(error) = component.data_mut().create_resources(graphics) {
                log::error!("Creating resources for {reference:?}: {error}");
                first_error.get_or_insert(error);
            }

            let mut ctx = ScriptContext::new(reference.object, *id, transform, input, 0.0, commands);
            let result = component.create(managers, |data| {
                if let ComponentData::Script(script) = data {
                    script.behaviour_mut().start(&mut ctx);
                }
            });
            keep_first(&mut first_error, result);
        }

        keep_first(&mut first_error, self.apply_commands());
        first_error.map_or(Ok(()), Err)
    }

    /// Per-frame pass over the update manager
    pub fn update(&mut self, delta_time: f32, graphics: &mut dyn Graphics) -> Result<(), EngineError> {
        let World { objects, managers, input, commands, .. } = self;
        for reference in managers.update.components().snapshot() {
            let Some(object) = objects.get_mut(reference.object) else {
                continue;
            };
            let GameObject { id, transform, components, .. } = object;
            let Some(component) = components.get_mut(&reference.kind) else {
                continue;
            };

            let mut ctx = ScriptContext::new(reference.object, *id, transform, input, delta_time, commands);
            component.data_mut().update(&mut ctx, graphics);
        }

        self.apply_commands()
    }

    /// One fixed step: fixed-update hooks, collision detection, triggers
    pub fn fixed_update(&mut self, delta_time: f32) -> Result<(), EngineError> {
        let World { objects, managers, input, commands, .. } = self;
        for reference in managers.physics.components().snapshot() {
            let Some(object) = objects.get_mut(reference.object) else {
                continue;
            };
            let GameObject { id, transform, components, .. } = object;
            let Some(component) = components.get_mut(&reference.kind) else {
                continue;
            };

            let mut ctx = ScriptContext::new(reference.object, *id, transform, input, delta_time, commands);
            component.data_mut().fixed_update(&mut ctx);
        }

        for event in managers.physics.detect(objects) {
            let (first, second) = (event.pair.first, event.pair.second);
            notify_trigger(objects, input, commands, delta_time, event.phase, first, second);
            notify_trigger(objects, input, commands, delta_time, event.phase, second, first);
        }

        self.apply_commands()
    }

    /// Draw loaded scenes in load order
    ///
    /// Within a scene objects draw in insertion order; each object draws
    /// its sprite, then its visible collider gizmos. Only components
    /// registered with the render manager draw.
    pub fn render(&mut self, graphics: &mut dyn Graphics) -> Result<(), EngineError> {
        let World { objects, scenes, loaded_scenes, .. } = self;
        let mut first_error = None;

        for scene in loaded_scenes.iter().filter_map(|key| scenes.get(*key)) {
            for key in scene.objects() {
                let Some(object) = objects.get_mut(key) else {
                    continue;
                };
                let GameObject { transform, components, .. } = object;

                for component in components.values_mut() {
                    if !component.registered_flags().contains(ComponentFlags::RENDER) {
                        continue;
                    }
                    let result = match component.data_mut() {
                        ComponentData::SpriteRenderer(sprite) => sprite.render(graphics, transform),
                        ComponentData::Collider(collider) => collider.render(graphics, transform).map(|_| ()),
                        _ => Ok(()),
                    };
                    keep_first(&mut first_error, result);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn next_id(&mut self) -> GameObjectId {
        let id = GameObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    fn attach(&mut self, key: GameObjectKey, scene: SceneKey) -> Result<(), EngineError> {
        let entry = self.scenes.get_mut(scene).ok_or_else(|| missing_scene(scene))?.push(key);
        let object = self.objects.get_mut(key).ok_or_else(|| missing_object(key))?;
        object.scene = Some(scene);
        object.scene_entry = Some(entry);
        Ok(())
    }

    fn detach(&mut self, key: GameObjectKey) {
        let Some(object) = self.objects.get_mut(key) else {
            return;
        };
        let (Some(scene), Some(entry)) = (object.scene.take(), object.scene_entry.take()) else {
            return;
        };
        if let Some(scene) = self.scenes.get_mut(scene) {
            scene.remove(entry);
        }
    }

    /// Push the object's global activation down to its components
    fn refresh_global(&mut self, key: GameObjectKey) -> Result<(), EngineError> {
        let active = self.is_globally_active(key);
        let World { objects, managers, .. } = self;
        let object = objects.get_mut(key).ok_or_else(|| missing_object(key))?;

        let mut first_error = None;
        for component in object.components.values_mut() {
            keep_first(&mut first_error, component.set_global_active(active, managers));
        }
        first_error.map_or(Ok(()), Err)
    }

    fn refresh_scene(&mut self, scene: SceneKey) -> Result<(), EngineError> {
        let keys = self.scenes.get(scene).map(Scene::object_keys).unwrap_or_default();

        let mut first_error = None;
        for key in keys {
            keep_first(&mut first_error, self.refresh_global(key));
        }
        first_error.map_or(Ok(()), Err)
    }

    fn apply_commands(&mut self) -> Result<(), EngineError> {
        let mut first_error = None;
        for command in std::mem::take(&mut self.commands) {
            let result = match command {
                WorldCommand::Destroy(key) if !self.objects.contains_key(key) => {
                    log::debug!("Skipping destroy of {key:?}: already gone");
                    Ok(())
                }
                WorldCommand::Destroy(key) => self.destroy_game_object(key),
                WorldCommand::SetActive(key, active) => self.set_game_object_active(key, active),
                WorldCommand::SetComponentActive(key, kind, active) => self.set_component_active(key, kind, active),
            };
            keep_first(&mut first_error, result);
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Deliver one trigger phase to every live script on `owner`'s object
fn notify_trigger(
    objects: &mut SlotMap<GameObjectKey, GameObject>,
    input: &InputSystem,
    commands: &mut Vec<WorldCommand>,
    delta_time: f32,
    phase: TriggerPhase,
    owner: ComponentRef,
    other: ComponentRef,
) {
    let Some(other_object) = objects.get(other.object) else {
        return;
    };
    let hit = ColliderHit {
        object: other.object,
        id: other_object.id,
        kind: other.kind,
        is_trigger: other_object.collider(other.kind).is_some_and(|collider| collider.is_trigger()),
    };

    let Some(object) = objects.get_mut(owner.object) else {
        return;
    };
    let GameObject { id, transform, components, .. } = object;
    for component in components.values_mut() {
        if !component.is_active() || !component.is_created() {
            continue;
        }
        let Some(script) = component.script_mut() else {
            continue;
        };

        let mut ctx = ScriptContext::new(owner.object, *id, transform, input, delta_time, commands);
        let behaviour = script.behaviour_mut();
        match phase {
            TriggerPhase::Enter => behaviour.on_trigger_enter(&mut ctx, &hit),
            TriggerPhase::Stay => behaviour.on_trigger_stay(&mut ctx, &hit),
            TriggerPhase::Exit => behaviour.on_trigger_exit(&mut ctx, &hit),
        }
    }
}

fn keep_first(slot: &mut Option<EngineError>, result: Result<(), EngineError>) {
    if let Err(error) = result {
        slot.get_or_insert(error);
    }
}

fn missing_object(key: GameObjectKey) -> EngineError {
    EngineError::NotFound(format!("game object {key:?}"))
}

fn missing_scene(key: SceneKey) -> EngineError {
    EngineError::NotFound(format!("scene {key:?}"))
}

fn missing_component(kind: ComponentKind, id: GameObjectId) -> EngineError {
    EngineError::NotFound(format!("{kind:?} on game object {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Animator, Collider, RigidBody, Script};
    use crate::foundation::math::{Transform, Vec3};
    use crate::render::{Color, GraphicsError, HeadlessGraphics};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        log: Log,
        label: &'static str,
    }

    impl Script for Recorder {
        fn start(&mut self, _ctx: &mut ScriptContext<'_>) {
            self.log.borrow_mut().push(format!("{} start", self.label));
        }

        fn on_trigger_enter(&mut self, _ctx: &mut ScriptContext<'_>, other: &ColliderHit) {
            self.log.borrow_mut().push(format!("{} enter {}", self.label, other.id));
        }

        fn on_trigger_stay(&mut self, _ctx: &mut ScriptContext<'_>, other: &ColliderHit) {
            self.log.borrow_mut().push(format!("{} stay {}", self.label, other.id));
        }

        fn on_trigger_exit(&mut self, _ctx: &mut ScriptContext<'_>, other: &ColliderHit) {
            self.log.borrow_mut().push(format!("{} exit {}", self.label, other.id));
        }
    }

    #[derive(Default)]
    struct SelfDestruct;

    impl Script for SelfDestruct {
        fn update(&mut self, ctx: &mut ScriptContext<'_>) {
            ctx.destroy_self();
        }
    }

    fn loaded_world() -> (World, SceneKey, HeadlessGraphics) {
        let mut world = World::new();
        let scene = world.create_scene("Level");
        world.load_scene(scene).unwrap();
        (world, scene, HeadlessGraphics::new())
    }

    fn named(world: &mut World, scene: SceneKey, name: &str) -> GameObjectKey {
        world.create_game_object(scene, name, true, "", 0).unwrap()
    }

    fn names(world: &World, scene: SceneKey) -> Vec<String> {
        world
            .scene(scene)
            .unwrap()
            .objects()
            .map(|key| world.game_object(key).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_destroying_the_middle_object_keeps_order() {
        let (mut world, scene, mut graphics) = loaded_world();
        let a = named(&mut world, scene, "a");
        let b = named(&mut world, scene, "b");
        let c = named(&mut world, scene, "c");
        for key in [a, b, c] {
            world.add_component(key, Animator::default()).unwrap();
        }
        world.flush_pending_components(&mut graphics).unwrap();
        assert_eq!(world.managers().update.len(), 3);

        world.destroy_game_object(b).unwrap();
        assert_eq!(names(&world, scene), vec!["a", "c"]);
        assert_eq!(world.managers().update.len(), 2);
        assert!(world.game_object(b).is_none());
        assert!(matches!(world.destroy_game_object(b), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_find_by_id_and_name() {
        let (mut world, scene, _) = loaded_world();
        let other = world.create_scene("Other");
        let keys: Vec<_> = ["player", "enemy", "enemy"].iter().map(|name| named(&mut world, scene, name)).collect();
        let elsewhere = named(&mut world, other, "player");

        for (index, key) in keys.iter().enumerate() {
            let id = GameObjectId(index as u32);
            assert_eq!(world.game_object(*key).unwrap().id(), id);
            assert_eq!(world.find_game_object_by_id(scene, id), Some(*key));
        }
        assert_eq!(world.find_game_object_by_id(scene, GameObjectId(3)), None);
        assert_eq!(world.find_game_object_by_id(other, GameObjectId(3)), Some(elsewhere));
        assert_eq!(world.find_game_object_by_id(scene, GameObjectId(42)), None);

        assert_eq!(world.find_game_object_by_name(scene, "enemy"), Some(keys[1]));
        assert_eq!(world.find_game_object_by_name(other, "player"), Some(elsewhere));
        assert!(matches!(
            world.find_game_object_by_name_or_err(scene, "boss"),
            Err(EngineError::NotFound(_))
        ));
        assert!(world.find_game_object_by_id_or_err(scene, GameObjectId(0)).is_ok());
    }

    #[test]
    fn test_components_register_on_flush_only() {
        let (mut world, scene, mut graphics) = loaded_world();
        let key = world.spawn(scene).unwrap();
        assert_eq!(world.game_object(key).unwrap().name(), "GameObject");

        let sprite = world.add_component(key, SpriteRenderer::new()).unwrap();
        assert_eq!(world.pending_count(), 1);
        assert!(!world.managers().render.contains(sprite));

        world.flush_pending_components(&mut graphics).unwrap();
        assert_eq!(world.pending_count(), 0);
        assert!(world.managers().render.contains(sprite));
        assert!(world.component(key, ComponentKind::SpriteRenderer).unwrap().is_created());
    }

    #[test]
    fn test_one_component_per_kind() {
        let (mut world, scene, _) = loaded_world();
        let key = world.spawn(scene).unwrap();
        world.add_component(key, Collider::boxed()).unwrap();
        world.add_component(key, Collider::circle()).unwrap();

        assert!(matches!(
            world.add_component(key, Collider::boxed()),
            Err(EngineError::DuplicateComponent(_))
        ));
        assert_eq!(world.game_object(key).unwrap().component_count(), 2);
    }

    #[test]
    fn test_scene_load_state_drives_registration() {
        let mut world = World::new();
        let mut graphics = HeadlessGraphics::new();
        let scene = world.create_scene("Level");
        let key = world.spawn(scene).unwrap();
        let collider = world.add_component(key, Collider::boxed()).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();

        assert!(world.component(key, collider.kind).unwrap().is_created());
        assert!(!world.managers().physics.contains_collider(collider));

        world.load_scene(scene).unwrap();
        assert!(world.managers().physics.contains_collider(collider));
        assert_eq!(world.loaded_scenes(), &[scene]);

        world.unload_scene(scene).unwrap();
        assert!(!world.managers().physics.contains_collider(collider));
        assert!(!world.managers().render.contains(collider));
        assert!(world.loaded_scenes().is_empty());
    }

    #[test]
    fn test_object_activation_propagates_to_components() {
        let (mut world, scene, mut graphics) = loaded_world();
        let key = world.spawn(scene).unwrap();
        let body = world.add_component(key, RigidBody::new()).unwrap();
        world.set_component_active(key, ComponentKind::RigidBody, false).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();
        assert!(!world.managers().physics.contains_component(body));

        world.set_game_object_active(key, false).unwrap();
        world.set_component_active(key, ComponentKind::RigidBody, true).unwrap();
        assert!(!world.managers().physics.contains_component(body), "object is inactive");

        world.set_game_object_active(key, true).unwrap();
        assert!(world.managers().physics.contains_component(body));
    }

    #[test]
    fn test_detached_objects_are_inactive_until_moved() {
        let (mut world, scene, mut graphics) = loaded_world();
        let other = world.create_scene("Other");
        let key = world.spawn(scene).unwrap();
        let animator = world.add_component(key, Animator::default()).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();

        world.remove_game_object_from_scene(key).unwrap();
        assert!(world.scene(scene).unwrap().is_empty());
        assert!(world.game_object(key).unwrap().scene().is_none());
        assert!(!world.managers().update.contains(animator));

        world.move_game_object_to_scene(key, other).unwrap();
        assert!(!world.managers().update.contains(animator), "target scene is not loaded");

        world.load_scene(other).unwrap();
        assert!(world.managers().update.contains(animator));

        world.move_game_object_to_scene(key, scene).unwrap();
        assert_eq!(world.scene(scene).unwrap().len(), 1);
        assert!(world.scene(other).unwrap().is_empty());
        assert!(world.managers().update.contains(animator));
    }

    #[test]
    fn test_duplicate_copies_fields_and_components() {
        let (mut world, scene, mut graphics) = loaded_world();
        let log = Log::default();
        let recorder = Rc::clone(&log);
        world.scripts_mut().register_with("recorder", move || {
            Box::new(Recorder { log: Rc::clone(&recorder), label: "r" })
        });

        let key = world.create_game_object(scene, "goat", true, "animal", 3).unwrap();
        world.game_object_mut(key).unwrap().transform_mut().position = Vec3::new(2.0, 3.0, 0.0);
        world.add_component(key, SpriteRenderer::with_color(Color::GREEN)).unwrap();
        world.add_component(key, RigidBody::new()).unwrap();
        world.add_script(key, "recorder").unwrap();
        world.set_component_active(key, ComponentKind::RigidBody, false).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();

        let copy = world.duplicate_game_object(key).unwrap();
        let object = world.game_object(copy).unwrap();
        assert_eq!((object.name(), object.tag(), object.layer()), ("goat", "animal", 3));
        assert_eq!(object.id(), GameObjectId(1));
        assert_relative_eq!(object.transform().position, Vec3::new(2.0, 3.0, 0.0));
        assert_eq!(object.component_count(), 3);
        assert!(object.components().all(|component| !component.is_created()));
        assert_eq!(world.get::<SpriteRenderer>(copy).unwrap().color(), Color::GREEN);
        assert_eq!(names(&world, scene), vec!["goat", "goat"]);

        world.flush_pending_components(&mut graphics).unwrap();
        let body = world.component(copy, ComponentKind::RigidBody).unwrap();
        assert!(!body.is_self_active());
        assert!(!body.is_registered());
        assert_eq!(*log.borrow(), vec!["r start", "r start"]);
    }

    #[test]
    fn test_trigger_callbacks_reach_both_objects() {
        let (mut world, scene, mut graphics) = loaded_world();
        let log = Log::default();
        for label in ["a", "b"] {
            let log = Rc::clone(&log);
            world.scripts_mut().register_with(label, move || Box::new(Recorder { log: Rc::clone(&log), label }));
        }

        let a = named(&mut world, scene, "a");
        let b = named(&mut world, scene, "b");
        world.game_object_mut(b).unwrap().transform_mut().position = Vec3::new(5.0, 5.0, 0.0);
        for (key, label) in [(a, "a"), (b, "b")] {
            world.add_component(key, Collider::boxed().with_trigger(true)).unwrap();
            world.add_script(key, label).unwrap();
        }
        world.flush_pending_components(&mut graphics).unwrap();
        log.borrow_mut().clear();

        world.fixed_update(0.02).unwrap();
        assert!(log.borrow().is_empty());

        world.game_object_mut(b).unwrap().transform_mut().position = Vec3::new(0.5, 0.5, 0.0);
        world.fixed_update(0.02).unwrap();
        assert_eq!(*log.borrow(), vec!["a enter #1", "b enter #0", "a stay #1", "b stay #0"]);

        log.borrow_mut().clear();
        world.game_object_mut(b).unwrap().transform_mut().position = Vec3::new(5.0, 5.0, 0.0);
        world.fixed_update(0.02).unwrap();
        assert_eq!(*log.borrow(), vec!["a exit #1", "b exit #0"]);
    }

    #[test]
    fn test_destroyed_collider_gets_no_exit() {
        let (mut world, scene, mut graphics) = loaded_world();
        let log = Log::default();
        let recorder = Rc::clone(&log);
        world.scripts_mut().register_with("a", move || Box::new(Recorder { log: Rc::clone(&recorder), label: "a" }));

        let a = named(&mut world, scene, "a");
        let b = named(&mut world, scene, "b");
        world.add_component(a, Collider::boxed()).unwrap();
        world.add_script(a, "a").unwrap();
        world.add_component(b, Collider::boxed()).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();

        world.fixed_update(0.02).unwrap();
        assert_eq!(world.managers().physics.overlap_count(), 1);

        world.destroy_game_object(b).unwrap();
        log.borrow_mut().clear();
        world.fixed_update(0.02).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(world.managers().physics.overlap_count(), 0);
    }

    #[test]
    fn test_rigid_body_moves_by_velocity_times_step() {
        let (mut world, scene, mut graphics) = loaded_world();
        let key = world.spawn(scene).unwrap();
        world.add_component(key, RigidBody::with_velocity(Vec3::new(2.0, -1.0, 0.0))).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();

        world.fixed_update(0.5).unwrap();
        world.fixed_update(0.5).unwrap();
        let position = world.game_object(key).unwrap().transform().position;
        assert_relative_eq!(position, Vec3::new(2.0, -1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_script_commands_apply_after_the_pass() {
        let (mut world, scene, mut graphics) = loaded_world();
        world.scripts_mut().register::<SelfDestruct>("self_destruct");
        let doomed = named(&mut world, scene, "doomed");
        let survivor = named(&mut world, scene, "survivor");
        world.add_script(doomed, "self_destruct").unwrap();
        world.add_component(survivor, Animator::default()).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();

        world.update(0.016, &mut graphics).unwrap();
        assert!(world.game_object(doomed).is_none());
        assert_eq!(names(&world, scene), vec!["survivor"]);
        assert_eq!(world.managers().update.len(), 1);
    }

    #[test]
    fn test_render_walks_scenes_then_objects_then_sprite_before_gizmo() {
        let mut world = World::new();
        let mut graphics = HeadlessGraphics::new();
        let first = world.create_scene("First");
        let second = world.create_scene("Second");

        let late = named(&mut world, second, "late");
        world.add_component(late, SpriteRenderer::new()).unwrap();

        let early = named(&mut world, first, "early");
        world.add_component(early, Collider::boxed().with_visible(true)).unwrap();
        world.add_component(early, SpriteRenderer::new()).unwrap();

        let hidden = named(&mut world, first, "hidden");
        world.add_component(hidden, SpriteRenderer::new()).unwrap();
        world.set_component_active(hidden, ComponentKind::SpriteRenderer, false).unwrap();

        world.load_scene(first).unwrap();
        world.load_scene(second).unwrap();
        world.flush_pending_components(&mut graphics).unwrap();
        graphics.take_calls();

        world.render(&mut graphics).unwrap();
        let mesh_of = |key: GameObjectKey| world.get::<SpriteRenderer>(key).unwrap().mesh().unwrap();
        let drawn = graphics.drawn_meshes();
        assert_eq!(drawn.len(), 3);
        assert_eq!(drawn[0], mesh_of(early));
        assert_eq!(drawn[2], mesh_of(late));
    }

    #[test]
    fn test_missing_texture_fails_fast() {
        let (mut world, scene, _) = loaded_world();
        let mut graphics = HeadlessGraphics::with_textures(["goat.dds"]);
        let key = world.spawn(scene).unwrap();

        assert!(matches!(
            world.set_sprite(key, &mut graphics, "goat.dds"),
            Err(EngineError::NotFound(_))
        ));

        world.add_component(key, SpriteRenderer::new()).unwrap();
        assert!(matches!(
            world.set_sprite(key, &mut graphics, "wolf.dds"),
            Err(EngineError::Graphics(GraphicsError::TextureNotFound(_)))
        ));
        world.set_sprite(key, &mut graphics, "goat.dds").unwrap();
        assert_eq!(world.get::<SpriteRenderer>(key).unwrap().texture_path(), Some("goat.dds"));
    }

    #[test]
    fn test_destroy_scene_destroys_its_objects() {
        let (mut world, scene, mut graphics) = loaded_world();
        let keep = world.create_scene("Keep");
        let kept = named(&mut world, keep, "kept");
        for name in ["a", "b"] {
            let key = named(&mut world, scene, name);
            world.add_component(key, Collider::circle()).unwrap();
        }
        world.flush_pending_components(&mut graphics).unwrap();
        assert_eq!(world.managers().physics.collider_count(), 2);

        world.destroy_scene(scene).unwrap();
        assert!(world.scene(scene).is_none());
        assert_eq!(world.game_object_count(), 1);
        assert!(world.game_object(kept).is_some());
        assert_eq!(world.managers().physics.collider_count(), 0);
        assert!(world.loaded_scenes().is_empty());
        assert_eq!(world.find_scene_by_name("Keep"), Some(keep));
    }

    #[test]
    fn test_unknown_script_kind() {
        let (mut world, scene, _) = loaded_world();
        let key = world.spawn(scene).unwrap();
        assert!(matches!(world.add_script(key, "ghost"), Err(EngineError::UnknownScriptKind(_))));
    }

    #[test]
    fn test_check_collision_between_objects() {
        let (mut world, scene, _) = loaded_world();
        let a = named(&mut world, scene, "a");
        let b = named(&mut world, scene, "b");
        *world.game_object_mut(b).unwrap().transform_mut() = Transform::from_position_scale_2d(0.8, 0.0, 1.0, 1.0);
        let box_a = world.add_component(a, Collider::boxed()).unwrap();
        let circle_b = world.add_component(b, Collider::circle()).unwrap();
        let body = world.add_component(b, RigidBody::new()).unwrap();

        assert!(world.check_collision(box_a, circle_b).unwrap());
        assert!(world.check_collision(circle_b, box_a).unwrap());
        assert!(matches!(world.check_collision(box_a, body), Err(EngineError::TypeMismatch(_))));
    }
}
