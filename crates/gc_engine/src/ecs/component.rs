//! Component record and activation state machine
//!
//! Every component, whatever its kind, is a [`Component`]: a
//! [`ComponentData`] payload plus two activation axes.
//!
//! - `self_active`: toggled through the component itself
//! - `global_active`: follows the owner (object active and its scene loaded)
//!
//! A component is *effectively active* when both are true. It is
//! registered with exactly the managers named by its [`ComponentFlags`]
//! iff it is effectively active **and** has been created. Every toggle
//! follows the same order: flip its own axis, check the other axis, check
//! `created`, then (un)register and run the hook. Toggling an axis to the
//! value it already has is a no-op.

use bitflags::bitflags;

use super::components::{Animator, Camera, Collider, RigidBody, ScriptComponent, ScriptContext, ScriptKindId, ScriptRegistry, SoundMixer, SpriteRenderer};
use super::game_object::GameObjectKey;
use super::managers::Managers;
use crate::engine::EngineError;
use crate::foundation::collections::RegistryHandle;
use crate::render::Graphics;

bitflags! {
    /// Managers a component kind takes part in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentFlags: u8 {
        /// Per-frame Update pass
        const UPDATE = 1 << 0;
        /// Fixed-step physics pass
        const FIXED_UPDATE = 1 << 1;
        /// Render pass
        const RENDER = 1 << 2;
    }
}

/// Component kind; a GameObject holds at most one component per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`SpriteRenderer`]
    SpriteRenderer,
    /// [`Collider`] with a box shape
    BoxCollider,
    /// [`Collider`] with a circle shape
    CircleCollider,
    /// [`RigidBody`]
    RigidBody,
    /// [`Animator`]
    Animator,
    /// [`SoundMixer`]
    SoundMixer,
    /// [`Camera`]
    Camera,
    /// A registered script kind
    Script(ScriptKindId),
}

impl ComponentKind {
    /// Static capability flags of this kind
    pub fn flags(self) -> ComponentFlags {
        match self {
            Self::SpriteRenderer => ComponentFlags::RENDER,
            Self::BoxCollider | Self::CircleCollider => ComponentFlags::FIXED_UPDATE | ComponentFlags::RENDER,
            Self::RigidBody => ComponentFlags::FIXED_UPDATE,
            Self::Animator | Self::SoundMixer | Self::Camera => ComponentFlags::UPDATE,
            Self::Script(_) => ComponentFlags::UPDATE | ComponentFlags::FIXED_UPDATE,
        }
    }

    /// Whether this kind also joins the physics manager's collider list
    pub fn is_collider(self) -> bool {
        matches!(self, Self::BoxCollider | Self::CircleCollider)
    }

    /// Whether this kind is a script
    pub fn is_script(self) -> bool {
        matches!(self, Self::Script(_))
    }
}

/// Weak reference to a component, as stored by the managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentRef {
    /// Owning GameObject
    pub object: GameObjectKey,
    /// Kind of the component on that object
    pub kind: ComponentKind,
}

/// Per-kind component payload
#[derive(Debug)]
pub enum ComponentData {
    /// Sprite renderer
    SpriteRenderer(SpriteRenderer),
    /// Box or circle collider
    Collider(Collider),
    /// Rigid body
    RigidBody(RigidBody),
    /// Animator
    Animator(Animator),
    /// Sound mixer
    SoundMixer(SoundMixer),
    /// Camera
    Camera(Camera),
    /// Script instance
    Script(ScriptComponent),
}

impl ComponentData {
    /// Kind this payload belongs to
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::SpriteRenderer(_) => ComponentKind::SpriteRenderer,
            Self::Collider(collider) if collider.is_circle() => ComponentKind::CircleCollider,
            Self::Collider(_) => ComponentKind::BoxCollider,
            Self::RigidBody(_) => ComponentKind::RigidBody,
            Self::Animator(_) => ComponentKind::Animator,
            Self::SoundMixer(_) => ComponentKind::SoundMixer,
            Self::Camera(_) => ComponentKind::Camera,
            Self::Script(script) => ComponentKind::Script(script.kind()),
        }
    }

    /// Collider payload, if this is a collider
    pub fn as_collider(&self) -> Option<&Collider> {
        match self {
            Self::Collider(collider) => Some(collider),
            _ => None,
        }
    }

    /// Collider payload, mutable
    pub fn as_collider_mut(&mut self) -> Option<&mut Collider> {
        match self {
            Self::Collider(collider) => Some(collider),
            _ => None,
        }
    }

    /// Script payload, if this is a script
    pub fn as_script_mut(&mut self) -> Option<&mut ScriptComponent> {
        match self {
            Self::Script(script) => Some(script),
            _ => None,
        }
    }

    pub(crate) fn create_resources(&mut self, graphics: &mut dyn Graphics) -> Result<(), EngineError> {
        match self {
            Self::SpriteRenderer(sprite) => sprite.create_resources(graphics),
            Self::Collider(collider) => collider.create_resources(graphics),
            _ => Ok(()),
        }
    }

    pub(crate) fn update(&mut self, ctx: &mut ScriptContext<'_>, graphics: &mut dyn Graphics) {
        match self {
            Self::Animator(animator) => animator.update(ctx.delta_time()),
            Self::SoundMixer(mixer) => mixer.update(ctx.delta_time()),
            Self::Camera(camera) => {
                camera.update(ctx.transform(), graphics);
            }
            Self::Script(script) => script.behaviour_mut().update(ctx),
            Self::SpriteRenderer(_) | Self::Collider(_) | Self::RigidBody(_) => {}
        }
    }

    pub(crate) fn fixed_update(&mut self, ctx: &mut ScriptContext<'_>) {
        match self {
            Self::RigidBody(body) => {
                let delta_time = ctx.delta_time();
                body.integrate(ctx.transform_mut(), delta_time);
            }
            Self::Script(script) => script.behaviour_mut().fixed_update(ctx),
            _ => {}
        }
    }

    fn on_activate(&mut self) {
        match self {
            Self::Camera(camera) => camera.invalidate(),
            Self::Script(script) => script.behaviour_mut().on_activate(),
            _ => {}
        }
    }

    fn on_deactivate(&mut self) {
        if let Self::Script(script) = self {
            script.behaviour_mut().on_deactivate();
        }
    }

    fn on_destroy(&mut self) {
        if let Self::Script(script) = self {
            script.behaviour_mut().on_destroy();
        }
    }

    /// Copy for a duplicated GameObject
    ///
    /// Graphics resources are not shared; scripts are rebuilt from their
    /// registered factory.
    pub(crate) fn duplicate(&self, scripts: &ScriptRegistry) -> Result<Self, EngineError> {
        Ok(match self {
            Self::SpriteRenderer(sprite) => Self::SpriteRenderer(sprite.duplicate()),
            Self::Collider(collider) => Self::Collider(collider.duplicate()),
            Self::RigidBody(body) => Self::RigidBody(body.clone()),
            Self::Animator(animator) => Self::Animator(animator.clone()),
            Self::SoundMixer(mixer) => Self::SoundMixer(mixer.duplicate()),
            Self::Camera(camera) => Self::Camera(camera.duplicate()),
            Self::Script(script) => Self::Script(scripts.instantiate(script.kind())?),
        })
    }
}

/// Typed access to a component payload
pub trait ComponentPayload: Sized {
    /// Kind the payload is stored under
    const KIND: ComponentKind;

    /// Borrow the payload out of `data`
    fn from_data(data: &ComponentData) -> Option<&Self>;

    /// Mutably borrow the payload out of `data`
    fn from_data_mut(data: &mut ComponentData) -> Option<&mut Self>;
}

macro_rules! impl_payload {
    ($ty:ident) => {
        impl ComponentPayload for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn from_data(data: &ComponentData) -> Option<&Self> {
                match data {
                    ComponentData::$ty(payload) => Some(payload),
                    _ => None,
                }
            }

            fn from_data_mut(data: &mut ComponentData) -> Option<&mut Self> {
                match data {
                    ComponentData::$ty(payload) => Some(payload),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ComponentData {
            fn from(payload: $ty) -> Self {
                Self::$ty(payload)
            }
        }
    };
}

impl_payload!(SpriteRenderer);
impl_payload!(RigidBody);
impl_payload!(Animator);
impl_payload!(SoundMixer);
impl_payload!(Camera);

impl From<Collider> for ComponentData {
    fn from(collider: Collider) -> Self {
        Self::Collider(collider)
    }
}

impl From<ScriptComponent> for ComponentData {
    fn from(script: ScriptComponent) -> Self {
        Self::Script(script)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Registrations {
    update: Option<RegistryHandle>,
    fixed_update: Option<RegistryHandle>,
    render: Option<RegistryHandle>,
    collider: Option<RegistryHandle>,
}

impl Registrations {
    fn any(&self) -> bool {
        self.update.is_some() || self.fixed_update.is_some() || self.render.is_some() || self.collider.is_some()
    }
}

/// A component attached to a GameObject
#[derive(Debug)]
pub struct Component {
    owner: GameObjectKey,
    data: ComponentData,
    self_active: bool,
    global_active: bool,
    created: bool,
    registrations: Registrations,
}

impl Component {
    pub(crate) fn new(owner: GameObjectKey, data: ComponentData, global_active: bool) -> Self {
        Self {
            owner,
            data,
            self_active: true,
            global_active,
            created: false,
            registrations: Registrations::default(),
        }
    }

    pub(crate) fn with_self_active(mut self, self_active: bool) -> Self {
        self.self_active = self_active;
        self
    }

    /// Kind of this component
    pub fn kind(&self) -> ComponentKind {
        self.data.kind()
    }

    /// Capability flags of this component's kind
    pub fn flags(&self) -> ComponentFlags {
        self.kind().flags()
    }

    /// Owning GameObject
    pub fn owner(&self) -> GameObjectKey {
        self.owner
    }

    /// Reference the managers store for this component
    pub fn reference(&self) -> ComponentRef {
        ComponentRef {
            object: self.owner,
            kind: self.kind(),
        }
    }

    /// Payload
    pub fn data(&self) -> &ComponentData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut ComponentData {
        &mut self.data
    }

    /// Collider payload, mutable
    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        self.data.as_collider_mut()
    }

    /// Script payload, mutable
    pub fn script_mut(&mut self) -> Option<&mut ScriptComponent> {
        self.data.as_script_mut()
    }

    /// Typed payload
    pub fn get<T: ComponentPayload>(&self) -> Option<&T> {
        T::from_data(&self.data)
    }

    /// Typed payload, mutable
    pub fn get_mut<T: ComponentPayload>(&mut self) -> Option<&mut T> {
        T::from_data_mut(&mut self.data)
    }

    /// Own activation axis
    pub fn is_self_active(&self) -> bool {
        self.self_active
    }

    /// Activation inherited from the owner and its scene
    pub fn is_global_active(&self) -> bool {
        self.global_active
    }

    /// Effective activation: both axes on
    pub fn is_active(&self) -> bool {
        self.self_active && self.global_active
    }

    /// Whether the deferred creation step has run
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Whether the component currently sits in any manager
    pub fn is_registered(&self) -> bool {
        self.registrations.any()
    }

    /// Managers the component currently sits in
    pub fn registered_flags(&self) -> ComponentFlags {
        let mut flags = ComponentFlags::empty();
        flags.set(ComponentFlags::UPDATE, self.registrations.update.is_some());
        flags.set(ComponentFlags::FIXED_UPDATE, self.registrations.fixed_update.is_some());
        flags.set(ComponentFlags::RENDER, self.registrations.render.is_some());
        flags
    }

    /// Whether the component sits in the collider list
    pub fn is_registered_collider(&self) -> bool {
        self.registrations.collider.is_some()
    }

    pub(crate) fn activate(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        if self.self_active {
            return Ok(());
        }
        self.self_active = true;

        if !self.global_active || !self.created {
            return Ok(());
        }
        self.register(managers)?;
        self.data.on_activate();
        Ok(())
    }

    pub(crate) fn deactivate(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        if !self.self_active {
            return Ok(());
        }
        self.self_active = false;

        if !self.global_active || !self.created {
            return Ok(());
        }
        self.unregister(managers)?;
        self.data.on_deactivate();
        Ok(())
    }

    pub(crate) fn activate_global(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        if self.global_active {
            return Ok(());
        }
        self.global_active = true;

        if !self.self_active || !self.created {
            return Ok(());
        }
        self.register(managers)?;
        self.data.on_activate();
        Ok(())
    }

    pub(crate) fn deactivate_global(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        if !self.global_active {
            return Ok(());
        }
        self.global_active = false;

        if !self.self_active || !self.created {
            return Ok(());
        }
        self.unregister(managers)?;
        self.data.on_deactivate();
        Ok(())
    }

    pub(crate) fn set_active(&mut self, active: bool, managers: &mut Managers) -> Result<(), EngineError> {
        if active {
            self.activate(managers)
        } else {
            self.deactivate(managers)
        }
    }

    pub(crate) fn set_global_active(&mut self, active: bool, managers: &mut Managers) -> Result<(), EngineError> {
        if active {
            self.activate_global(managers)
        } else {
            self.deactivate_global(managers)
        }
    }

    /// Mark the component constructed, run `start`, then register if
    /// effectively active
    pub(crate) fn create<F>(&mut self, managers: &mut Managers, start: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut ComponentData),
    {
        if self.created {
            return Ok(());
        }
        self.created = true;
        start(&mut self.data);

        if self.is_active() {
            self.register(managers)?;
        }
        Ok(())
    }

    /// Leave every manager and run the destroy hook
    pub(crate) fn destroy(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        let result = if self.is_registered() { self.unregister(managers) } else { Ok(()) };
        self.data.on_destroy();
        result
    }

    fn register(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        let me = self.reference();
        debug_assert!(!self.is_registered(), "{me:?} is already registered");
        if self.is_registered() {
            log::error!("{me:?} is already registered");
            return Err(EngineError::InvalidHandle(format!("{me:?} is already registered")));
        }

        let flags = self.flags();
        if flags.contains(ComponentFlags::UPDATE) {
            self.registrations.update = Some(managers.update.register_component(me));
        }
        if flags.contains(ComponentFlags::FIXED_UPDATE) {
            self.registrations.fixed_update = Some(managers.physics.register_component(me));
        }
        if flags.contains(ComponentFlags::RENDER) {
            self.registrations.render = Some(managers.render.register_component(me));
        }
        if me.kind.is_collider() {
            self.registrations.collider = Some(managers.physics.register_collider(me));
        }
        log::debug!("Registered {me:?} ({flags:?})");
        Ok(())
    }

    fn unregister(&mut self, managers: &mut Managers) -> Result<(), EngineError> {
        let me = self.reference();
        debug_assert!(self.is_registered(), "{me:?} is not registered");
        if !self.is_registered() {
            log::error!("{me:?} is not registered");
            return Err(EngineError::InvalidHandle(format!("{me:?} is not registered")));
        }

        let registrations = std::mem::take(&mut self.registrations);
        let mut first_error = None;
        let mut record = |result: Result<_, EngineError>| {
            if let Err(error) = result {
                log::error!("Unregistering {me:?}: {error}");
                first_error.get_or_insert(error);
            }
        };

        if let Some(handle) = registrations.update {
            record(managers.update.unregister_component(handle));
        }
        if let Some(handle) = registrations.fixed_update {
            record(managers.physics.unregister_component(handle));
        }
        if let Some(handle) = registrations.render {
            record(managers.render.unregister_component(handle));
        }
        if let Some(handle) = registrations.collider {
            record(managers.physics.unregister_collider(handle));
        }
        log::debug!("Unregistered {me:?}");

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Script;
    use slotmap::SlotMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn owner() -> GameObjectKey {
        let mut keys: SlotMap<GameObjectKey, ()> = SlotMap::with_key();
        keys.insert(())
    }

    fn created(data: impl Into<ComponentData>, managers: &mut Managers) -> Component {
        let mut component = Component::new(owner(), data.into(), true);
        component.create(managers, |_| {}).unwrap();
        component
    }

    fn assert_invariant(component: &Component, managers: &Managers) {
        let expected = component.is_active() && component.is_created();
        let flags = component.flags();
        let registered = if expected { flags } else { ComponentFlags::empty() };
        assert_eq!(component.registered_flags(), registered, "{component:?}");
        assert_eq!(component.is_registered_collider(), expected && component.kind().is_collider());

        let me = component.reference();
        assert_eq!(managers.update.contains(me), registered.contains(ComponentFlags::UPDATE));
        assert_eq!(managers.physics.contains_component(me), registered.contains(ComponentFlags::FIXED_UPDATE));
        assert_eq!(managers.render.contains(me), registered.contains(ComponentFlags::RENDER));
    }

    struct Hooks(Rc<RefCell<Vec<&'static str>>>);

    impl Script for Hooks {
        fn on_activate(&mut self) {
            self.0.borrow_mut().push("activate");
        }
        fn on_deactivate(&mut self) {
            self.0.borrow_mut().push("deactivate");
        }
        fn on_destroy(&mut self) {
            self.0.borrow_mut().push("destroy");
        }
    }

    #[test]
    fn test_flags_per_kind() {
        assert_eq!(ComponentKind::SpriteRenderer.flags(), ComponentFlags::RENDER);
        assert_eq!(ComponentKind::RigidBody.flags(), ComponentFlags::FIXED_UPDATE);
        assert_eq!(
            ComponentKind::CircleCollider.flags(),
            ComponentFlags::FIXED_UPDATE | ComponentFlags::RENDER
        );
        assert_eq!(
            ComponentKind::Script(ScriptKindId(0)).flags(),
            ComponentFlags::UPDATE | ComponentFlags::FIXED_UPDATE
        );
        assert!(ComponentKind::BoxCollider.is_collider());
        assert!(!ComponentKind::Camera.is_collider());
    }

    #[test]
    fn test_uncreated_component_never_registers() {
        let mut managers = Managers::default();
        let mut component = Component::new(owner(), SpriteRenderer::new().into(), true);

        component.deactivate(&mut managers).unwrap();
        component.activate(&mut managers).unwrap();
        assert!(component.is_active());
        assert!(!component.is_registered());
        assert_eq!(managers.render.len(), 0);

        component.create(&mut managers, |_| {}).unwrap();
        assert_invariant(&component, &managers);
        assert_eq!(managers.render.len(), 1);
    }

    #[test]
    fn test_double_activation_is_a_no_op() {
        let mut managers = Managers::default();
        let mut component = created(Animator::default(), &mut managers);

        component.activate(&mut managers).unwrap();
        component.activate(&mut managers).unwrap();
        assert_eq!(managers.update.len(), 1);

        component.deactivate(&mut managers).unwrap();
        component.deactivate(&mut managers).unwrap();
        assert_eq!(managers.update.len(), 0);
        assert_invariant(&component, &managers);
    }

    #[test]
    fn test_reactivating_a_created_component_registers_again() {
        let mut managers = Managers::default();
        let mut component = created(RigidBody::new(), &mut managers);

        component.deactivate(&mut managers).unwrap();
        assert!(!component.is_registered());

        component.activate(&mut managers).unwrap();
        assert!(component.is_registered());
        assert_invariant(&component, &managers);
    }

    #[test]
    fn test_global_axis_defers_activation() {
        let mut managers = Managers::default();
        let mut component = created(Collider::boxed(), &mut managers);
        assert_eq!(managers.physics.collider_count(), 1);

        component.deactivate_global(&mut managers).unwrap();
        assert_invariant(&component, &managers);
        assert_eq!(managers.physics.collider_count(), 0);

        component.deactivate(&mut managers).unwrap();
        component.activate(&mut managers).unwrap();
        assert!(!component.is_registered(), "self axis alone cannot register");

        component.activate_global(&mut managers).unwrap();
        assert_invariant(&component, &managers);
        assert_eq!(managers.physics.collider_count(), 1);
    }

    #[test]
    fn test_invariant_holds_across_toggle_sequences() {
        let mut managers = Managers::default();
        let mut components = vec![
            Component::new(owner(), SpriteRenderer::new().into(), true),
            Component::new(owner(), Collider::circle().into(), false),
            Component::new(owner(), RigidBody::new().into(), true),
            Component::new(owner(), Camera::new().into(), true),
        ];

        let mut seed: u32 = 0x2545_f491;
        for step in 0..400 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let index = (seed >> 8) as usize % components.len();
            let component = &mut components[index];
            match (seed >> 20) % 5 {
                0 => component.activate(&mut managers).unwrap(),
                1 => component.deactivate(&mut managers).unwrap(),
                2 => component.activate_global(&mut managers).unwrap(),
                3 => component.deactivate_global(&mut managers).unwrap(),
                _ if step > 50 => component.create(&mut managers, |_| {}).unwrap(),
                _ => {}
            }
            for component in &components {
                assert_invariant(component, &managers);
            }
        }
    }

    #[test]
    fn test_hooks_fire_once_per_transition() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let script = ScriptComponent::new(ScriptKindId(0), Box::new(Hooks(Rc::clone(&log))));
        let mut managers = Managers::default();
        let mut component = created(script, &mut managers);
        assert!(log.borrow().is_empty(), "creation runs start, not on_activate");

        component.deactivate_global(&mut managers).unwrap();
        component.deactivate(&mut managers).unwrap();
        component.activate_global(&mut managers).unwrap();
        component.activate(&mut managers).unwrap();
        component.destroy(&mut managers).unwrap();

        assert_eq!(*log.borrow(), vec!["deactivate", "activate", "destroy"]);
        assert_eq!(managers.update.len(), 0);
        assert_eq!(managers.physics.component_count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already registered")]
    fn test_double_registration_is_caught() {
        let mut managers = Managers::default();
        let mut component = created(SpriteRenderer::new(), &mut managers);
        let _ = component.register(&mut managers);
    }
}
