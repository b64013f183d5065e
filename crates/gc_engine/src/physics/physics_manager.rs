//! Physics manager
//!
//! Owns two lists: components taking part in the fixed-step pass, and
//! colliders. After the fixed-step hooks have run, every unordered pair of
//! registered colliders is tested (O(n²), no broad phase) and the result is
//! compared with the previous step's overlaps:
//!
//! - new overlap: Enter, then Stay
//! - continuing overlap: Stay
//! - overlap that ended: Exit
//!
//! A collider leaving the list drops its pairs without an Exit. Colliders on
//! the same GameObject are never tested against each other.

use std::collections::HashSet;

use slotmap::SlotMap;

use super::collision::WorldShape;
use crate::ecs::{ComponentList, ComponentRef, GameObject, GameObjectKey};
use crate::engine::EngineError;
use crate::foundation::collections::RegistryHandle;

/// Unordered pair of colliders, smaller reference first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderPair {
    /// First collider
    pub first: ComponentRef,
    /// Second collider
    pub second: ComponentRef,
}

impl ColliderPair {
    /// Create a pair (always stores the smaller reference first)
    pub fn new(a: ComponentRef, b: ComponentRef) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Whether `component` is one of the two colliders
    pub fn involves(&self, component: ComponentRef) -> bool {
        self.first == component || self.second == component
    }
}

/// Phase of a trigger notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPhase {
    /// First step of an overlap
    Enter,
    /// Every step of an overlap
    Stay,
    /// First step after an overlap ended
    Exit,
}

/// Trigger notification produced by a fixed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Phase
    pub phase: TriggerPhase,
    /// Colliders involved
    pub pair: ColliderPair,
}

/// Fixed-step registry, collider registry and overlap cache
#[derive(Debug)]
pub struct PhysicsManager {
    components: ComponentList,
    colliders: ComponentList,
    overlaps: HashSet<ColliderPair>,
    trigger_events: bool,
}

impl Default for PhysicsManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PhysicsManager {
    /// Create a manager; with `trigger_events` off only Stay is reported
    pub fn new(trigger_events: bool) -> Self {
        Self {
            components: ComponentList::new(),
            colliders: ComponentList::new(),
            overlaps: HashSet::new(),
            trigger_events,
        }
    }

    /// Whether Enter/Exit are reported
    pub fn trigger_events(&self) -> bool {
        self.trigger_events
    }

    /// Turn Enter/Exit reporting on or off
    pub fn set_trigger_events(&mut self, enabled: bool) {
        self.trigger_events = enabled;
    }

    /// Register a component for the fixed-step pass
    pub fn register_component(&mut self, component: ComponentRef) -> RegistryHandle {
        self.components.register(component)
    }

    /// Unregister from the fixed-step pass
    pub fn unregister_component(&mut self, handle: RegistryHandle) -> Result<ComponentRef, EngineError> {
        self.components.unregister(handle)
    }

    /// Register a collider for pair checks
    pub fn register_collider(&mut self, collider: ComponentRef) -> RegistryHandle {
        self.colliders.register(collider)
    }

    /// Unregister a collider and forget its overlaps
    pub fn unregister_collider(&mut self, handle: RegistryHandle) -> Result<ComponentRef, EngineError> {
        let collider = self.colliders.unregister(handle)?;
        self.overlaps.retain(|pair| !pair.involves(collider));
        Ok(collider)
    }

    /// Fixed-step components in registration order
    pub fn components(&self) -> &ComponentList {
        &self.components
    }

    /// Colliders in registration order
    pub fn colliders(&self) -> &ComponentList {
        &self.colliders
    }

    /// Whether `component` takes part in the fixed-step pass
    pub fn contains_component(&self, component: ComponentRef) -> bool {
        self.components.contains(component)
    }

    /// Whether `collider` takes part in pair checks
    pub fn contains_collider(&self, collider: ComponentRef) -> bool {
        self.colliders.contains(collider)
    }

    /// Number of fixed-step components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of registered colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Whether `a` and `b` overlapped during the last step
    pub fn is_overlapping(&self, a: ComponentRef, b: ComponentRef) -> bool {
        self.overlaps.contains(&ColliderPair::new(a, b))
    }

    /// Number of pairs that overlapped during the last step
    pub fn overlap_count(&self) -> usize {
        self.overlaps.len()
    }

    /// Test two colliders against each other
    ///
    /// Fails with `NotFound` if either component is missing and with
    /// `TypeMismatch` if either is not a collider.
    pub fn check_collision(
        &self,
        objects: &SlotMap<GameObjectKey, GameObject>,
        a: ComponentRef,
        b: ComponentRef,
    ) -> Result<bool, EngineError> {
        let first = world_shape(objects, a)?;
        let second = world_shape(objects, b)?;
        Ok(first.intersects(&second))
    }

    /// Test every registered pair and update the overlap cache
    pub(crate) fn detect(&mut self, objects: &SlotMap<GameObjectKey, GameObject>) -> Vec<TriggerEvent> {
        let shapes: Vec<(ComponentRef, WorldShape)> = self
            .colliders
            .iter()
            .filter_map(|collider| match world_shape(objects, collider) {
                Ok(shape) => Some((collider, shape)),
                Err(error) => {
                    log::warn!("Skipping collider {collider:?}: {error}");
                    None
                }
            })
            .collect();

        let mut current = HashSet::new();
        let mut events = Vec::new();

        for (index, (first, first_shape)) in shapes.iter().enumerate() {
            for (second, second_shape) in &shapes[index + 1..] {
                if !first_shape.intersects(second_shape) {
                    continue;
                }

                let pair = ColliderPair::new(*first, *second);
                log::debug!("Collision detected: {first:?} / {second:?}");
                current.insert(pair);

                if self.trigger_events && !self.overlaps.contains(&pair) {
                    events.push(TriggerEvent { phase: TriggerPhase::Enter, pair });
                }
                events.push(TriggerEvent { phase: TriggerPhase::Stay, pair });
            }
        }

        if self.trigger_events {
            let mut ended: Vec<ColliderPair> = self.overlaps.difference(&current).copied().collect();
            ended.sort();
            events.extend(ended.into_iter().map(|pair| TriggerEvent { phase: TriggerPhase::Exit, pair }));
        }

        self.overlaps = current;
        events
    }
}

fn world_shape(objects: &SlotMap<GameObjectKey, GameObject>, collider: ComponentRef) -> Result<WorldShape, EngineError> {
    let object = objects
        .get(collider.object)
        .ok_or_else(|| EngineError::NotFound(format!("game object {:?}", collider.object)))?;
    let component = object
        .component(collider.kind)
        .ok_or_else(|| EngineError::NotFound(format!("{:?} on {}", collider.kind, object.id())))?;
    let shape = component
        .data()
        .as_collider()
        .ok_or_else(|| EngineError::TypeMismatch(format!("{:?} on {} is not a collider", collider.kind, object.id())))?;
    Ok(shape.world_shape(object.transform()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, RigidBody};
    use crate::ecs::{Component, ComponentData, ComponentKind, GameObjectId};
    use crate::foundation::math::Transform;

    struct Fixture {
        objects: SlotMap<GameObjectKey, GameObject>,
        physics: PhysicsManager,
        next_id: u32,
    }

    impl Fixture {
        fn new(trigger_events: bool) -> Self {
            Self {
                objects: SlotMap::with_key(),
                physics: PhysicsManager::new(trigger_events),
                next_id: 0,
            }
        }

        fn spawn(&mut self, transform: Transform, data: ComponentData) -> (ComponentRef, RegistryHandle) {
            let id = GameObjectId(self.next_id);
            self.next_id += 1;
            let key = self.objects.insert(GameObject::new(id, "collider", true, "", 0));
            let component = Component::new(key, data, true);
            let reference = component.reference();

            let object = &mut self.objects[key];
            object.transform = transform;
            object.components.insert(reference.kind, component);

            let handle = self.physics.register_collider(reference);
            (reference, handle)
        }

        fn boxed(&mut self, x: f32, y: f32, scale: f32) -> (ComponentRef, RegistryHandle) {
            self.spawn(Transform::from_position_scale_2d(x, y, scale, scale), Collider::boxed().into())
        }

        fn move_to(&mut self, collider: ComponentRef, x: f32, y: f32) {
            let transform = &mut self.objects[collider.object].transform;
            transform.position.x = x;
            transform.position.y = y;
        }

        fn phases(&mut self) -> Vec<TriggerPhase> {
            self.physics.detect(&self.objects).into_iter().map(|event| event.phase).collect()
        }
    }

    #[test]
    fn test_pair_is_unordered() {
        let mut fixture = Fixture::new(true);
        let (a, _) = fixture.boxed(0.0, 0.0, 1.0);
        let (b, _) = fixture.boxed(0.0, 0.0, 1.0);
        assert_eq!(ColliderPair::new(a, b), ColliderPair::new(b, a));
    }

    #[test]
    fn test_enter_stay_exit_sequence() {
        let mut fixture = Fixture::new(true);
        let (a, _) = fixture.boxed(0.0, 0.0, 1.0);
        let (b, _) = fixture.boxed(5.0, 5.0, 1.0);

        assert!(fixture.phases().is_empty());

        fixture.move_to(b, 0.5, 0.5);
        assert_eq!(fixture.phases(), vec![TriggerPhase::Enter, TriggerPhase::Stay]);
        assert!(fixture.physics.is_overlapping(b, a));

        assert_eq!(fixture.phases(), vec![TriggerPhase::Stay]);

        fixture.move_to(b, 5.0, 5.0);
        assert_eq!(fixture.phases(), vec![TriggerPhase::Exit]);
        assert_eq!(fixture.physics.overlap_count(), 0);

        assert!(fixture.phases().is_empty());
    }

    #[test]
    fn test_stay_only_without_trigger_events() {
        let mut fixture = Fixture::new(false);
        let (_, _) = fixture.boxed(0.0, 0.0, 2.0);
        let (b, _) = fixture.boxed(1.0, 1.0, 2.0);

        assert_eq!(fixture.phases(), vec![TriggerPhase::Stay]);
        fixture.move_to(b, 10.0, 10.0);
        assert!(fixture.phases().is_empty());
    }

    #[test]
    fn test_unregistered_collider_drops_pair_without_exit() {
        let mut fixture = Fixture::new(true);
        let (_, _) = fixture.boxed(0.0, 0.0, 2.0);
        let (_, handle) = fixture.boxed(1.0, 1.0, 2.0);
        fixture.phases();
        assert_eq!(fixture.physics.overlap_count(), 1);

        fixture.physics.unregister_collider(handle).unwrap();
        assert_eq!(fixture.physics.overlap_count(), 0);
        assert!(fixture.phases().is_empty());
    }

    #[test]
    fn test_circle_registered_before_box_is_tested_as_circle() {
        let mut fixture = Fixture::new(true);
        // Circle radius 0.5 centered at (2.5, 0.5); box spans [0, 2]: no overlap
        let (circle, _) = fixture.spawn(Transform::from_position_scale_2d(2.0, 0.0, 1.0, 1.0), Collider::circle().into());
        let (boxed, _) = fixture.boxed(0.0, 0.0, 2.0);

        assert!(!fixture.physics.check_collision(&fixture.objects, circle, boxed).unwrap());
        assert!(fixture.phases().is_empty());

        fixture.move_to(circle, 1.8, 0.0);
        assert!(fixture.physics.check_collision(&fixture.objects, circle, boxed).unwrap());
        assert!(fixture.physics.check_collision(&fixture.objects, boxed, circle).unwrap());
    }

    #[test]
    fn test_check_collision_rejects_non_colliders() {
        let mut fixture = Fixture::new(true);
        let (a, _) = fixture.boxed(0.0, 0.0, 1.0);
        let (body, _) = fixture.spawn(Transform::identity(), RigidBody::new().into());

        assert!(matches!(
            fixture.physics.check_collision(&fixture.objects, a, body),
            Err(EngineError::TypeMismatch(_))
        ));

        let missing = ComponentRef { object: a.object, kind: ComponentKind::CircleCollider };
        assert!(matches!(
            fixture.physics.check_collision(&fixture.objects, a, missing),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn test_colliders_on_one_object_overlap_each_other() {
        let mut fixture = Fixture::new(true);
        let (boxed, _) = fixture.boxed(0.0, 0.0, 2.0);
        let circle = Component::new(boxed.object, Collider::circle().into(), true);
        let circle = {
            let reference = circle.reference();
            fixture.objects[boxed.object].components.insert(reference.kind, circle);
            fixture.physics.register_collider(reference);
            reference
        };

        assert!(fixture.physics.check_collision(&fixture.objects, boxed, circle).unwrap());
        assert_eq!(fixture.phases(), vec![TriggerPhase::Enter, TriggerPhase::Stay]);
        assert!(fixture.physics.is_overlapping(boxed, circle));
    }

    #[test]
    fn test_pairs_are_checked_once_in_registration_order() {
        let mut fixture = Fixture::new(true);
        let (a, _) = fixture.boxed(0.0, 0.0, 2.0);
        let (b, _) = fixture.boxed(1.0, 1.0, 2.0);
        let (c, _) = fixture.boxed(1.5, 1.5, 2.0);

        let stays: Vec<ColliderPair> = fixture
            .physics
            .detect(&fixture.objects)
            .into_iter()
            .filter(|event| event.phase == TriggerPhase::Stay)
            .map(|event| event.pair)
            .collect();
        assert_eq!(
            stays,
            vec![ColliderPair::new(a, b), ColliderPair::new(a, c), ColliderPair::new(b, c)]
        );
    }
}
