//! Physics module for collision detection and trigger notifications
//!
//! Shapes and predicates live in [`collision`]; the [`PhysicsManager`]
//! owns the fixed-step registry, the collider registry and the overlap
//! cache that turns raw overlaps into Enter/Stay/Exit notifications.

pub mod collision;
mod physics_manager;

pub use collision::{Aabb2, Circle2, ColliderShape, WorldShape};
pub use physics_manager::{ColliderPair, PhysicsManager, TriggerEvent, TriggerPhase};
