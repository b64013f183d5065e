//! GameObjects, components and the world that owns them
//!
//! - [`component`] - component record, capability flags, activation
//! - [`components`] - built-in payloads and scripts
//! - [`game_object`] - GameObject and its identifiers
//! - [`managers`] - update/render registries
//! - [`world`] - arena, scene operations and frame passes

pub mod component;
pub mod components;
pub mod game_object;
pub mod managers;
pub mod world;

pub use component::{Component, ComponentData, ComponentFlags, ComponentKind, ComponentPayload, ComponentRef};
pub use game_object::{GameObject, GameObjectId, GameObjectKey};
pub use managers::{ComponentList, Managers, RenderManager, UpdateManager};
pub use world::World;
