//! Built-in component payloads
//!
//! Each file holds the data and per-kind behaviour of one component kind.
//! Activation, registration and ownership live in
//! [`crate::ecs::component`].

pub mod animator;
pub mod camera;
pub mod collider;
pub mod rigid_body;
pub mod script;
pub mod sound_mixer;
pub mod sprite;

pub use animator::Animator;
pub use camera::Camera;
pub use collider::Collider;
pub use rigid_body::RigidBody;
pub use script::{ColliderHit, Script, ScriptComponent, ScriptContext, ScriptKindId, ScriptRegistry};
pub use sound_mixer::SoundMixer;
pub use sprite::SpriteRenderer;
