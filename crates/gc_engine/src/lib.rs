//! # GC Engine
//!
//! A small component-based game engine core.
//!
//! ## Features
//!
//! - **GameObjects and Components**: one component per kind, two activation
//!   axes, registration with exactly the managers a kind needs
//! - **Scenes**: load/unload, ordered traversal, find by name or ID
//! - **Physics**: fixed-step pass, box and circle colliders, trigger
//!   Enter/Stay/Exit notifications
//! - **Scripts**: gameplay behaviour registered by name at startup
//! - **Headless**: graphics and input sit behind traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gc_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let scene = engine.main_scene();
//!         let player = engine.world_mut().spawn(scene)?;
//!         engine.world_mut().add_component(player, SpriteRenderer::new())?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     gc_engine::foundation::logging::init();
//!     let mut engine = Engine::new(EngineConfig::default(), Box::new(HeadlessGraphics::new()))?;
//!     engine.run_frames(&mut MyApp, 60, 1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod ecs;
pub mod events;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineError,
        core::config::{EngineConfig, PhysicsConfig, StepMode},
        core::state_machine::{State, StateMachine, Transition},
        foundation::{
            math::{Vec2, Vec3, Mat4, Transform},
            time::Timer,
        },
        ecs::{
            World, GameObject, GameObjectKey, GameObjectId,
            Component, ComponentKind, ComponentRef,
            components::{
                Animator, Camera, Collider, ColliderHit, RigidBody, Script,
                ScriptContext, SoundMixer, SpriteRenderer,
            },
        },
        physics::ColliderShape,
        render::{Color, Graphics, HeadlessGraphics},
        input::{InputSource, KeyCode, MouseButton, ScriptedInput},
        scene::SceneKey,
    };
}
