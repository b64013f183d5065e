//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::input::{InputSource, KeyCode, MouseButton};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to create your game or application using the engine.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to register
    /// script kinds and build the initial scenes.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame, before the engine samples input and runs its
    /// passes.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Input device the engine samples this frame
    ///
    /// Defaults to a device with nothing held.
    fn input_source(&self) -> &dyn InputSource {
        &NoInput
    }

    /// Cleanup the application
    ///
    /// Called when the application is shutting down.
    fn cleanup(&mut self, engine: &mut Engine);
}

struct NoInput;

impl InputSource for NoInput {
    fn is_key_down(&self, _key: KeyCode) -> bool {
        false
    }

    fn is_mouse_button_down(&self, _button: MouseButton) -> bool {
        false
    }
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}
