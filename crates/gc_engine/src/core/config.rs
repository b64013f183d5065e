//! # Engine Configuration
//!
//! Configuration for the frame loop, the physics pass, scene defaults and
//! logging. Every section carries `#[serde(default)]` so a config file only
//! needs to name the values it overrides.
//!
//! ```toml
//! [physics]
//! fixed_timestep = 0.02
//! step_mode = "Accumulated"
//!
//! [logging]
//! filter = "debug"
//! ```

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};

/// How the physics pass is scheduled relative to rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMode {
    /// Run 0..N fixed steps per frame from an accumulator (default)
    Accumulated,
    /// Run exactly one physics step per frame, with the frame's own delta
    PerFrame,
}

/// # Physics Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Length of one fixed step in seconds
    pub fixed_timestep: f32,
    /// Upper bound on fixed steps run in a single frame
    pub max_steps_per_frame: u32,
    /// Scheduling of the physics pass
    pub step_mode: StepMode,
    /// Report Enter/Exit in addition to Stay
    pub trigger_events: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_steps_per_frame: 5,
            step_mode: StepMode::Accumulated,
            trigger_events: true,
        }
    }
}

impl PhysicsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fixed_timestep.is_finite() || self.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "physics.fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "physics.max_steps_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// # Scene Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Name of the scene the engine creates and loads at startup
    pub default_scene_name: String,
    /// Name given to GameObjects created without one
    pub default_object_name: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_scene_name: "Main".to_string(),
            default_object_name: "GameObject".to_string(),
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// # Engine Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Physics pass settings
    pub physics: PhysicsConfig,
    /// Scene defaults
    pub scene: SceneConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Set the fixed step length
    pub fn with_fixed_timestep(mut self, seconds: f32) -> Self {
        self.physics.fixed_timestep = seconds;
        self
    }

    /// Set the physics scheduling mode
    pub fn with_step_mode(mut self, mode: StepMode) -> Self {
        self.physics.step_mode = mode;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        if self.scene.default_scene_name.is_empty() {
            return Err(ConfigError::Invalid("scene.default_scene_name cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Config for EngineConfig {}
