//! Core engine implementation

use crate::{
    application::Application,
    config::ConfigError,
    core::config::{EngineConfig, StepMode},
    ecs::World,
    events::EventSystem,
    foundation::{
        collections::RegistryError,
        time::{FixedTimestep, Timer},
    },
    input::InputSource,
    render::{Graphics, GraphicsError},
    scene::SceneKey,
};
use thiserror::Error;

/// Main engine struct
///
/// The engine owns the world and the graphics service and drives one frame
/// at a time: input, events, component creation, Update, FixedUpdate,
/// Render.
pub struct Engine {
    /// World containing every scene, GameObject and manager
    world: World,

    /// Graphics service
    graphics: Box<dyn Graphics>,

    /// Event queue fed by the input system
    events: EventSystem,

    /// Frame timing
    timer: Timer,

    /// Fixed-step accumulator for the physics pass
    fixed_step: FixedTimestep,

    /// Engine configuration
    config: EngineConfig,

    /// Scene created and loaded at startup
    main_scene: SceneKey,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    ///
    /// Creates and loads the default scene named by the configuration.
    pub fn new(config: EngineConfig, graphics: Box<dyn Graphics>) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        let mut world = World::from_config(&config);
        let main_scene = world.create_scene(&config.scene.default_scene_name);
        world.load_scene(main_scene)?;

        let fixed_step = FixedTimestep::new(config.physics.fixed_timestep, config.physics.max_steps_per_frame);

        Ok(Self {
            world,
            graphics,
            events: EventSystem::new(),
            timer: Timer::new(),
            fixed_step,
            config,
            main_scene,
            running: true,
        })
    }

    /// Run the engine main loop with the given application, on wall-clock time
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        self.timer = Timer::new();
        let result = self.main_loop(app);

        app.cleanup(self);
        log::info!("Engine shutdown complete");
        result
    }

    /// Run `frames` frames of `delta_time` seconds each, or until quit
    ///
    /// Deterministic counterpart of [`run`](Self::run) for headless runs and
    /// tests.
    pub fn run_frames<A: Application>(&mut self, app: &mut A, frames: u32, delta_time: f32) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        let mut result = Ok(());
        for _ in 0..frames {
            if !self.running {
                break;
            }
            self.timer.advance(delta_time);
            if let Err(error) = self.frame(app, delta_time) {
                result = Err(error);
                break;
            }
        }

        app.cleanup(self);
        result
    }

    fn main_loop<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        while self.running {
            self.timer.update();
            let delta_time = self.timer.delta_time();
            self.frame(app, delta_time)?;
        }
        Ok(())
    }

    fn frame<A: Application>(&mut self, app: &mut A, delta_time: f32) -> Result<(), EngineError> {
        app.update(self, delta_time)
            .map_err(|e| EngineError::Application(format!("App update: {e}")))?;
        self.step(delta_time, app.input_source())?;
        Ok(())
    }

    /// Advance the timer by `delta_time` and run one frame
    ///
    /// Returns the number of fixed steps that ran.
    pub fn tick(&mut self, delta_time: f32, input: &dyn InputSource) -> Result<u32, EngineError> {
        self.timer.advance(delta_time);
        self.step(delta_time, input)
    }

    fn step(&mut self, delta_time: f32, input: &dyn InputSource) -> Result<u32, EngineError> {
        self.events.update_time(f64::from(self.timer.total_time()));
        self.world.input_mut().update(input, &mut self.events);
        self.events.dispatch();

        self.graphics.begin_frame();
        self.world.flush_pending_components(self.graphics.as_mut())?;
        self.world.update(delta_time, self.graphics.as_mut())?;

        let (steps, step_length) = match self.config.physics.step_mode {
            StepMode::Accumulated => (self.fixed_step.advance(delta_time), self.fixed_step.step()),
            StepMode::PerFrame => (1, delta_time),
        };
        for _ in 0..steps {
            self.world.fixed_update(step_length)?;
        }

        self.world.render(self.graphics.as_mut())?;
        Ok(steps)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the graphics service
    pub fn graphics(&self) -> &dyn Graphics {
        self.graphics.as_ref()
    }

    /// Get mutable access to the graphics service
    pub fn graphics_mut(&mut self) -> &mut dyn Graphics {
        self.graphics.as_mut()
    }

    /// Borrow the world and the graphics service together
    pub fn world_and_graphics(&mut self) -> (&mut World, &mut dyn Graphics) {
        (&mut self.world, self.graphics.as_mut())
    }

    /// Get the event system
    pub fn events(&self) -> &EventSystem {
        &self.events
    }

    /// Get mutable access to the event system
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// Scene created at startup
    pub fn main_scene(&self) -> SceneKey {
        self.main_scene
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Seconds of simulated time since startup
    pub fn total_time(&self) -> f32 {
        self.timer.total_time()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A registration handle was stale, duplicated or never issued
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// A GameObject, scene or component does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A component is not of the kind the operation needs
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// The GameObject already holds a component of that kind
    #[error("Duplicate component: {0}")]
    DuplicateComponent(String),

    /// No script kind is registered under that name or ID
    #[error("Unknown script kind: {0}")]
    UnknownScriptKind(String),

    /// Graphics service error
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Application error
    #[error("Application error: {0}")]
    Application(String),
}

impl From<RegistryError> for EngineError {
    fn from(error: RegistryError) -> Self {
        Self::InvalidHandle(error.to_string())
    }
}
