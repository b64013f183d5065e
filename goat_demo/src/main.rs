//! Goat demo application
//!
//! A headless run of the engine: a goat steered by scripted keyboard input
//! grazes hay bales (trigger colliders) while wolves drift around the
//! field. Everything draws into a recording graphics service.
//!
//! Usage: `goat_demo [config.toml|config.ron]`

mod phases;
mod scripts;

use std::cell::Cell;
use std::rc::Rc;

use gc_engine::config::{Config, ConfigError};
use gc_engine::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use phases::Grazing;
use scripts::{GoatController, Wander};

const HAY_BALES: u32 = 8;
const WOLVES: u32 = 2;
const FRAMES: u32 = 1200;
const FRAME_TIME: f32 = 1.0 / 60.0;
const STEERING_PERIOD: u32 = 40;

#[derive(Error, Debug)]
enum DemoError {
    #[error("engine: {0}")]
    Engine(#[from] EngineError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

struct GoatGame {
    input: ScriptedInput,
    rng: StdRng,
    eaten: Rc<Cell<u32>>,
    frame: u32,
    held: Option<KeyCode>,
    phase: StateMachine,
}

impl GoatGame {
    fn new(seed: u64) -> Self {
        Self {
            input: ScriptedInput::new(),
            rng: StdRng::seed_from_u64(seed),
            eaten: Rc::new(Cell::new(0)),
            frame: 0,
            held: None,
            phase: StateMachine::new(),
        }
    }

    fn random_position(&mut self) -> (f32, f32) {
        (self.rng.gen_range(-8.0..8.0), self.rng.gen_range(-8.0..8.0))
    }

    fn steer(&mut self) {
        if let Some(key) = self.held.take() {
            self.input.release(key);
        }
        let keys = [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right];
        let key = keys[self.rng.gen_range(0..keys.len())];
        self.input.press(key);
        self.held = Some(key);
    }
}

impl Application for GoatGame {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Setting up the field...");
        let scene = engine.main_scene();

        let eaten = Rc::clone(&self.eaten);
        let scripts = engine.world_mut().scripts_mut();
        scripts.register_with("goat", move || Box::new(GoatController::new(Rc::clone(&eaten))));
        scripts.register::<Wander>("wander");

        let (world, graphics) = engine.world_and_graphics();

        let goat = world.create_game_object(scene, "Goat", true, "player", 0)?;
        world.add_component(goat, SpriteRenderer::new())?;
        world.set_sprite(goat, graphics, "goat.dds")?;
        world.add_component(goat, Collider::circle().with_visible(true))?;
        world.add_component(goat, Camera::new().with_view_size(20.0, 20.0))?;
        world.add_script(goat, "goat")?;

        for index in 0..HAY_BALES {
            let (x, y) = self.random_position();
            let hay = world.create_game_object(scene, &format!("Hay{index}"), true, "hay", 0)?;
            *world.game_object_mut(hay).ok_or_else(|| AppError::GameLogic("hay vanished".to_string()))?.transform_mut() =
                Transform::from_position_scale_2d(x, y, 1.0, 1.0);
            world.add_component(hay, SpriteRenderer::with_color(Color::GREEN))?;
            world.add_component(hay, Collider::boxed().with_trigger(true))?;
        }

        for index in 0..WOLVES {
            let (x, y) = self.random_position();
            let velocity = Vec3::new(self.rng.gen_range(-2.0..2.0), self.rng.gen_range(-2.0..2.0), 0.0);
            let wolf = world.create_game_object(scene, &format!("Wolf{index}"), true, "wolf", 1)?;
            *world.game_object_mut(wolf).ok_or_else(|| AppError::GameLogic("wolf vanished".to_string()))?.transform_mut() =
                Transform::from_position_scale_2d(x, y, 1.5, 1.5);
            world.add_component(wolf, SpriteRenderer::new())?;
            world.add_component(wolf, Collider::circle())?;
            world.add_component(wolf, RigidBody::with_velocity(velocity))?;
            world.add_script(wolf, "wander")?;
        }

        log::info!("{} game objects on the field", world.game_object_count());
        self.phase.change_state(Box::new(Grazing::new(Rc::clone(&self.eaten), HAY_BALES)));
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        if self.frame % STEERING_PERIOD == 0 {
            self.steer();
        }
        self.frame += 1;

        self.phase.update(delta_time);
        if self.phase.current_name() == Some(phases::DONE) {
            engine.quit();
        }
        Ok(())
    }

    fn input_source(&self) -> &dyn InputSource {
        &self.input
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let world = engine.world();
        log::info!(
            "Demo finished: {} frames, {:.2}s simulated, {}/{} hay eaten, {} objects left",
            engine.frame_count(),
            engine.total_time(),
            self.eaten.get(),
            HAY_BALES,
            world.game_object_count()
        );
    }
}

fn load_config() -> Result<EngineConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_or_default(path),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<(), DemoError> {
    let config = load_config()?;

    // Initialize logging
    gc_engine::foundation::logging::init_with_level(&config.logging.filter);

    log::info!("Starting Goat Demo");

    let graphics = HeadlessGraphics::with_textures(["goat.dds"]);
    let mut engine = Engine::new(config, Box::new(graphics))?;
    let mut game = GoatGame::new(7);

    match engine.run_frames(&mut game, FRAMES, FRAME_TIME) {
        Ok(()) => {
            log::info!("Goat demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Goat demo failed: {e}");
            Err(e.into())
        }
    }
}
