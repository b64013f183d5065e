//! Gameplay scripts for the goat demo

use std::cell::Cell;
use std::rc::Rc;

use gc_engine::prelude::*;

const GOAT_SPEED: f32 = 6.0;
const FIELD_HALF_SIZE: f32 = 10.0;

/// Arrow keys move the goat; touching hay eats it, touching a wolf sends
/// the goat home
pub struct GoatController {
    eaten: Rc<Cell<u32>>,
}

impl GoatController {
    pub fn new(eaten: Rc<Cell<u32>>) -> Self {
        Self { eaten }
    }
}

impl Script for GoatController {
    fn start(&mut self, ctx: &mut ScriptContext<'_>) {
        log::info!("Goat {} ready", ctx.id());
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) {
        let input = ctx.input();
        let mut direction = Vec3::zeros();
        if input.is_key_pressed(KeyCode::Up) {
            direction.y += 1.0;
        }
        if input.is_key_pressed(KeyCode::Down) {
            direction.y -= 1.0;
        }
        if input.is_key_pressed(KeyCode::Left) {
            direction.x -= 1.0;
        }
        if input.is_key_pressed(KeyCode::Right) {
            direction.x += 1.0;
        }

        let step = direction * GOAT_SPEED * ctx.delta_time();
        let transform = ctx.transform_mut();
        transform.translate(step);
        transform.position.x = transform.position.x.clamp(-FIELD_HALF_SIZE, FIELD_HALF_SIZE);
        transform.position.y = transform.position.y.clamp(-FIELD_HALF_SIZE, FIELD_HALF_SIZE);
    }

    fn on_trigger_enter(&mut self, ctx: &mut ScriptContext<'_>, other: &ColliderHit) {
        if other.is_trigger {
            self.eaten.set(self.eaten.get() + 1);
            log::info!("Goat ate hay {} ({} so far)", other.id, self.eaten.get());
            ctx.destroy_game_object(other.object);
        } else {
            log::warn!("Wolf {} caught the goat, back to the barn", other.id);
            ctx.transform_mut().position = Vec3::zeros();
        }
    }
}

/// Stops its owner's rigid body once it drifts off the field
#[derive(Default)]
pub struct Wander {
    elapsed: f32,
}

impl Script for Wander {
    fn fixed_update(&mut self, ctx: &mut ScriptContext<'_>) {
        self.elapsed += ctx.delta_time();
        let position = ctx.transform().position;
        if position.x.abs() > FIELD_HALF_SIZE || position.y.abs() > FIELD_HALF_SIZE {
            log::debug!("Wolf {} left the field after {:.1}s, resting", ctx.id(), self.elapsed);
            let object = ctx.object();
            ctx.set_component_active(object, ComponentKind::RigidBody, false);
        }
    }
}
