//! Game phases: grazing until the hay is gone, a short rest, then done

use std::cell::Cell;
use std::rc::Rc;

use gc_engine::prelude::*;

/// Name of the final phase; the game quits once it is reached
pub const DONE: &str = "done";

const REST_SECONDS: f32 = 1.0;

/// The goat is still hungry
pub struct Grazing {
    eaten: Rc<Cell<u32>>,
    goal: u32,
    elapsed: f32,
}

impl Grazing {
    pub fn new(eaten: Rc<Cell<u32>>, goal: u32) -> Self {
        Self { eaten, goal, elapsed: 0.0 }
    }
}

impl State for Grazing {
    fn name(&self) -> &str {
        "grazing"
    }

    fn enter(&mut self) {
        log::info!("Grazing: {} hay bales to find", self.goal);
    }

    fn update(&mut self, delta_time: f32) -> Transition {
        self.elapsed += delta_time;
        if self.eaten.get() < self.goal {
            return Transition::None;
        }
        log::info!("All hay eaten after {:.1}s", self.elapsed);
        Transition::Switch(Box::new(Resting::default()))
    }
}

/// Digesting before the run ends
#[derive(Default)]
struct Resting {
    elapsed: f32,
}

impl State for Resting {
    fn name(&self) -> &str {
        "resting"
    }

    fn update(&mut self, delta_time: f32) -> Transition {
        self.elapsed += delta_time;
        if self.elapsed < REST_SECONDS {
            return Transition::None;
        }
        Transition::Switch(Box::new(Done))
    }
}

struct Done;

impl State for Done {
    fn name(&self) -> &str {
        DONE
    }
}
