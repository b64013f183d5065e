//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer from the wall clock (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed.as_secs_f32());
    }

    /// Advance the timer by an explicit delta (headless runs and tests)
    pub fn advance(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Fixed-step accumulator for the physics pass
///
/// Frame time is accumulated and consumed in `step`-sized slices. At most
/// `max_steps` slices run per frame; any backlog beyond that is dropped so a
/// long hitch cannot snowball into ever longer frames.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    /// Create an accumulator with the given step length in seconds
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    /// Length of one fixed step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Unconsumed time, always in `[0, step)` after [`Self::advance`]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Interpolation factor between the last two fixed steps
    pub fn alpha(&self) -> f32 {
        if self.step > 0.0 {
            self.accumulator / self.step
        } else {
            0.0
        }
    }

    /// Feed a frame's delta time and return how many fixed steps to run
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        if self.step <= 0.0 {
            return 0;
        }

        if !delta_time.is_finite() {
            log::warn!("Ignoring non-finite frame delta {delta_time}");
            return 0;
        }
        self.accumulator += delta_time.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            log::warn!(
                "Fixed timestep backlog of {:.4}s dropped after {} steps",
                self.accumulator,
                steps
            );
            self.accumulator %= self.step;
        }

        steps
    }

    /// Forget any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
