//! Rigid body component
//!
//! Kinematic only: the body carries a velocity and moves its owner by
//! `velocity * dt` each fixed step. Forces are impulses, divided by mass and
//! folded into the velocity at the start of the next step. There is no
//! collision response.

use crate::foundation::math::{Transform, Vec3};

/// Velocity-driven body
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    velocity: Vec3,
    mass: f32,
    pending_impulse: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            mass: 1.0,
            pending_impulse: Vec3::zeros(),
        }
    }
}

impl RigidBody {
    /// Body at rest with unit mass
    pub fn new() -> Self {
        Self::default()
    }

    /// Body moving at `velocity`
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }

    /// Current velocity in units per second
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Overwrite the velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Mass used to scale forces
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set the mass; non-positive values are clamped to a tiny positive mass
    pub fn set_mass(&mut self, mass: f32) {
        if mass <= 0.0 || !mass.is_finite() {
            log::warn!("RigidBody mass must be positive, got {mass}");
            self.mass = f32::EPSILON;
            return;
        }
        self.mass = mass;
    }

    /// Queue an impulse applied on the next fixed step
    pub fn add_force(&mut self, force: Vec3) {
        self.pending_impulse += force / self.mass;
    }

    /// Advance one fixed step
    pub fn integrate(&mut self, transform: &mut Transform, delta_time: f32) {
        self.velocity += std::mem::take(&mut self.pending_impulse);
        transform.translate(self.velocity * delta_time);
    }

    /// Stop all motion
    pub fn stop(&mut self) {
        self.velocity = Vec3::zeros();
        self.pending_impulse = Vec3::zeros();
    }
}
