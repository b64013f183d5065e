//! # Core Engine Module
//!
//! Shared configuration used by every subsystem. Engine behaviour that can
//! be tuned without recompiling (fixed step length, trigger events, log
//! filter, default names) lives in [`config::EngineConfig`]. Game flow that
//! moves between phases uses [`state_machine::StateMachine`].

pub mod config;
pub mod state_machine;

pub use config::{EngineConfig, PhysicsConfig, SceneConfig, LoggingConfig, StepMode};
pub use crate::config::{Config, ConfigError};
pub use state_machine::{State, StateMachine, Transition};
