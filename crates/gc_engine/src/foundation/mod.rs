//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and the [`math::Transform`] value type
//! - Index-based collections with stable handles
//! - Frame timing and the fixed-step accumulator
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
