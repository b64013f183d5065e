//! 2D collision detection
//!
//! - [`primitives`] - world-space boxes and circles with their predicates
//! - [`shape`] - local collider shapes and their world-space placement
//!
//! Colliders store a [`ColliderShape`]; a [`WorldShape`] is built from the
//! owner's transform for each test and thrown away afterwards.

pub mod primitives;
pub mod shape;

pub use primitives::{Aabb2, Circle2};
pub use shape::{ColliderShape, WorldShape, DEFAULT_RADIUS};
