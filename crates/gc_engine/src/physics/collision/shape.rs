//! Collider shapes
//!
//! Shapes are stored in local units and placed in the world on demand from
//! the owner's transform, every time a test runs. The transform position is
//! the minimum corner of the shape's bounding square; rotation is ignored.

use serde::{Deserialize, Serialize};

use super::primitives::{Aabb2, Circle2};
use crate::foundation::math::{Transform, Vec2};

/// Default circle radius, half the unit square
pub const DEFAULT_RADIUS: f32 = 0.5;

/// Local collider shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Axis-aligned box; world extents are `size * scale.xy`
    Box {
        /// Size in local units
        size: Vec2,
    },
    /// Circle; world radius is `radius * scale.x`
    Circle {
        /// Radius in local units
        radius: f32,
    },
}

impl ColliderShape {
    /// Unit box, covering exactly the owner's scale
    pub fn unit_box() -> Self {
        Self::Box { size: Vec2::new(1.0, 1.0) }
    }

    /// Circle inscribed in the owner's scale along x
    pub fn unit_circle() -> Self {
        Self::Circle { radius: DEFAULT_RADIUS }
    }

    /// Place the shape in the world using `transform`
    pub fn to_world_space(&self, transform: &Transform) -> WorldShape {
        let origin = transform.position_2d();
        let scale = transform.scale_2d();

        match *self {
            Self::Box { size } => WorldShape::Box(Aabb2::from_min_size(origin, size.component_mul(&scale))),
            Self::Circle { radius } => {
                // Non-uniform scale is not supported on circles, only x counts
                let radius = radius * scale.x;
                WorldShape::Circle(Circle2::new(origin + Vec2::new(radius, radius), radius))
            }
        }
    }
}

/// World-space shape, built for a single test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    /// World-space box
    Box(Aabb2),
    /// World-space circle
    Circle(Circle2),
}

impl WorldShape {
    /// Center point
    pub fn center(&self) -> Vec2 {
        match self {
            Self::Box(aabb) => aabb.center(),
            Self::Circle(circle) => circle.center,
        }
    }

    /// Test if this shape overlaps another
    ///
    /// Every pairing is handled, so `a.intersects(b) == b.intersects(a)`.
    pub fn intersects(&self, other: &WorldShape) -> bool {
        match (self, other) {
            (Self::Box(a), Self::Box(b)) => a.intersects_aabb(b),

            (Self::Box(aabb), Self::Circle(circle)) |
            (Self::Circle(circle), Self::Box(aabb)) => circle.intersects_aabb(aabb),

            (Self::Circle(a), Self::Circle(b)) => a.intersects_circle(b),
        }
    }
}
