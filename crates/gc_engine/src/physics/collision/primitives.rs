//! 2D collision primitives and intersection predicates
//!
//! Boxes are axis-aligned and touching boxes count as overlapping. Tests
//! involving a circle are strict: a circle grazing another shape does not
//! overlap it.

use crate::foundation::math::Vec2;

/// Axis-aligned box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb2 {
    /// Box spanning `[min, min + size]`
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half the size along each axis
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Point of the box nearest to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Box-box overlap, touching edges included
    pub fn intersects_aabb(&self, other: &Aabb2) -> bool {
        let overlap_x = self.max.x >= other.min.x && other.max.x >= self.min.x;
        let overlap_y = self.max.y >= other.min.y && other.max.y >= self.min.y;
        overlap_x && overlap_y
    }

    /// Box-circle overlap through the closest point on the box
    pub fn intersects_circle(&self, circle: &Circle2) -> bool {
        circle.intersects_aabb(self)
    }
}

/// Circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle2 {
    /// Center point
    pub center: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle2 {
    /// Circle from center and radius
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Circle-circle overlap
    pub fn intersects_circle(&self, other: &Circle2) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).norm_squared() < reach * reach
    }

    /// Circle-box overlap
    pub fn intersects_aabb(&self, aabb: &Aabb2) -> bool {
        let closest = aabb.closest_point(self.center);
        (closest - self.center).norm_squared() < self.radius * self.radius
    }
}
