//! Axis-aligned bounding boxes
//!
//! World space has x growing to the right (the running direction) and y
//! growing downward, so `top < bottom`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Box of the given size whose bottom edge is centered on `(center_x, bottom)`
    pub fn from_bottom_center(center_x: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self::new(center_x - width / 2.0, bottom - height, width, height)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    /// Trailing edge when running right
    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Same box moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            size: self.size,
        }
    }

    /// Horizontal extent as `(left, right)`
    pub fn span_x(&self) -> (f32, f32) {
        (self.left(), self.right())
    }
}
