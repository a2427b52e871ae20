use shared::arena_center;
use std::ops::{Add, Mul, Sub};

/// A vector in field coordinates. Positive y points down the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(*self)
    }

    pub fn magnitude(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the zero vector for (near) zero input.
    pub fn normalize(&self) -> Vec2 {
        let mag = self.magnitude();
        if mag <= f32::EPSILON {
            Vec2::ZERO
        } else {
            self.scale(1.0 / mag)
        }
    }

    pub fn scale(&self, scalar: f32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }

    /// Polar angle around the arena centre, in `[0, 2π)`.
    pub fn arena_angle(&self) -> f32 {
        let (cx, cy) = arena_center();
        let angle = (self.y - cy).atan2(self.x - cx);
        if angle < 0.0 {
            angle + shared::TAU
        } else {
            angle
        }
    }

    /// Point on a circle around the arena centre.
    pub fn on_arena_circle(angle: f32, radius: f32) -> Vec2 {
        let (cx, cy) = arena_center();
        Vec2::new(angle.cos() * radius + cx, angle.sin() * radius + cy)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f32) -> Vec2 {
        self.scale(scalar)
    }
}

/// Intersection of the segments `start..end` and `a..b`.
///
/// Solves both parametric equations with Cramer's rule. Parallel segments
/// (zero determinant) and parameters outside `[0, 1]` yield `None`.
pub fn segment_intersection(start: Vec2, end: Vec2, a: Vec2, b: Vec2) -> Option<Vec2> {
    let motion = end - start;
    let edge = b - a;
    let denom = edge.y * motion.x - edge.x * motion.y;
    if denom == 0.0 {
        return None;
    }

    let offset = start - a;
    let t = (edge.x * offset.y - edge.y * offset.x) / denom;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let u = (motion.x * offset.y - motion.y * offset.x) / denom;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(start + motion * t)
}
