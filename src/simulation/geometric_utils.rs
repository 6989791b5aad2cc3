//! Geometric utility functions for distance calculations and spatial operations.
//!
//! Positions and velocities are `geo::Coord<f32>` values. Helpers that would
//! divide by a vector length short-circuit on zero-length input instead of
//! producing NaN.

use geo::{Coord, Rect};

/// A 2D vector in world units.
pub type Vec2 = Coord<f32>;

/// Builds a [`Vec2`].
#[inline]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Coord { x, y }
}

/// Dot product.
#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Squared length, for comparisons that do not need the root.
#[inline]
pub fn length_squared(v: Vec2) -> f32 {
    dot(v, v)
}

/// Euclidean length.
#[inline]
pub fn length(v: Vec2) -> f32 {
    length_squared(v).sqrt()
}

/// Squared distance between two points.
#[inline]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    length_squared(a - b)
}

/// Unit vector in the direction of `v`, or `None` for a zero-length vector.
#[inline]
pub fn try_normalize(v: Vec2) -> Option<Vec2> {
    let len = length(v);
    if len > f32::EPSILON && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Unit vector in the direction of `v`; the zero vector stays zero.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    try_normalize(v).unwrap_or(vec2(0.0, 0.0))
}

/// Angle (radians) of the direction pointing from `from` towards `to`.
#[inline]
pub fn direction(to: Vec2, from: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector pointing along `angle`.
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU);
    wrapped - std::f32::consts::PI
}

/// Maps `value` from `[min, max]` onto `[0, 1]` (not clamped).
#[inline]
pub fn normalize_range(value: f32, min: f32, max: f32) -> f32 {
    if max - min == 0.0 {
        return 0.0;
    }
    (value - min) / (max - min)
}

/// True when two circles overlap or touch. Uses squared distances only.
#[inline]
pub fn circles_intersect(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    distance_squared(center_a, center_b) <= reach * reach
}

/// True when a circle overlaps an axis-aligned rectangle.
pub fn circle_rect_intersects(center: Vec2, radius: f32, rect: &Rect<f32>) -> bool {
    let min = rect.min();
    let max = rect.max();
    let closest = vec2(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
    distance_squared(center, closest) < radius * radius
}

/// Point on the circle `(center, radius)` closest to `point`.
///
/// A point exactly at the center has no closest direction; the positive x
/// axis is used.
pub fn closest_circle_point(center: Vec2, radius: f32, point: Vec2) -> Vec2 {
    let dir = try_normalize(point - center).unwrap_or(vec2(1.0, 0.0));
    center + dir * radius
}

/// Distance along the segment `start -> end` at which it first enters the
/// circle, or `None` when it misses.
///
/// A segment starting inside the circle hits at distance zero.
pub fn ray_circle_intersection(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = end - start;
    let f = start - center;

    let a = dot(d, d);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * dot(f, d);
    let c = dot(f, f) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);

    let t = if (0.0..=1.0).contains(&t1) {
        t1
    } else if t1 < 0.0 && t2 >= 0.0 {
        0.0
    } else {
        return None;
    };

    Some(t * a.sqrt())
}
