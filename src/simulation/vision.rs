//! Vision sense: three rays cast from a cell's center.
//!
//! For each ray the sense reports:
//! - Proximity of the first entity hit (1.0 = touching, 0.0 = nothing seen)
//! - That entity's color as three channels

use super::dna::Traits;
use super::geometric_utils::{Vec2, from_angle, ray_circle_intersection, vec2};

/// Number of vision rays per cell.
pub const EYE_COUNT: usize = 3;
/// Network inputs contributed by each ray.
pub const INPUTS_PER_EYE: usize = 4;

/// First entity a ray runs into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray start to the hit.
    pub distance: f32,
    /// Color of the entity hit.
    pub color: [f32; 3],
}

/// One vision ray and what it currently sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionRay {
    /// Ray origin (the cell's center).
    pub start: Vec2,
    /// Far end of the ray.
    pub end: Vec2,
    /// Ray length.
    pub length: f32,
    /// Closest hit so far.
    pub hit: Option<RayHit>,
}

impl Default for VisionRay {
    fn default() -> Self {
        let origin = vec2(0.0, 0.0);
        Self {
            start: origin,
            end: origin,
            length: 0.0,
            hit: None,
        }
    }
}

impl VisionRay {
    /// Ray from `start` along `angle`, seeing nothing yet.
    pub fn new(start: Vec2, angle: f32, length: f32) -> Self {
        Self {
            start,
            end: start + from_angle(angle) * length,
            length,
            hit: None,
        }
    }

    /// Records the circle `(center, radius)` if the ray hits it closer than
    /// anything seen so far.
    pub fn observe(&mut self, center: Vec2, radius: f32, color: [f32; 3]) {
        let Some(distance) = ray_circle_intersection(self.start, self.end, center, radius) else {
            return;
        };
        if self.hit.is_none_or(|hit| distance < hit.distance) {
            self.hit = Some(RayHit { distance, color });
        }
    }

    /// 1.0 for a hit at the origin, falling to 0.0 at the ray's end or with no hit.
    pub fn proximity(&self) -> f32 {
        match self.hit {
            Some(hit) if self.length > 0.0 => 1.0 - (hit.distance / self.length).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Point where the ray stops: the hit if any, otherwise its end.
    pub fn visible_end(&self) -> Vec2 {
        match self.hit {
            Some(hit) if self.length > 0.0 => {
                self.start + (self.end - self.start) * (hit.distance / self.length)
            }
            _ => self.end,
        }
    }
}

/// The three rays of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vision {
    rays: [VisionRay; EYE_COUNT],
}

impl Vision {
    /// Rays at `rotation`, `rotation - eye_offset_a` and
    /// `rotation + eye_offset_b` with the trait lengths.
    pub fn cast(position: Vec2, rotation: f32, traits: &Traits) -> Self {
        Self {
            rays: [
                VisionRay::new(position, rotation, traits.eye_length_a),
                VisionRay::new(position, rotation - traits.eye_offset_a, traits.eye_length_b),
                VisionRay::new(position, rotation + traits.eye_offset_b, traits.eye_length_c),
            ],
        }
    }

    /// Offers one nearby circle to every ray.
    pub fn observe(&mut self, center: Vec2, radius: f32, color: [f32; 3]) {
        for ray in &mut self.rays {
            ray.observe(center, radius, color);
        }
    }

    /// The rays, forward ray first.
    pub fn rays(&self) -> &[VisionRay; EYE_COUNT] {
        &self.rays
    }

    /// Writes `(proximity, r, g, b)` per ray into `out`.
    pub fn write_inputs(&self, out: &mut [f32]) {
        for (ray, chunk) in self.rays.iter().zip(out.chunks_exact_mut(INPUTS_PER_EYE)) {
            let color = ray.hit.map(|hit| hit.color).unwrap_or([0.0; 3]);
            chunk[0] = ray.proximity();
            chunk[1..].copy_from_slice(&color);
        }
    }
}
