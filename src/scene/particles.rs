//! Decorative point fields: background stars, a faint dust disc and the
//! asteroid belt.

use std::f32::consts::TAU;

use nalgebra::{Matrix4, Vector3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::engine::mesh::Mesh;

pub struct PointCloud {
    pub positions: Vec<Vector3<f32>>,
    pub colors: Vec<(f32, f32, f32)>,
    /// Point size in pixels.
    pub size: f32,
    pub opacity: f32,
    pub rotation_y: f32,
    /// Radians per frame at 1x.
    pub rotation_rate: f32,
}

impl PointCloud {
    pub fn mesh(&self) -> Mesh {
        Mesh::points(&self.positions, &self.colors)
    }

    pub fn model(&self) -> Matrix4<f32> {
        Matrix4::from_euler_angles(0.0, self.rotation_y, 0.0)
    }

    pub fn advance(&mut self, multiplier: f32) {
        if multiplier > 0.0 {
            self.rotation_y += self.rotation_rate * multiplier;
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Stars scattered uniformly over directions, between `inner` and `outer`
/// from the origin.
pub fn starfield(count: usize, inner: f32, outer: f32, seed: u64) -> PointCloud {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    for _ in 0..count {
        let z: f32 = rng.gen_range(-1.0..=1.0);
        let theta = rng.gen_range(0.0..TAU);
        let ring = (1.0 - z * z).sqrt();
        let direction = Vector3::new(ring * theta.cos(), z, ring * theta.sin());
        positions.push(direction * rng.gen_range(inner..=outer));

        let brightness: f32 = rng.gen_range(0.5..=1.0);
        let tint = match rng.gen_range(0..10) {
            0 => (0.75, 0.85, 1.0),
            1 => (1.0, 0.9, 0.7),
            _ => (1.0, 1.0, 1.0),
        };
        colors.push((tint.0 * brightness, tint.1 * brightness, tint.2 * brightness));
    }
    PointCloud { positions, colors, size: 2.0, opacity: 1.0, rotation_y: 0.0, rotation_rate: 0.0 }
}

/// Thin translucent disc of dust out to `radius`, slowly turning.
pub fn dust(count: usize, radius: f32, seed: u64) -> PointCloud {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    let half_height = radius * 0.05;
    for _ in 0..count {
        // sqrt keeps the areal density uniform
        let r = radius * rng.gen::<f32>().sqrt();
        let theta = rng.gen_range(0.0..TAU);
        let y = rng.gen_range(-half_height..=half_height);
        positions.push(Vector3::new(r * theta.cos(), y, r * theta.sin()));
        let shade: f32 = rng.gen_range(0.4..=0.7);
        colors.push((shade * 0.8, shade * 0.85, shade));
    }
    PointCloud { positions, colors, size: 1.5, opacity: 0.35, rotation_y: 0.0, rotation_rate: 0.0002 }
}

/// Annulus of rocks between `inner` and `outer`, `thickness` tall.
pub fn asteroid_belt(count: usize, inner: f32, outer: f32, thickness: f32, seed: u64) -> PointCloud {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    let half = thickness / 2.0;
    for _ in 0..count {
        let r = rng.gen_range(inner..=outer);
        let theta = rng.gen_range(0.0..TAU);
        let y = rng.gen_range(-half..=half);
        positions.push(Vector3::new(r * theta.cos(), y, r * theta.sin()));
        let shade: f32 = rng.gen_range(0.35..=0.65);
        let warmth: f32 = rng.gen_range(0.0..=0.15);
        colors.push((shade + warmth, shade + warmth * 0.5, shade));
    }
    PointCloud { positions, colors, size: 2.5, opacity: 1.0, rotation_y: 0.0, rotation_rate: 0.0015 }
}
