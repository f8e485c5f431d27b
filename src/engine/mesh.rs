use std::f32::consts::PI;

use nalgebra::Vector3;

use crate::error::VizError;

/// position(3) normal(3) color(3) uv(2)
pub const FLOATS_PER_VERTEX: usize = 11;

const MAX_INDEXED_VERTICES: usize = u16::MAX as usize + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Points,
}

pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
    pub primitive: Primitive,
}

impl Mesh {
    /// UV sphere with poles on the Y axis. `u` runs around the equator and
    /// `v` from the north pole down, so equirectangular textures map directly.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32, color: (f32, f32, f32)) -> Result<Self, VizError> {
        let width_segments = width_segments.max(3) as usize;
        let height_segments = height_segments.max(2) as usize;
        let vertex_count = (width_segments + 1) * (height_segments + 1);
        if vertex_count > MAX_INDEXED_VERTICES {
            return Err(VizError::MeshTooLarge(vertex_count));
        }

        let mut vertices = Vec::with_capacity(vertex_count * FLOATS_PER_VERTEX);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = Vector3::new(
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                );
                push_vertex(&mut vertices, normal * radius, normal, color, (u, 1.0 - v));
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::with_capacity(width_segments * height_segments * 6);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = (iy * row + ix + 1) as u16;
                let b = (iy * row + ix) as u16;
                let c = ((iy + 1) * row + ix) as u16;
                let d = ((iy + 1) * row + ix + 1) as u16;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Ok(Mesh { vertices, indices, primitive: Primitive::Triangles })
    }

    /// Flat annulus in the XY plane facing +Z. Callers rotate it a quarter turn
    /// about X to lay it in the orbital plane.
    pub fn ring(inner: f32, outer: f32, segments: u32, color: (f32, f32, f32)) -> Result<Self, VizError> {
        let segments = segments.max(3) as usize;
        let vertex_count = (segments + 1) * 2;
        if vertex_count > MAX_INDEXED_VERTICES {
            return Err(VizError::MeshTooLarge(vertex_count));
        }

        let mut vertices = Vec::with_capacity(vertex_count * FLOATS_PER_VERTEX);
        let normal = Vector3::z();
        for radius in [inner, outer] {
            for i in 0..=segments {
                let theta = i as f32 / segments as f32 * 2.0 * PI;
                let x = radius * theta.cos();
                let y = radius * theta.sin();
                let uv = ((x / outer + 1.0) / 2.0, (y / outer + 1.0) / 2.0);
                push_vertex(&mut vertices, Vector3::new(x, y, 0.0), normal, color, uv);
            }
        }

        let mut indices = Vec::with_capacity(segments * 6);
        for i in 0..segments {
            let a = i as u16;
            let b = (i + segments + 1) as u16;
            let c = (i + segments + 2) as u16;
            let d = (i + 1) as u16;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        Ok(Mesh { vertices, indices, primitive: Primitive::Triangles })
    }

    /// Unindexed point cloud. A missing color defaults to white.
    pub fn points(positions: &[Vector3<f32>], colors: &[(f32, f32, f32)]) -> Self {
        let mut vertices = Vec::with_capacity(positions.len() * FLOATS_PER_VERTEX);
        for (i, position) in positions.iter().enumerate() {
            let color = colors.get(i).copied().unwrap_or((1.0, 1.0, 1.0));
            push_vertex(&mut vertices, *position, Vector3::zeros(), color, (0.0, 0.0));
        }
        Mesh { vertices, indices: Vec::new(), primitive: Primitive::Points }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    #[cfg(test)]
    pub fn position(&self, index: usize) -> Vector3<f32> {
        let base = index * FLOATS_PER_VERTEX;
        Vector3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    #[cfg(test)]
    pub fn normal(&self, index: usize) -> Vector3<f32> {
        let base = index * FLOATS_PER_VERTEX + 3;
        Vector3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }
}

fn push_vertex(vertices: &mut Vec<f32>, position: Vector3<f32>, normal: Vector3<f32>, color: (f32, f32, f32), uv: (f32, f32)) {
    vertices.extend_from_slice(&[
        position.x, position.y, position.z,
        normal.x, normal.y, normal.z,
        color.0, color.1, color.2,
        uv.0, uv.1,
    ]);
}
