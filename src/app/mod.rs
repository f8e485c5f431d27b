//! The two visualizers. Both own a renderer plus GPU copies of a scene graph
//! built from one of the body tables.

pub mod explorer;
pub mod orrery;

use wasm_bindgen::JsValue;
use web_sys::WebGlTexture;

use crate::config::SceneConfig;
use crate::engine::mesh::Mesh;
use crate::engine::renderer::{GpuMesh, Material, Renderer};
use crate::engine::texture::TextureData;
use crate::scene::bodies::{hex_to_rgb, BodyDescriptor, RingDescriptor};
use crate::scene::graph::SceneGraph;

/// Orbit rings are drawn `distance ± ORBIT_HALF_WIDTH`.
const ORBIT_HALF_WIDTH: f32 = 0.1;
const ORBIT_OPACITY: f32 = 0.2;

const WHITE: (f32, f32, f32) = (1.0, 1.0, 1.0);

struct BodyVisual {
    mesh: GpuMesh,
    texture: Option<WebGlTexture>,
    ring: Option<(GpuMesh, RingDescriptor)>,
}

fn upload_bodies(renderer: &Renderer, table: &[BodyDescriptor], scene: &SceneConfig) -> Result<Vec<BodyVisual>, JsValue> {
    let mut visuals = Vec::with_capacity(table.len());
    for (i, desc) in table.iter().enumerate() {
        // Unit sphere, scaled per body by the model matrix.
        let sphere = Mesh::sphere(1.0, scene.sphere_segments, scene.sphere_segments, WHITE)?;
        let mesh = renderer.upload(&sphere)?;

        let texture = if desc.surface.is_procedural() {
            let data = TextureData::procedural(desc.surface, desc.rgb(), scene.texture_size, scene.seed.wrapping_add(i as u64));
            Some(renderer.upload_texture(&data)?)
        } else {
            None
        };

        let ring = match desc.ring {
            Some(ring) => {
                let geometry = Mesh::ring(ring.inner, ring.outer, scene.orbit_segments, WHITE)?;
                Some((renderer.upload(&geometry)?, ring))
            }
            None => None,
        };

        visuals.push(BodyVisual { mesh, texture, ring });
    }
    log::debug!("uploaded {} bodies", visuals.len());
    Ok(visuals)
}

fn upload_orbits(renderer: &Renderer, graph: &SceneGraph, segments: u32) -> Result<Vec<Option<GpuMesh>>, JsValue> {
    graph
        .orbits
        .iter()
        .map(|orbit| match orbit {
            Some(orbit) => {
                let geometry = Mesh::ring(orbit.radius - ORBIT_HALF_WIDTH, orbit.radius + ORBIT_HALF_WIDTH, segments, WHITE)?;
                Ok(Some(renderer.upload(&geometry)?))
            }
            None => Ok(None),
        })
        .collect()
}

/// Emissive bodies ignore the lights. A texture already carries the body
/// color, so it is modulated by white.
fn body_material<'a>(desc: &BodyDescriptor, texture: Option<&'a WebGlTexture>) -> Material<'a> {
    let color = if texture.is_some() { WHITE } else { desc.rgb() };
    let material = if desc.emissive { Material::basic(color) } else { Material::phong(color) };
    material.with_texture(texture)
}

fn draw_bodies(renderer: &Renderer, graph: &SceneGraph, table: &[BodyDescriptor], visuals: &[BodyVisual]) {
    for (i, (desc, visual)) in table.iter().zip(visuals).enumerate() {
        let material = body_material(desc, visual.texture.as_ref());
        renderer.draw(&visual.mesh, &material, &graph.body_model(i));
    }
}

/// Must run inside a transparent pass.
fn draw_orbits(renderer: &Renderer, graph: &SceneGraph, orbit_meshes: &[Option<GpuMesh>]) {
    let material = Material::basic(WHITE).transparent(ORBIT_OPACITY).double_sided();
    let model = graph.orbit_model();
    for (orbit, mesh) in graph.orbits.iter().zip(orbit_meshes) {
        if let (Some(orbit), Some(mesh)) = (orbit, mesh) {
            if orbit.visible {
                renderer.draw(mesh, &material, &model);
            }
        }
    }
}

/// Must run inside a transparent pass.
fn draw_rings(renderer: &Renderer, graph: &SceneGraph, visuals: &[BodyVisual]) {
    for (i, visual) in visuals.iter().enumerate() {
        if let Some((mesh, ring)) = &visual.ring {
            let material = Material::basic(hex_to_rgb(ring.color)).transparent(ring.opacity).double_sided();
            renderer.draw(mesh, &material, &graph.ring_model(i));
        }
    }
}
