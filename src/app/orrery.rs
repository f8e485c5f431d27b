use wasm_bindgen::JsValue;

use crate::app::{draw_bodies, draw_orbits, upload_bodies, upload_orbits, BodyVisual};
use crate::config::AppConfig;
use crate::engine::camera::{DragMode, OrbitCamera, Projection};
use crate::engine::renderer::{FrameCamera, GpuMesh, Renderer};
use crate::error::VizError;
use crate::scene::animation;
use crate::scene::bodies::ORRERY_BODIES;
use crate::scene::controls::OrreryControls;
use crate::scene::graph::{OrbitRule, SceneGraph};

/// Sun and four inner planets on flat orbit rings, turned by the page's
/// buttons and speed slider.
pub struct Orrery {
    renderer: Renderer,
    graph: SceneGraph,
    visuals: Vec<BodyVisual>,
    orbit_meshes: Vec<Option<GpuMesh>>,
    controls: OrreryControls,
    camera: OrbitCamera,
    projection: Projection,
}

impl Orrery {
    pub fn new(renderer: Renderer, config: &AppConfig, width: u32, height: u32) -> Result<Self, JsValue> {
        let graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        let visuals = upload_bodies(&renderer, ORRERY_BODIES, &config.scene)?;
        let orbit_meshes = upload_orbits(&renderer, &graph, config.scene.orbit_segments)?;

        let camera_config = &config.orrery;
        let mut camera = OrbitCamera::new(camera_config.distance);
        camera.min_distance = ORRERY_BODIES[0].radius * 1.5;
        let mut projection = Projection::new(camera_config.fov_deg, 1.0, camera_config.near, camera_config.far);
        projection.set_aspect(width, height);

        log::info!("orrery ready with {} bodies", graph.len());
        let orrery = Orrery {
            renderer,
            graph,
            visuals,
            orbit_meshes,
            controls: OrreryControls::default(),
            camera,
            projection,
        };
        orrery.renderer.resize(width as i32, height as i32);
        Ok(orrery)
    }

    pub fn update(&mut self) {
        animation::advance(&mut self.graph, self.controls.rotation_speed);
    }

    pub fn render(&self) {
        self.renderer.clear(0.0, 0.0, 0.0);

        let view = self.camera.view();
        let frame = FrameCamera {
            view_projection: self.projection.matrix() * view,
            eye: self.camera.eye(),
        };
        self.renderer.set_camera(&frame);
        self.renderer.set_lights(&self.graph.lights);

        draw_bodies(&self.renderer, &self.graph, ORRERY_BODIES, &self.visuals);

        self.renderer.begin_transparent();
        draw_orbits(&self.renderer, &self.graph, &self.orbit_meshes);
        self.renderer.end_transparent();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.set_aspect(width, height);
        self.renderer.resize(width as i32, height as i32);
    }

    pub fn toggle_orbits(&mut self) {
        let visible = self.controls.toggle_orbits();
        self.graph.set_orbits_visible(visible);
    }

    pub fn toggle_rotation(&mut self) {
        self.controls.toggle_rotation();
        log::debug!("rotation speed {}", self.controls.rotation_speed);
    }

    pub fn update_speed(&mut self, value: &str) -> Result<f32, VizError> {
        self.controls.update_speed(value)
    }

    pub fn handle_mouse_down(&mut self, x: i32, y: i32, button: i16) {
        if let Some(mode) = DragMode::from_button(button) {
            self.camera.begin_drag(x, y, mode);
        }
    }

    pub fn handle_mouse_up(&mut self) {
        self.camera.end_drag();
    }

    pub fn handle_mouse_move(&mut self, x: i32, y: i32) {
        self.camera.drag_to(x, y);
    }

    pub fn handle_wheel(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }
}
