use nalgebra::{Matrix4, Point3, Vector2};
use wasm_bindgen::JsValue;

use crate::app::{draw_bodies, draw_orbits, draw_rings, upload_bodies, upload_orbits, BodyVisual};
use crate::config::AppConfig;
use crate::engine::camera::{CameraMode, DragMode, FirstPersonCamera, OrbitCamera, Projection};
use crate::engine::picking::{pick, Ray};
use crate::engine::renderer::{FrameCamera, GpuMesh, Material, Renderer};
use crate::error::VizError;
use crate::scene::animation;
use crate::scene::bodies::{BELT_INNER, BELT_OUTER, BELT_THICKNESS, EXPLORER_BODIES};
use crate::scene::controls::ExplorerControls;
use crate::scene::graph::{OrbitRule, SceneGraph};
use crate::scene::particles::{self, PointCloud};
use crate::ui;

const STAR_SHELL: (f32, f32) = (1200.0, 1800.0);
const DUST_RADIUS: f32 = 200.0;

/// Index of the nearest body under `ndc`.
fn pick_body(graph: &SceneGraph, projection: &Matrix4<f32>, view: &Matrix4<f32>, ndc: Vector2<f32>) -> Option<usize> {
    Ray::from_ndc(ndc, projection, view).and_then(|ray| pick(&ray, &graph.colliders))
}

struct Particles {
    cloud: PointCloud,
    mesh: GpuMesh,
}

impl Particles {
    fn upload(renderer: &Renderer, cloud: PointCloud) -> Result<Self, JsValue> {
        let mesh = renderer.upload(&cloud.mesh())?;
        Ok(Particles { cloud, mesh })
    }

    fn draw(&self, renderer: &Renderer) {
        let material = Material::points(self.cloud.size, self.cloud.opacity);
        renderer.draw(&self.mesh, &material, &self.cloud.model());
    }
}

/// Full nine-body system with textures, rings, belt, picking and two camera
/// modes.
pub struct Explorer {
    renderer: Renderer,
    graph: SceneGraph,
    visuals: Vec<BodyVisual>,
    orbit_meshes: Vec<Option<GpuMesh>>,
    stars: Particles,
    dust: Particles,
    belt: Particles,
    controls: ExplorerControls,
    orbit_camera: OrbitCamera,
    fly_camera: FirstPersonCamera,
    projection: Projection,
    viewport: (u32, u32),
}

impl Explorer {
    pub fn new(renderer: Renderer, config: &AppConfig, width: u32, height: u32) -> Result<Self, JsValue> {
        let scene = &config.scene;
        let graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        let visuals = upload_bodies(&renderer, EXPLORER_BODIES, scene)?;
        let orbit_meshes = upload_orbits(&renderer, &graph, scene.orbit_segments)?;

        let stars = particles::starfield(scene.star_count, STAR_SHELL.0, STAR_SHELL.1, scene.seed);
        let dust = particles::dust(scene.dust_count, DUST_RADIUS, scene.seed.wrapping_add(1));
        let belt = particles::asteroid_belt(
            scene.asteroid_count,
            BELT_INNER,
            BELT_OUTER,
            BELT_THICKNESS,
            scene.seed.wrapping_add(2),
        );
        let stars = Particles::upload(&renderer, stars)?;
        let dust = Particles::upload(&renderer, dust)?;
        let belt = Particles::upload(&renderer, belt)?;

        let camera_config = &config.explorer;
        let mut orbit_camera = OrbitCamera::new(camera_config.distance);
        orbit_camera.elevation = 0.35;
        orbit_camera.min_distance = EXPLORER_BODIES[0].radius * 1.5;
        let fly_camera = FirstPersonCamera::looking_at(orbit_camera.eye(), orbit_camera.target);
        let mut projection = Projection::new(camera_config.fov_deg, 1.0, camera_config.near, camera_config.far);
        projection.set_aspect(width, height);

        log::info!(
            "explorer ready: {} bodies, {} stars, {} asteroids",
            graph.len(),
            stars.cloud.len(),
            belt.cloud.len()
        );

        let explorer = Explorer {
            renderer,
            graph,
            visuals,
            orbit_meshes,
            stars,
            dust,
            belt,
            controls: ExplorerControls::default(),
            orbit_camera,
            fly_camera,
            projection,
            viewport: (width, height),
        };
        explorer.renderer.resize(width as i32, height as i32);
        ui::set_camera_label(explorer.controls.camera_mode);
        ui::set_speed_label(explorer.controls.time_multiplier);
        Ok(explorer)
    }

    pub fn update(&mut self) {
        let multiplier = self.controls.time_multiplier;
        animation::advance(&mut self.graph, multiplier);
        self.dust.cloud.advance(multiplier);
        self.belt.cloud.advance(multiplier);

        if self.controls.camera_mode == CameraMode::PointerLock {
            self.fly_camera.update(&self.controls.movement);
        }
    }

    fn view(&self) -> (Matrix4<f32>, Point3<f32>) {
        match self.controls.camera_mode {
            CameraMode::Orbit => (self.orbit_camera.view(), self.orbit_camera.eye()),
            CameraMode::PointerLock => (self.fly_camera.view(), self.fly_camera.position),
        }
    }

    pub fn render(&self) {
        self.renderer.clear(0.0, 0.0, 0.0);

        let (view, eye) = self.view();
        let frame = FrameCamera { view_projection: self.projection.matrix() * view, eye };
        self.renderer.set_camera(&frame);
        self.renderer.set_lights(&self.graph.lights);

        draw_bodies(&self.renderer, &self.graph, EXPLORER_BODIES, &self.visuals);
        self.stars.draw(&self.renderer);
        if self.controls.belt_visible {
            self.belt.draw(&self.renderer);
        }

        self.renderer.begin_transparent();
        draw_orbits(&self.renderer, &self.graph, &self.orbit_meshes);
        draw_rings(&self.renderer, &self.graph, &self.visuals);
        self.dust.draw(&self.renderer);
        self.renderer.end_transparent();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.set_aspect(width, height);
        self.viewport = (width, height);
        self.renderer.resize(width as i32, height as i32);
    }

    pub fn set_time_multiplier(&mut self, value: &str) -> Result<f32, VizError> {
        let multiplier = self.controls.set_time_multiplier(value)?;
        ui::set_speed_label(multiplier);
        Ok(multiplier)
    }

    pub fn toggle_orbits(&mut self) {
        let visible = self.controls.toggle_orbits();
        self.graph.set_orbits_visible(visible);
    }

    pub fn toggle_belt(&mut self) {
        let visible = self.controls.toggle_belt();
        log::debug!("asteroid belt visible: {visible}");
    }

    /// Switches camera mode, handing the current viewpoint to the new camera.
    pub fn toggle_camera_mode(&mut self) -> CameraMode {
        let mode = self.controls.toggle_camera_mode();
        match mode {
            CameraMode::PointerLock => {
                self.fly_camera = FirstPersonCamera::looking_at(self.orbit_camera.eye(), self.orbit_camera.target);
            }
            CameraMode::Orbit => {
                let mut camera =
                    OrbitCamera::from_first_person(&self.fly_camera, self.orbit_camera.distance, self.orbit_camera.max_distance);
                camera.min_distance = self.orbit_camera.min_distance;
                self.orbit_camera = camera;
            }
        }
        ui::set_camera_label(mode);
        log::info!("camera mode: {}", mode.label());
        mode
    }

    pub fn wants_pointer_lock(&self) -> bool {
        self.controls.camera_mode == CameraMode::PointerLock && !self.controls.pointer_locked
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.controls.set_pointer_locked(locked);
        log::debug!("pointer locked: {locked}");
    }

    /// Picks the body under the cursor, or under the crosshair while the
    /// pointer is locked. Returns the selected index.
    pub fn handle_click(&mut self, x: f32, y: f32) -> Option<usize> {
        let Some(ndc) = self.controls.pick_ndc(&self.orbit_camera, x, y, self.viewport) else {
            return self.controls.selected;
        };

        let (view, _) = self.view();
        let hit = self.controls.select(pick_body(&self.graph, &self.projection.matrix(), &view, ndc));
        match hit {
            Some(index) => {
                let body = &EXPLORER_BODIES[index];
                log::info!("selected {}", body.name);
                ui::show_body_info(body);
            }
            None => ui::hide_body_info(),
        }
        hit
    }

    pub fn handle_mouse_down(&mut self, x: i32, y: i32, button: i16) {
        if self.controls.camera_mode != CameraMode::Orbit {
            return;
        }
        if let Some(mode) = DragMode::from_button(button) {
            self.orbit_camera.begin_drag(x, y, mode);
        }
    }

    pub fn handle_mouse_up(&mut self) {
        self.orbit_camera.end_drag();
    }

    pub fn handle_mouse_move(&mut self, x: i32, y: i32, movement_x: i32, movement_y: i32) {
        match self.controls.camera_mode {
            CameraMode::Orbit => self.orbit_camera.drag_to(x, y),
            CameraMode::PointerLock if self.controls.pointer_locked => {
                self.fly_camera.look(movement_x as f32, movement_y as f32)
            }
            CameraMode::PointerLock => {}
        }
    }

    pub fn handle_wheel(&mut self, delta: f32) {
        if self.controls.camera_mode == CameraMode::Orbit {
            self.orbit_camera.zoom(delta);
        }
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.controls.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.controls.key_up(key)
    }
}
