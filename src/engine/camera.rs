use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Translation3, UnitQuaternion, Vector3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    Orbit,
    PointerLock,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Orbit => CameraMode::PointerLock,
            CameraMode::PointerLock => CameraMode::Orbit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Orbit => "Orbit",
            CameraMode::PointerLock => "Fly",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection { fov_y: fov_deg.to_radians(), aspect, near, far }
    }

    /// A collapsed (zero height) viewport keeps the previous aspect.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fov_y, self.near, self.far).to_homogeneous()
    }
}

const ORBIT_ROTATE_SPEED: f32 = 0.01;
const ORBIT_ZOOM_SPEED: f32 = 0.05;
/// Pan distance per pixel, relative to the distance from the target.
const ORBIT_PAN_SPEED: f32 = 0.0015;
const MAX_ELEVATION: f32 = 1.5;
const DRAG_THRESHOLD: i32 = 4;

/// What a mouse drag does to the orbit camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

impl DragMode {
    /// Left button rotates, right button pans; other buttons do nothing.
    pub fn from_button(button: i16) -> Option<Self> {
        match button {
            0 => Some(DragMode::Rotate),
            2 => Some(DragMode::Pan),
            _ => None,
        }
    }
}

/// Mouse-drag orbit around a target point.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    drag: Option<DragMode>,
    last_mouse_pos: (i32, i32),
    drag_travel: i32,
}

impl OrbitCamera {
    pub fn new(distance: f32) -> Self {
        OrbitCamera {
            target: Point3::origin(),
            distance,
            azimuth: 0.0,
            elevation: 0.0,
            min_distance: 2.0,
            max_distance: distance.max(2.0) * 6.0,
            drag: None,
            last_mouse_pos: (0, 0),
            drag_travel: 0,
        }
    }

    pub fn from_position(eye: Point3<f32>, target: Point3<f32>, max_distance: f32) -> Self {
        let offset = eye - target;
        let distance = offset.norm().max(f32::EPSILON);
        let mut camera = OrbitCamera::new(distance);
        camera.target = target;
        camera.max_distance = max_distance.max(distance);
        camera.elevation = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-MAX_ELEVATION, MAX_ELEVATION);
        camera.azimuth = offset.x.atan2(offset.z);
        camera
    }

    /// Orbit camera at the fly camera's position, looking where it looks,
    /// around a target `distance` ahead.
    pub fn from_first_person(fly: &FirstPersonCamera, distance: f32, max_distance: f32) -> Self {
        let target = fly.position + fly.forward() * distance;
        OrbitCamera::from_position(fly.position, target, max_distance)
    }

    pub fn eye(&self) -> Point3<f32> {
        self.target + Vector3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        )
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &self.target, &Vector3::y())
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * ORBIT_ROTATE_SPEED;
        self.elevation = (self.elevation + dy * ORBIT_ROTATE_SPEED).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Slides the target (and with it the eye) across the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        let scale = self.distance * ORBIT_PAN_SPEED;
        self.target += (up * dy - right * dx) * scale;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta * ORBIT_ZOOM_SPEED).clamp(self.min_distance, self.max_distance);
    }

    pub fn begin_drag(&mut self, x: i32, y: i32, mode: DragMode) {
        self.drag = Some(mode);
        self.last_mouse_pos = (x, y);
        self.drag_travel = 0;
    }

    pub fn drag_to(&mut self, x: i32, y: i32) {
        let Some(mode) = self.drag else {
            return;
        };
        let dx = x - self.last_mouse_pos.0;
        let dy = y - self.last_mouse_pos.1;
        self.drag_travel += dx.abs() + dy.abs();
        match mode {
            DragMode::Rotate => self.rotate(dx as f32, dy as f32),
            DragMode::Pan => self.pan(dx as f32, dy as f32),
        }
        self.last_mouse_pos = (x, y);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// True when the last press moved far enough to count as a drag, so the
    /// click that ends it should not pick.
    pub fn was_dragged(&self) -> bool {
        self.drag_travel > DRAG_THRESHOLD
    }
}

/// Held-key state for the free-flight camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub roll_left: bool,
    pub roll_right: bool,
}

impl MovementFlags {
    pub fn clear(&mut self) {
        *self = MovementFlags::default();
    }
}

const LOOK_SPEED: f32 = 0.002;
const MOVE_SPEED: f32 = 0.8;
const ROLL_SPEED: f32 = 0.02;

/// Free-flight camera looking down its local -Z axis. Yaw, pitch and roll are
/// all applied in camera space, so there is no fixed up direction.
#[derive(Clone, Debug)]
pub struct FirstPersonCamera {
    pub position: Point3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl FirstPersonCamera {
    pub fn looking_at(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let back = eye - target;
        let orientation = if back.norm() > f32::EPSILON && back.cross(&Vector3::y()).norm() > f32::EPSILON {
            UnitQuaternion::face_towards(&back, &Vector3::y())
        } else {
            UnitQuaternion::identity()
        };
        FirstPersonCamera { position: eye, orientation }
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation * -Vector3::z()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation * Vector3::x()
    }

    pub fn look(&mut self, dx: f32, dy: f32) {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -dx * LOOK_SPEED);
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -dy * LOOK_SPEED);
        let mut orientation = self.orientation * yaw * pitch;
        orientation.renormalize_fast();
        self.orientation = orientation;
    }

    pub fn update(&mut self, flags: &MovementFlags) {
        let mut direction = Vector3::zeros();
        if flags.forward {
            direction += self.forward();
        }
        if flags.backward {
            direction -= self.forward();
        }
        if flags.right {
            direction += self.right();
        }
        if flags.left {
            direction -= self.right();
        }
        if direction.norm() > 0.0 {
            self.position += direction.normalize() * MOVE_SPEED;
        }

        let roll = match (flags.roll_left, flags.roll_right) {
            (true, false) => ROLL_SPEED,
            (false, true) => -ROLL_SPEED,
            _ => 0.0,
        };
        if roll != 0.0 {
            self.orientation *= UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll);
        }
    }

    pub fn view(&self) -> Matrix4<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.orientation)
            .inverse()
            .to_homogeneous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).norm() < 1e-3
    }

    #[test]
    fn orbit_camera_starts_on_positive_z() {
        let camera = OrbitCamera::new(50.0);
        assert!(approx(camera.eye(), Point3::new(0.0, 0.0, 50.0)));
    }

    #[test]
    fn orbit_camera_round_trips_through_position() {
        let eye = Point3::new(12.0, 30.0, -40.0);
        let camera = OrbitCamera::from_position(eye, Point3::origin(), 500.0);
        assert!(approx(camera.eye(), eye));
    }

    #[test]
    fn elevation_is_clamped_while_dragging() {
        let mut camera = OrbitCamera::new(50.0);
        camera.begin_drag(0, 0, DragMode::Rotate);
        camera.drag_to(0, 10_000);
        assert_eq!(camera.elevation, 1.5);
        assert!(camera.was_dragged());
        camera.end_drag();
        camera.drag_to(500, 500);
        assert_eq!(camera.elevation, 1.5);
    }

    #[test]
    fn small_wiggle_is_not_a_drag() {
        let mut camera = OrbitCamera::new(50.0);
        camera.begin_drag(100, 100, DragMode::Rotate);
        camera.drag_to(101, 102);
        assert!(!camera.was_dragged());
    }

    #[test]
    fn right_drag_pans_target_and_eye_together() {
        let mut camera = OrbitCamera::new(50.0);
        camera.azimuth = 0.6;
        camera.elevation = 0.3;
        let (eye, target, azimuth) = (camera.eye(), camera.target, camera.azimuth);

        camera.begin_drag(200, 200, DragMode::from_button(2).unwrap());
        camera.drag_to(260, 180);
        camera.end_drag();

        let moved = camera.target - target;
        assert!(moved.norm() > 1.0);
        assert!(((camera.eye() - eye) - moved).norm() < 1e-3);
        assert_eq!(camera.azimuth, azimuth);
        // stays in the view plane
        let forward = (target - eye).normalize();
        assert!(moved.dot(&forward).abs() < 1e-3);
    }

    #[test]
    fn pan_follows_screen_directions() {
        let mut camera = OrbitCamera::new(50.0);
        camera.pan(10.0, 0.0);
        assert!(camera.target.x < 0.0, "dragging right slides the scene right");
        let mut camera = OrbitCamera::new(50.0);
        camera.pan(0.0, 10.0);
        assert!(camera.target.y > 0.0);
    }

    #[test]
    fn only_left_and_right_buttons_drag() {
        assert_eq!(DragMode::from_button(0), Some(DragMode::Rotate));
        assert_eq!(DragMode::from_button(2), Some(DragMode::Pan));
        assert_eq!(DragMode::from_button(1), None);
    }

    #[test]
    fn fly_to_orbit_keeps_eye_and_direction() {
        let mut fly = FirstPersonCamera::looking_at(Point3::new(30.0, 20.0, 90.0), Point3::new(10.0, 0.0, 0.0));
        fly.look(120.0, 40.0);
        let camera = OrbitCamera::from_first_person(&fly, 80.0, 960.0);
        assert!(approx(camera.eye(), fly.position));
        assert!(((camera.target - camera.eye()).normalize() - fly.forward()).norm() < 1e-3);
        assert!((camera.distance - 80.0).abs() < 1e-3);
        assert_eq!(camera.max_distance, 960.0);
    }

    #[test]
    fn orbit_to_fly_keeps_eye_and_faces_target() {
        let mut camera = OrbitCamera::new(160.0);
        camera.elevation = 0.35;
        camera.azimuth = -1.1;
        let fly = FirstPersonCamera::looking_at(camera.eye(), camera.target);
        assert!(approx(fly.position, camera.eye()));
        assert!(((camera.target - fly.position).normalize() - fly.forward()).norm() < 1e-3);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut camera = OrbitCamera::new(50.0);
        camera.zoom(-1.0e6);
        assert_eq!(camera.distance, camera.min_distance);
        camera.zoom(1.0e6);
        assert_eq!(camera.distance, camera.max_distance);
    }

    #[test]
    fn projection_ignores_zero_height() {
        let mut projection = Projection::new(75.0, 1.5, 0.1, 1000.0);
        projection.set_aspect(800, 0);
        assert_eq!(projection.aspect, 1.5);
        projection.set_aspect(800, 400);
        assert_eq!(projection.aspect, 2.0);
    }

    #[test]
    fn first_person_camera_faces_its_target() {
        let camera = FirstPersonCamera::looking_at(Point3::new(0.0, 0.0, 50.0), Point3::origin());
        assert!((camera.forward() - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-4);
        let in_view = camera.view().transform_point(&Point3::origin());
        assert!((in_view - Point3::new(0.0, 0.0, -50.0)).norm() < 1e-3);
    }

    #[test]
    fn first_person_camera_moves_and_rolls() {
        let mut camera = FirstPersonCamera::looking_at(Point3::new(0.0, 0.0, 50.0), Point3::origin());
        let flags = MovementFlags { forward: true, ..MovementFlags::default() };
        camera.update(&flags);
        assert!(approx(camera.position, Point3::new(0.0, 0.0, 50.0 - MOVE_SPEED)));

        let flags = MovementFlags { roll_left: true, ..MovementFlags::default() };
        let before = camera.forward();
        camera.update(&flags);
        assert!((camera.forward() - before).norm() < 1e-5);
        assert!((camera.right() - Vector3::x()).norm() > 1e-3);
    }

    #[test]
    fn looking_straight_down_falls_back_to_identity() {
        let camera = FirstPersonCamera::looking_at(Point3::new(0.0, 10.0, 0.0), Point3::origin());
        assert_eq!(camera.orientation, UnitQuaternion::identity());
    }

    #[test]
    fn mode_toggle_alternates() {
        assert_eq!(CameraMode::Orbit.toggled(), CameraMode::PointerLock);
        assert_eq!(CameraMode::PointerLock.toggled(), CameraMode::Orbit);
    }
}
