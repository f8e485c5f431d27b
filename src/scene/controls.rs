use nalgebra::Vector2;

use crate::engine::camera::{CameraMode, MovementFlags, OrbitCamera};
use crate::engine::picking::to_ndc;
use crate::error::VizError;

/// Upper bound of the explorer's time slider.
pub const MAX_TIME_MULTIPLIER: f32 = 20.0;

fn parse_speed(value: &str) -> Result<f32, VizError> {
    let speed: f32 = value
        .trim()
        .parse()
        .map_err(|_| VizError::InvalidSpeed(value.to_string()))?;
    if !speed.is_finite() {
        return Err(VizError::InvalidSpeed(value.to_string()));
    }
    Ok(speed.max(0.0))
}

/// Button and slider state of the orrery page.
#[derive(Clone, Debug, PartialEq)]
pub struct OrreryControls {
    pub rotation_speed: f32,
    pub orbits_visible: bool,
}

impl Default for OrreryControls {
    fn default() -> Self {
        OrreryControls { rotation_speed: 1.0, orbits_visible: true }
    }
}

impl OrreryControls {
    pub fn toggle_orbits(&mut self) -> bool {
        self.orbits_visible = !self.orbits_visible;
        self.orbits_visible
    }

    /// Pauses a moving system and restarts a paused one at 1x.
    pub fn toggle_rotation(&mut self) {
        self.rotation_speed = if self.rotation_speed > 0.0 { 0.0 } else { 1.0 };
    }

    pub fn update_speed(&mut self, value: &str) -> Result<f32, VizError> {
        self.rotation_speed = parse_speed(value)?;
        Ok(self.rotation_speed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerControls {
    pub time_multiplier: f32,
    pub orbits_visible: bool,
    pub belt_visible: bool,
    pub camera_mode: CameraMode,
    pub pointer_locked: bool,
    pub movement: MovementFlags,
    pub selected: Option<usize>,
}

impl Default for ExplorerControls {
    fn default() -> Self {
        ExplorerControls {
            time_multiplier: 1.0,
            orbits_visible: true,
            belt_visible: true,
            camera_mode: CameraMode::Orbit,
            pointer_locked: false,
            movement: MovementFlags::default(),
            selected: None,
        }
    }
}

impl ExplorerControls {
    pub fn set_time_multiplier(&mut self, value: &str) -> Result<f32, VizError> {
        self.time_multiplier = parse_speed(value)?.min(MAX_TIME_MULTIPLIER);
        Ok(self.time_multiplier)
    }

    pub fn toggle_orbits(&mut self) -> bool {
        self.orbits_visible = !self.orbits_visible;
        self.orbits_visible
    }

    pub fn toggle_belt(&mut self) -> bool {
        self.belt_visible = !self.belt_visible;
        self.belt_visible
    }

    pub fn toggle_camera_mode(&mut self) -> CameraMode {
        self.camera_mode = self.camera_mode.toggled();
        self.movement.clear();
        self.camera_mode
    }

    /// Losing the lock (Escape, tab switch) must not leave keys stuck down.
    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer_locked = locked;
        if !locked {
            self.movement.clear();
        }
    }

    fn flying(&self) -> bool {
        self.camera_mode == CameraMode::PointerLock && self.pointer_locked
    }

    /// Where a canvas click casts its pick ray, in NDC: the crosshair while
    /// locked, the cursor in orbit mode. `None` when the click must not pick,
    /// either in fly mode before the lock is taken or at the end of a drag.
    pub fn pick_ndc(&self, orbit: &OrbitCamera, x: f32, y: f32, viewport: (u32, u32)) -> Option<Vector2<f32>> {
        match self.camera_mode {
            CameraMode::PointerLock if self.pointer_locked => Some(Vector2::zeros()),
            CameraMode::PointerLock => None,
            CameraMode::Orbit if orbit.was_dragged() => None,
            CameraMode::Orbit => Some(to_ndc(x, y, viewport.0 as f32, viewport.1 as f32)),
        }
    }

    /// Records a pick result. A miss clears the selection.
    pub fn select(&mut self, hit: Option<usize>) -> Option<usize> {
        self.selected = hit;
        hit
    }

    /// Flight keys only apply while flying with the pointer locked. Returns
    /// whether the key was consumed.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.set_key(key, true)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: &str, pressed: bool) -> bool {
        if !self.flying() {
            return false;
        }
        let flag = match key {
            "w" | "W" | "ArrowUp" => &mut self.movement.forward,
            "s" | "S" | "ArrowDown" => &mut self.movement.backward,
            "a" | "A" | "ArrowLeft" => &mut self.movement.left,
            "d" | "D" | "ArrowRight" => &mut self.movement.right,
            "q" | "Q" => &mut self.movement.roll_left,
            "e" | "E" => &mut self.movement.roll_right,
            _ => return false,
        };
        *flag = pressed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::DragMode;

    #[test]
    fn orbit_toggle_flips_visibility() {
        let mut controls = OrreryControls::default();
        assert!(!controls.toggle_orbits());
        assert!(controls.toggle_orbits());
    }

    #[test]
    fn rotation_toggle_pauses_and_resumes_at_unit_speed() {
        let mut controls = OrreryControls::default();
        controls.update_speed("3.5").unwrap();
        controls.toggle_rotation();
        assert_eq!(controls.rotation_speed, 0.0);
        controls.toggle_rotation();
        assert_eq!(controls.rotation_speed, 1.0);
    }

    #[test]
    fn speed_parsing() {
        let mut controls = OrreryControls::default();
        assert_eq!(controls.update_speed(" 2.25 ").unwrap(), 2.25);
        assert_eq!(controls.update_speed("-4").unwrap(), 0.0);
        assert!(matches!(controls.update_speed("fast"), Err(VizError::InvalidSpeed(v)) if v == "fast"));
        assert!(controls.update_speed("NaN").is_err());
        assert_eq!(controls.rotation_speed, 0.0);
    }

    #[test]
    fn time_multiplier_is_capped() {
        let mut controls = ExplorerControls::default();
        assert_eq!(controls.set_time_multiplier("500").unwrap(), MAX_TIME_MULTIPLIER);
        assert_eq!(controls.set_time_multiplier("0").unwrap(), 0.0);
    }

    #[test]
    fn flight_keys_ignored_in_orbit_mode() {
        let mut controls = ExplorerControls::default();
        assert!(!controls.key_down("w"));
        assert_eq!(controls.movement, MovementFlags::default());
    }

    #[test]
    fn flight_keys_set_and_clear_flags() {
        let mut controls = ExplorerControls::default();
        assert_eq!(controls.toggle_camera_mode(), CameraMode::PointerLock);
        controls.set_pointer_locked(true);
        assert!(controls.key_down("W"));
        assert!(controls.key_down("q"));
        assert!(controls.key_down("ArrowLeft"));
        assert!(controls.movement.forward && controls.movement.roll_left && controls.movement.left);
        assert!(controls.key_up("w"));
        assert!(!controls.movement.forward);
        assert!(!controls.key_down("x"));
    }

    #[test]
    fn losing_pointer_lock_releases_keys() {
        let mut controls = ExplorerControls::default();
        controls.toggle_camera_mode();
        controls.set_pointer_locked(true);
        controls.key_down("d");
        controls.set_pointer_locked(false);
        assert_eq!(controls.movement, MovementFlags::default());
        assert!(!controls.pointer_locked);
    }

    #[test]
    fn mode_switch_releases_keys() {
        let mut controls = ExplorerControls::default();
        controls.toggle_camera_mode();
        controls.set_pointer_locked(true);
        assert!(controls.key_down("s"));
        assert_eq!(controls.toggle_camera_mode(), CameraMode::Orbit);
        assert!(!controls.movement.backward);
    }

    #[test]
    fn flight_keys_need_the_pointer_lock() {
        let mut controls = ExplorerControls::default();
        controls.toggle_camera_mode();
        assert!(!controls.key_down("w"));
        assert!(!controls.key_down("ArrowUp"));
        assert_eq!(controls.movement, MovementFlags::default());

        controls.set_pointer_locked(true);
        assert!(controls.key_down("w"));
        controls.set_pointer_locked(false);
        assert!(!controls.key_down("w"));
        assert!(!controls.movement.forward);
    }

    #[test]
    fn locked_click_picks_at_screen_centre() {
        let mut controls = ExplorerControls::default();
        controls.toggle_camera_mode();
        controls.set_pointer_locked(true);
        let orbit = OrbitCamera::new(160.0);
        assert_eq!(controls.pick_ndc(&orbit, 5.0, 5.0, (800, 600)), Some(Vector2::zeros()));
    }

    #[test]
    fn click_before_lock_picks_nothing() {
        let mut controls = ExplorerControls::default();
        controls.toggle_camera_mode();
        let orbit = OrbitCamera::new(160.0);
        assert_eq!(controls.pick_ndc(&orbit, 400.0, 300.0, (800, 600)), None);
    }

    #[test]
    fn orbit_click_uses_cursor_unless_dragged() {
        let controls = ExplorerControls::default();
        let mut orbit = OrbitCamera::new(160.0);
        let ndc = controls.pick_ndc(&orbit, 0.0, 0.0, (800, 600)).unwrap();
        assert!((ndc - Vector2::new(-1.0, 1.0)).norm() < 1e-6);

        orbit.begin_drag(0, 0, DragMode::Rotate);
        orbit.drag_to(40, 0);
        orbit.end_drag();
        assert_eq!(controls.pick_ndc(&orbit, 40.0, 0.0, (800, 600)), None);
    }

    #[test]
    fn miss_clears_selection() {
        let mut controls = ExplorerControls::default();
        assert_eq!(controls.select(Some(3)), Some(3));
        assert_eq!(controls.selected, Some(3));
        assert_eq!(controls.select(None), None);
        assert_eq!(controls.selected, None);
    }

    #[test]
    fn visibility_toggles() {
        let mut controls = ExplorerControls::default();
        assert!(!controls.toggle_belt());
        assert!(!controls.toggle_orbits());
        assert!(controls.toggle_belt());
    }
}
