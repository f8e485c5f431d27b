use std::f32::consts::FRAC_PI_2;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::engine::picking::Collider;
use crate::scene::bodies::{hex_to_rgb, BodyDescriptor};

/// Collider radius relative to the visible radius, so small bodies stay clickable.
const COLLIDER_PADDING: f32 = 1.2;

/// Angle the innermost planet of the orrery advances per frame at 1x.
pub const ORRERY_STEP: f32 = 0.02;

/// Angle Earth advances per frame at 1x in the explorer.
pub const EXPLORER_YEAR_STEP: f32 = 0.005;

const DAYS_PER_YEAR: f32 = 365.25;

/// How per-frame orbital speed is derived from the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitRule {
    /// `ORRERY_STEP / (n + 1)` for the n-th orbiting body.
    ByOrder,
    /// Inversely proportional to the orbital period.
    ByPeriod,
}

#[derive(Clone, Debug)]
pub struct BodyNode {
    /// Position inside the parent group.
    pub offset: Vector3<f32>,
    pub radius: f32,
    pub spin: f32,
    pub spin_rate: f32,
    pub tilt: f32,
}

/// Orbit pivot: rotating it about Y carries its body around the star.
#[derive(Clone, Debug)]
pub struct Group {
    pub rotation_y: f32,
    pub orbit_rate: f32,
}

#[derive(Clone, Debug)]
pub struct OrbitRing {
    pub radius: f32,
    pub visible: bool,
}

#[derive(Clone, Debug)]
pub struct Lights {
    pub ambient: (f32, f32, f32),
    pub point_color: (f32, f32, f32),
    pub point_intensity: f32,
    pub point_position: Point3<f32>,
}

impl Default for Lights {
    fn default() -> Self {
        Lights {
            ambient: hex_to_rgb(0x404040),
            point_color: (1.0, 1.0, 1.0),
            point_intensity: 2.0,
            point_position: Point3::origin(),
        }
    }
}

/// Per-body scene state derived from a descriptor table. Every vector is
/// indexed the same way as the table it was built from.
pub struct SceneGraph {
    pub bodies: Vec<BodyNode>,
    pub groups: Vec<Group>,
    pub colliders: Vec<Collider>,
    pub orbits: Vec<Option<OrbitRing>>,
    pub lights: Lights,
}

impl SceneGraph {
    pub fn build(table: &[BodyDescriptor], rule: OrbitRule) -> Self {
        let mut bodies = Vec::with_capacity(table.len());
        let mut groups = Vec::with_capacity(table.len());
        let mut orbits = Vec::with_capacity(table.len());
        let mut order = 0;

        for desc in table {
            bodies.push(BodyNode {
                offset: Vector3::new(desc.distance, 0.0, 0.0),
                radius: desc.radius,
                spin: 0.0,
                spin_rate: desc.spin,
                tilt: desc.tilt,
            });

            let orbit_rate = if !desc.orbits() {
                0.0
            } else {
                match rule {
                    OrbitRule::ByOrder => {
                        order += 1;
                        ORRERY_STEP / order as f32
                    }
                    OrbitRule::ByPeriod if desc.period_days > 0.0 => {
                        EXPLORER_YEAR_STEP * DAYS_PER_YEAR / desc.period_days
                    }
                    OrbitRule::ByPeriod => 0.0,
                }
            };
            groups.push(Group { rotation_y: 0.0, orbit_rate });

            orbits.push(desc.orbits().then(|| OrbitRing { radius: desc.distance, visible: true }));
        }

        let mut graph = SceneGraph {
            colliders: vec![Collider { center: Point3::origin(), radius: 0.0 }; bodies.len()],
            bodies,
            groups,
            orbits,
            lights: Lights::default(),
        };
        graph.refresh_colliders();
        graph
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    fn group_matrix(&self, index: usize) -> Matrix4<f32> {
        Matrix4::from_euler_angles(0.0, self.groups[index].rotation_y, 0.0)
    }

    /// Group rotation, then the offset inside the group, without the body's own spin.
    fn anchor(&self, index: usize) -> Matrix4<f32> {
        let body = &self.bodies[index];
        self.group_matrix(index)
            * Matrix4::new_translation(&body.offset)
            * Matrix4::from_euler_angles(0.0, 0.0, body.tilt)
    }

    pub fn body_world_position(&self, index: usize) -> Point3<f32> {
        self.group_matrix(index).transform_point(&Point3::from(self.bodies[index].offset))
    }

    /// Unit-sphere meshes are scaled by the body radius here.
    pub fn body_model(&self, index: usize) -> Matrix4<f32> {
        let body = &self.bodies[index];
        self.anchor(index)
            * Matrix4::from_euler_angles(0.0, body.spin, 0.0)
            * Matrix4::new_scaling(body.radius)
    }

    /// Planetary ring: shares the body's tilt but not its spin, laid flat.
    pub fn ring_model(&self, index: usize) -> Matrix4<f32> {
        self.anchor(index) * Matrix4::from_euler_angles(FRAC_PI_2, 0.0, 0.0)
    }

    /// Orbit rings are centred on the star and laid in the XZ plane.
    pub fn orbit_model(&self) -> Matrix4<f32> {
        Matrix4::from_euler_angles(FRAC_PI_2, 0.0, 0.0)
    }

    pub fn refresh_colliders(&mut self) {
        for i in 0..self.bodies.len() {
            self.colliders[i] = Collider {
                center: self.body_world_position(i),
                radius: self.bodies[i].radius * COLLIDER_PADDING,
            };
        }
    }

    pub fn set_orbits_visible(&mut self, visible: bool) {
        for orbit in self.orbits.iter_mut().flatten() {
            orbit.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::bodies::{EXPLORER_BODIES, ORRERY_BODIES};

    #[test]
    fn arrays_stay_index_aligned_with_table() {
        let graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        assert_eq!(graph.len(), EXPLORER_BODIES.len());
        assert_eq!(graph.groups.len(), graph.len());
        assert_eq!(graph.colliders.len(), graph.len());
        assert_eq!(graph.orbits.len(), graph.len());
        for (i, desc) in EXPLORER_BODIES.iter().enumerate() {
            assert_eq!(graph.bodies[i].radius, desc.radius);
            assert_eq!(graph.orbits[i].is_some(), desc.orbits());
            let pos = graph.body_world_position(i);
            assert!((pos.x - desc.distance).abs() < 1e-4);
        }
    }

    #[test]
    fn orrery_rates_follow_planet_order() {
        let graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        let rates: Vec<f32> = graph.groups.iter().map(|g| g.orbit_rate).collect();
        assert_eq!(rates, vec![0.0, 0.02, 0.01, 0.02 / 3.0, 0.005]);
    }

    #[test]
    fn explorer_earth_moves_one_year_step() {
        let graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        let earth = EXPLORER_BODIES.iter().position(|b| b.name == "Earth").unwrap();
        assert!((graph.groups[earth].orbit_rate - EXPLORER_YEAR_STEP).abs() < 1e-7);
        assert_eq!(graph.groups[0].orbit_rate, 0.0);
    }

    #[test]
    fn group_rotation_moves_body_like_a_y_rotation() {
        let mut graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        graph.groups[1].rotation_y = FRAC_PI_2;
        let pos = graph.body_world_position(1);
        assert!((pos - Point3::new(0.0, 0.0, -10.0)).norm() < 1e-4);
    }

    #[test]
    fn colliders_follow_bodies_after_refresh() {
        let mut graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        graph.groups[3].rotation_y = std::f32::consts::PI;
        graph.refresh_colliders();
        let collider = graph.colliders[3];
        assert!((collider.center - Point3::new(-20.0, 0.0, 0.0)).norm() < 1e-4);
        assert!((collider.radius - 2.0 * COLLIDER_PADDING).abs() < 1e-6);
    }

    #[test]
    fn body_model_scales_unit_sphere_to_radius() {
        let graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        let top = graph.body_model(3).transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert!((top - Point3::new(20.0, 2.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn orbit_model_lays_ring_in_xz_plane() {
        let graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        let p = graph.orbit_model().transform_point(&Point3::new(0.0, 10.0, 0.0));
        assert!(p.y.abs() < 1e-5);
        assert!((p.z.abs() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_visibility_toggles_every_ring() {
        let mut graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        graph.set_orbits_visible(false);
        assert!(graph.orbits.iter().flatten().all(|o| !o.visible));
        assert!(graph.orbits[0].is_none());
        graph.set_orbits_visible(true);
        assert!(graph.orbits.iter().flatten().all(|o| o.visible));
    }

    #[test]
    fn default_lights_match_scene_setup() {
        let lights = Lights::default();
        assert_eq!(lights.point_intensity, 2.0);
        assert_eq!(lights.point_position, Point3::origin());
        assert!((lights.ambient.0 - 0.251).abs() < 1e-3);
    }
}
