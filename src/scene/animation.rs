use crate::scene::graph::SceneGraph;

/// One frame of motion: each group turns by its orbit rate and each body by
/// its spin rate, both scaled by `multiplier`. A non-positive multiplier
/// freezes the scene.
pub fn advance(graph: &mut SceneGraph, multiplier: f32) {
    if multiplier <= 0.0 {
        return;
    }
    for (group, body) in graph.groups.iter_mut().zip(graph.bodies.iter_mut()) {
        group.rotation_y += group.orbit_rate * multiplier;
        body.spin += body.spin_rate * multiplier;
    }
    graph.refresh_colliders();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::bodies::{EXPLORER_BODIES, ORRERY_BODIES};
    use crate::scene::graph::{OrbitRule, EXPLORER_YEAR_STEP};

    #[test]
    fn orrery_frame_increments_by_order() {
        let mut graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        advance(&mut graph, 1.0);
        let angles: Vec<f32> = graph.groups.iter().map(|g| g.rotation_y).collect();
        assert_eq!(angles, vec![0.0, 0.02, 0.01, 0.02 / 3.0, 0.005]);
    }

    #[test]
    fn speed_scales_the_increment() {
        let mut graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        advance(&mut graph, 2.5);
        assert!((graph.groups[1].rotation_y - 0.05).abs() < 1e-7);
    }

    #[test]
    fn zero_speed_freezes_everything() {
        let mut graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        advance(&mut graph, 0.0);
        advance(&mut graph, -1.0);
        assert!(graph.groups.iter().all(|g| g.rotation_y == 0.0));
        assert!(graph.bodies.iter().all(|b| b.spin == 0.0));
    }

    #[test]
    fn explorer_sun_spins_but_never_moves() {
        let mut graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        for _ in 0..100 {
            advance(&mut graph, 1.0);
        }
        assert_eq!(graph.groups[0].rotation_y, 0.0);
        assert!(graph.bodies[0].spin > 0.0);
        assert_eq!(graph.colliders[0].center, nalgebra::Point3::origin());
    }

    #[test]
    fn inner_planets_outpace_outer_ones() {
        let mut graph = SceneGraph::build(EXPLORER_BODIES, OrbitRule::ByPeriod);
        advance(&mut graph, 1.0);
        let earth = EXPLORER_BODIES.iter().position(|b| b.name == "Earth").unwrap();
        assert!((graph.groups[earth].rotation_y - EXPLORER_YEAR_STEP).abs() < 1e-7);
        for pair in graph.groups[1..].windows(2) {
            assert!(pair[0].rotation_y > pair[1].rotation_y);
        }
    }

    #[test]
    fn colliders_track_the_animation() {
        let mut graph = SceneGraph::build(ORRERY_BODIES, OrbitRule::ByOrder);
        let before = graph.colliders[1].center;
        advance(&mut graph, 1.0);
        assert_ne!(graph.colliders[1].center, before);
        assert_eq!(graph.colliders[1].center, graph.body_world_position(1));
    }
}
