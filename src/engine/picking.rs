use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};

/// Invisible bounding sphere used only for click tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub center: Point3<f32>,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

/// Client pixel coordinates to normalised device coordinates, y up.
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vector2<f32> {
    Vector2::new(2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
}

impl Ray {
    /// Unprojects a point on the near plane and one on the far plane. Returns
    /// `None` for a singular view-projection.
    pub fn from_ndc(ndc: Vector2<f32>, projection: &Matrix4<f32>, view: &Matrix4<f32>) -> Option<Ray> {
        let inverse = (projection * view).try_inverse()?;
        let unproject = |z: f32| {
            let p = inverse * Vector4::new(ndc.x, ndc.y, z, 1.0);
            Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);
        let direction = (far - near).try_normalize(f32::EPSILON)?;
        Some(Ray { origin: near, direction })
    }

    /// Distance along the ray to the first point on the sphere in front of the
    /// origin. A ray starting inside the sphere hits the far side.
    pub fn intersect_sphere(&self, center: &Point3<f32>, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(&self.direction);
        let c = oc.norm_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }
}

/// Index of the nearest collider hit by `ray`.
pub fn pick(ray: &Ray, colliders: &[Collider]) -> Option<usize> {
    colliders
        .iter()
        .enumerate()
        .filter_map(|(i, collider)| ray.intersect_sphere(&collider.center, collider.radius).map(|t| (i, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::{OrbitCamera, Projection};

    fn ray_along_minus_z() -> Ray {
        Ray { origin: Point3::new(0.0, 0.0, 50.0), direction: -Vector3::z() }
    }

    #[test]
    fn ndc_corners() {
        assert_eq!(to_ndc(0.0, 0.0, 800.0, 600.0), Vector2::new(-1.0, 1.0));
        assert_eq!(to_ndc(800.0, 600.0, 800.0, 600.0), Vector2::new(1.0, -1.0));
        assert_eq!(to_ndc(400.0, 300.0, 800.0, 600.0), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn sphere_hit_distance() {
        let t = ray_along_minus_z().intersect_sphere(&Point3::origin(), 5.0).unwrap();
        assert!((t - 45.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_miss_and_behind() {
        let ray = ray_along_minus_z();
        assert!(ray.intersect_sphere(&Point3::new(20.0, 0.0, 0.0), 5.0).is_none());
        assert!(ray.intersect_sphere(&Point3::new(0.0, 0.0, 80.0), 5.0).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_far_side() {
        let t = ray_along_minus_z().intersect_sphere(&Point3::new(0.0, 0.0, 50.0), 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn pick_returns_nearest_hit() {
        let colliders = [
            Collider { center: Point3::origin(), radius: 5.0 },
            Collider { center: Point3::new(0.0, 0.0, 20.0), radius: 1.0 },
            Collider { center: Point3::new(30.0, 0.0, 0.0), radius: 1.0 },
        ];
        assert_eq!(pick(&ray_along_minus_z(), &colliders), Some(1));
        assert_eq!(pick(&ray_along_minus_z(), &colliders[2..]), None);
    }

    #[test]
    fn screen_center_ray_points_at_target() {
        let camera = OrbitCamera::new(50.0);
        let projection = Projection::new(75.0, 16.0 / 9.0, 0.1, 1000.0);
        let ray = Ray::from_ndc(Vector2::zeros(), &projection.matrix(), &camera.view()).unwrap();
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-3);
        assert!((ray.origin - Point3::new(0.0, 0.0, 49.9)).norm() < 0.05);

        let colliders = [Collider { center: Point3::origin(), radius: 5.0 }];
        assert_eq!(pick(&ray, &colliders), Some(0));
    }

    #[test]
    fn off_center_click_picks_offset_body() {
        let camera = OrbitCamera::new(50.0);
        let projection = Projection::new(75.0, 1.0, 0.1, 1000.0);
        let view = camera.view();
        let vp = projection.matrix() * view;
        let body = Point3::new(20.0, 0.0, 0.0);
        let clip = vp * body.to_homogeneous();
        let ndc = Vector2::new(clip.x / clip.w, clip.y / clip.w);

        let ray = Ray::from_ndc(ndc, &projection.matrix(), &view).unwrap();
        let colliders = [
            Collider { center: Point3::origin(), radius: 5.0 },
            Collider { center: body, radius: 1.0 },
        ];
        assert_eq!(pick(&ray, &colliders), Some(1));
    }
}
