//! Sphere primitive for ray tracing.

use crate::sampling::{cos_theta_max, random_to_sphere};
use crate::{HitRecord, Material};
use lux_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive, optionally moving linearly over the shutter interval.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Centre at time 0 and displacement reached at time 1
    center: Ray,
    radius: f32,
    material: Material,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center: Ray::new_simple(center, Vec3::ZERO),
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere moving from `center0` (time 0) to `center1` (time 1).
    pub fn moving(center0: Vec3, center1: Vec3, radius: f32, material: Material) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Self {
            center: Ray::new_simple(center0, center1 - center0),
            radius,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    /// UV coordinates for a point on the unit sphere centred at the origin.
    ///
    /// u: angle around the Y axis from X=-1, v: angle from Y=-1 to Y=+1.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let current_center = self.center.at(ray.time());
        let oc = current_center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - current_center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            &self.material,
            Self::get_sphere_uv(outward_normal),
        ))
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Density of directions from `origin` that hit the sphere, uniform over
    /// the subtended cone. Uses the time-0 centre.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new_simple(origin, direction);
        if self.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none() {
            return 0.0;
        }

        let distance_squared = (self.center.at(0.0) - origin).length_squared();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max(self.radius, distance_squared));
        1.0 / solid_angle
    }

    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center.at(0.0) - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(rng, self.radius, distance_squared))
    }
}
