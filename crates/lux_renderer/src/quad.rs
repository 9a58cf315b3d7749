//! Planar parallelogram primitive and the box built from six of them.

use crate::sampling::gen_f32;
use crate::{HitRecord, HittableList, Material};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Parallelogram with corner `q` and edges `u`, `v`.
#[derive(Debug, Clone)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n·n)`, maps plane offsets to (alpha, beta)
    w: Vec3,
    normal: Vec3,
    d: f32,
    area: f32,
    material: Material,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Material) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let d = normal.dot(q);
        let w = n / n.dot(n);

        // Both diagonals, so degenerate edge orderings still get a full box
        let diagonal1 = Aabb::from_points(q, q + u + v);
        let diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            area: n.length(),
            material,
            bbox: Aabb::surrounding(&diagonal1, &diagonal2),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let intersection = ray.at(t);
        let planar_hitpt = intersection - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            &self.material,
            (alpha, beta),
        ))
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Solid-angle density of hitting this quad along `direction`, from
    /// uniform area sampling.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new_simple(origin, direction);
        let Some(rec) = self.hit(&ray, Interval::new(0.001, f32::INFINITY)) else {
            return 0.0;
        };

        let length_squared = direction.length_squared();
        let distance_squared = rec.t * rec.t * length_squared;
        let cosine = (direction.dot(rec.normal) / length_squared.sqrt()).abs();
        if cosine == 0.0 {
            return 0.0;
        }

        distance_squared / (cosine * self.area)
    }

    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

/// Closed box spanning corners `a` and `b`, as six outward-facing quads.
pub fn make_box(a: Vec3, b: Vec3, material: Material) -> HittableList {
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    let mut sides = HittableList::new();
    // front, right, back, left, top, bottom
    sides.add(Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(max.x, min.y, max.z), -dz, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(max.x, min.y, min.z), -dx, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dz, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, max.y, max.z), dx, -dz, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dx, dz, material));
    sides
}
