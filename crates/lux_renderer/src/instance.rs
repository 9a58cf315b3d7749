//! Instance transforms: an object is stored once in local space and rays are
//! moved into that space instead of moving the geometry.

use crate::{HitRecord, Hittable};
use lux_math::{Aabb, Interval, Mat4, Mat4Ext, Quat, Ray, Vec3};
use rand::RngCore;

/// Object displaced by a fixed offset.
#[derive(Debug, Clone)]
pub struct Translate {
    object: Box<Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: impl Into<Hittable>, offset: Vec3) -> Self {
        let object = object.into();
        let bbox = object.bounding_box().translate(offset);

        Self {
            object: Box::new(object),
            offset,
            bbox,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin - self.offset, direction)
    }

    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin - self.offset, rng)
    }
}

/// Object rotated about an axis through the origin.
#[derive(Debug, Clone)]
pub struct Rotate {
    object: Box<Hittable>,
    /// Local-to-world
    transform: Mat4,
    /// World-to-local
    inv_transform: Mat4,
    bbox: Aabb,
}

impl Rotate {
    /// Rotate by `degrees` around `axis` (right-handed). A zero axis leaves
    /// the object unrotated.
    pub fn new(object: impl Into<Hittable>, axis: Vec3, degrees: f32) -> Self {
        let object = object.into();
        let rotation = match axis.try_normalize() {
            Some(axis) => Quat::from_axis_angle(axis, degrees.to_radians()),
            None => Quat::IDENTITY,
        };
        let transform = Mat4::from_quat(rotation);
        let inv_transform = Mat4::from_quat(rotation.inverse());
        let bbox = transform.transform_aabb(&object.bounding_box());

        Self {
            object: Box::new(object),
            transform,
            inv_transform,
            bbox,
        }
    }

    pub fn y(object: impl Into<Hittable>, degrees: f32) -> Self {
        Self::new(object, Vec3::Y, degrees)
    }

    fn to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inv_transform.transform_vector3(ray.origin()),
            self.inv_transform.transform_vector3(ray.direction()),
            ray.time(),
        )
    }

    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = self.to_local(ray);
        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;

        // Pure rotation: normals transform like vectors
        rec.p = self.transform.transform_vector3(rec.p);
        rec.normal = self.transform.transform_vector3(rec.normal);
        Some(rec)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(
            self.inv_transform.transform_vector3(origin),
            self.inv_transform.transform_vector3(direction),
        )
    }

    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let local = self
            .object
            .random(self.inv_transform.transform_vector3(origin), rng);
        self.transform.transform_vector3(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_box, Color, Material, Quad, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Material {
        Material::lambertian(Color::splat(0.5))
    }

    #[test]
    fn test_translate_moves_hit_point() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, gray());
        let moved = Translate::new(sphere, Vec3::new(0.0, 0.0, -5.0));
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = moved
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();

        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-4);
        assert!(moved.bounding_box().z.contains(-6.0));
        assert!(!moved.bounding_box().z.contains(0.5));
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        // Thin slab along +X, rotated 90 degrees about Y ends up along -Z
        let slab = make_box(Vec3::new(1.0, -0.5, -0.5), Vec3::new(3.0, 0.5, 0.5), gray());
        let rotated = Rotate::y(slab, 90.0);
        let mut rng = StdRng::seed_from_u64(0);
        let range = Interval::new(0.001, f32::INFINITY);

        let along_z = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = rotated.hit(&along_z, range, &mut rng).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-4);
        assert!((rec.normal - Vec3::Z).length() < 1e-4);

        let along_x = Ray::new_simple(Vec3::ZERO, Vec3::X);
        assert!(rotated.hit(&along_x, range, &mut rng).is_none());

        let bbox = rotated.bounding_box();
        assert!(bbox.z.contains(-2.9) && !bbox.x.contains(2.0));
    }

    #[test]
    fn test_rotated_light_sampling_round_trips() {
        let light = Quad::new(
            Vec3::new(-0.5, 2.0, -0.5),
            Vec3::X,
            Vec3::Z,
            Material::diffuse_light(Color::ONE),
        );
        let rotated = Rotate::new(Translate::new(light, Vec3::X), Vec3::Z, 30.0);
        let mut rng = StdRng::seed_from_u64(1);
        let origin = Vec3::new(0.1, 0.0, 0.2);

        for _ in 0..50 {
            let direction = rotated.random(origin, &mut rng);
            assert!(rotated.pdf_value(origin, direction) > 0.0);
        }
    }
}
