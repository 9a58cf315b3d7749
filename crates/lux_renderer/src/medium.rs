//! Homogeneous participating medium (smoke, fog) bounded by another shape.

use crate::sampling::gen_f32;
use crate::{HitRecord, Hittable, Material, Texture};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Volume of constant density inside `boundary`, scattering isotropically.
///
/// The boundary is assumed convex: a ray enters and leaves it at most once.
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: Box<Hittable>,
    neg_inv_density: f32,
    phase_function: Material,
}

impl ConstantMedium {
    /// A density that is not positive behaves as empty space.
    pub fn new(boundary: impl Into<Hittable>, density: f32, albedo: impl Into<Texture>) -> Self {
        Self {
            boundary: Box::new(boundary.into()),
            neg_inv_density: -1.0 / density.max(f32::MIN_POSITIVE),
            phase_function: Material::isotropic(albedo),
        }
    }

    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 0.0001, f32::INFINITY), rng)?;

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        // Normal and face are arbitrary inside a volume
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    pub fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }

    /// Light sampling aims at the boundary surface.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.boundary.pdf_value(origin, direction)
    }

    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.boundary.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fog(density: f32) -> ConstantMedium {
        let boundary = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::lambertian(Color::ONE));
        ConstantMedium::new(boundary, density, Color::splat(0.8))
    }

    #[test]
    fn test_dense_medium_scatters_inside_boundary() {
        let medium = fog(1.0e4);
        let mut rng = StdRng::seed_from_u64(3);
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);

        for _ in 0..100 {
            let rec = medium
                .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
                .unwrap();
            assert!(rec.t >= 4.0 && rec.t <= 6.0);
            assert!(rec.front_face);
            assert!(matches!(rec.material, Material::Isotropic { .. }));
        }
    }

    #[test]
    fn test_thin_medium_is_mostly_transparent() {
        let medium = fog(1.0e-4);
        let mut rng = StdRng::seed_from_u64(4);
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);

        let hits = (0..1000)
            .filter(|_| {
                medium
                    .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
                    .is_some()
            })
            .count();
        assert!(hits < 10);
    }

    #[test]
    fn test_miss_outside_boundary() {
        let medium = fog(1.0e4);
        let mut rng = StdRng::seed_from_u64(5);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);

        assert!(medium.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_non_positive_density_is_empty_space() {
        let mut rng = StdRng::seed_from_u64(7);
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let range = Interval::new(0.001, f32::INFINITY);

        for density in [-1.0e4, 0.0, f32::NAN] {
            let medium = fog(density);
            assert!((0..100).all(|_| medium.hit(&ray, range, &mut rng).is_none()));
        }
    }

    #[test]
    fn test_light_sampling_targets_boundary() {
        let medium = fog(0.5);
        let mut rng = StdRng::seed_from_u64(8);

        let mut seen = 0;
        for _ in 0..50 {
            let direction = medium.random(Vec3::ZERO, &mut rng);
            assert!(direction.normalize().z < -0.9);
            // Rim directions may graze past the sphere in f32
            if medium.pdf_value(Vec3::ZERO, direction) > 0.0 {
                seen += 1;
            }
        }
        assert!(seen >= 45);
        assert_eq!(medium.pdf_value(Vec3::ZERO, Vec3::Z), 0.0);
    }

    #[test]
    fn test_origin_inside_medium() {
        let boundary = Sphere::new(Vec3::ZERO, 2.0, Material::lambertian(Color::ONE));
        let medium = ConstantMedium::new(boundary, 1.0e4, Color::ONE);
        let mut rng = StdRng::seed_from_u64(6);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);

        let rec = medium
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!(rec.t < 2.0);
    }
}
