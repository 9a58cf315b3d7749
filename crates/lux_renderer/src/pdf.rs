//! Direction sampling distributions used for importance sampling.

use crate::sampling::{gen_f32, random_cosine_direction, random_unit_vector};
use crate::Hittable;
use lux_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A density over directions that can also draw samples from itself.
#[derive(Debug, Clone)]
pub enum Pdf<'a> {
    /// `cos θ / π` around the frame's `w` axis
    Cosine(Onb),
    /// Uniform over the unit sphere
    Sphere,
    /// Directions from `origin` toward a (list of) sampleable objects
    Hittable {
        objects: &'a Hittable,
        origin: Vec3,
    },
    /// Even blend of two densities
    Mixture(&'a Pdf<'a>, &'a Pdf<'a>),
}

impl<'a> Pdf<'a> {
    pub fn cosine(normal: Vec3) -> Self {
        Pdf::Cosine(Onb::new(normal))
    }

    pub fn value(&self, direction: Vec3) -> f32 {
        match self {
            Pdf::Cosine(uvw) => {
                let cosine_theta = direction.normalize_or_zero().dot(uvw.w);
                (cosine_theta / PI).max(0.0)
            }
            Pdf::Sphere => 1.0 / (4.0 * PI),
            Pdf::Hittable { objects, origin } => objects.pdf_value(*origin, direction),
            Pdf::Mixture(a, b) => 0.5 * a.value(direction) + 0.5 * b.value(direction),
        }
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Cosine(uvw) => uvw.transform(random_cosine_direction(rng)),
            Pdf::Sphere => random_unit_vector(rng),
            Pdf::Hittable { objects, origin } => objects.random(*origin, rng),
            Pdf::Mixture(a, b) => {
                if gen_f32(rng) < 0.5 {
                    a.generate(rng)
                } else {
                    b.generate(rng)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Material, Quad};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosine_pdf_stays_above_surface() {
        let pdf = Pdf::cosine(Vec3::Y);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..500 {
            let d = pdf.generate(&mut rng);
            assert!(d.y >= 0.0);
            assert!(pdf.value(d) >= 0.0);
        }
        assert!((pdf.value(Vec3::Y) - 1.0 / PI).abs() < 1e-6);
        assert_eq!(pdf.value(-Vec3::Y), 0.0);
    }

    #[test]
    fn test_sphere_pdf_is_uniform() {
        let pdf = Pdf::Sphere;
        assert_eq!(pdf.value(Vec3::X), pdf.value(-Vec3::Z));
    }

    #[test]
    fn test_mixture_averages() {
        let light: Hittable = Quad::new(
            Vec3::new(-0.5, 2.0, -0.5),
            Vec3::X,
            Vec3::Z,
            Material::diffuse_light(Color::ONE),
        )
        .into();
        let toward_light = Pdf::Hittable {
            objects: &light,
            origin: Vec3::ZERO,
        };
        let cosine = Pdf::cosine(Vec3::Y);
        let mixture = Pdf::Mixture(&toward_light, &cosine);

        let expected = 0.5 * 4.0 + 0.5 / PI;
        assert!((mixture.value(Vec3::Y) - expected).abs() < 1e-4);

        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert!(mixture.value(mixture.generate(&mut rng)) > 0.0);
        }
    }
}
