//! Recursive Monte Carlo radiance estimator.
//!
//! Diffuse bounces are importance sampled: with no lights in the scene the
//! material samples its own lobe, otherwise half the directions are aimed at
//! the lights and the estimate is weighted by the mixture density.

use lux_core::Background;
use lux_math::{Interval, Ray};
use rand::RngCore;

use crate::sampling::gen_f32;
use crate::{Color, Pdf, RenderStats, Scene};

/// Radiance seen by a ray that leaves the scene.
pub fn background_color(background: &Background, ray: &Ray) -> Color {
    match background {
        Background::Solid(color) => *color,
        Background::Sky => sky_gradient(ray),
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Compute the color seen by a ray, following at most `depth` bounces.
pub fn ray_color(
    ray: &Ray,
    depth: u32,
    scene: &Scene,
    background: &Background,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = scene.hit(ray, Interval::new(0.001, f32::INFINITY), rng) else {
        return background_color(background, ray);
    };

    let emission = rec.material.emitted(&rec);

    let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
        return emission;
    };

    let Some(material_pdf) = &srec.pdf else {
        // Specular: follow the single reflected/refracted direction
        let incoming = ray_color(&srec.scattered, depth - 1, scene, background, rng);
        return emission + srec.attenuation * incoming;
    };

    let (scattered, pdf_value) = match scene.lights() {
        Some(lights) => {
            let light_pdf = Pdf::Hittable {
                objects: lights,
                origin: rec.p,
            };
            let scattered = if gen_f32(rng) < 0.5 {
                Ray::new(rec.p, light_pdf.generate(rng), ray.time())
            } else {
                srec.scattered
            };
            let mixture = Pdf::Mixture(&light_pdf, material_pdf);
            (scattered, mixture.value(scattered.direction()))
        }
        None => (srec.scattered, material_pdf.value(srec.scattered.direction())),
    };

    if !(pdf_value.is_finite() && pdf_value > 0.0) {
        return emission;
    }

    let scattering_pdf = rec.material.scattering_pdf(&rec, &scattered);
    let incoming = ray_color(&scattered, depth - 1, scene, background, rng);

    emission + srec.attenuation * scattering_pdf * incoming / pdf_value
}

/// One camera sample. A non-finite estimate is replaced by black and
/// counted in `stats`.
pub fn sample_radiance(
    ray: &Ray,
    max_depth: u32,
    scene: &Scene,
    background: &Background,
    rng: &mut dyn RngCore,
    stats: &mut RenderStats,
) -> Color {
    let color = ray_color(ray, max_depth, scene, background, rng);
    stats.samples += 1;

    if color.is_finite() {
        color
    } else {
        stats.faulted_samples += 1;
        log::trace!("Zeroed non-finite sample {:?} for ray {:?}", color, ray);
        Color::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bvh, Hittable, Material, Quad, Sphere};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single(object: impl Into<Hittable>) -> Scene {
        let mut rng = StdRng::seed_from_u64(0);
        Scene::new(vec![object.into()], Vec::new(), &mut rng).unwrap()
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let up_color = sky_gradient(&up_ray);

        // Ray pointing down should be white
        let down_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 0.0);
        let down_color = sky_gradient(&down_ray);

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_miss_returns_background_exactly() {
        let scene = single(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::lambertian(Color::ONE)));
        let background = Background::Solid(Color::new(0.25, 0.5, 0.75));
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        let color = ray_color(&ray, 10, &scene, &background, &mut rng);
        assert_eq!(color, Color::new(0.25, 0.5, 0.75));
    }

    #[test]
    fn test_depth_zero_is_black() {
        let scene = Scene::empty();
        let background = Background::Solid(Color::ONE);
        let mut rng = StdRng::seed_from_u64(2);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert_eq!(ray_color(&ray, 0, &scene, &background, &mut rng), Color::ZERO);
        assert_eq!(ray_color(&ray, 1, &scene, &background, &mut rng), Color::ONE);
    }

    #[test]
    fn test_depth_one_sees_only_emission() {
        // A diffuse surface with a bright background: one bounce stops at
        // the surface, two bounces let the background through
        let scene = single(Quad::new(
            Vec3::new(-5.0, -5.0, -1.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            Material::lambertian(Color::splat(0.5)),
        ));
        let background = Background::Solid(Color::ONE);
        let mut rng = StdRng::seed_from_u64(3);
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);

        assert_eq!(ray_color(&ray, 1, &scene, &background, &mut rng), Color::ZERO);

        let lit = ray_color(&ray, 2, &scene, &background, &mut rng);
        assert!(lit.max_element() > 0.0);
    }

    #[test]
    fn test_front_face_light_emission() {
        let light = Quad::new(
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Material::diffuse_light(Color::splat(7.0)),
        );
        let scene = single(light);
        let background = Background::Solid(Color::ZERO);
        let mut rng = StdRng::seed_from_u64(4);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert_eq!(ray_color(&ray, 5, &scene, &background, &mut rng), Color::splat(7.0));

        // Seen from behind the quad emits nothing
        let behind = Ray::new_simple(Vec3::new(0.0, 0.0, -4.0), Vec3::Z);
        assert_eq!(ray_color(&behind, 5, &scene, &background, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_light_sampling_matches_brdf_sampling() {
        // Diffuse floor under a square light: both estimators should agree
        let floor = Quad::new(
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(0.0, 0.0, 100.0),
            Vec3::new(100.0, 0.0, 0.0),
            Material::lambertian(Color::splat(0.8)),
        );
        let light = Quad::new(
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Material::diffuse_light(Color::splat(4.0)),
        );
        let objects: Vec<Hittable> = vec![floor.into(), light.clone().into()];

        let mut rng = StdRng::seed_from_u64(5);
        let unsampled = Scene::new(objects.clone(), Vec::new(), &mut rng).unwrap();
        let sampled = Scene::new(objects, vec![light.into()], &mut rng).unwrap();
        let background = Background::Solid(Color::ZERO);
        let ray = Ray::new_simple(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);

        let n = 20_000;
        let estimate = |scene: &Scene, rng: &mut StdRng| {
            (0..n)
                .map(|_| ray_color(&ray, 3, scene, &background, rng).x)
                .sum::<f32>()
                / n as f32
        };
        let brdf = estimate(&unsampled, &mut rng);
        let mixed = estimate(&sampled, &mut rng);

        assert!(brdf > 0.0 && mixed > 0.0);
        assert!((brdf - mixed).abs() / mixed < 0.1, "brdf {} vs mixed {}", brdf, mixed);
    }

    #[test]
    fn test_grouped_light_matches_brdf_sampling() {
        // Wall in the x = 0 plane lit by a quad facing it from x = 2
        let wall = Quad::new(
            Vec3::new(0.0, -50.0, -50.0),
            Vec3::new(0.0, 0.0, 100.0),
            Vec3::new(0.0, 100.0, 0.0),
            Material::lambertian(Color::splat(0.8)),
        );
        let light = Quad::new(
            Vec3::new(2.0, -1.0, -1.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 2.0, 0.0),
            Material::diffuse_light(Color::splat(4.0)),
        );
        let objects: Vec<Hittable> = vec![wall.into(), light.clone().into()];

        let mut rng = StdRng::seed_from_u64(9);
        let group = Bvh::build(vec![light.into()], &mut rng).unwrap();
        let unsampled = Scene::new(objects.clone(), Vec::new(), &mut rng).unwrap();
        let grouped = Scene::new(objects, vec![group.into()], &mut rng).unwrap();
        let background = Background::Solid(Color::ZERO);
        let ray = Ray::new_simple(Vec3::new(1.0, 0.0, 0.0), -Vec3::X);

        let n = 20_000;
        let estimate = |scene: &Scene, rng: &mut StdRng| {
            (0..n)
                .map(|_| ray_color(&ray, 2, scene, &background, rng).x)
                .sum::<f32>()
                / n as f32
        };
        let brdf = estimate(&unsampled, &mut rng);
        let mixed = estimate(&grouped, &mut rng);

        assert!(brdf > 0.0 && mixed > 0.0);
        assert!((brdf - mixed).abs() / brdf < 0.1, "brdf {} vs grouped {}", brdf, mixed);
    }

    #[test]
    fn test_non_finite_sample_is_zeroed() {
        let scene = Scene::empty();
        let background = Background::Solid(Color::new(f32::NAN, 0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(6);
        let mut stats = RenderStats::default();

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let color = sample_radiance(&ray, 4, &scene, &background, &mut rng, &mut stats);

        assert_eq!(color, Color::ZERO);
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.faulted_samples, 1);
    }
}
