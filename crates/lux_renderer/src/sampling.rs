//! Random sampling helpers.
//!
//! Every function takes the generator explicitly so each worker can own its
//! own seeded stream.

use lux_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform float in `[min, max)`.
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Random point in the `[-0.5, 0.5]²` square (z = 0).
pub fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

/// Random point in the unit disk (z = 0), by rejection.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniformly distributed direction on the unit sphere, by rejection.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        let len_sq = p.length_squared();
        if 1e-12 < len_sq && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Cosine-weighted direction around +Z (density `cos θ / π`).
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);

    let phi = 2.0 * PI * r1;
    let x = phi.cos() * r2.sqrt();
    let y = phi.sin() * r2.sqrt();
    let z = (1.0 - r2).sqrt();

    Vec3::new(x, y, z)
}

/// Direction around +Z uniformly covering the cone subtended by a sphere of
/// `radius` whose centre lies `distance_squared` away.
pub fn random_to_sphere(rng: &mut dyn RngCore, radius: f32, distance_squared: f32) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let z = 1.0 + r2 * (cos_theta_max(radius, distance_squared) - 1.0);

    let phi = 2.0 * PI * r1;
    let sin_theta = (1.0 - z * z).max(0.0).sqrt();
    let x = phi.cos() * sin_theta;
    let y = phi.sin() * sin_theta;

    Vec3::new(x, y, z)
}

/// Cosine of the half-angle of the cone subtended by a sphere.
/// Zero when the point lies inside the sphere.
#[inline]
pub fn cos_theta_max(radius: f32, distance_squared: f32) -> f32 {
    (1.0 - radius * radius / distance_squared).max(0.0).sqrt()
}

/// Mix a seed with tile coordinates into an independent stream seed
/// (splitmix64 finalizer).
pub fn mix_seed(seed: u64, a: u64, b: u64) -> u64 {
    let mut z = seed
        .wrapping_add(a.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(b.wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_vector_has_unit_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_disk_and_square_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let d = random_in_unit_disk(&mut rng);
            assert!(d.length_squared() < 1.0 && d.z == 0.0);

            let s = sample_square(&mut rng);
            assert!((-0.5..0.5).contains(&s.x) && (-0.5..0.5).contains(&s.y));
        }
    }

    #[test]
    fn test_cosine_direction_upper_hemisphere() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let mut mean_z = 0.0;
        for _ in 0..n {
            let d = random_cosine_direction(&mut rng);
            assert!(d.z >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-4);
            mean_z += d.z;
        }
        // E[cos θ] under cos θ / π is 2/3
        mean_z /= n as f32;
        assert!((mean_z - 2.0 / 3.0).abs() < 0.01, "mean cos = {}", mean_z);
    }

    #[test]
    fn test_random_to_sphere_stays_in_cone() {
        let mut rng = StdRng::seed_from_u64(4);
        let cos_max = cos_theta_max(1.0, 25.0);
        for _ in 0..1000 {
            let d = random_to_sphere(&mut rng, 1.0, 25.0);
            assert!(d.z >= cos_max - 1e-5);
        }
    }

    #[test]
    fn test_cos_theta_max_inside_sphere() {
        assert_eq!(cos_theta_max(2.0, 1.0), 0.0);
    }

    #[test]
    fn test_mix_seed_separates_tiles() {
        assert_ne!(mix_seed(0, 0, 64), mix_seed(0, 64, 0));
        assert_eq!(mix_seed(7, 3, 4), mix_seed(7, 3, 4));
    }
}
