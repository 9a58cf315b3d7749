//! Materials describe how light interacts with surfaces and volumes.

use crate::sampling::{gen_f32, random_unit_vector};
use crate::{HitRecord, Pdf, Texture};
use lux_math::{Color, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Outcome of a scattering event.
#[derive(Debug, Clone)]
pub struct ScatterRecord {
    pub attenuation: Color,
    /// Continuation ray, drawn from `pdf` when there is one
    pub scattered: Ray,
    /// Sampling density of the scattered direction; `None` for a specular
    /// (delta) bounce that must be followed as-is.
    pub pdf: Option<Pdf<'static>>,
}

impl ScatterRecord {
    pub fn is_specular(&self) -> bool {
        self.pdf.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum Material {
    /// Ideal diffuse reflector
    Lambertian { albedo: Texture },
    /// Mirror, blurred by `fuzz` in `[0, 1]`
    Metal { albedo: Color, fuzz: f32 },
    /// Clear glass-like refractor
    Dielectric { refraction_index: f32 },
    /// Emits from its front face, never scatters
    DiffuseLight { emit: Texture },
    /// Phase function of participating media
    Isotropic { albedo: Texture },
}

impl Material {
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    pub fn diffuse_light(emit: impl Into<Texture>) -> Self {
        Material::DiffuseLight { emit: emit.into() }
    }

    pub fn isotropic(albedo: impl Into<Texture>) -> Self {
        Material::Isotropic {
            albedo: albedo.into(),
        }
    }

    /// Scatter an incoming ray, or `None` if it is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        match self {
            Material::Lambertian { albedo } => {
                let pdf = Pdf::cosine(rec.normal);
                let direction = pdf.generate(rng);
                Some(ScatterRecord {
                    attenuation: albedo.value(rec.u, rec.v, rec.p),
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                    pdf: Some(pdf),
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction(), rec.normal).normalize_or_zero();
                let direction = reflected + *fuzz * random_unit_vector(rng);

                // Fuzzed below the surface: absorbed
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }
                Some(ScatterRecord {
                    attenuation: *albedo,
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                    pdf: None,
                })
            }
            Material::Dielectric { refraction_index } => {
                let ri = if rec.front_face {
                    1.0 / refraction_index
                } else {
                    *refraction_index
                };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                // Total internal reflection
                let cannot_refract = ri * sin_theta > 1.0;

                let direction = if cannot_refract || reflectance(cos_theta, ri) > gen_f32(rng) {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, ri)
                };

                Some(ScatterRecord {
                    attenuation: Color::ONE,
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                    pdf: None,
                })
            }
            Material::DiffuseLight { .. } => None,
            Material::Isotropic { albedo } => {
                let pdf = Pdf::Sphere;
                let direction = pdf.generate(rng);
                Some(ScatterRecord {
                    attenuation: albedo.value(rec.u, rec.v, rec.p),
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                    pdf: Some(pdf),
                })
            }
        }
    }

    /// Light emitted toward the incoming ray. Lights only emit from their
    /// front face.
    pub fn emitted(&self, rec: &HitRecord) -> Color {
        match self {
            Material::DiffuseLight { emit } if rec.front_face => emit.value(rec.u, rec.v, rec.p),
            _ => Color::ZERO,
        }
    }

    /// Density with which this material itself scatters into `scattered`.
    pub fn scattering_pdf(&self, rec: &HitRecord, scattered: &Ray) -> f32 {
        match self {
            Material::Lambertian { .. } => {
                let cos_theta = rec.normal.dot(scattered.direction().normalize_or_zero());
                (cos_theta / PI).max(0.0)
            }
            Material::Isotropic { .. } => 1.0 / (4.0 * PI),
            _ => 0.0,
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance.
#[inline]
fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
