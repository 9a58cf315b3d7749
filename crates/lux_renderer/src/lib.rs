//! Lux Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering: spheres, quads,
//! boxes and smoke volumes under diffuse, metal, glass and emissive
//! materials, traced through a BVH and rendered in parallel buckets.
//!
//! # Example
//!
//! ```ignore
//! use lux_renderer::{output, Camera, Scene};
//!
//! let desc = lux_core::load_scene("scenes/cornell.json")?;
//! let scene = Scene::from_description(&desc)?;
//! let mut camera = Camera::from_settings(&desc.camera)?;
//! let (image, _stats) = camera.render(&scene)?;
//! output::save("cornell.ppm", &image)?;
//! ```

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod instance;
mod integrator;
mod material;
mod medium;
pub mod output;
mod pdf;
mod quad;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod texture;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use bvh::{Bvh, BvhNode};
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{Rotate, Translate};
pub use integrator::{background_color, ray_color, sample_radiance};
pub use material::{Material, ScatterRecord};
pub use medium::ConstantMedium;
pub use pdf::Pdf;
pub use quad::{make_box, Quad};
pub use renderer::{color_to_rgb, linear_to_gamma, ImageBuffer, RenderStats};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::Texture;

/// Re-export common math types from lux_math
pub use lux_math::{Aabb, Color, Interval, Ray, Vec3};
