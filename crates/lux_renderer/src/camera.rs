//! Camera for ray generation and the bucketed render loop.

use std::time::Instant;

use lux_core::{Background, CameraSettings};
use lux_math::{Ray, Vec3};
use rand::RngCore;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::integrator::sample_radiance;
use crate::sampling::{gen_f32, random_in_unit_disk, sample_square};
use crate::{Color, ImageBuffer, RenderError, RenderResult, RenderStats, Scene};

/// Largest image the camera accepts (3 GiB of linear radiance).
const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub background: Background,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus

    // Sampling and scheduling
    stratified: bool,
    seed: u64,
    bucket_size: u32,

    // Cached computed values (set by initialize())
    image_height: u32,
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    sqrt_spp: u32,
    samples_scale: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Background::default(),
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            stratified: true,
            seed: 0,
            bucket_size: 64,
            // Cached values (initialized to defaults)
            image_height: 100,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
            sqrt_spp: 3,
            samples_scale: 1.0 / 9.0,
        }
    }

    /// Build and initialize a camera from scene-file settings.
    pub fn from_settings(settings: &CameraSettings) -> RenderResult<Self> {
        let mut camera = Self::new()
            .with_image(settings.aspect_ratio, settings.image_width)
            .with_quality(settings.samples_per_pixel, settings.max_depth)
            .with_position(settings.lookfrom, settings.lookat, settings.vup)
            .with_lens(settings.vfov, settings.defocus_angle, settings.focus_dist)
            .with_background(settings.background)
            .with_sampling(settings.stratified, settings.seed)
            .with_bucket_size(settings.bucket_size);
        camera.initialize()?;
        Ok(camera)
    }

    /// Set output width and aspect ratio; the height is derived.
    pub fn with_image(mut self, aspect_ratio: f32, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Choose stratified or whole-pixel jitter, and the base random seed.
    pub fn with_sampling(mut self, stratified: bool, seed: u64) -> Self {
        self.stratified = stratified;
        self.seed = seed;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidCamera(msg));

        if self.image_width < 1 {
            return invalid("image_width must be at least 1".into());
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return invalid(format!("aspect_ratio must be positive, got {}", self.aspect_ratio));
        }
        let pixels = self.image_width as f64 * self.height_for_aspect();
        if pixels > MAX_IMAGE_PIXELS as f64 {
            return invalid(format!(
                "{}x{:.0} image exceeds {} pixels",
                self.image_width,
                self.height_for_aspect(),
                MAX_IMAGE_PIXELS
            ));
        }
        if self.samples_per_pixel < 1 {
            return invalid("samples_per_pixel must be at least 1".into());
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return invalid(format!("vfov must be in (0, 180) degrees, got {}", self.vfov));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return invalid(format!("focus_dist must be positive, got {}", self.focus_dist));
        }
        if !(self.defocus_angle.is_finite() && self.defocus_angle >= 0.0) {
            return invalid(format!("defocus_angle must be non-negative, got {}", self.defocus_angle));
        }

        let view = self.look_from - self.look_at;
        if !view.is_finite() || view.length_squared() == 0.0 {
            return invalid("lookfrom and lookat must be distinct points".into());
        }
        if self.vup.cross(view).length_squared() <= f32::EPSILON * view.length_squared() {
            return invalid("vup must not be parallel to the view direction".into());
        }
        if self.bucket_size < 1 {
            return invalid("bucket_size must be at least 1".into());
        }
        Ok(())
    }

    /// Image height before clamping; widened so huge values stay comparable.
    fn height_for_aspect(&self) -> f64 {
        ((self.image_width as f32 / self.aspect_ratio) as f64).floor()
    }

    /// Validate settings and derive the viewport (must succeed before
    /// generating rays).
    pub fn initialize(&mut self) -> RenderResult<()> {
        self.validate()?;

        self.image_height = (self.height_for_aspect() as u32).max(1);

        self.sqrt_spp = (self.samples_per_pixel as f32).sqrt() as u32;
        self.samples_scale = 1.0 / self.samples_taken() as f32;
        self.center = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;

        Ok(())
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn bucket_size(&self) -> u32 {
        self.bucket_size
    }

    /// Samples actually traced per pixel: `sqrt_spp²` when stratified.
    pub fn samples_taken(&self) -> u32 {
        if self.stratified {
            self.sqrt_spp * self.sqrt_spp
        } else {
            self.samples_per_pixel
        }
    }

    /// Get the samples scale factor (1 / samples taken).
    pub fn samples_scale(&self) -> f32 {
        self.samples_scale
    }

    /// Generate a ray for pixel (i, j).
    ///
    /// With `stratum = Some((s_i, s_j))` the jitter stays inside that cell of
    /// the `sqrt_spp × sqrt_spp` grid, otherwise it covers the whole pixel.
    pub fn get_ray(
        &self,
        i: u32,
        j: u32,
        stratum: Option<(u32, u32)>,
        rng: &mut dyn RngCore,
    ) -> Ray {
        let offset = match stratum {
            Some((s_i, s_j)) => self.sample_square_stratified(s_i, s_j, rng),
            None => sample_square(rng),
        };

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Offset in `[-0.5, 0.5]²` inside grid cell `(s_i, s_j)`.
    fn sample_square_stratified(&self, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Vec3 {
        let recip = 1.0 / self.sqrt_spp as f32;
        let px = (s_i as f32 + gen_f32(rng)) * recip - 0.5;
        let py = (s_j as f32 + gen_f32(rng)) * recip - 0.5;
        Vec3::new(px, py, 0.0)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    /// Average radiance through pixel (i, j).
    pub fn render_pixel(
        &self,
        i: u32,
        j: u32,
        scene: &Scene,
        rng: &mut dyn RngCore,
        stats: &mut RenderStats,
    ) -> Color {
        let mut pixel_color = Color::ZERO;

        if self.stratified {
            for s_j in 0..self.sqrt_spp {
                for s_i in 0..self.sqrt_spp {
                    let ray = self.get_ray(i, j, Some((s_i, s_j)), rng);
                    pixel_color +=
                        sample_radiance(&ray, self.max_depth, scene, &self.background, rng, stats);
                }
            }
        } else {
            for _ in 0..self.samples_per_pixel {
                let ray = self.get_ray(i, j, None, rng);
                pixel_color +=
                    sample_radiance(&ray, self.max_depth, scene, &self.background, rng, stats);
            }
        }

        pixel_color * self.samples_scale
    }

    /// Render the whole image.
    ///
    /// Buckets are traced in parallel, each with its own generator seeded from
    /// the camera seed and the bucket position, so the result does not depend
    /// on thread scheduling.
    pub fn render(&mut self, scene: &Scene) -> RenderResult<(ImageBuffer, RenderStats)> {
        self.initialize()?;
        let camera: &Camera = self;

        let buckets = generate_buckets(camera.image_width, camera.image_height, camera.bucket_size);
        log::info!(
            "Rendering {}x{} at {} spp ({} buckets, {} threads)",
            camera.image_width,
            camera.image_height,
            camera.samples_taken(),
            buckets.len(),
            rayon::current_num_threads()
        );
        let start = Instant::now();

        let results: Vec<BucketResult> = buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, camera, scene))
            .collect();

        let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
        let mut stats = RenderStats::default();
        for result in &results {
            result.write_into(&mut image);
            stats.merge(&result.stats);
        }

        log::info!(
            "Render finished in {:.2?} ({} samples, {} zeroed)",
            start.elapsed(),
            stats.samples,
            stats.faulted_samples
        );

        Ok((image, stats))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
