//! Declarative scene description.
//!
//! A scene file is JSON with three sections: `camera`, named `materials`
//! and an ordered list of `objects`. Everything optional carries a serde
//! default so small scenes stay small:
//!
//! ```json
//! {
//!   "camera": { "image_width": 400, "aspect_ratio": 1.7777, "background": "sky" },
//!   "materials": { "ground": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] } },
//!   "objects": [
//!     { "shape": { "type": "sphere", "center": [0, -1000, 0], "radius": 1000 },
//!       "material": "ground" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lux_math::{Color, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or resolving a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Object {0} needs a material")]
    MissingMaterial(usize),

    #[error("Object {index} has medium density {density}, expected a positive number")]
    InvalidDensity { index: usize, density: f32 },
}

pub type SceneResult<T> = Result<T, SceneError>;

/// What a ray that escapes the scene sees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Constant radiance.
    Solid(Color),
    /// Vertical white-to-blue gradient keyed on the ray direction.
    Sky,
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::ZERO)
    }
}

/// Viewing and sampling parameters supplied before the first render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Ratio of image width over height
    pub aspect_ratio: f32,
    /// Rendered image width in pixels
    pub image_width: u32,
    /// Requested samples per pixel (rounded down to a square when stratified)
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces
    pub max_depth: u32,
    pub background: Background,

    /// Vertical field of view in degrees
    pub vfov: f32,
    pub lookfrom: Vec3,
    pub lookat: Vec3,
    /// Camera-relative "up" direction
    pub vup: Vec3,

    /// Variation angle of rays through each pixel (degrees)
    pub defocus_angle: f32,
    /// Distance from lookfrom to the plane of perfect focus
    pub focus_dist: f32,

    /// Jitter inside a sqrt(spp) x sqrt(spp) grid instead of the whole pixel
    pub stratified: bool,
    pub seed: u64,
    /// Edge length of the square tiles handed to worker threads
    pub bucket_size: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Background::default(),
            vfov: 90.0,
            lookfrom: Vec3::ZERO,
            lookat: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            stratified: true,
            seed: 0,
            bucket_size: 64,
        }
    }
}

/// A texture written inline, either as a bare colour or a full description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextureRef {
    Color(Color),
    Texture(TextureDesc),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureDesc {
    Solid { color: Color },
    /// 3D checker pattern with cells of edge `scale`.
    Checker {
        scale: f32,
        even: Box<TextureRef>,
        odd: Box<TextureRef>,
    },
    /// Image file, relative paths resolve against the scene file directory.
    Image { path: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian {
        albedo: TextureRef,
    },
    Metal {
        albedo: Color,
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        refraction_index: f32,
    },
    DiffuseLight {
        emit: TextureRef,
    },
    Isotropic {
        albedo: TextureRef,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDesc {
    /// Static sphere, or moving from `center` to `center1` over shutter time.
    Sphere {
        center: Vec3,
        radius: f32,
        #[serde(default)]
        center1: Option<Vec3>,
    },
    /// Parallelogram with corner `q` and edges `u`, `v`.
    Quad { q: Vec3, u: Vec3, v: Vec3 },
    /// Axis-aligned box with opposite corners `a` and `b`, built from six quads.
    Box { a: Vec3, b: Vec3 },
    /// Child objects gathered under their own BVH.
    Group { objects: Vec<ObjectDesc> },
}

/// Instance transforms, applied in the order listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformDesc {
    Translate(Vec3),
    RotateY(f32),
    Rotate { axis: Vec3, degrees: f32 },
}

/// Homogeneous participating medium filling the object's boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediumDesc {
    pub density: f32,
    pub albedo: TextureRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    pub shape: ShapeDesc,
    /// Name in the `materials` table. Groups and media do not need one.
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub transforms: Vec<TransformDesc>,
    #[serde(default)]
    pub medium: Option<MediumDesc>,
    /// Also sample this shape directly as a light source.
    #[serde(default)]
    pub light: bool,
}

impl ObjectDesc {
    pub fn new(shape: ShapeDesc, material: impl Into<String>) -> Self {
        Self {
            shape,
            material: Some(material.into()),
            transforms: Vec::new(),
            medium: None,
            light: false,
        }
    }

    pub fn with_transform(mut self, transform: TransformDesc) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn as_light(mut self) -> Self {
        self.light = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub materials: HashMap<String, MaterialDesc>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    /// Directory used to resolve relative texture paths.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl SceneDescription {
    /// Parse a scene from a JSON string.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json_string(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a material by name.
    pub fn material(&self, name: &str) -> SceneResult<&MaterialDesc> {
        self.materials
            .get(name)
            .ok_or_else(|| SceneError::UnknownMaterial(name.to_string()))
    }

    /// Check that every object resolves its material and every medium has
    /// a positive density.
    pub fn validate(&self) -> SceneResult<()> {
        for (index, object) in self.objects.iter().enumerate() {
            self.validate_object(index, object)?;
        }
        Ok(())
    }

    fn validate_object(&self, index: usize, object: &ObjectDesc) -> SceneResult<()> {
        if let Some(medium) = &object.medium {
            if !(medium.density.is_finite() && medium.density > 0.0) {
                return Err(SceneError::InvalidDensity {
                    index,
                    density: medium.density,
                });
            }
        }

        if let ShapeDesc::Group { objects } = &object.shape {
            for child in objects {
                self.validate_object(index, child)?;
            }
            return Ok(());
        }

        match (&object.material, &object.medium) {
            (Some(name), _) => self.material(name).map(|_| ()),
            (None, Some(_)) => Ok(()),
            (None, None) => Err(SceneError::MissingMaterial(index)),
        }
    }

    /// Number of objects flagged for direct light sampling, groups included.
    pub fn light_count(&self) -> usize {
        fn count(objects: &[ObjectDesc]) -> usize {
            objects
                .iter()
                .map(|o| match &o.shape {
                    ShapeDesc::Group { objects } => count(objects) + usize::from(o.light),
                    _ => usize::from(o.light),
                })
                .sum()
        }
        count(&self.objects)
    }
}

/// Load a scene description from a JSON file.
///
/// Relative texture paths are resolved against the file's directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> SceneResult<SceneDescription> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let mut scene = SceneDescription::from_json_str(&json)?;
    scene.base_dir = path.parent().map(Path::to_path_buf);

    log::info!(
        "Loaded scene {}: {} objects ({} sampled as lights), {} materials",
        path.display(),
        scene.objects.len(),
        scene.light_count(),
        scene.materials.len()
    );

    Ok(scene)
}
