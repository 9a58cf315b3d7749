//! Renderable scene: the world hierarchy plus the shapes sampled as lights.
//!
//! Built either directly from [`Hittable`]s or from a
//! [`lux_core::SceneDescription`] loaded from JSON.

use lux_core::{
    MaterialDesc, MediumDesc, ObjectDesc, SceneDescription, ShapeDesc, TextureCache, TextureDesc,
    TextureRef, TransformDesc,
};
use lux_math::{Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::{
    make_box, Bvh, Color, ConstantMedium, HitRecord, Hittable, HittableList, Material, Quad,
    RenderResult, Rotate, Sphere, Texture, Translate,
};

/// Debug colour used when an image texture cannot be loaded.
const MISSING_TEXTURE: Color = Color::new(0.0, 1.0, 1.0);

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// BVH over all objects; `None` when the scene has no geometry
    world: Option<Hittable>,
    /// Shapes sampled directly for lighting
    lights: Option<Hittable>,
}

impl Scene {
    /// Build a scene from world objects and the subset sampled as lights.
    ///
    /// An empty object list is allowed: every ray then sees the background.
    pub fn new(
        objects: Vec<Hittable>,
        lights: Vec<Hittable>,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        let world = if objects.is_empty() {
            None
        } else {
            Some(Hittable::Bvh(Bvh::build(objects, rng)?))
        };

        let lights = if lights.is_empty() {
            None
        } else {
            Some(Hittable::List(lights.into_iter().collect()))
        };

        Ok(Self { world, lights })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble the scene described by a scene file.
    ///
    /// The BVH split axes are drawn from the camera seed so a given file
    /// always builds the same tree.
    pub fn from_description(desc: &SceneDescription) -> RenderResult<Self> {
        desc.validate()?;

        let mut builder = SceneBuilder {
            desc,
            textures: match &desc.base_dir {
                Some(dir) => TextureCache::with_base_dir(dir),
                None => TextureCache::new(),
            },
            rng: StdRng::seed_from_u64(desc.camera.seed),
            lights: Vec::new(),
        };

        let mut objects = Vec::with_capacity(desc.objects.len());
        for object in &desc.objects {
            objects.push(builder.object(object)?);
        }

        log::info!(
            "Built scene: {} objects, {} lights, {} textures",
            objects.len(),
            builder.lights.len(),
            builder.textures.len()
        );

        let SceneBuilder {
            mut rng, lights, ..
        } = builder;
        Self::new(objects, lights, &mut rng)
    }

    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.world.as_ref()?.hit(ray, ray_t, rng)
    }

    pub fn world(&self) -> Option<&Hittable> {
        self.world.as_ref()
    }

    pub fn lights(&self) -> Option<&Hittable> {
        self.lights.as_ref()
    }
}

/// Converts descriptions into geometry, loading textures on the way.
struct SceneBuilder<'d> {
    desc: &'d SceneDescription,
    textures: TextureCache,
    rng: StdRng,
    lights: Vec<Hittable>,
}

impl SceneBuilder<'_> {
    fn object(&mut self, object: &ObjectDesc) -> RenderResult<Hittable> {
        let mut hittable = match &object.shape {
            ShapeDesc::Group { objects } => {
                let mut children = Vec::with_capacity(objects.len());
                for child in objects {
                    children.push(self.object(child)?);
                }
                Hittable::Bvh(Bvh::build(children, &mut self.rng)?)
            }
            shape => {
                let desc = self.desc;
                let material = match &object.material {
                    Some(name) => self.material(desc.material(name)?),
                    // Media-only objects never shade their boundary
                    None => Material::lambertian(Color::ZERO),
                };
                Self::shape(shape, material)
            }
        };

        if let Some(medium) = &object.medium {
            hittable = self.medium(hittable, medium).into();
        }

        for transform in &object.transforms {
            hittable = match *transform {
                TransformDesc::Translate(offset) => Translate::new(hittable, offset).into(),
                TransformDesc::RotateY(degrees) => Rotate::y(hittable, degrees).into(),
                TransformDesc::Rotate { axis, degrees } => Rotate::new(hittable, axis, degrees).into(),
            };
        }

        if object.light {
            self.lights.push(hittable.clone());
        }
        Ok(hittable)
    }

    fn shape(shape: &ShapeDesc, material: Material) -> Hittable {
        match shape {
            ShapeDesc::Sphere {
                center,
                radius,
                center1: Some(center1),
            } => Sphere::moving(*center, *center1, *radius, material).into(),
            ShapeDesc::Sphere { center, radius, .. } => Sphere::new(*center, *radius, material).into(),
            ShapeDesc::Quad { q, u, v } => Quad::new(*q, *u, *v, material).into(),
            ShapeDesc::Box { a, b } => make_box(*a, *b, material).into(),
            ShapeDesc::Group { .. } => HittableList::new().into(),
        }
    }

    fn medium(&mut self, boundary: Hittable, medium: &MediumDesc) -> ConstantMedium {
        let albedo = self.texture(&medium.albedo);
        ConstantMedium::new(boundary, medium.density, albedo)
    }

    fn material(&mut self, desc: &MaterialDesc) -> Material {
        match desc {
            MaterialDesc::Lambertian { albedo } => Material::lambertian(self.texture(albedo)),
            MaterialDesc::Metal { albedo, fuzz } => Material::metal(*albedo, *fuzz),
            MaterialDesc::Dielectric { refraction_index } => Material::dielectric(*refraction_index),
            MaterialDesc::DiffuseLight { emit } => Material::diffuse_light(self.texture(emit)),
            MaterialDesc::Isotropic { albedo } => Material::isotropic(self.texture(albedo)),
        }
    }

    fn texture(&mut self, texture: &TextureRef) -> Texture {
        match texture {
            TextureRef::Color(color) => Texture::Solid(*color),
            TextureRef::Texture(TextureDesc::Solid { color }) => Texture::Solid(*color),
            TextureRef::Texture(TextureDesc::Checker { scale, even, odd }) => {
                let even = self.texture(even);
                let odd = self.texture(odd);
                Texture::checker(*scale, even, odd)
            }
            TextureRef::Texture(TextureDesc::Image { path }) => match self.textures.load(path) {
                Ok(image) => Texture::Image(image),
                Err(err) => {
                    log::warn!("Using debug colour for texture {}: {}", path, err);
                    Texture::Solid(MISSING_TEXTURE)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_math::Vec3;

    const CORNELL_SMOKE: &str = r#"{
        "camera": { "image_width": 20, "samples_per_pixel": 4, "seed": 3,
                    "lookfrom": [278, 278, -800], "lookat": [278, 278, 0], "vfov": 40 },
        "materials": {
            "red":   { "type": "lambertian", "albedo": [0.65, 0.05, 0.05] },
            "white": { "type": "lambertian", "albedo": [0.73, 0.73, 0.73] },
            "light": { "type": "diffuse_light", "emit": [7, 7, 7] },
            "glass": { "type": "dielectric", "refraction_index": 1.5 },
            "board": { "type": "lambertian",
                       "albedo": { "type": "checker", "scale": 10,
                                   "even": [0, 0, 0], "odd": [1, 1, 1] } },
            "photo": { "type": "lambertian",
                       "albedo": { "type": "image", "path": "does/not/exist.png" } }
        },
        "objects": [
            { "shape": { "type": "quad", "q": [555, 0, 0], "u": [0, 555, 0], "v": [0, 0, 555] },
              "material": "red" },
            { "shape": { "type": "quad", "q": [113, 554, 127], "u": [330, 0, 0], "v": [0, 0, 305] },
              "material": "light", "light": true },
            { "shape": { "type": "box", "a": [0, 0, 0], "b": [165, 330, 165] },
              "material": "white",
              "transforms": [ { "rotate_y": 15 }, { "translate": [265, 0, 295] } ],
              "medium": { "density": 0.01, "albedo": [0, 0, 0] } },
            { "shape": { "type": "sphere", "center": [190, 90, 190], "radius": 90 },
              "material": "glass", "light": true },
            { "shape": { "type": "group", "objects": [
                { "shape": { "type": "sphere", "center": [400, 400, 200], "radius": 50,
                             "center1": [430, 400, 200] }, "material": "board" },
                { "shape": { "type": "sphere", "center": [100, 400, 200], "radius": 50 },
                  "material": "photo" } ] } }
        ]
    }"#;

    #[test]
    fn test_from_description_builds_world_and_lights() {
        let desc = SceneDescription::from_json_str(CORNELL_SMOKE).unwrap();
        let scene = Scene::from_description(&desc).unwrap();

        match scene.world() {
            Some(Hittable::Bvh(bvh)) => {
                assert_eq!(bvh.primitive_count(), 5);
                assert!(bvh.check_bounds());
            }
            other => panic!("expected a BVH world, got {:?}", other.is_some()),
        }
        match scene.lights() {
            Some(Hittable::List(lights)) => assert_eq!(lights.len(), 2),
            other => panic!("expected a light list, got {:?}", other.is_some()),
        }
    }

    #[test]
    fn test_transforms_apply_in_order() {
        let desc = SceneDescription::from_json_str(
            r#"{
                "materials": { "white": { "type": "lambertian", "albedo": [0.73, 0.73, 0.73] } },
                "objects": [
                    { "shape": { "type": "box", "a": [0, 0, 0], "b": [165, 330, 165] },
                      "material": "white",
                      "transforms": [ { "rotate_y": 15 }, { "translate": [265, 0, 295] } ] }
                ]
            }"#,
        )
        .unwrap();
        let scene = Scene::from_description(&desc).unwrap();
        let bbox = scene.world().unwrap().bounding_box();

        // Rotating after the translation would swing the box past x = 330
        assert!(bbox.x.contains(300.0));
        assert!(bbox.z.contains(300.0));
        assert!(!bbox.x.contains(500.0));
    }

    #[test]
    fn test_missing_image_falls_back_to_debug_colour() {
        let desc = SceneDescription::from_json_str(CORNELL_SMOKE).unwrap();
        let mut builder = SceneBuilder {
            desc: &desc,
            textures: TextureCache::new(),
            rng: StdRng::seed_from_u64(0),
            lights: Vec::new(),
        };

        let texture = builder.texture(&TextureRef::Texture(TextureDesc::Image {
            path: "does/not/exist.png".into(),
        }));
        assert_eq!(texture.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE);
    }

    #[test]
    fn test_unknown_material_is_an_error() {
        let mut desc = SceneDescription::default();
        desc.objects.push(ObjectDesc::new(
            ShapeDesc::Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
                center1: None,
            },
            "nope",
        ));

        assert!(matches!(
            Scene::from_description(&desc),
            Err(crate::RenderError::Scene(lux_core::SceneError::UnknownMaterial(_)))
        ));
    }

    #[test]
    fn test_empty_description_has_no_world() {
        let scene = Scene::from_description(&SceneDescription::default()).unwrap();
        assert!(scene.world().is_none());
        assert!(scene.lights().is_none());
    }

    #[test]
    fn test_bundled_scenes_build() {
        let files = [
            include_str!("../../../scenes/cornell.json"),
            include_str!("../../../scenes/smoke.json"),
            include_str!("../../../scenes/spheres.json"),
        ];
        for json in files {
            let desc = SceneDescription::from_json_str(json).unwrap();
            let scene = Scene::from_description(&desc).unwrap();
            assert!(scene.world().is_some());
        }
    }
}
