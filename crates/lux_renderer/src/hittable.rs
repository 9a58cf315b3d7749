//! Hittable geometry and HitRecord for ray-object intersection.
//!
//! Geometry is a closed set of variants dispatched with `match`, so adding a
//! primitive means touching every operation here.

use crate::{Bvh, ConstantMedium, Material, Quad, Rotate, Sphere, Translate};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::{Rng, RngCore};

/// Record of a ray-object intersection.
#[derive(Debug, Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record at parameter `t`, orienting `outward_normal` against
    /// the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: &'a Material,
        (u, v): (f32, f32),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Anything a ray can hit.
#[derive(Debug, Clone)]
pub enum Hittable {
    Sphere(Sphere),
    Quad(Quad),
    List(HittableList),
    Medium(ConstantMedium),
    Translate(Translate),
    Rotate(Rotate),
    Bvh(Bvh),
}

impl Hittable {
    /// Nearest intersection with `ray_t`, if any.
    ///
    /// The generator is only consumed by participating media, which sample a
    /// scattering distance.
    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            Hittable::Sphere(sphere) => sphere.hit(ray, ray_t),
            Hittable::Quad(quad) => quad.hit(ray, ray_t),
            Hittable::List(list) => list.hit(ray, ray_t, rng),
            Hittable::Medium(medium) => medium.hit(ray, ray_t, rng),
            Hittable::Translate(translate) => translate.hit(ray, ray_t, rng),
            Hittable::Rotate(rotate) => rotate.hit(ray, ray_t, rng),
            Hittable::Bvh(bvh) => bvh.hit(ray, ray_t, rng),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Hittable::Sphere(sphere) => sphere.bounding_box(),
            Hittable::Quad(quad) => quad.bounding_box(),
            Hittable::List(list) => list.bounding_box(),
            Hittable::Medium(medium) => medium.bounding_box(),
            Hittable::Translate(translate) => translate.bounding_box(),
            Hittable::Rotate(rotate) => rotate.bounding_box(),
            Hittable::Bvh(bvh) => bvh.bounding_box(),
        }
    }

    /// Solid-angle density of choosing `direction` from `origin` when
    /// sampling this object with [`Hittable::random`].
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        match self {
            Hittable::Sphere(sphere) => sphere.pdf_value(origin, direction),
            Hittable::Quad(quad) => quad.pdf_value(origin, direction),
            Hittable::List(list) => list.pdf_value(origin, direction),
            Hittable::Translate(translate) => translate.pdf_value(origin, direction),
            Hittable::Rotate(rotate) => rotate.pdf_value(origin, direction),
            Hittable::Medium(medium) => medium.pdf_value(origin, direction),
            Hittable::Bvh(bvh) => bvh.pdf_value(origin, direction),
        }
    }

    /// Random direction from `origin` toward this object.
    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Hittable::Sphere(sphere) => sphere.random(origin, rng),
            Hittable::Quad(quad) => quad.random(origin, rng),
            Hittable::List(list) => list.random(origin, rng),
            Hittable::Translate(translate) => translate.random(origin, rng),
            Hittable::Rotate(rotate) => rotate.random(origin, rng),
            Hittable::Medium(medium) => medium.random(origin, rng),
            Hittable::Bvh(bvh) => bvh.random(origin, rng),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Hittable {
                fn from(object: $variant) -> Self {
                    Hittable::$variant(object)
                }
            }
        )*
    };
}

impl_from_variant!(Sphere, Quad, Translate, Rotate, Bvh);

impl From<ConstantMedium> for Hittable {
    fn from(medium: ConstantMedium) -> Self {
        Hittable::Medium(medium)
    }
}

impl From<HittableList> for Hittable {
    fn from(list: HittableList) -> Self {
        Hittable::List(list)
    }
}

/// A list of hittable objects, tested linearly.
#[derive(Debug, Clone, Default)]
pub struct HittableList {
    objects: Vec<Hittable>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: impl Into<Hittable>) {
        let object = object.into();
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Hittable] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max), rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Average of the members' densities.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    /// Direction toward a uniformly chosen member.
    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let index = rng.gen_range(0..self.objects.len());
        self.objects[index].random(origin, rng)
    }
}

impl FromIterator<Hittable> for HittableList {
    fn from_iter<I: IntoIterator<Item = Hittable>>(iter: I) -> Self {
        let mut list = HittableList::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}
