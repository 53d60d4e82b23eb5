//! Scene: primitive storage, sky texture and the BVH over them.

use rand::RngCore;

use crate::bvh::Bvh;
use crate::error::SceneResult;
use crate::hittable::{hit_linear, HitRecord, Primitive};
use crate::texture::uv_on_sphere;
use crate::{Color, Material, Ray, Sphere, Texture};
use glint_math::{Aabb, Interval, Vec3};

/// Index of a primitive inside its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub usize);

/// Everything a render needs besides the camera.
///
/// Primitives are added while the scene is mutable. [`Scene::build_bvh`]
/// must run before rendering starts; afterwards the scene is only read,
/// from any number of threads.
#[derive(Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    sky: Texture,
    bbox: Aabb,
    bvh: Option<Bvh>,
}

impl Scene {
    /// Empty scene with a white sky.
    pub fn new() -> Self {
        Self::with_sky(Color::ONE)
    }

    pub fn with_sky(sky: impl Into<Texture>) -> Self {
        Self {
            primitives: Vec::new(),
            sky: sky.into(),
            bbox: Aabb::EMPTY,
            bvh: None,
        }
    }

    /// Add a primitive and return its handle.
    ///
    /// Invalidates any previously built BVH.
    pub fn add(&mut self, primitive: impl Into<Primitive>) -> PrimitiveId {
        let primitive = primitive.into();
        match primitive.bounding_box(Interval::UNIVERSE) {
            Some(bbox) => self.bbox = Aabb::surrounding(&self.bbox, &bbox),
            None => log::warn!(
                "Primitive {} has no bounding box; BVH construction will fail",
                self.primitives.len()
            ),
        }

        self.primitives.push(primitive);
        self.bvh = None;
        PrimitiveId(self.primitives.len() - 1)
    }

    /// Add a stationary sphere.
    pub fn add_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        material: impl Into<Material>,
    ) -> PrimitiveId {
        self.add(Sphere::new(center, radius, material))
    }

    /// Add a sphere moving from `center0` to `center1` over `time`.
    pub fn add_moving_sphere(
        &mut self,
        center0: Vec3,
        center1: Vec3,
        time: Interval,
        radius: f32,
        material: impl Into<Material>,
    ) -> PrimitiveId {
        self.add(Sphere::moving(center0, center1, time, radius, material))
    }

    pub fn set_sky(&mut self, sky: impl Into<Texture>) {
        self.sky = sky.into();
    }

    pub fn sky(&self) -> &Texture {
        &self.sky
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.0)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Running union of all primitive boxes.
    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Build the BVH over all primitives. Fatal on failure: the scene is
    /// malformed and must not be rendered.
    pub fn build_bvh(&mut self, time: Interval, rng: &mut dyn RngCore) -> SceneResult<()> {
        let bvh = Bvh::build(&self.primitives, time, rng)?;
        log::info!("Scene BVH ready: {} primitives", bvh.primitive_count());
        self.bvh = Some(bvh);
        Ok(())
    }

    pub fn has_bvh(&self) -> bool {
        self.bvh.is_some()
    }

    /// Nearest hit within `ray_t`.
    ///
    /// Uses the BVH when built, a linear scan otherwise.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match &self.bvh {
            Some(bvh) => bvh.hit(&self.primitives, ray, ray_t),
            None => self.hit_linear(ray, ray_t),
        }
    }

    /// Nearest hit by testing every primitive.
    pub fn hit_linear(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        hit_linear(&self.primitives, ray, ray_t)
    }

    /// Background radiance for a ray that escapes the scene.
    pub fn sky_color(&self, ray: &Ray) -> Color {
        let (u, v) = uv_on_sphere(ray.direction().normalize());
        self.sky.value_at(u, v, ray.origin() + ray.direction())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
