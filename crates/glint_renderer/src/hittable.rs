//! Primitive shapes and the HitRecord produced by ray intersection.

use crate::{Material, Ray, Sphere};
use glint_math::{Aabb, Interval, Vec3};

/// Record of a ray-object intersection.
///
/// Borrows the material of the primitive that was hit, so it cannot outlive
/// the scene query that produced it.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit outward normal of the primitive. Not flipped to face the ray.
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Surface coordinates in [0, 1]
    pub u: f32,
    pub v: f32,
}

/// Closed set of scene shapes.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
}

impl Primitive {
    /// Nearest intersection with parameter strictly inside `ray_t`.
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Primitive::Sphere(sphere) => sphere.hit(ray, ray_t),
        }
    }

    /// Box enclosing the primitive over the time interval, or `None` if the
    /// primitive is unbounded.
    pub fn bounding_box(&self, time: Interval) -> Option<Aabb> {
        match self {
            Primitive::Sphere(sphere) => sphere.bounding_box(time),
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(sphere) => sphere.material(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

/// Nearest hit over a slice of primitives by brute force.
pub fn hit_linear<'a>(
    primitives: &'a [Primitive],
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let mut closest: Option<HitRecord<'a>> = None;
    let mut closest_so_far = ray_t.max;

    for primitive in primitives {
        if let Some(rec) = primitive.hit(ray, Interval::new(ray_t.min, closest_so_far)) {
            closest_so_far = rec.t;
            closest = Some(rec);
        }
    }

    closest
}
