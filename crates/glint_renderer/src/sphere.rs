//! Sphere primitive for ray tracing.

use crate::hittable::HitRecord;
use crate::texture::uv_on_sphere;
use crate::{Material, Ray};
use glint_math::{Aabb, Interval, Vec3};

/// A sphere, optionally moving linearly between two centers over a time
/// interval (motion blur).
///
/// A negative radius keeps the geometry of `|radius|` but turns normals
/// inward, which is how hollow glass shells are modelled.
#[derive(Debug, Clone)]
pub struct Sphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    inv_time_span: f32,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: impl Into<Material>) -> Self {
        Self::moving(center, center, Interval::new(0.0, 0.0), radius, material)
    }

    /// Create a sphere whose center moves from `center0` at `time.min` to
    /// `center1` at `time.max`.
    pub fn moving(
        center0: Vec3,
        center1: Vec3,
        time: Interval,
        radius: f32,
        material: impl Into<Material>,
    ) -> Self {
        let span = time.size();
        Self {
            center0,
            center1,
            time0: time.min,
            inv_time_span: if span != 0.0 { 1.0 / span } else { 0.0 },
            radius,
            material: material.into(),
        }
    }

    /// Center position at the given time.
    pub fn center(&self, time: f32) -> Vec3 {
        let s = (time - self.time0) * self.inv_time_span;
        self.center0 + s * (self.center1 - self.center0)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let center = self.center(ray.time());
        let oc = ray.origin() - center;
        let a = ray.direction().length_squared();
        let b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let offset = p - center;
        let normal = offset / self.radius;
        // Surface coordinates ignore the radius sign
        let (u, v) = uv_on_sphere(offset / self.radius.abs());

        Some(HitRecord {
            t: root,
            p,
            normal,
            material: &self.material,
            u,
            v,
        })
    }

    /// Union of the boxes at both ends of the motion. `None` when the
    /// sphere is not finite.
    pub fn bounding_box(&self, _time: Interval) -> Option<Aabb> {
        let r = self.radius.abs();
        if !r.is_finite() || !self.center0.is_finite() || !self.center1.is_finite() {
            return None;
        }

        let rvec = Vec3::splat(r);
        let box0 = Aabb::from_points(self.center0 - rvec, self.center0 + rvec);
        let box1 = Aabb::from_points(self.center1 - rvec, self.center1 + rvec);
        Some(Aabb::surrounding(&box0, &box1))
    }
}
