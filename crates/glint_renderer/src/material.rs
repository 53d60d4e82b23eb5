//! Surface materials: how light scatters off, or is emitted by, a hit point.

use glint_math::Vec3;
use rand::RngCore;

use crate::sampling::{chance, random_in_unit_sphere};
use crate::{HitRecord, Ray, Texture};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Componentwise filter applied to light arriving along `scattered`.
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Closed set of surface materials.
#[derive(Debug, Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    DiffuseLight(DiffuseLight),
}

impl Material {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => Some(m.scatter(ray_in, rec, rng)),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => Some(m.scatter(ray_in, rec, rng)),
            Material::DiffuseLight(_) => None,
        }
    }

    /// Light emitted at the given surface coordinate and point.
    ///
    /// Black for everything except lights.
    pub fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Material::DiffuseLight(light) => light.emit.value_at(u, v, p),
            _ => Color::ZERO,
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Texture,
}

impl Lambertian {
    pub fn new(albedo: impl Into<Texture>) -> Self {
        Self {
            albedo: albedo.into(),
        }
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        let mut scatter_direction = rec.normal + random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        ScatterResult {
            attenuation: self.albedo.value_at(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction, ray_in.time()),
        }
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Texture,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror. Negative values are treated as 0.
    pub fn new(albedo: impl Into<Texture>, fuzz: f32) -> Self {
        Self {
            albedo: albedo.into(),
            fuzz: fuzz.max(0.0),
        }
    }

    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Anything at or below the surface is absorbed
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value_at(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scattered_dir, ray_in.time()),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    tint: Texture,
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Clear glass.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self::tinted(Color::ONE, ior)
    }

    /// Glass whose transmission and reflection are filtered by `tint`.
    pub fn tinted(tint: impl Into<Texture>, ior: f32) -> Self {
        Self {
            tint: tint.into(),
            ior,
        }
    }

    /// Schlick's approximation for reflectance
    pub fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        let direction = ray_in.direction();
        let dir_dot_normal = direction.dot(rec.normal);
        let dir_length = direction.length();

        // Normals are never flipped toward the ray, so the sign tells us
        // whether we are leaving the medium.
        let (facing_normal, eta, cosine) = if dir_dot_normal > 0.0 {
            (-rec.normal, self.ior, self.ior * dir_dot_normal / dir_length)
        } else {
            (rec.normal, 1.0 / self.ior, -dir_dot_normal / dir_length)
        };

        let reflected = reflect(direction, rec.normal);

        // The exit-side cosine is scaled by the index and may exceed 1;
        // reflectance is then evaluated outside Schlick's nominal domain.
        let scattered_dir = match refract(direction.normalize(), facing_normal, eta) {
            Some(refracted) if !chance(rng, Self::reflectance(cosine, self.ior)) => refracted,
            _ => reflected,
        };

        ScatterResult {
            attenuation: self.tint.value_at(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scattered_dir, ray_in.time()),
        }
    }
}

/// Diffuse light emitter.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Texture,
}

impl DiffuseLight {
    pub fn new(emit: impl Into<Texture>) -> Self {
        Self { emit: emit.into() }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<DiffuseLight> for Material {
    fn from(m: DiffuseLight) -> Self {
        Material::DiffuseLight(m)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Snell refraction of unit vector `uv` through a surface with unit normal
/// `n` facing it. `None` when no real solution exists (total internal
/// reflection).
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = n.dot(uv);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        None
    } else {
        Some(eta * uv - (eta * cos_i + k.sqrt()) * n)
    }
}
