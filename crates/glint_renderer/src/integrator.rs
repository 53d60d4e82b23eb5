//! Recursive Monte Carlo radiance estimate.

use glint_math::Interval;
use rand::RngCore;

use crate::{Color, Ray, Scene};

/// Bounce limit: a path at this depth returns emission only.
pub const MAX_DEPTH: u32 = 50;

/// Near clip for secondary rays, to avoid re-hitting the surface they
/// left from.
pub const T_MIN: f32 = 1e-4;

/// Path tracer with a fixed recursion cap and no Russian roulette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integrator {
    pub max_depth: u32,
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

impl Integrator {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Radiance arriving along `ray`, counting `depth` bounces so far.
    ///
    /// Misses return the sky. Hits return the material's emission, plus the
    /// attenuated radiance of the scattered ray while `depth` is below the
    /// cap.
    pub fn seen_color(&self, ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
        let Some(rec) = scene.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
            return scene.sky_color(ray);
        };

        let emitted = rec.material.emitted(rec.u, rec.v, rec.p);
        if depth >= self.max_depth {
            return emitted;
        }

        match rec.material.scatter(ray, &rec, rng) {
            Some(s) => emitted + s.attenuation * self.seen_color(&s.scattered, scene, depth + 1, rng),
            None => emitted,
        }
    }
}

/// [`Integrator::seen_color`] with the default depth cap.
pub fn seen_color(ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
    Integrator::default().seen_color(ray, scene, depth, rng)
}
