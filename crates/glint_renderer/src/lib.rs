//! Glint - offline CPU path tracer
//!
//! A Monte Carlo path tracer over spheres with procedural and image
//! textures, diffuse/metal/glass/emissive materials, a BVH, a thin-lens
//! camera with motion blur, and a banded multi-threaded renderer.
//!
//! Typical flow: fill a [`Scene`], build a [`Camera`], then call [`render`]
//! with a [`RenderConfig`].

mod band;
mod bvh;
mod camera;
mod error;
mod hittable;
mod image_io;
mod integrator;
mod material;
mod perlin;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod texture;

pub use band::{generate_bands, render_band, row_seed, Band, Progress};
pub use bvh::{Bvh, BvhNode};
pub use camera::{Camera, CameraBuilder};
pub use error::{
    RenderError, RenderResult, SceneError, SceneResult, TextureError, TextureResult,
};
pub use hittable::{hit_linear, HitRecord, Primitive};
pub use image_io::load_pixels;
pub use integrator::{seen_color, Integrator, MAX_DEPTH, T_MIN};
pub use material::{
    Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult,
};
pub use perlin::{Perlin, TURBULENCE_DEPTH};
pub use renderer::{
    clamp_01, color_to_rgb8, linear_to_gamma, render, render_pixel, ImageBuffer, RenderConfig,
    Rgb,
};
pub use scene::{PrimitiveId, Scene};
pub use sphere::Sphere;
pub use texture::{
    uv_on_sphere, CheckerTexture, ImageTexture, NoiseTexture, NoiseTransform, Texture,
};

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Aabb, Interval, Ray, Vec3};
