//! Render driver.
//!
//! Implements Monte Carlo path tracing with:
//! - Jittered multi-sampling for anti-aliasing
//! - Gamma correction (gamma = 2.0) and 8-bit quantization
//! - Fork-join over horizontal bands on a fixed-size worker pool

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::band::{generate_bands, render_band, Progress};
use crate::error::{RenderError, RenderResult};
use crate::sampling::gen_f32;
use crate::{Camera, Color, Integrator, Scene, MAX_DEPTH};

/// One output pixel: gamma-corrected 8-bit RGB.
pub type Rgb = [u8; 3];

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Worker threads, one band of rows each
    pub thread_count: usize,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Seed for all sampling; equal seeds give identical images
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            samples_per_pixel: 100,
            thread_count: default_thread_count(),
            max_depth: MAX_DEPTH,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn new(width: u32, height: u32, samples_per_pixel: u32, thread_count: usize) -> Self {
        Self {
            width,
            height,
            samples_per_pixel,
            thread_count,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.thread_count == 0 {
            return Err(RenderError::InvalidConfig(
                "thread_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Gamma-correct a linear color and quantize it to 8 bits per channel.
pub fn color_to_rgb8(color: Color) -> Rgb {
    let quantize = |c: f32| (255.99 * clamp_01(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Average linear radiance over `samples_per_pixel` jittered samples of
/// pixel `(x, y)`, with `y = 0` the top row.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    integrator: &Integrator,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let inv_width = 1.0 / config.width as f32;
    let inv_height = 1.0 / config.height as f32;
    // Film t runs bottom-to-top
    let row_from_bottom = (config.height - 1 - y) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) * inv_width;
        let t = (row_from_bottom + gen_f32(rng)) * inv_height;
        let ray = camera.shoot_ray_at(s, t, rng);
        pixel_color += integrator.seen_color(&ray, scene, 0, rng);
    }

    pixel_color / config.samples_per_pixel as f32
}

/// Rendered image: row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl ImageBuffer {
    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Packed RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy into an `image` buffer for encoding.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
    }
}

/// Render the scene.
///
/// Builds the scene's BVH first if it isn't built yet, then renders one band
/// of rows per worker on a pool of `config.thread_count` threads. The scene
/// and camera are shared read-only by all workers.
pub fn render(scene: &mut Scene, camera: &Camera, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    config.validate()?;

    if !scene.has_bvh() {
        let mut rng = StdRng::seed_from_u64(config.seed);
        scene.build_bvh(camera.shutter(), &mut rng)?;
    }
    let scene: &Scene = scene;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.thread_count)
        .thread_name(|i| format!("glint-worker-{i}"))
        .build()?;

    let bands = generate_bands(config.height, config.thread_count);
    log::info!(
        "Rendering {}x{} @ {} spp on {} threads ({} bands)",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.thread_count,
        bands.len()
    );

    let start = Instant::now();
    let progress = Progress::new();
    // collect() on an indexed parallel iterator keeps band order
    let band_pixels: Vec<Vec<Rgb>> = pool.install(|| {
        bands
            .par_iter()
            .map(|band| render_band(band, scene, camera, config, &progress))
            .collect()
    });

    let pixels: Vec<Rgb> = band_pixels.into_iter().flatten().collect();
    log::info!(
        "Rendered {} rows in {:?}",
        progress.rows_done(),
        start.elapsed()
    );

    Ok(ImageBuffer {
        width: config.width,
        height: config.height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dielectric, DiffuseLight, Lambertian, Metal, Texture};
    use glint_math::{Interval, Vec3};

    fn red_sphere_scene() -> Scene {
        let mut scene = Scene::with_sky(Color::ONE);
        scene.add_sphere(Vec3::ZERO, 1.0, Lambertian::new(Color::new(0.8, 0.0, 0.0)));
        scene
    }

    fn looking_at_origin(aspect_ratio: f32) -> Camera {
        Camera::builder()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.0)
            .with_aspect_ratio(aspect_ratio)
            .with_shutter(Interval::new(0.0, 1.0))
            .build()
    }

    fn busy_scene() -> Scene {
        let mut scene = Scene::with_sky(Color::new(0.5, 0.7, 1.0));
        scene.add_sphere(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Lambertian::new(Texture::checker(
                10.0,
                Color::new(0.2, 0.3, 0.1).into(),
                Color::splat(0.9).into(),
            )),
        );
        scene.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, Lambertian::new(Color::new(0.1, 0.2, 0.5)));
        scene.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, Dielectric::new(1.5));
        scene.add_sphere(Vec3::new(-1.0, 0.0, -1.0), -0.45, Dielectric::new(1.5));
        scene.add_sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, Metal::new(Color::new(0.8, 0.6, 0.2), 0.2));
        scene.add_moving_sphere(
            Vec3::new(0.0, 0.8, -1.5),
            Vec3::new(0.3, 1.0, -1.5),
            Interval::new(0.0, 1.0),
            0.25,
            Lambertian::new(Color::new(0.9, 0.9, 0.2)),
        );
        scene
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, -1.0, f32::NAN)), [127, 0, 0]);
    }

    #[test]
    fn test_validate_rejects_degenerate_settings() {
        assert!(RenderConfig::new(0, 10, 1, 1).validate().is_err());
        assert!(RenderConfig::new(10, 10, 0, 1).validate().is_err());
        assert!(RenderConfig::new(10, 10, 1, 0).validate().is_err());
        assert!(RenderConfig::new(10, 10, 1, 1).validate().is_ok());
    }

    #[test]
    fn test_render_config_serde_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{ "width": 64, "seed": 9 }"#).unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.seed, 9);
        assert_eq!(config.height, RenderConfig::default().height);
        assert_eq!(config.max_depth, MAX_DEPTH);
    }

    #[test]
    fn test_render_output_layout() {
        let mut scene = red_sphere_scene();
        let camera = looking_at_origin(2.0);
        let config = RenderConfig::new(8, 4, 1, 2);

        let image = render(&mut scene, &camera, &config).unwrap();
        assert_eq!(image.pixels.len(), 32);
        assert_eq!(image.as_bytes().len(), 96);
        assert!(scene.has_bvh());

        let rgb = image.to_rgb_image().unwrap();
        assert_eq!(rgb.dimensions(), (8, 4));
        assert_eq!(rgb.get_pixel(3, 2).0, image.get(3, 2));
    }

    #[test]
    fn test_red_sphere_end_to_end() {
        let mut scene = red_sphere_scene();
        let camera = looking_at_origin(1.0);
        let config = RenderConfig::new(9, 9, 16, 3).with_seed(5);

        let image = render(&mut scene, &camera, &config).unwrap();

        // Center sees the sphere: attenuated red
        let [r, g, b] = image.get(4, 4);
        let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        assert!(r > 0.6 && r < 0.95, "red channel {r}");
        assert!(g < 0.3 && b < 0.3, "green {g} blue {b}");

        // Corners miss the sphere and see the background exactly
        for (x, y) in [(0, 0), (8, 0), (0, 8), (8, 8)] {
            assert_eq!(image.get(x, y), [255, 255, 255], "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_top_row_is_first() {
        // Emitter above the horizon line only: top rows bright, bottom rows dark.
        let mut scene = Scene::with_sky(Color::ZERO);
        scene.add_sphere(Vec3::new(0.0, 50.0, 0.0), 49.0, DiffuseLight::new(Color::ONE));
        let camera = looking_at_origin(1.0);
        let config = RenderConfig::new(4, 6, 1, 2);

        let image = render(&mut scene, &camera, &config).unwrap();
        assert_eq!(image.get(1, 0), [255, 255, 255]);
        assert_eq!(image.get(1, 5), [0, 0, 0]);
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let camera = Camera::builder()
            .with_position(Vec3::new(0.0, 0.5, 1.5), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(60.0, 0.05)
            .with_aspect_ratio(1.5)
            .build();

        let mut images = Vec::new();
        for threads in [1, 2, 3, 7] {
            let mut scene = busy_scene();
            let config = RenderConfig::new(15, 10, 4, threads).with_seed(1234);
            images.push(render(&mut scene, &camera, &config).unwrap());
        }

        for image in &images[1..] {
            assert_eq!(image.as_bytes(), images[0].as_bytes());
        }
    }

    #[test]
    fn test_render_reports_unbounded_primitive() {
        let mut scene = red_sphere_scene();
        scene.add_sphere(Vec3::ZERO, f32::INFINITY, Lambertian::new(Color::ONE));
        let config = RenderConfig::new(4, 4, 1, 1);

        let result = render(&mut scene, &looking_at_origin(1.0), &config);
        assert!(matches!(result, Err(RenderError::Scene(_))));
    }
}
