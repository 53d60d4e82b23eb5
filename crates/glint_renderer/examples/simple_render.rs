//! Simple path tracer example.
//!
//! Renders a field of random spheres and saves it as a PNG.
//!
//! Usage: `simple_render [config.json] [output.png] [sky.png]`
//!
//! The optional JSON file overrides any [`RenderConfig`] field, e.g.
//! `{ "width": 400, "height": 225, "samples_per_pixel": 16 }`.
//! Set `RUST_LOG=debug` (or `trace` for per-row progress) for more output.

use anyhow::{Context, Result};
use glint_renderer::{
    render, Camera, Color, Dielectric, DiffuseLight, ImageTexture, Interval, Lambertian, Metal,
    NoiseTexture, NoiseTransform, RenderConfig, Scene, Texture, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => load_config(path)?,
        None => RenderConfig {
            width: 800,
            height: 450,
            samples_per_pixel: 50,
            ..Default::default()
        },
    };
    let output = args.get(1).map(String::as_str).unwrap_or("output.png");

    // Build the scene
    let start = std::time::Instant::now();
    let mut scene = build_scene(config.seed);
    if let Some(sky_path) = args.get(2) {
        let sky = ImageTexture::open(sky_path)
            .with_context(|| format!("failed to load sky texture {sky_path}"))?;
        log::info!("Sky texture {}x{}", sky.width(), sky.height());
        scene.set_sky(sky);
    }
    log::info!("Scene built in {:?} ({} spheres)", start.elapsed(), scene.len());

    // Set up camera
    let camera = Camera::builder()
        .with_position(
            Vec3::new(13.0, 2.0, 3.0), // look_from
            Vec3::new(0.0, 0.0, 0.0),  // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 0.1)
        .with_aspect_ratio(config.aspect_ratio())
        .with_shutter(Interval::new(0.0, 1.0))
        .build();

    let image = render(&mut scene, &camera, &config)?;

    let png = image
        .to_rgb_image()
        .context("rendered pixel count does not match image size")?;
    png.save(output)
        .with_context(|| format!("failed to write {output}"))?;
    log::info!("Saved to {output}");

    Ok(())
}

fn load_config(path: &str) -> Result<RenderConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config {path}"))?;
    let config: RenderConfig =
        serde_json::from_str(&text).with_context(|| format!("invalid config {path}"))?;
    Ok(config)
}

fn build_scene(seed: u64) -> Scene {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = Scene::with_sky(Color::new(0.5, 0.7, 1.0));

    // Ground
    scene.add_sphere(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(Texture::checker(
            10.0,
            Color::new(0.2, 0.3, 0.1).into(),
            Color::new(0.9, 0.9, 0.9).into(),
        )),
    );

    // Three main spheres: hollow glass, marble, polished metal
    scene.add_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, Dielectric::new(1.5));
    scene.add_sphere(Vec3::new(0.0, 1.0, 0.0), -0.9, Dielectric::new(1.5));
    scene.add_sphere(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(NoiseTexture::with_transform(
            4.0,
            Color::ONE,
            NoiseTransform::Marble,
            &mut rng,
        )),
    );
    scene.add_sphere(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    );

    // A light overhead
    scene.add_sphere(
        Vec3::new(0.0, 7.0, 0.0),
        2.0,
        DiffuseLight::new(Color::splat(4.0)),
    );

    // Small random spheres
    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            if choose_mat < 0.8 {
                // Diffuse, bouncing during the shutter
                let albedo = Color::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                let center1 = center + Vec3::new(0.0, 0.5 * rng.gen::<f32>(), 0.0);
                scene.add_moving_sphere(
                    center,
                    center1,
                    Interval::new(0.0, 1.0),
                    0.2,
                    Lambertian::new(albedo),
                );
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::new(
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                );
                let fuzz = 0.5 * rng.gen::<f32>();
                scene.add_sphere(center, 0.2, Metal::new(albedo, fuzz));
            } else {
                // Tinted glass
                let tint = Color::new(
                    0.7 + 0.3 * rng.gen::<f32>(),
                    0.7 + 0.3 * rng.gen::<f32>(),
                    0.7 + 0.3 * rng.gen::<f32>(),
                );
                scene.add_sphere(center, 0.2, Dielectric::tinted(tint, 1.5));
            }
        }
    }

    scene
}
