//! Textures: colors evaluated at a surface coordinate and a world point.
//!
//! A closed set of variants dispatched by `match`. Textures nest (a checker
//! holds two child textures) and are cheap to clone: large payloads such as
//! pixel grids and noise tables sit behind `Arc`.

use std::f32::consts::PI;
use std::path::Path;
use std::sync::Arc;

use glint_math::Vec3;
use rand::RngCore;

use crate::error::{SceneError, SceneResult, TextureResult};
use crate::perlin::{Perlin, TURBULENCE_DEPTH};
use crate::Color;

/// A color source for materials and the sky.
#[derive(Debug, Clone)]
pub enum Texture {
    Constant(Color),
    Checker(CheckerTexture),
    Image(ImageTexture),
    Noise(NoiseTexture),
}

impl Texture {
    /// Constant-color texture.
    pub fn constant(color: Color) -> Self {
        Texture::Constant(color)
    }

    /// 3D checker alternating between `odd` and `even`.
    pub fn checker(scale: f32, odd: Texture, even: Texture) -> Self {
        Texture::Checker(CheckerTexture::new(scale, odd, even))
    }

    /// Evaluate the texture at surface coordinate `(u, v)` and point `p`.
    pub fn value_at(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Constant(color) => *color,
            Texture::Checker(checker) => checker.value_at(u, v, p),
            Texture::Image(image) => image.value_at(u, v),
            Texture::Noise(noise) => noise.value_at(p),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Constant(color)
    }
}

impl From<CheckerTexture> for Texture {
    fn from(checker: CheckerTexture) -> Self {
        Texture::Checker(checker)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::Image(image)
    }
}

impl From<NoiseTexture> for Texture {
    fn from(noise: NoiseTexture) -> Self {
        Texture::Noise(noise)
    }
}

/// Spatial checker pattern, independent of surface coordinates.
#[derive(Debug, Clone)]
pub struct CheckerTexture {
    scale: f32,
    odd: Box<Texture>,
    even: Box<Texture>,
}

impl CheckerTexture {
    pub fn new(scale: f32, odd: Texture, even: Texture) -> Self {
        Self {
            scale,
            odd: Box::new(odd),
            even: Box::new(even),
        }
    }

    fn value_at(&self, u: f32, v: f32, p: Vec3) -> Color {
        let s = self.scale * p;
        let sines = s.x.sin() * s.y.sin() * s.z.sin();
        if sines < 0.0 {
            self.odd.value_at(u, v, p)
        } else {
            self.even.value_at(u, v, p)
        }
    }
}

/// Nearest-sample lookup into a pixel grid.
///
/// `u` maps across the width; `v` runs bottom-to-top while rows are stored
/// top-to-bottom, so it is flipped.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    width: usize,
    height: usize,
    pixels: Arc<[Color]>,
}

impl ImageTexture {
    /// Wrap a row-major pixel grid. Fails if the grid doesn't match the
    /// dimensions or is empty.
    pub fn new(pixels: Vec<Color>, width: usize, height: usize) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::EmptyImage);
        }
        let expected = width * height;
        if pixels.len() != expected {
            return Err(SceneError::ImageSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Decode an image file from disk.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let (pixels, width, height) = crate::image_io::load_pixels(path.as_ref())?;
        Ok(Self::new(pixels, width, height)?)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn value_at(&self, u: f32, v: f32) -> Color {
        // Float-to-usize casts saturate: negatives and NaN become 0.
        let i = ((u * self.width as f32) as usize).min(self.width - 1);
        let j = (((1.0 - v) * self.height as f32 - 0.001) as usize).min(self.height - 1);
        self.pixels[i + j * self.width]
    }
}

/// How raw noise is shaped before tinting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseTransform {
    /// Raw gradient noise, roughly [-1, 1].
    Raw,
    /// `0.5 * (1 + noise)`, remapped into [0, 1].
    #[default]
    Normalized,
    /// Summed octaves of `|noise|`.
    Turbulence,
    /// Marble veins: `0.5 * (1 + sin(p.z + 10 * turbulence))`.
    Marble,
}

/// Procedural noise texture.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    noise: Arc<Perlin>,
    scale: f32,
    albedo: Color,
    transform: NoiseTransform,
}

impl NoiseTexture {
    /// White, normalized noise at the given frequency scale.
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self::with_transform(scale, Color::ONE, NoiseTransform::default(), rng)
    }

    pub fn with_transform(
        scale: f32,
        albedo: Color,
        transform: NoiseTransform,
        rng: &mut dyn RngCore,
    ) -> Self {
        Self {
            noise: Arc::new(Perlin::new(rng)),
            scale,
            albedo,
            transform,
        }
    }

    fn value_at(&self, p: Vec3) -> Color {
        let p = self.scale * p;
        let n = &self.noise;
        let intensity = match self.transform {
            NoiseTransform::Raw => n.noise(p),
            NoiseTransform::Normalized => 0.5 * (1.0 + n.noise(p)),
            NoiseTransform::Turbulence => n.turbulence(p, TURBULENCE_DEPTH),
            NoiseTransform::Marble => {
                0.5 * (1.0 + (p.z + 10.0 * n.turbulence(p, TURBULENCE_DEPTH)).sin())
            }
        };
        intensity * self.albedo
    }
}

/// Spherical surface coordinates of a unit-length direction.
///
/// Longitude maps to `u`, latitude to `v`; both land in [0, 1].
pub fn uv_on_sphere(unit: Vec3) -> (f32, f32) {
    let u = 1.0 - (unit.z.atan2(unit.x) + PI) / (2.0 * PI);
    let v = (unit.y.clamp(-1.0, 1.0).asin() + PI / 2.0) / PI;
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_constant_ignores_inputs() {
        let tex = Texture::constant(Color::new(0.2, 0.4, 0.6));
        assert_eq!(tex.value_at(0.0, 0.0, Vec3::ZERO), Color::new(0.2, 0.4, 0.6));
        assert_eq!(tex.value_at(0.9, 0.1, Vec3::splat(42.0)), Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_checker_depends_on_point_only() {
        let odd = Color::new(1.0, 0.0, 0.0);
        let even = Color::new(0.0, 0.0, 1.0);
        let tex = Texture::checker(1.0, odd.into(), even.into());

        // sin(1)^3 > 0 -> even
        let p = Vec3::splat(1.0);
        assert_eq!(tex.value_at(0.0, 0.0, p), even);
        assert_eq!(tex.value_at(0.7, 0.3, p), even);

        // sin(-1) * sin(1) * sin(1) < 0 -> odd
        let q = Vec3::new(-1.0, 1.0, 1.0);
        assert_eq!(tex.value_at(0.0, 0.0, q), odd);
    }

    #[test]
    fn test_checker_nests() {
        let inner = Texture::checker(1.0, Color::ZERO.into(), Color::ONE.into());
        let outer = Texture::checker(1.0, inner, Color::new(0.5, 0.5, 0.5).into());

        // Outer odd branch delegates to the inner checker at the same point.
        let q = Vec3::new(-1.0, 1.0, 1.0);
        assert_eq!(outer.value_at(0.0, 0.0, q), Color::ZERO);
    }

    #[test]
    fn test_image_lookup_flips_v_and_clamps() {
        // 2x2: top row red/green, bottom row blue/white
        let pixels = vec![
            Color::new(1.0, 0.0, 0.0),
            Color::new(0.0, 1.0, 0.0),
            Color::new(0.0, 0.0, 1.0),
            Color::ONE,
        ];
        let tex: Texture = ImageTexture::new(pixels, 2, 2).unwrap().into();

        assert_eq!(tex.value_at(0.0, 1.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value_at(0.99, 1.0, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value_at(0.0, 0.0, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value_at(1.0, 0.0, Vec3::ZERO), Color::ONE);

        // Out-of-range coordinates clamp to the border
        assert_eq!(tex.value_at(-3.0, 5.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value_at(7.0, -2.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_size_mismatch() {
        let err = ImageTexture::new(vec![Color::ONE; 3], 2, 2).unwrap_err();
        assert_eq!(err, SceneError::ImageSizeMismatch { expected: 4, actual: 3 });

        let err = ImageTexture::new(vec![], 0, 4).unwrap_err();
        assert_eq!(err, SceneError::EmptyImage);
    }

    #[test]
    fn test_noise_transforms_tint_and_range() {
        let mut rng = StdRng::seed_from_u64(12);
        let tint = Color::new(1.0, 0.5, 0.25);

        for transform in [
            NoiseTransform::Normalized,
            NoiseTransform::Turbulence,
            NoiseTransform::Marble,
        ] {
            let tex: Texture = NoiseTexture::with_transform(4.0, tint, transform, &mut rng).into();
            for i in 0..50 {
                let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, 2.5 - i as f32 * 0.05);
                let c = tex.value_at(0.0, 0.0, p);
                assert!(c.min_element() >= 0.0, "{transform:?} gave {c}");
                // Channels keep the tint ratio
                assert!((c.y - 0.5 * c.x).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_uv_on_sphere_range() {
        let dirs = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        for d in dirs {
            let (u, v) = uv_on_sphere(d);
            assert!((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v), "{d}: ({u}, {v})");
        }

        let (_, v_top) = uv_on_sphere(Vec3::Y);
        let (_, v_bottom) = uv_on_sphere(-Vec3::Y);
        assert!((v_top - 1.0).abs() < 1e-6);
        assert!(v_bottom.abs() < 1e-6);
    }
}
