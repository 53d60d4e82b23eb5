//! Image decoding for image textures.
//!
//! The only place the renderer touches the filesystem.

use std::path::Path;

use crate::error::TextureResult;
use crate::Color;

/// Decode an image file into a row-major RGB grid with channels in [0, 1].
///
/// Channels are scaled by 1/255 without any transfer-curve conversion.
/// Returns `(pixels, width, height)`.
pub fn load_pixels(path: &Path) -> TextureResult<(Vec<Color>, usize, usize)> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let pixels: Vec<Color> = rgb
        .pixels()
        .map(|p| Color::new(p[0] as f32, p[1] as f32, p[2] as f32) / 255.0)
        .collect();

    log::debug!(
        "Loaded texture: {} ({}x{}, {:.1} KB)",
        path.display(),
        width,
        height,
        (pixels.len() * std::mem::size_of::<Color>()) as f32 / 1024.0
    );

    Ok((pixels, width as usize, height as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TextureError;
    use crate::ImageTexture;

    #[test]
    fn test_load_round_trip_through_png() {
        let path = std::env::temp_dir().join(format!("glint_load_{}.png", std::process::id()));
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 51, 255]));
        img.save(&path).unwrap();

        let (pixels, width, height) = load_pixels(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((width, height), (2, 1));
        assert_eq!(pixels[0], Color::new(1.0, 0.0, 0.0));
        assert!((pixels[1].y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ImageTexture::open("/definitely/not/here.png");
        assert!(matches!(result, Err(TextureError::ImageError(_)) | Err(TextureError::Io(_))));
    }
}
