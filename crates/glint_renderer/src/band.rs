//! Horizontal band partitioning for multi-threaded rendering.
//!
//! The image is split into one band of whole rows per worker. Bands are
//! rendered independently and concatenated in index order.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::renderer::{color_to_rgb8, render_pixel, RenderConfig, Rgb};
use crate::{Camera, Integrator, Scene};

/// A run of full-width rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// First row (0 = top of the image)
    pub y: u32,
    /// Number of rows
    pub height: u32,
    /// Position of this band in the final image
    pub index: usize,
}

impl Band {
    pub fn new(y: u32, height: u32, index: usize) -> Self {
        Self { y, height, index }
    }

    /// Rows covered by this band, top to bottom.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.y..self.y + self.height
    }
}

/// Split `height` rows into `count` contiguous bands of near-equal height.
///
/// The first `height % count` bands get one extra row, so every row is
/// covered exactly once. At most `height` bands are produced.
pub fn generate_bands(height: u32, count: usize) -> Vec<Band> {
    let count = u32::try_from(count)
        .unwrap_or(u32::MAX)
        .clamp(1, height.max(1));
    let base = height / count;
    let extra = height % count;

    let mut bands = Vec::with_capacity(count as usize);
    let mut y = 0;
    for index in 0..count {
        let band_height = base + u32::from(index < extra);
        bands.push(Band::new(y, band_height, index as usize));
        y += band_height;
    }

    bands
}

/// Rows finished so far, shared by all workers.
#[derive(Debug, Default)]
pub struct Progress {
    rows_done: Mutex<u32>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished row and return the new total.
    pub fn row_done(&self) -> u32 {
        // A poisoned counter only means another worker panicked; keep counting.
        let mut rows = self.rows_done.lock().unwrap_or_else(|e| e.into_inner());
        *rows += 1;
        *rows
    }

    pub fn rows_done(&self) -> u32 {
        *self.rows_done.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Seed for one image row. Mixing the row index through SplitMix64 keeps
/// neighbouring rows decorrelated.
pub fn row_seed(seed: u64, row: u32) -> u64 {
    let mut z = seed ^ (u64::from(row).wrapping_add(1)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Render every pixel of a band, row-major.
///
/// Each row draws from its own generator seeded by [`row_seed`], so the
/// result does not depend on how rows are grouped into bands.
pub fn render_band(
    band: &Band,
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    progress: &Progress,
) -> Vec<Rgb> {
    let integrator = Integrator::new(config.max_depth);
    let mut pixels = Vec::with_capacity(band.height as usize * config.width as usize);

    for y in band.rows() {
        let mut rng = StdRng::seed_from_u64(row_seed(config.seed, y));
        for x in 0..config.width {
            let color = render_pixel(camera, scene, &integrator, x, y, config, &mut rng);
            pixels.push(color_to_rgb8(color));
        }

        let done = progress.row_done();
        log::trace!(
            "Rendering... {:.2}%",
            100.0 * done as f32 / config.height as f32
        );
    }

    log::debug!("Band {} finished (rows {:?})", band.index, band.rows());
    pixels
}
