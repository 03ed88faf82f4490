//! Grayscale heightmap export for eyeballing generated terrain.

use std::path::Path;

use image::{GrayImage, ImageResult, Luma};

use ridge_world::{SectionSource, SectionStore};

/// Heights sampled on a square grid centered at the origin, one row per z.
pub struct Heightmap {
    pub side: usize,
    pub heights: Vec<f32>,
}

impl Heightmap {
    /// Samples `[-extent, extent]` on both axes at the store's grid spacing.
    pub fn sample<S: SectionSource>(store: &mut SectionStore<S>, extent: f32) -> Self {
        let step = store.config().spacing();
        let side = ((2.0 * extent / step).round() as usize).max(1) + 1;
        let mut heights = Vec::with_capacity(side * side);
        for iz in 0..side {
            let z = -extent + iz as f32 * step;
            for ix in 0..side {
                heights.push(store.height(-extent + ix as f32 * step, z));
            }
        }
        Self { side, heights }
    }

    pub fn range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Grayscale image with rows along +z and the lowest height black.
    pub fn to_image(&self) -> GrayImage {
        let (lo, hi) = self.range();
        let scale = if hi > lo { 255.0 / (hi - lo) } else { 0.0 };
        let side = self.side as u32;
        GrayImage::from_fn(side, side, |x, z| {
            let h = self.heights[z as usize * self.side + x as usize];
            Luma([((h - lo) * scale).round().clamp(0.0, 255.0) as u8])
        })
    }

    /// Writes the image; the format (PNG, PGM, ...) follows the extension.
    pub fn save(&self, path: &Path) -> ImageResult<()> {
        self.to_image().save(path)
    }
}
