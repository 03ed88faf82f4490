//! Procedural height field: random Gaussian bumps sampled onto a raw table.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::TerrainConfig;

/// Narrowest width a bump may have; keeps the kernel finite at its center.
const MIN_WIDTH: f32 = 1e-3;

/// One Gaussian bump: `height * exp(-(dist / width)^2)`.
///
/// Centers are section-local, so the same bump set can be placed anywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mountain {
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_z: f32,
}

impl Mountain {
    #[inline]
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let dx = x - self.center_x;
        let dz = z - self.center_z;
        self.height * (-(dx * dx + dz * dz) / (self.width * self.width)).exp()
    }

    /// Shrinks `width` so that three widths from the center stay inside the
    /// 3x3 block around the owning section.
    pub fn clamp_to_block(&mut self, section_size: f32) {
        let lo = -section_size;
        let hi = 2.0 * section_size;
        let mindist = (self.center_x - lo)
            .min(self.center_z - lo)
            .min(hi - self.center_x)
            .min(hi - self.center_z);
        self.width = self.width.min(mindist / 3.0);
    }
}

/// Random stream for the `stream`-th section generated under `config.seed`.
pub fn section_rng(config: &TerrainConfig, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    rng.set_stream(stream);
    rng
}

pub fn generate_mountains<R: Rng>(config: &TerrainConfig, rng: &mut R) -> Vec<Mountain> {
    let size = config.section_size as f32;
    let wide = config.wide_mountain_count();
    let mut mountains = Vec::with_capacity(config.mountain_count);

    // wide and deep/tall
    for _ in 0..wide {
        let h = 5.0 * rng.random_range(-1.4f32..1.4).tan();
        let w = rng.random_range(h.abs()..=3.0 * h.abs());
        mountains.push(Mountain {
            width: w,
            height: h,
            center_x: rng.random_range(0.0..size),
            center_z: rng.random_range(0.0..size),
        });
    }

    // narrow and shallow
    for _ in wide..config.mountain_count {
        let mut h = rng.random_range(0.25f32..1.5);
        let w = rng.random_range(2.0 * h..5.0 * h);
        if rng.random_bool(0.5) {
            h = -h;
        }
        mountains.push(Mountain {
            width: w,
            height: h,
            center_x: rng.random_range(0.0..size),
            center_z: rng.random_range(0.0..size),
        });
    }

    for m in &mut mountains {
        m.width = m.width.max(MIN_WIDTH);
        m.clamp_to_block(size);
    }
    mountains
}

/// Samples every bump onto the raw grid spanning `[-S, 2S]` on both axes.
///
/// Layout is x-major: index `ix * raw_side + iz`. The kernel is separable,
/// so each bump needs one row of x factors and one column of z factors over
/// its support window.
pub fn raw_table(config: &TerrainConfig, mountains: &[Mountain]) -> Box<[f32]> {
    let n = config.raw_side();
    let r = config.samples_per_unit as f32;
    let s = config.section_size as f32;
    let mut table = vec![0.0f32; n * n];
    let mut fx: Vec<f32> = Vec::with_capacity(n);
    let mut fz: Vec<f32> = Vec::with_capacity(n);

    for m in mountains {
        let reach = config.support_sigmas * m.width;
        let (x0, x1) = window(m.center_x, reach, s, r, n);
        let (z0, z1) = window(m.center_z, reach, s, r, n);
        let inv = 1.0 / (m.width * m.width);

        fx.clear();
        fx.extend((x0..=x1).map(|i| {
            let dx = i as f32 / r - s - m.center_x;
            (-dx * dx * inv).exp()
        }));
        fz.clear();
        fz.extend((z0..=z1).map(|j| {
            let dz = j as f32 / r - s - m.center_z;
            m.height * (-dz * dz * inv).exp()
        }));

        for (i, wx) in (x0..=x1).zip(fx.iter()) {
            let row = &mut table[i * n + z0..=i * n + z1];
            for (cell, wz) in row.iter_mut().zip(fz.iter()) {
                *cell += wx * wz;
            }
        }
    }
    table.into_boxed_slice()
}

/// Inclusive raw-grid index range covering `center +- reach` (local coords).
#[inline]
fn window(center: f32, reach: f32, s: f32, r: f32, n: usize) -> (usize, usize) {
    let lo = ((center - reach + s) * r).floor().max(0.0) as usize;
    let hi = (((center + reach + s) * r).ceil().max(0.0) as usize).min(n - 1);
    (lo.min(n - 1), hi)
}
