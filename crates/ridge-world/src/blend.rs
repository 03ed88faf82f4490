//! Neighbor blending: a section's final table sums the overlapping windows of
//! its own raw table and its 8 neighbors'.

use crate::config::TerrainConfig;
use crate::coord::SectionOrigin;
use crate::section::SectionId;
use crate::source::SectionSource;
use crate::store::SectionStore;

/// Section offsets in blend order (x outer, z inner).
pub const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Sums the 9 raw tables (ordered as [`NEIGHBOR_OFFSETS`]) into a blended
/// table for the center section.
///
/// The neighbor at `(dx, dz)` sections away sees our sample `(ix, iz)` at its
/// raw index `(ix + C - dx*C, iz + C - dz*C)` where `C` is cells per side.
pub fn blend_tables(config: &TerrainConfig, raws: &[&[f32]; 9]) -> Box<[f32]> {
    let cells = config.cells_per_side() as i32;
    let side = config.blended_side();
    let raw_side = config.raw_side();
    let mut out = vec![0.0f32; side * side];

    for (raw, &(dx, dz)) in raws.iter().zip(NEIGHBOR_OFFSETS.iter()) {
        debug_assert_eq!(raw.len(), raw_side * raw_side);
        let base_x = (cells - dx * cells) as usize;
        let base_z = (cells - dz * cells) as usize;
        for ix in 0..side {
            let src = (base_x + ix) * raw_side + base_z;
            let dst = &mut out[ix * side..(ix + 1) * side];
            for (d, s) in dst.iter_mut().zip(&raw[src..src + side]) {
                *d += *s;
            }
        }
    }
    out.into_boxed_slice()
}

impl<S: SectionSource> SectionStore<S> {
    /// Places the section at `origin` and its neighbors if needed and fills in
    /// its blended table. No-op once the section is ready.
    pub fn ensure_blended(&mut self, origin: SectionOrigin) -> SectionId {
        if let Some(id) = self.find(origin) {
            if self.section(id).is_ready() {
                return id;
            }
        }

        // All growth happens here, before any neighbor is resolved.
        self.reserve(NEIGHBOR_OFFSETS.len());
        let size = self.config.section_size;
        let ids = NEIGHBOR_OFFSETS.map(|(dx, dz)| self.find_or_add(origin.offset(dx, dz, size)));
        let center = ids[4];

        let blended = {
            let raws = ids.map(|id| self.sections[id.index()].raw());
            blend_tables(&self.config, &raws)
        };
        self.sections[center.index()].set_blended(blended);
        self.blends += 1;
        log::trace!(target: "sections", "blended section at ({}, {})", origin.x, origin.z);
        center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_offset_is_middle_entry() {
        assert_eq!(NEIGHBOR_OFFSETS[4], (0, 0));
    }

    #[test]
    fn blend_reads_the_right_windows() {
        let cfg = TerrainConfig {
            section_size: 2,
            samples_per_unit: 1,
            ..TerrainConfig::default()
        };
        let raw_side = cfg.raw_side();
        assert_eq!(raw_side, 7);
        // Each neighbor's raw table encodes its own raw index; only the
        // center table is non-zero so the result is its middle window.
        let zeros = vec![0.0f32; raw_side * raw_side];
        let center: Vec<f32> = (0..raw_side * raw_side).map(|i| i as f32).collect();
        let mut raws: [&[f32]; 9] = [&zeros; 9];
        raws[4] = &center;
        let out = blend_tables(&cfg, &raws);
        assert_eq!(out.len(), 9);
        // (ix, iz) = (0, 0) maps to raw (2, 2)
        assert_eq!(out[0], (2 * raw_side + 2) as f32);
        assert_eq!(out[8], (4 * raw_side + 4) as f32);

        // Neighbor at +x contributes from its -x side: raw (0 + 2 - 2, ...)
        let mut raws: [&[f32]; 9] = [&zeros; 9];
        raws[7] = &center;
        let out = blend_tables(&cfg, &raws);
        assert_eq!(out[0], 2.0);
    }
}
