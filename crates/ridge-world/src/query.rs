//! Height and normal queries over continuous world coordinates.

use ridge_geom::{Mat3, Vec3};

use crate::source::SectionSource;
use crate::store::SectionStore;

/// Splits a section-local coordinate into a cell index and the fraction
/// within that cell. Coordinates are clamped to the section's extent, so the
/// far edge maps to the last cell with fraction 1.
#[inline]
fn split(local: f32, cells: usize, samples_per_unit: f32) -> (usize, f32) {
    let extent = cells as f32 / samples_per_unit;
    let f = local.clamp(0.0, extent) * samples_per_unit;
    let i = (f.floor() as usize).min(cells - 1);
    (i, f - i as f32)
}

/// Bilinear sample of an x-major `side x side` table at local `(lx, lz)`.
pub fn bilinear(table: &[f32], side: usize, samples_per_unit: f32, lx: f32, lz: f32) -> f32 {
    let cells = side - 1;
    let (ix, t) = split(lx, cells, samples_per_unit);
    let (iz, u) = split(lz, cells, samples_per_unit);
    let h = |x: usize, z: usize| table[x * side + z];
    (1.0 - t) * (1.0 - u) * h(ix, iz)
        + (1.0 - t) * u * h(ix, iz + 1)
        + t * (1.0 - u) * h(ix + 1, iz)
        + t * u * h(ix + 1, iz + 1)
}

impl<S: SectionSource> SectionStore<S> {
    /// Terrain height at world `(x, z)`. Generates and blends terrain as needed.
    pub fn height(&mut self, x: f32, z: f32) -> f32 {
        let origin = self.origin_at(x, z);
        let id = self.ensure_blended(origin);
        let section = self.section(id);
        bilinear(
            section.blended(),
            section.blended_side(),
            self.config.samples_per_unit as f32,
            x - origin.x as f32,
            z - origin.z as f32,
        )
    }

    /// Unnormalized upward surface normal from central differences of
    /// [`height`](Self::height) with the configured step.
    pub fn normal(&mut self, x: f32, z: f32) -> Vec3 {
        let h = self.config.normal_step;
        let v = Vec3::new(2.0 * h, self.height(x + h, z) - self.height(x - h, z), 0.0);
        let w = Vec3::new(0.0, self.height(x, z + h) - self.height(x, z - h), 2.0 * h);
        w.cross(v)
    }

    /// Rotation taking `(0,1,0)` to the surface normal at `(x, z)`; identity on
    /// flat ground.
    pub fn rotation(&mut self, x: f32, z: f32) -> Mat3 {
        Mat3::rotation_to_tilt_y_towards(self.normal(x, z))
    }
}
