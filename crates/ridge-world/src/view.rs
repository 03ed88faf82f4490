//! Read-only access to blended tiles for renderers, plus visibility ranges.

use ridge_geom::Vec3;

use crate::coord::SectionOrigin;
use crate::source::SectionSource;
use crate::store::SectionStore;

/// Borrowed view of one ready section's blended samples.
#[derive(Clone, Copy, Debug)]
pub struct SectionView<'a> {
    origin: SectionOrigin,
    side: usize,
    spacing: f32,
    heights: &'a [f32],
}

impl<'a> SectionView<'a> {
    #[inline]
    pub fn origin(&self) -> SectionOrigin {
        self.origin
    }

    /// Samples along one side (cells + 1).
    #[inline]
    pub fn samples_per_side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Raw x-major sample slice.
    #[inline]
    pub fn heights(&self) -> &'a [f32] {
        self.heights
    }

    #[inline]
    pub fn height_at(&self, ix: usize, iz: usize) -> f32 {
        self.heights[ix * self.side + iz]
    }

    #[inline]
    pub fn world_position(&self, ix: usize, iz: usize) -> Vec3 {
        Vec3::new(
            self.origin.x as f32 + ix as f32 * self.spacing,
            self.height_at(ix, iz),
            self.origin.z as f32 + iz as f32 * self.spacing,
        )
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        let cells = self.side - 1;
        2 * cells * cells
    }

    /// Two triangles per grid cell, ready for upload as a flat vertex list.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + 'a {
        let view = *self;
        let cells = self.side - 1;
        (0..cells).flat_map(move |ix| {
            (0..cells).flat_map(move |iz| {
                let p = |x, z| view.world_position(x, z);
                [
                    [p(ix, iz), p(ix + 1, iz), p(ix, iz + 1)],
                    [p(ix + 1, iz + 1), p(ix + 1, iz), p(ix, iz + 1)],
                ]
            })
        })
    }
}

fn circle_and_segment_intersect(center: (f32, f32), r: f32, start: (f32, f32), end: (f32, f32)) -> bool {
    let dir = (end.0 - start.0, end.1 - start.1);
    let dot = |a: (f32, f32)| a.0 * dir.0 + a.1 * dir.1;
    // Point on the segment closest to the center
    let t = ((dot(center) - dot(start)) / (dot(end) - dot(start))).clamp(0.0, 1.0);
    let px = start.0 + dir.0 * t;
    let pz = start.1 + dir.1 * t;
    let (dx, dz) = (center.0 - px, center.1 - pz);
    dx * dx + dz * dz < r * r
}

fn circle_intersects_section(center: (f32, f32), r: f32, origin: SectionOrigin, size: i32) -> bool {
    if SectionOrigin::containing(center.0, center.1, size) == origin {
        return true;
    }
    let (x0, z0) = (origin.x as f32, origin.z as f32);
    let (x1, z1) = (x0 + size as f32, z0 + size as f32);
    let corners = [(x0, z0), (x0, z1), (x1, z1), (x1, z0)];
    (0..4).any(|i| circle_and_segment_intersect(center, r, corners[i], corners[(i + 1) % 4]))
}

impl<S: SectionSource> SectionStore<S> {
    /// View of the blended section at `origin`, generating it if needed.
    pub fn view(&mut self, origin: SectionOrigin) -> SectionView<'_> {
        let id = self.ensure_blended(origin);
        let spacing = self.config.spacing();
        let section = self.section(id);
        SectionView {
            origin,
            side: section.blended_side(),
            spacing,
            heights: section.blended(),
        }
    }

    /// View of an already blended section, without generating anything.
    pub fn try_view(&self, origin: SectionOrigin) -> Option<SectionView<'_>> {
        let section = self.get(origin)?;
        Some(SectionView {
            origin,
            side: section.blended_side(),
            spacing: self.config.spacing(),
            heights: section.try_blended()?,
        })
    }

    /// Origins of every section overlapping the square of half-size `radius`
    /// around `(cx, cz)`, x-major.
    pub fn visible_origins(&self, cx: f32, cz: f32, radius: f32) -> Vec<SectionOrigin> {
        let size = self.config.section_size;
        let min = SectionOrigin::containing(cx - radius, cz - radius, size);
        let max = SectionOrigin::containing(cx + radius, cz + radius, size);
        let nx = ((max.x - min.x) / size + 1).max(0) as usize;
        let nz = ((max.z - min.z) / size + 1).max(0) as usize;
        let mut out = Vec::with_capacity(nx * nz);
        for i in 0..nx as i32 {
            for j in 0..nz as i32 {
                out.push(min.offset(i, j, size));
            }
        }
        out
    }

    /// Places and blends every section within view of `(cx, cz)`.
    pub fn prepare_visible(&mut self, cx: f32, cz: f32, radius: f32) -> Vec<SectionOrigin> {
        let origins = self.visible_origins(cx, cz, radius);
        for &origin in &origins {
            self.ensure_blended(origin);
        }
        origins
    }

    /// Already placed sections whose square intersects the circle.
    pub fn sections_within_circle(&self, cx: f32, cz: f32, radius: f32) -> Vec<SectionOrigin> {
        let size = self.config.section_size;
        self.visible_origins(cx, cz, radius)
            .into_iter()
            .filter(|&o| circle_intersects_section((cx, cz), radius, o, size))
            .filter(|&o| self.find(o).is_some())
            .collect()
    }
}
