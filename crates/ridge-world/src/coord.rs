/// Tile-aligned (x, z) world coordinate of a section's minimum corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SectionOrigin {
    pub x: i32,
    pub z: i32,
}

impl SectionOrigin {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Origin of the section containing world point `(x, z)`: each axis is
    /// rounded down to a multiple of `size`.
    #[inline]
    pub fn containing(x: f32, z: f32, size: i32) -> Self {
        Self {
            x: round_down(x, size),
            z: round_down(z, size),
        }
    }

    /// Origin `dx`, `dz` whole sections away. The grid index is clamped to
    /// the representable range, so the result is always aligned.
    #[inline]
    pub fn offset(self, dx: i32, dz: i32, size: i32) -> Self {
        Self {
            x: step(self.x, dx, size),
            z: step(self.z, dz, size),
        }
    }

    /// Grid coordinates (origin divided by the section size).
    #[inline]
    pub fn grid(self, size: i32) -> (i32, i32) {
        (self.x.div_euclid(size), self.z.div_euclid(size))
    }

    #[inline]
    pub fn is_aligned(self, size: i32) -> bool {
        self.x.rem_euclid(size) == 0 && self.z.rem_euclid(size) == 0
    }
}

/// Inclusive range of grid indices whose origin fits in `i32`.
#[inline]
fn grid_limits(size: i32) -> (i64, i64) {
    (i64::from(i32::MIN / size), i64::from(i32::MAX / size))
}

/// Keeps one section of headroom on each side, so every neighbor of a
/// containing section is distinct and aligned.
#[inline]
fn round_down(v: f32, size: i32) -> i32 {
    let (lo, hi) = grid_limits(size);
    let g = (f64::from(v) / f64::from(size))
        .floor()
        .clamp((lo + 1) as f64, (hi - 1).max(lo + 1) as f64) as i64;
    (g * i64::from(size)) as i32
}

#[inline]
fn step(v: i32, d: i32, size: i32) -> i32 {
    let (lo, hi) = grid_limits(size);
    let g = (i64::from(v.div_euclid(size)) + i64::from(d)).clamp(lo, hi);
    (g * i64::from(size)) as i32
}

impl From<(i32, i32)> for SectionOrigin {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<SectionOrigin> for (i32, i32) {
    fn from(value: SectionOrigin) -> Self {
        (value.x, value.z)
    }
}
