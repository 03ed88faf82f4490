use std::time::Instant;

use crate::config::TerrainConfig;
use crate::coord::SectionOrigin;
use crate::field::{Mountain, generate_mountains, raw_table, section_rng};

/// Stable handle into the store's section arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(pub(crate) u32);

impl SectionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One tile of terrain.
///
/// The raw table is computed at construction and never changes. The blended
/// table is filled in once by the store, after which the section is ready and
/// immutable.
#[derive(Debug)]
pub struct Section {
    origin: Option<SectionOrigin>,
    stream: u64,
    mountains: Box<[Mountain]>,
    raw: Box<[f32]>,
    raw_side: usize,
    blended: Option<Box<[f32]>>,
    blended_side: usize,
    pub compute_time_us: u32,
}

impl Section {
    /// Builds the `stream`-th section for `config`. This is the expensive step.
    pub fn generate(config: &TerrainConfig, stream: u64) -> Self {
        let t0 = Instant::now();
        let mut rng = section_rng(config, stream);
        let mountains = generate_mountains(config, &mut rng);
        let raw = raw_table(config, &mountains);
        let compute_time_us = t0.elapsed().as_micros().min(u128::from(u32::MAX)) as u32;
        log::trace!(target: "sections", "generated section stream={} in {}us", stream, compute_time_us);
        Self {
            origin: None,
            stream,
            mountains: mountains.into_boxed_slice(),
            raw,
            raw_side: config.raw_side(),
            blended: None,
            blended_side: config.blended_side(),
            compute_time_us,
        }
    }

    #[inline]
    pub fn origin(&self) -> Option<SectionOrigin> {
        self.origin
    }

    pub(crate) fn assign_origin(&mut self, origin: SectionOrigin) {
        debug_assert!(self.origin.is_none(), "section placed twice");
        self.origin = Some(origin);
    }

    /// Random stream this section was generated from.
    #[inline]
    pub fn stream(&self) -> u64 {
        self.stream
    }

    #[inline]
    pub fn mountains(&self) -> &[Mountain] {
        &self.mountains
    }

    #[inline]
    pub fn raw(&self) -> &[f32] {
        &self.raw
    }

    #[inline]
    pub fn raw_side(&self) -> usize {
        self.raw_side
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.blended.is_some()
    }

    #[inline]
    pub fn blended_side(&self) -> usize {
        self.blended_side
    }

    /// Blended table, x-major (`ix * blended_side + iz`).
    ///
    /// Panics if the section has not been blended yet.
    #[inline]
    pub fn blended(&self) -> &[f32] {
        self.blended
            .as_deref()
            .expect("blended table read before section was ready")
    }

    #[inline]
    pub fn try_blended(&self) -> Option<&[f32]> {
        self.blended.as_deref()
    }

    pub(crate) fn set_blended(&mut self, table: Box<[f32]>) {
        debug_assert!(self.blended.is_none(), "section blended twice");
        debug_assert_eq!(table.len(), self.blended_side * self.blended_side);
        self.blended = Some(table);
    }
}
