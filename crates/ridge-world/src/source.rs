use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::TerrainConfig;
use crate::section::Section;

/// Supplier of freshly generated, not yet placed sections.
pub trait SectionSource {
    /// Hands over one section with its raw table computed and no origin.
    /// May block until one is available.
    fn next_section(&mut self) -> Section;
}

/// Shared counter handing out per-section random streams in order.
///
/// Clones share the counter, so a background producer and an inline fallback
/// never reuse a stream.
#[derive(Clone, Debug, Default)]
pub struct SeedSequence {
    next: Arc<AtomicU64>,
}

impl SeedSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(stream: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(stream)),
        }
    }

    #[inline]
    pub fn next_stream(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Streams handed out so far.
    #[inline]
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Generates each section synchronously on the calling thread.
pub struct InlineSource {
    config: Arc<TerrainConfig>,
    seeds: SeedSequence,
}

impl InlineSource {
    pub fn new(config: Arc<TerrainConfig>) -> Self {
        Self::with_seeds(config, SeedSequence::new())
    }

    pub fn with_seeds(config: Arc<TerrainConfig>, seeds: SeedSequence) -> Self {
        Self { config, seeds }
    }
}

impl SectionSource for InlineSource {
    fn next_section(&mut self) -> Section {
        Section::generate(&self.config, self.seeds.next_stream())
    }
}
