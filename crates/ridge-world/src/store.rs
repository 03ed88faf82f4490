use std::sync::Arc;

use crate::config::TerrainConfig;
use crate::coord::SectionOrigin;
use crate::index::SectionIndex;
use crate::section::{Section, SectionId};
use crate::source::{InlineSource, SectionSource};

#[derive(Clone, Copy, Debug, Default)]
pub struct StoreStats {
    pub sections: usize,
    pub ready: usize,
    pub index_capacity: usize,
    pub load_factor: f32,
    pub index_grows: u32,
    pub lookups: u64,
    pub placements: u64,
    pub bytes: usize,
}

/// Cache of placed sections, keyed by origin.
///
/// Sections live in an arena and are addressed by [`SectionId`]; ids stay
/// valid across index growth. The store is used from a single thread; its
/// source may hand work off to others.
pub struct SectionStore<S: SectionSource> {
    pub(crate) config: Arc<TerrainConfig>,
    source: S,
    pub(crate) sections: Vec<Section>,
    index: SectionIndex,
    lookups: u64,
    pub(crate) blends: usize,
}

impl SectionStore<InlineSource> {
    /// Store that generates sections on the query thread.
    pub fn inline(config: Arc<TerrainConfig>) -> Self {
        let source = InlineSource::new(Arc::clone(&config));
        Self::new(config, source)
    }
}

impl<S: SectionSource> SectionStore<S> {
    pub fn new(config: Arc<TerrainConfig>, source: S) -> Self {
        let index = SectionIndex::new(&config.table, config.section_size);
        Self {
            config,
            source,
            sections: Vec::new(),
            index,
            lookups: 0,
            blends: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Origin of the section containing world point `(x, z)`.
    #[inline]
    pub fn origin_at(&self, x: f32, z: f32) -> SectionOrigin {
        SectionOrigin::containing(x, z, self.config.section_size)
    }

    #[inline]
    pub fn find(&self, origin: SectionOrigin) -> Option<SectionId> {
        self.index.find(origin)
    }

    #[inline]
    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.index()]
    }

    pub fn get(&self, origin: SectionOrigin) -> Option<&Section> {
        self.find(origin).map(|id| self.section(id))
    }

    /// Returns the section at `origin`, placing a new one from the source if
    /// none exists yet.
    pub fn find_or_add(&mut self, origin: SectionOrigin) -> SectionId {
        debug_assert!(
            origin.is_aligned(self.config.section_size),
            "unaligned section origin {:?}",
            origin
        );
        self.lookups += 1;
        if let Some(id) = self.index.find(origin) {
            return id;
        }

        let mut section = self.source.next_section();
        section.assign_origin(origin);
        let id = SectionId(
            u32::try_from(self.sections.len()).expect("section arena exceeds u32 ids"),
        );
        self.sections.push(section);
        self.index.insert(origin, id);
        log::debug!(
            target: "sections",
            "placed section at ({}, {}), store now has {} sections",
            origin.x,
            origin.z,
            self.sections.len()
        );
        id
    }

    /// Makes room for `additional` placements without rehashing in between.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
        self.sections.reserve(additional);
    }

    /// Iterates placed sections in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionOrigin, &Section)> + '_ {
        self.sections
            .iter()
            .filter_map(|s| s.origin().map(|o| (o, s)))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sections: self.sections.len(),
            ready: self.blends,
            index_capacity: self.index.capacity(),
            load_factor: self.index.load_factor(),
            index_grows: self.index.grows(),
            lookups: self.lookups,
            placements: self.sections.len() as u64,
            bytes: self.sections.len() * self.config.section_bytes(),
        }
    }
}
