//! Open-addressing hash index from section origin to arena slot.

use crate::config::TableConfig;
use crate::coord::SectionOrigin;
use crate::section::SectionId;

const MIX_X: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_Z: u64 = 0xC2B2_AE3D_27D4_EB4F;

#[derive(Clone, Copy, Debug)]
struct Entry {
    origin: SectionOrigin,
    id: SectionId,
}

/// Linear-probing table keyed by tile origin.
///
/// Capacity grows by `growth_factor` before an insert would push the load
/// factor over `max_load_factor`, so there is always at least one empty slot
/// and every probe sequence terminates.
pub struct SectionIndex {
    slots: Vec<Option<Entry>>,
    len: usize,
    section_size: i32,
    growth_factor: usize,
    max_load_factor: f32,
    grows: u32,
}

impl SectionIndex {
    pub fn new(table: &TableConfig, section_size: i32) -> Self {
        debug_assert!(section_size > 0);
        Self {
            slots: vec![None; table.initial_capacity.max(1)],
            len: 0,
            section_size,
            growth_factor: table.growth_factor.max(2),
            max_load_factor: table.max_load_factor,
            grows: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.slots.len() as f32
    }

    /// Number of times the table has been rehashed.
    #[inline]
    pub fn grows(&self) -> u32 {
        self.grows
    }

    #[inline]
    fn home_slot(&self, origin: SectionOrigin, capacity: usize) -> usize {
        let (gx, gz) = origin.grid(self.section_size);
        let h = (gx as i64 as u64).wrapping_mul(MIX_X) ^ (gz as i64 as u64).wrapping_mul(MIX_Z);
        let h = h ^ (h >> 32);
        (h % capacity as u64) as usize
    }

    pub fn find(&self, origin: SectionOrigin) -> Option<SectionId> {
        let cap = self.slots.len();
        let start = self.home_slot(origin, cap);
        for step in 0..cap {
            match self.slots[(start + step) % cap] {
                None => return None,
                Some(e) if e.origin == origin => return Some(e.id),
                Some(_) => {}
            }
        }
        None
    }

    /// Maps `origin` to `id`, replacing any previous mapping for `origin`.
    pub fn insert(&mut self, origin: SectionOrigin, id: SectionId) -> Option<SectionId> {
        if let Some(prev) = self.replace(origin, id) {
            return Some(prev);
        }
        self.reserve(1);
        let start = self.home_slot(origin, self.slots.len());
        Self::place(&mut self.slots, start, Entry { origin, id });
        self.len += 1;
        None
    }

    /// Grows until `additional` more entries fit under the load threshold.
    pub fn reserve(&mut self, additional: usize) {
        while (self.len + additional) as f32 > self.slots.len() as f32 * self.max_load_factor {
            self.grow();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionOrigin, SectionId)> + '_ {
        self.slots.iter().flatten().map(|e| (e.origin, e.id))
    }

    fn replace(&mut self, origin: SectionOrigin, id: SectionId) -> Option<SectionId> {
        let cap = self.slots.len();
        let start = self.home_slot(origin, cap);
        for step in 0..cap {
            match &mut self.slots[(start + step) % cap] {
                None => return None,
                Some(e) if e.origin == origin => return Some(std::mem::replace(&mut e.id, id)),
                Some(_) => {}
            }
        }
        None
    }

    fn place(slots: &mut [Option<Entry>], start: usize, entry: Entry) {
        let cap = slots.len();
        for step in 0..cap {
            let slot = &mut slots[(start + step) % cap];
            if slot.is_none() {
                *slot = Some(entry);
                return;
            }
        }
        unreachable!("section index full; load factor invariant violated");
    }

    fn grow(&mut self) {
        let new_cap = self.slots.len() * self.growth_factor;
        let old = std::mem::replace(&mut self.slots, vec![None; new_cap]);
        for entry in old.into_iter().flatten() {
            let start = self.home_slot(entry.origin, new_cap);
            Self::place(&mut self.slots, start, entry);
        }
        self.grows += 1;
        log::debug!(target: "sections", "section index grown to {} slots ({} entries)", new_cap, self.len);
    }
}
