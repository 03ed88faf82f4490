//! Background section generation feeding a terrain store.
#![forbid(unsafe_code)]

mod queue;

use std::io;
use std::sync::Arc;

use ridge_world::{SectionStore, TerrainConfig};

pub use queue::{GenerationQueue, QueueStats};

/// A terrain store fed by a background generation thread.
pub type Terrain = SectionStore<GenerationQueue>;

/// Starts a producer thread for `config` and returns a store drawing from it.
/// The thread stops when the store is dropped.
pub fn spawn_store(config: TerrainConfig) -> io::Result<Terrain> {
    let config = Arc::new(config);
    let queue = GenerationQueue::spawn(Arc::clone(&config))?;
    Ok(SectionStore::new(config, queue))
}
