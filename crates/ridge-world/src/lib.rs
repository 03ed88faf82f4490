//! Procedural terrain sections: generation, caching, blending, and queries.
#![forbid(unsafe_code)]

pub mod blend;
pub mod config;
mod coord;
pub mod field;
mod index;
mod query;
mod section;
mod source;
mod store;
mod view;

pub use config::{ConfigError, QueueConfig, TableConfig, TerrainConfig, load_config_from_path};
pub use coord::SectionOrigin;
pub use field::Mountain;
pub use index::SectionIndex;
pub use query::bilinear;
pub use section::{Section, SectionId};
pub use source::{InlineSource, SectionSource, SeedSequence};
pub use store::{SectionStore, StoreStats};
pub use view::SectionView;
