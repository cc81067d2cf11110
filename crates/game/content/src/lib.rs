//! Data-driven content definitions and loaders.
//!
//! Loads the catalogs the engine resolves by ID:
//! - effects, skills, items, characters, objects and quests (RON)
//! - map layer grids (RON)
//! - area placements (RON)
//! - game configuration (TOML)
//!
//! Everything lands in a [`realm_core::ContentSnapshot`] or in core record types
//! deserialized directly with serde; content never appears in save state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{AreaLoader, CatalogLoader, ConfigLoader, ContentFactory, LoadResult, MapLoader};
