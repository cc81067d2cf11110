//! Content loaders for reading game data from files.
//!
//! Each loader turns one RON or TOML file into core types. [`ContentFactory`]
//! knows the data directory layout and assembles the full content snapshot.

pub mod area;
pub mod catalog;
pub mod config;
pub mod factory;
pub mod map;

pub use area::AreaLoader;
pub use catalog::{Catalog, CatalogLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use map::MapLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))
}

/// Reads and parses a RON file.
pub(crate) fn read_ron<T>(path: &Path, what: &str) -> LoadResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_file(path)?;
    ron::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {} RON {}: {}", what, path.display(), e))
}
