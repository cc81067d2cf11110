//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use realm_core::{AreaData, ContentSnapshot, GameConfig, LayerMap};

use crate::loaders::catalog::Definition;
use crate::loaders::{AreaLoader, CatalogLoader, ConfigLoader, LoadResult, MapLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── effects.ron
/// ├── skills.ron
/// ├── items.ron
/// ├── characters.ron
/// ├── objects.ron
/// ├── quests.ron
/// ├── maps/
/// │   └── village.ron
/// └── areas/
///     └── village.ron
/// ```
///
/// Every file is optional: a missing config yields the defaults and a missing
/// catalog contributes nothing.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every catalog into one snapshot.
    pub fn load_content(&self) -> LoadResult<ContentSnapshot> {
        let mut snapshot = ContentSnapshot::new();
        for data in self.load_catalog("effects.ron")? {
            snapshot.insert_effect(data);
        }
        for data in self.load_catalog("skills.ron")? {
            snapshot.insert_skill(data);
        }
        for data in self.load_catalog("items.ron")? {
            snapshot.insert_item(data);
        }
        for data in self.load_catalog("characters.ron")? {
            snapshot.insert_character(data);
        }
        for data in self.load_catalog("objects.ron")? {
            snapshot.insert_object(data);
        }
        for data in self.load_catalog("quests.ron")? {
            snapshot.insert_quest(data);
        }
        tracing::info!(
            definitions = snapshot.len(),
            dir = %self.data_dir.display(),
            "content loaded"
        );
        Ok(snapshot)
    }

    fn load_catalog<T: Definition>(&self, file: &str) -> LoadResult<Vec<T>> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "catalog absent");
            return Ok(Vec::new());
        }
        CatalogLoader::load(&path)
    }

    /// Load a map from `maps/{map_name}.ron`.
    pub fn load_map(&self, map_name: &str) -> LoadResult<LayerMap> {
        let path = self.data_dir.join("maps").join(format!("{}.ron", map_name));
        MapLoader::load(&path)
    }

    /// Load an area from `areas/{area_id}.ron`.
    pub fn load_area(&self, area_id: &str) -> LoadResult<AreaData> {
        let path = self.data_dir.join("areas").join(format!("{}.ron", area_id));
        AreaLoader::load(&path)
    }

    /// Load every area file, sorted by ID.
    pub fn load_areas(&self) -> LoadResult<Vec<AreaData>> {
        let dir = self.data_dir.join("areas");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut areas = Vec::new();
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to list areas in {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                areas.push(AreaLoader::load(&path)?);
            }
        }
        areas.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(areas)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
