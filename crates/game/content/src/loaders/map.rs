//! Map data loader.
//!
//! Loads named tile layers into a [`LayerMap`]. Layers are listed bottom to top;
//! a position takes the name of the topmost layer covering it.

use std::path::Path;

use realm_core::LayerMap;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_ron};

/// Map data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    dimensions: (u32, u32),
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    #[serde(default)]
    layers: Vec<LayerRon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayerRon {
    name: String,
    /// Covers the whole grid; `tiles` is ignored.
    #[serde(default)]
    fill: bool,
    #[serde(default)]
    tiles: Vec<(u32, u32)>, // (x, y) in tiles
}

fn default_tile_size() -> u32 {
    1
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Load a layer map from a RON file.
    pub fn load(path: &Path) -> LoadResult<LayerMap> {
        let data: MapDataRon = read_ron(path, "map")?;
        let (width, height) = data.dimensions;

        let mut map = LayerMap::new(width, height, data.tile_size);
        for layer in data.layers {
            if let Some(&(x, y)) = layer.tiles.iter().find(|(x, y)| *x >= width || *y >= height) {
                anyhow::bail!(
                    "Map {} layer {} has tile ({}, {}) outside {}x{}",
                    path.display(),
                    layer.name,
                    x,
                    y,
                    width,
                    height
                );
            }
            map = if layer.fill {
                map.with_layer(
                    layer.name,
                    (0..width).flat_map(|x| (0..height).map(move |y| (x, y))),
                )
            } else {
                map.with_layer(layer.name, layer.tiles)
            };
        }

        Ok(map)
    }
}
