//! Map geometry consumed by area movement.
//!
//! The engine only asks which named layer covers a world position. Tile geometry
//! parsing belongs to the loaders; [`LayerMap`] is the in-memory grid they build.

use std::collections::HashSet;

/// Map size in world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Read-only map geometry.
pub trait MapOracle: Send + Sync {
    fn size(&self) -> MapSize;

    /// Names of every layer, bottom to top.
    fn layers(&self) -> Vec<String>;

    /// Name of the topmost layer covering a position, if any.
    fn position_layer(&self, x: f64, y: f64) -> Option<String>;

    /// Whether an object may stand on a position.
    ///
    /// Unmapped positions are passable; mapped ones only when their layer is allowed.
    fn is_passable(&self, x: f64, y: f64, allowed: &[String]) -> bool {
        match self.position_layer(x, y) {
            None => true,
            Some(layer) => allowed.iter().any(|a| *a == layer),
        }
    }
}

/// One named layer of tiles.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapLayer {
    pub name: String,
    pub tiles: HashSet<(u32, u32)>,
}

/// Tile grid with named layers. Later layers cover earlier ones.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerMap {
    tile_size: u32,
    width: u32,
    height: u32,
    layers: Vec<MapLayer>,
}

impl LayerMap {
    /// Creates an empty map `width` x `height` tiles of `tile_size` world units.
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            width,
            height,
            layers: Vec::new(),
        }
    }

    /// Adds a layer on top of the existing ones (builder pattern).
    #[must_use]
    pub fn with_layer<I>(mut self, name: impl Into<String>, tiles: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        self.layers.push(MapLayer {
            name: name.into(),
            tiles: tiles.into_iter().collect(),
        });
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn tile_at(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let size = f64::from(self.tile_size);
        let tx = (x / size).floor() as u32;
        let ty = (y / size).floor() as u32;
        (tx < self.width && ty < self.height).then_some((tx, ty))
    }
}

impl MapOracle for LayerMap {
    fn size(&self) -> MapSize {
        MapSize::new(self.width * self.tile_size, self.height * self.tile_size)
    }

    fn layers(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    fn position_layer(&self, x: f64, y: f64) -> Option<String> {
        let tile = self.tile_at(x, y)?;
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.tiles.contains(&tile))
            .map(|layer| layer.name.clone())
    }
}
