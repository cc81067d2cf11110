//! Read-only collaborators every tick needs.
//!
//! Oracles expose content definitions, randomness and map geometry. The [`Env`]
//! aggregate bundles them with the identity registry and configuration so update
//! code can reach everything without hard coupling to concrete implementations.
mod content;
mod map;
mod rng;

pub use content::{ContentOracle, ContentSnapshot};
pub use map::{LayerMap, MapLayer, MapOracle, MapSize};
pub use rng::{PcgRng, RngOracle};

use std::fmt;

use crate::config::GameConfig;
use crate::registry::Registry;

/// Aggregates the collaborators required by update and apply paths.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    content: &'a dyn ContentOracle,
    rng: &'a dyn RngOracle,
    registry: &'a Registry,
    config: &'a GameConfig,
}

impl<'a> Env<'a> {
    pub fn new(
        content: &'a dyn ContentOracle,
        rng: &'a dyn RngOracle,
        registry: &'a Registry,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            content,
            rng,
            registry,
            config,
        }
    }

    pub fn content(&self) -> &'a dyn ContentOracle {
        self.content
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }
}

impl fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("registry", self.registry)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
