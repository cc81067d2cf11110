//! Fixtures shared by unit tests.

use crate::config::GameConfig;
use crate::env::{ContentSnapshot, Env, PcgRng};
use crate::registry::Registry;

pub(crate) struct Fixture {
    pub content: ContentSnapshot,
    pub rng: PcgRng,
    pub registry: Registry,
    pub config: GameConfig,
}

impl Fixture {
    pub fn new(content: ContentSnapshot) -> Self {
        Self {
            content,
            rng: PcgRng::new(1),
            registry: Registry::new(),
            config: GameConfig::new(),
        }
    }

    pub fn env(&self) -> Env<'_> {
        Env::new(&self.content, &self.rng, &self.registry, &self.config)
    }
}
