/// Simulation constants and tunable parameters.
///
/// Every field has a default so partial TOML files only override what they name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Character's own cooldown after a cast resolves (ms).
    pub use_cooldown_ms: i64,
    /// Move-cooldown applied after every movement step (ms).
    pub move_cooldown_ms: i64,
    /// Experience needed per level; `MaxExperience = experience_per_level * level`.
    pub experience_per_level: i64,
    /// Kill reward per level of the victim.
    pub kill_experience_per_level: i64,
    /// Sight range of every character.
    pub base_sight: i64,
    /// Agony threshold as a percentage of maximum health.
    pub agony_percent: i64,
    /// Virtual time between weather rolls (ms).
    pub weather_interval_ms: i64,
    /// Map layers an object may step onto.
    pub passable_layers: Vec<String>,
    /// Maximum simultaneous targets per character.
    pub max_targets: usize,
}

impl GameConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_USE_COOLDOWN_MS: i64 = 2000;
    pub const DEFAULT_MOVE_COOLDOWN_MS: i64 = 50;
    pub const DEFAULT_EXPERIENCE_PER_LEVEL: i64 = 1000;
    pub const DEFAULT_KILL_EXPERIENCE_PER_LEVEL: i64 = 100;
    pub const DEFAULT_BASE_SIGHT: i64 = 300;
    pub const DEFAULT_AGONY_PERCENT: i64 = 10;
    pub const DEFAULT_WEATHER_INTERVAL_MS: i64 = 60_000;
    pub const DEFAULT_PASSABLE_LAYER: &'static str = "ground";
    pub const DEFAULT_MAX_TARGETS: usize = 1;

    // ===== fixed engine constants =====
    /// Over-time modifiers pulse once per this many ms.
    pub const OVER_TIME_PULSE_MS: i64 = 1000;

    pub fn new() -> Self {
        Self {
            use_cooldown_ms: Self::DEFAULT_USE_COOLDOWN_MS,
            move_cooldown_ms: Self::DEFAULT_MOVE_COOLDOWN_MS,
            experience_per_level: Self::DEFAULT_EXPERIENCE_PER_LEVEL,
            kill_experience_per_level: Self::DEFAULT_KILL_EXPERIENCE_PER_LEVEL,
            base_sight: Self::DEFAULT_BASE_SIGHT,
            agony_percent: Self::DEFAULT_AGONY_PERCENT,
            weather_interval_ms: Self::DEFAULT_WEATHER_INTERVAL_MS,
            passable_layers: vec![Self::DEFAULT_PASSABLE_LAYER.to_string()],
            max_targets: Self::DEFAULT_MAX_TARGETS,
        }
    }

    pub fn with_passable_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passable_layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Experience threshold for leaving `level`.
    pub fn max_experience(&self, level: i64) -> i64 {
        self.experience_per_level * level
    }

    /// Agony threshold for a given maximum health.
    ///
    /// The percentage is divided first, so with integer arithmetic any
    /// percentage below 100 yields zero.
    pub fn agony_threshold(&self, max_health: i64) -> i64 {
        self.agony_percent / 100 * max_health
    }

    /// Whether a layer name is on the passable allow-list.
    pub fn is_passable_layer(&self, layer: &str) -> bool {
        self.passable_layers.iter().any(|l| l == layer)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agony_threshold_truncates_to_zero() {
        let config = GameConfig::new();
        assert_eq!(config.agony_threshold(5000), 0);
    }

    #[test]
    fn max_experience_scales_with_level() {
        let config = GameConfig::new();
        assert_eq!(config.max_experience(1), 1000);
        assert_eq!(config.max_experience(7), 7000);
    }

    #[test]
    fn passable_layers_default_to_ground() {
        let config = GameConfig::default();
        assert!(config.is_passable_layer("ground"));
        assert!(!config.is_passable_layer("water"));

        let config = config.with_passable_layers(["water"]);
        assert!(config.is_passable_layer("water"));
    }
}
