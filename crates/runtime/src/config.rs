//! Runtime configuration and environment loading.
use std::env;
use std::path::PathBuf;

use realm_core::GameConfig;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Content directory; `None` starts with empty content and no areas.
    pub data_dir: Option<PathBuf>,
    /// Wall-clock tick period in milliseconds. Zero disables the timer so only
    /// explicit [`RuntimeHandle::step`](crate::RuntimeHandle::step) calls advance time.
    pub tick_ms: u64,
    pub seed: u64,
    /// Directory for the rolling log file; stderr only when unset.
    pub log_dir: Option<PathBuf>,
    pub command_buffer_size: usize,
    /// Used when `data_dir` carries no `config.toml`.
    pub game_config: GameConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            tick_ms: 16,
            seed: 0,
            log_dir: None,
            command_buffer_size: 32,
            game_config: GameConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Loads `.env` first when present. Environment variables:
    /// - `REALM_DATA_DIR` - Content directory (default: none)
    /// - `REALM_TICK_MS` - Tick period, 0 disables the timer (default: 16)
    /// - `REALM_SEED` - RNG seed (default: 0)
    /// - `REALM_LOG_DIR` - Log file directory (default: none)
    /// - `REALM_COMMAND_BUFFER` - Command queue size (default: 32)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable lookup.
    /// Values that fail to parse keep their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("REALM_DATA_DIR").filter(|dir| !dir.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(tick_ms) = read_var::<u64>(&lookup, "REALM_TICK_MS") {
            config.tick_ms = tick_ms;
        }
        if let Some(seed) = read_var::<u64>(&lookup, "REALM_SEED") {
            config.seed = seed;
        }
        if let Some(dir) = lookup("REALM_LOG_DIR").filter(|dir| !dir.is_empty()) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(capacity) = read_var::<usize>(&lookup, "REALM_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        config
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = RuntimeConfig::from_vars(vars(&[]));
        assert!(config.data_dir.is_none());
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.seed, 0);
        assert_eq!(config.command_buffer_size, 32);
    }

    #[test]
    fn reads_every_variable() {
        let config = RuntimeConfig::from_vars(vars(&[
            ("REALM_DATA_DIR", "/srv/realm"),
            ("REALM_TICK_MS", "0"),
            ("REALM_SEED", "42"),
            ("REALM_LOG_DIR", "/var/log/realm"),
            ("REALM_COMMAND_BUFFER", "8"),
        ]));
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/realm")));
        assert_eq!(config.tick_ms, 0);
        assert_eq!(config.seed, 42);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/realm")));
        assert_eq!(config.command_buffer_size, 8);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let config = RuntimeConfig::from_vars(vars(&[
            ("REALM_TICK_MS", "fast"),
            ("REALM_SEED", "-1"),
            ("REALM_COMMAND_BUFFER", "0"),
        ]));
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.seed, 0);
        assert_eq!(config.command_buffer_size, 1);
    }
}
