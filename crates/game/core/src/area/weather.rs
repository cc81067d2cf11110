use strum::{AsRefStr, Display, EnumString};

use crate::env::Env;

/// Sky conditions over an area.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Conditions {
    #[default]
    Sunny,
    Rain,
}

/// Weather state driven by the area clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Weather {
    pub conditions: Conditions,
    /// Area time of the last roll.
    pub changed_at: i64,
}

impl Weather {
    pub const fn new(conditions: Conditions) -> Self {
        Self {
            conditions,
            changed_at: 0,
        }
    }

    /// Rolls new conditions once a full interval has passed since the last roll.
    ///
    /// A d4 decides: 1-2 sunny, 3 rain, 4 keeps the current conditions.
    pub fn update(&mut self, now: i64, env: &Env<'_>) {
        if now - self.changed_at < env.config().weather_interval_ms {
            return;
        }
        self.changed_at = now;
        let next = match env.rng().roll_die(4) {
            1 | 2 => Conditions::Sunny,
            3 => Conditions::Rain,
            _ => return,
        };
        if next != self.conditions {
            tracing::debug!(from = %self.conditions, to = %next, "weather changed");
        }
        self.conditions = next;
    }
}
