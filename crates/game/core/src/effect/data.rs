use crate::modifier::Modifier;

/// Content definition of an effect.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectData {
    pub id: String,
    pub name: String,
    /// One-shot modifiers, reversed on expiry.
    pub modifiers: Vec<Modifier>,
    /// Modifiers pulsed on the first tick and then once per second.
    pub over_time_modifiers: Vec<Modifier>,
    /// Lifetime in ms.
    pub duration: i64,
    pub infinite: bool,
    /// Carries the user's melee damage when delivered by a cast.
    pub melee_hit: bool,
    /// Makes the receiver remember the source as hostile.
    pub hostile: bool,
}

impl EffectData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_over_time_modifier(mut self, modifier: Modifier) -> Self {
        self.over_time_modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    #[must_use]
    pub fn melee_hit(mut self) -> Self {
        self.melee_hit = true;
        self
    }

    #[must_use]
    pub fn hostile(mut self) -> Self {
        self.hostile = true;
        self
    }
}

/// Saved state of an active effect.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SavedEffect {
    pub id: String,
    pub serial: String,
    pub time: i64,
    pub source: Option<crate::registry::Identity>,
}
