//! Cast/cooldown unit behind skills, items and usable objects.
//!
//! A use-action carries four delivery channels, each a list of inline modifiers
//! plus effect definition IDs:
//!
//! - **user**: onto the character that used it
//! - **object**: from the used entity back onto the user (only when the used
//!   thing is itself a target)
//! - **target**: onto the user's current target, or the user when untargeted
//! - **target_user**: from the target back onto the user

use crate::modifier::Modifier;
use crate::requirement::Requirement;

/// Modifiers and effect IDs delivered together.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Delivery {
    pub modifiers: Vec<Modifier>,
    pub effects: Vec<String>,
}

impl Delivery {
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.effects.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UseActionData {
    pub cast_time: i64,
    pub cooldown: i64,
    pub requirements: Vec<Requirement>,
    pub user: Delivery,
    pub object: Delivery,
    pub target: Delivery,
    pub target_user: Delivery,
}

impl UseActionData {
    #[must_use]
    pub fn with_cast_time(mut self, cast_time: i64) -> Self {
        self.cast_time = cast_time;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: i64) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn with_user_modifier(mut self, modifier: Modifier) -> Self {
        self.user.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_target_modifier(mut self, modifier: Modifier) -> Self {
        self.target.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_target_effect(mut self, id: impl Into<String>) -> Self {
        self.target.effects.push(id.into());
        self
    }

    #[must_use]
    pub fn with_object_modifier(mut self, modifier: Modifier) -> Self {
        self.object.modifiers.push(modifier);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct UseAction {
    cast_time: i64,
    cast_time_max: i64,
    cooldown: i64,
    cooldown_max: i64,
    requirements: Vec<Requirement>,
    user: Delivery,
    object: Delivery,
    target: Delivery,
    target_user: Delivery,
}

impl UseAction {
    /// Builds a ready action: no cast progress, no cooldown.
    pub fn from_data(data: &UseActionData) -> Self {
        Self {
            cast_time: 0,
            cast_time_max: data.cast_time,
            cooldown: 0,
            cooldown_max: data.cooldown,
            requirements: data.requirements.clone(),
            user: data.user.clone(),
            object: data.object.clone(),
            target: data.target.clone(),
            target_user: data.target_user.clone(),
        }
    }

    pub fn cast_time(&self) -> i64 {
        self.cast_time
    }

    pub fn cast_time_max(&self) -> i64 {
        self.cast_time_max
    }

    pub fn cooldown(&self) -> i64 {
        self.cooldown
    }

    pub fn cooldown_max(&self) -> i64 {
        self.cooldown_max
    }

    pub fn set_cooldown(&mut self, cooldown: i64) {
        self.cooldown = cooldown;
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn user(&self) -> &Delivery {
        &self.user
    }

    pub fn object(&self) -> &Delivery {
        &self.object
    }

    pub fn target(&self) -> &Delivery {
        &self.target
    }

    pub fn target_user(&self) -> &Delivery {
        &self.target_user
    }

    pub fn ready(&self) -> bool {
        self.cooldown <= 0
    }

    /// Adds elapsed time to the cast; true once the cast is complete.
    pub fn advance_cast(&mut self, delta: i64) -> bool {
        self.cast_time += delta;
        self.cast_time >= self.cast_time_max
    }

    pub fn reset_cast(&mut self) {
        self.cast_time = 0;
    }

    /// Resets the cast and starts the full cooldown.
    pub fn finish(&mut self) {
        self.cast_time = 0;
        self.cooldown = self.cooldown_max;
    }

    /// Decays the cooldown, stopping at zero.
    pub fn update(&mut self, delta: i64) {
        if self.cooldown > 0 {
            self.cooldown = (self.cooldown - delta).max(0);
        }
    }

    pub fn data(&self) -> UseActionData {
        UseActionData {
            cast_time: self.cast_time_max,
            cooldown: self.cooldown_max,
            requirements: self.requirements.clone(),
            user: self.user.clone(),
            object: self.object.clone(),
            target: self.target.clone(),
            target_user: self.target_user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_completes_at_max() {
        let mut action = UseAction::from_data(&UseActionData::default().with_cast_time(300));
        assert!(!action.advance_cast(200));
        assert!(action.advance_cast(100));
        action.finish();
        assert_eq!(action.cast_time(), 0);
    }

    #[test]
    fn cooldown_decays_to_zero() {
        let mut action = UseAction::from_data(&UseActionData::default().with_cooldown(1000));
        assert!(action.ready());
        action.finish();
        assert!(!action.ready());
        action.update(600);
        assert_eq!(action.cooldown(), 400);
        action.update(600);
        assert_eq!(action.cooldown(), 0);
        assert!(action.ready());
    }
}
