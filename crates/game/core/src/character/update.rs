//! Per-tick state machine.
//!
//! Order is fixed:
//! 1. refresh live/agony from health
//! 2. decay use and move cooldowns (may go negative)
//! 3. level up once if experience reached the threshold
//! 4. journal, inventory, dialogs, skills (passive injection), effects
//! 5. advance and possibly resolve the in-progress cast
//! 6. decay the character's own use-action cooldown

use std::mem;

use super::Character;
use crate::effect::Effect;
use crate::env::Env;
use crate::target::{Origin, Target};

impl Character {
    pub fn update(&mut self, delta: i64, env: &Env<'_>) {
        self.refresh_vitals();

        self.use_cooldown -= delta;
        self.move_cooldown -= delta;

        if self.experience >= env.config().max_experience(self.level) {
            self.level_up();
        }

        self.journal.update(&self.flags);
        self.inventory.update(delta);
        self.dialogs.retain(|dialog| !dialog.is_stale());
        self.update_skills(delta, env);
        self.update_effects(delta, env);

        self.update_cast(delta, env);

        if let Some(action) = self.use_action.as_mut() {
            action.update(delta);
        }
    }

    /// Gains one level and restores health and mana. Experience restarts at zero.
    fn level_up(&mut self) {
        self.level += 1;
        self.experience = 0;
        let (health, mana) = (self.max_health(), self.max_mana());
        self.set_health(health);
        self.set_mana(mana);
        tracing::debug!(character = %self.identity, level = self.level, "level up");
    }

    fn update_skills(&mut self, delta: i64, env: &Env<'_>) {
        let ids: Vec<String> = self.skills.keys().cloned().collect();
        for id in ids {
            let Some(skill) = self.skills.get_mut(&id) else {
                continue;
            };
            skill.update(delta);
            let requirements = skill.passive_requirements().to_vec();
            let passives = skill.passive_effects().to_vec();
            if passives.is_empty() || !self.meets_all(&requirements, env) {
                continue;
            }
            for effect_id in passives {
                if self.has_effect(&effect_id) {
                    continue;
                }
                if let Some(effect) = Effect::from_content(&effect_id, Some(&self.identity), env) {
                    self.take_effect(effect, Origin::Itself, env);
                }
            }
        }
    }

    fn update_effects(&mut self, delta: i64, env: &Env<'_>) {
        let mut effects = mem::take(&mut self.effects);
        for effect in effects.values_mut() {
            let origin = effect.origin_for(&self.identity);
            effect.update(delta, self, origin, env);
        }
        effects.retain(|identity, effect| {
            if effect.expired() {
                env.registry().unregister(identity);
                false
            } else {
                true
            }
        });
        let added = mem::replace(&mut self.effects, effects);
        self.effects.extend(added);
    }

    fn update_cast(&mut self, delta: i64, env: &Env<'_>) {
        let Some(casted) = self.casted.clone() else {
            return;
        };
        match self.with_casted_action(&casted, env, |action| action.advance_cast(delta)) {
            None => {
                tracing::warn!(character = %self.identity, usable = %casted.id, "cast source lost");
                self.casted = None;
            }
            Some(false) => {}
            Some(true) => {
                self.casted = None;
                self.use_casted(&casted, env);
            }
        }
    }
}
