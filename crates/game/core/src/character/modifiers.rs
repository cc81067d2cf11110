//! Modifier dispatch and the capability implementations.

use super::Character;
use crate::effect::Effect;
use crate::env::Env;
use crate::item::{Inventory, Item};
use crate::journal::Quest;
use crate::modifier::{Modifier, normalized_amount};
use crate::registry::Identity;
use crate::skill::Skill;
use crate::target::{
    Container, Experiencer, Kill, Killer, ModifierHook, Origin, Target, transfer_to_source,
};
use crate::types::{Attitude, Position};
use crate::useaction::UseAction;

impl Character {
    fn take_modifier(&mut self, origin: &mut Origin<'_>, modifier: &Modifier, env: &Env<'_>) {
        match modifier {
            Modifier::Health { min, max } => {
                let was_live = self.live;
                let roll = env.rng().range(*min, *max);
                self.set_health(self.health + roll);
                if was_live && !self.live {
                    self.credit_kill(origin, env);
                }
            }
            Modifier::Mana { min, max } => {
                let roll = env.rng().range(*min, *max);
                self.set_mana(self.mana + roll);
            }
            Modifier::Flag { id, off } => {
                if *off {
                    self.flags.remove(id);
                } else {
                    self.flags.insert(id.clone());
                }
            }
            Modifier::Quest { id } => match env.content().quest(id) {
                Some(data) => {
                    self.journal.add_quest(Quest::new(&data));
                }
                None => tracing::warn!(quest = %id, "quest definition not found"),
            },
            Modifier::Area { id, x, y } => {
                let entry = Position::new(*x, *y);
                self.area_id = id.clone();
                self.position = entry;
                self.destination = entry;
            }
            Modifier::Chapter { id } => self.chapter_id = id.clone(),
            Modifier::AddItem { id, amount } => {
                for _ in 0..normalized_amount(*amount) {
                    let Some(item) = Item::from_content(id, env) else {
                        break;
                    };
                    let identity = item.identity().clone();
                    if let Err(err) = self.inventory.add_item(item) {
                        tracing::debug!(%err, character = %self.identity, "item not added");
                        env.registry().unregister(&identity);
                        break;
                    }
                }
            }
            Modifier::RemoveItem { id, amount } => {
                for item in self.inventory.take(id, normalized_amount(*amount)) {
                    env.registry().unregister(item.identity());
                }
            }
            Modifier::TransferItem { id, amount } => {
                let items = self.inventory.take(id, normalized_amount(*amount));
                let returned = transfer_to_source(origin, items, env);
                for item in returned {
                    if let Err(err) = self.inventory.add_item(item) {
                        tracing::warn!(%err, "transferred item lost");
                    }
                }
            }
            Modifier::AddSkill { id } => {
                if self.skills.contains_key(id) {
                    return;
                }
                match env.content().skill(id) {
                    Some(data) => {
                        self.skills.insert(id.clone(), Skill::new(&data));
                    }
                    None => tracing::warn!(skill = %id, "skill definition not found"),
                }
            }
            Modifier::Attribute(delta) => {
                self.attributes += *delta;
                self.set_health(self.health);
                self.set_mana(self.mana);
            }
            Modifier::Memory { attitude } => {
                if let Some(source) = origin.identity(&self.identity) {
                    self.memory.insert(source, *attitude);
                }
            }
        }
    }

    fn credit_kill(&mut self, origin: &mut Origin<'_>, env: &Env<'_>) {
        let kill = Kill {
            victim: self.identity.clone(),
            experience: env.config().kill_experience_per_level * self.level,
        };
        tracing::debug!(victim = %self.identity, killer = ?origin, "character killed");
        origin.with_source(env, |source| {
            if let Some(killer) = source.as_killer_mut() {
                killer.add_kill(kill);
            }
        });
    }
}

impl Target for Character {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn live(&self) -> bool {
        self.live
    }

    fn health(&self) -> i64 {
        self.health
    }

    fn position(&self) -> Position {
        self.position
    }

    fn level(&self) -> i64 {
        self.level
    }

    fn take_modifiers(&mut self, mut origin: Origin<'_>, modifiers: &[Modifier], env: &Env<'_>) {
        for modifier in modifiers {
            self.take_modifier(&mut origin, modifier, env);
            if let Some(hook) = &self.on_modifier_taken {
                hook(&self.identity, modifier);
            }
        }
    }

    fn remove_modifiers(&mut self, mut origin: Origin<'_>, modifiers: &[Modifier], env: &Env<'_>) {
        for inverse in modifiers.iter().filter_map(Modifier::inverse) {
            self.take_modifier(&mut origin, &inverse, env);
        }
    }

    fn take_effect(&mut self, mut effect: Effect, origin: Origin<'_>, env: &Env<'_>) {
        effect.set_target(self.identity.clone());
        if effect.hostile() {
            let source = origin
                .identity(&self.identity)
                .or_else(|| effect.source().cloned());
            if let Some(source) = source.filter(|s| *s != self.identity) {
                self.memory.insert(source, Attitude::Hostile);
            }
        }
        effect.update(0, self, origin, env);
        if effect.expired() {
            env.registry().unregister(effect.identity());
            return;
        }
        self.effects.insert(effect.identity().clone(), effect);
    }

    fn has_effect(&self, id: &str) -> bool {
        self.effects.keys().any(|identity| identity.id() == id)
    }

    fn set_on_modifier_taken(&mut self, hook: Option<ModifierHook>) {
        self.on_modifier_taken = hook;
    }

    fn as_killer_mut(&mut self) -> Option<&mut dyn Killer> {
        Some(self)
    }

    fn as_experiencer_mut(&mut self) -> Option<&mut dyn Experiencer> {
        Some(self)
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }

    fn use_action(&self) -> Option<&UseAction> {
        self.use_action.as_ref()
    }

    fn use_action_mut(&mut self) -> Option<&mut UseAction> {
        self.use_action.as_mut()
    }
}

impl Killer for Character {
    /// Records the kill and grants its experience.
    fn add_kill(&mut self, kill: Kill) {
        self.experience += kill.experience;
        self.kills.push(kill);
    }

    fn kills(&self) -> &[Kill] {
        &self.kills
    }
}

impl Experiencer for Character {
    fn level(&self) -> i64 {
        self.level
    }

    fn experience(&self) -> i64 {
        self.experience
    }

    fn set_experience(&mut self, value: i64) {
        self.experience = value;
    }

    fn max_experience(&self, env: &Env<'_>) -> i64 {
        env.config().max_experience(self.level)
    }
}

impl Container for Character {
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}
