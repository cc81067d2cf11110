//! Timed bundles of modifiers.
//!
//! An effect moves through four states:
//!
//! - **Pending**: built from a definition, no target yet
//! - **First tick**: target set, the next [`Effect::update`] applies the one-shot
//!   modifiers and pulses the over-time modifiers once
//! - **Ticking**: over-time modifiers pulse every accumulated second; remaining
//!   time decreases unless the effect is infinite
//! - **Expired**: remaining time reached zero; one-shot modifiers were reversed
//!
//! The effect never removes itself. Owners drop expired effects right after the
//! tick that expired them.
mod data;

pub use data::{EffectData, SavedEffect};

use std::collections::{HashMap, HashSet};

use crate::config::GameConfig;
use crate::env::Env;
use crate::modifier::Modifier;
use crate::registry::{EntityKind, Identity};
use crate::target::{Origin, Target, with_resolved};

#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    identity: Identity,
    name: String,
    source: Option<Identity>,
    target: Option<Identity>,
    modifiers: Vec<Modifier>,
    over_time_modifiers: Vec<Modifier>,
    duration: i64,
    time: i64,
    second_timer: i64,
    melee_hit: bool,
    infinite: bool,
    hostile: bool,
    started: bool,
    expired: bool,
}

impl Effect {
    /// Instantiates a definition under a fresh serial.
    pub fn new(data: &EffectData, env: &Env<'_>) -> Self {
        Self::with_serial(data, None, env)
    }

    /// Instantiates a definition, keeping a saved serial when it is free.
    pub fn with_serial(data: &EffectData, serial: Option<&str>, env: &Env<'_>) -> Self {
        let identity = env
            .registry()
            .register(EntityKind::Effect, &data.id, serial);
        Self {
            identity,
            name: data.name.clone(),
            source: None,
            target: None,
            modifiers: data.modifiers.clone(),
            over_time_modifiers: data.over_time_modifiers.clone(),
            duration: data.duration,
            time: data.duration,
            second_timer: 0,
            melee_hit: data.melee_hit,
            infinite: data.infinite,
            hostile: data.hostile,
            started: false,
            expired: false,
        }
    }

    /// Looks up a definition and instantiates it from `source`.
    ///
    /// Missing definitions are logged and skipped.
    pub fn from_content(id: &str, source: Option<&Identity>, env: &Env<'_>) -> Option<Self> {
        let Some(data) = env.content().effect(id) else {
            tracing::warn!(effect = id, "effect definition not found");
            return None;
        };
        let mut effect = Self::new(&data, env);
        effect.source = source.cloned();
        Some(effect)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&Identity> {
        self.source.as_ref()
    }

    pub fn set_source(&mut self, source: Option<Identity>) {
        self.source = source;
    }

    pub fn target(&self) -> Option<&Identity> {
        self.target.as_ref()
    }

    /// Attaches the effect to its receiver. Application starts on the next update.
    pub fn set_target(&mut self, target: Identity) {
        self.target = Some(target);
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn over_time_modifiers(&self) -> &[Modifier] {
        &self.over_time_modifiers
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Remaining time in ms.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn set_time(&mut self, time: i64) {
        self.time = time;
    }

    pub fn melee_hit(&self) -> bool {
        self.melee_hit
    }

    pub fn infinite(&self) -> bool {
        self.infinite
    }

    pub fn hostile(&self) -> bool {
        self.hostile
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Marks the one-shot modifiers as already applied.
    ///
    /// Used when restoring saved effects whose changes are part of the saved stats.
    pub fn mark_started(&mut self) {
        self.started = true;
    }

    pub fn expired(&self) -> bool {
        self.expired
    }

    /// Origin of this effect's modifiers as seen by `holder`.
    pub fn origin_for(&self, holder: &Identity) -> Origin<'static> {
        Origin::for_source(self.source.as_ref(), holder)
    }

    /// Advances the effect by `delta` ms against its target.
    ///
    /// `holder` is the entity whose collection owns the effect; when it is also the
    /// target it receives the modifiers directly, otherwise the target is resolved
    /// through the registry. An unresolvable target leaves the effect untouched.
    pub fn update(
        &mut self,
        delta: i64,
        holder: &mut dyn Target,
        origin: Origin<'_>,
        env: &Env<'_>,
    ) {
        if self.expired {
            tracing::error!(effect = %self.identity, "update called on expired effect");
            return;
        }
        let Some(target) = self.target.clone() else {
            tracing::warn!(effect = %self.identity, "effect has no target");
            return;
        };
        if &target == holder.identity() {
            self.tick(delta, holder, origin, env);
            return;
        }
        let applied = with_resolved(&target, env, |receiver| {
            self.tick(delta, receiver, origin, env);
        });
        if applied.is_none() {
            tracing::warn!(effect = %self.identity, %target, "effect target unresolved");
        }
    }

    fn tick(&mut self, delta: i64, receiver: &mut dyn Target, mut origin: Origin<'_>, env: &Env<'_>) {
        if !self.started {
            receiver.take_modifiers(origin.reborrow(), &self.modifiers, env);
            receiver.take_modifiers(origin.reborrow(), &self.over_time_modifiers, env);
            self.started = true;
        } else {
            self.second_timer += delta;
            if self.second_timer >= GameConfig::OVER_TIME_PULSE_MS {
                receiver.take_modifiers(origin.reborrow(), &self.over_time_modifiers, env);
                self.second_timer = 0;
            }
        }
        if self.infinite {
            return;
        }
        self.time -= delta;
        if self.time <= 0 {
            receiver.remove_modifiers(origin, &self.modifiers, env);
            self.expired = true;
            tracing::trace!(effect = %self.identity, "effect expired");
        }
    }

    /// Saved state for this effect.
    pub fn data(&self) -> SavedEffect {
        SavedEffect {
            id: self.identity.id().to_string(),
            serial: self.identity.serial().to_string(),
            time: self.time,
            source: self.source.clone(),
        }
    }
}

/// Reconciles a holder's effects with saved records.
///
/// Effects missing from `saved` are dropped and unregistered, held ones take the
/// saved remaining time, and the rest are rebuilt already started so their
/// one-shot modifiers are not applied twice.
pub(crate) fn restore(
    effects: &mut HashMap<Identity, Effect>,
    saved: &[SavedEffect],
    holder: &Identity,
    env: &Env<'_>,
) {
    let wanted: HashSet<Identity> = saved
        .iter()
        .map(|s| Identity::new(&s.id, &s.serial))
        .collect();
    effects.retain(|identity, _| {
        let keep = wanted.contains(identity);
        if !keep {
            env.registry().unregister(identity);
        }
        keep
    });

    for entry in saved {
        let key = Identity::new(&entry.id, &entry.serial);
        if let Some(effect) = effects.get_mut(&key) {
            effect.set_time(entry.time);
            continue;
        }
        let Some(def) = env.content().effect(&entry.id) else {
            tracing::warn!(effect = %entry.id, "effect definition not found");
            continue;
        };
        let mut effect = Effect::with_serial(&def, Some(&entry.serial), env);
        effect.set_time(entry.time);
        effect.set_source(entry.source.clone());
        effect.set_target(holder.clone());
        effect.mark_started();
        effects.insert(effect.identity().clone(), effect);
    }
}

/// Unregisters effects that were built but never handed to a receiver.
pub(crate) fn discard(effects: Vec<Effect>, env: &Env<'_>) {
    for effect in effects {
        env.registry().unregister(effect.identity());
    }
}
