//! Use, cast and resolve.
//!
//! `Idle -> Casting -> Resolved -> Idle`. [`Character::activate`] validates and
//! records the cast; nothing is applied until the per-tick update sees the cast
//! time reach its maximum and calls `use_casted`.

use super::Character;
use crate::effect::{self, Effect};
use crate::env::Env;
use crate::error::{ErrorSeverity, GameError};
use crate::item::Item;
use crate::modifier::Modifier;
use crate::registry::Identity;
use crate::skill::Skill;
use crate::target::{Origin, Target, deliver, with_resolved};
use crate::useaction::UseAction;

/// Reasons a use attempt is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UseError {
    #[error("requirements for {usable} not met")]
    RequirementsNotMet { usable: String },

    #[error("{usable} is not ready")]
    NotReady { usable: String },

    #[error("cannot use {usable} while moving")]
    InMove { usable: String },
}

impl GameError for UseError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RequirementsNotMet { .. } => ErrorSeverity::Validation,
            Self::NotReady { .. } | Self::InMove { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RequirementsNotMet { .. } => "USE_REQUIREMENTS_NOT_MET",
            Self::NotReady { .. } => "USE_NOT_READY",
            Self::InMove { .. } => "USE_IN_MOVE",
        }
    }
}

/// Something a character can use.
#[derive(Clone, Copy)]
pub enum Usable<'a> {
    /// One of the character's skills, by ID.
    Skill(&'a str),
    /// An item in the character's inventory.
    Item(&'a Identity),
    /// Another entity exposing its own use-action; the caller holds its lock.
    Object(&'a dyn Target),
}

/// In-progress cast: the usable's ID and the identity of its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Casted {
    pub id: String,
    pub owner: Identity,
    /// The exact inventory item being used, when the usable is an item.
    pub item: Option<Identity>,
}

impl Character {
    /// Starts using something.
    ///
    /// Dead characters and usables without a use-action succeed without effect.
    /// Otherwise requirements, then readiness, then movement are checked.
    pub fn activate(&mut self, usable: Usable<'_>, env: &Env<'_>) -> Result<(), UseError> {
        if !self.live {
            return Ok(());
        }
        let (action, casted) = match usable {
            Usable::Skill(id) => (
                self.skills.get(id).and_then(Skill::use_action).cloned(),
                Casted {
                    id: id.to_string(),
                    owner: self.identity.clone(),
                    item: None,
                },
            ),
            Usable::Item(identity) => (
                self.inventory.item(identity).and_then(Item::use_action).cloned(),
                Casted {
                    id: identity.id().to_string(),
                    owner: self.identity.clone(),
                    item: Some(identity.clone()),
                },
            ),
            Usable::Object(target) => (
                target.use_action().cloned(),
                Casted {
                    id: target.identity().id().to_string(),
                    owner: target.identity().clone(),
                    item: None,
                },
            ),
        };
        let Some(action) = action else {
            return Ok(());
        };
        let usable = casted.id.clone();
        if !self.meets_all(action.requirements(), env) {
            return Err(UseError::RequirementsNotMet { usable });
        }
        if self.use_cooldown > 0 || !action.ready() {
            return Err(UseError::NotReady { usable });
        }
        if self.moving() {
            return Err(UseError::InMove { usable });
        }
        tracing::debug!(character = %self.identity, %usable, "cast started");
        self.casted = Some(casted);
        Ok(())
    }

    pub fn use_skill(&mut self, id: &str, env: &Env<'_>) -> Result<(), UseError> {
        self.activate(Usable::Skill(id), env)
    }

    pub fn use_item(&mut self, item: &Identity, env: &Env<'_>) -> Result<(), UseError> {
        self.activate(Usable::Item(item), env)
    }

    pub fn use_object(&mut self, object: &dyn Target, env: &Env<'_>) -> Result<(), UseError> {
        self.activate(Usable::Object(object), env)
    }

    /// Runs `f` on the use-action a cast refers to.
    pub(super) fn with_casted_action<R>(
        &mut self,
        casted: &Casted,
        env: &Env<'_>,
        f: impl FnOnce(&mut UseAction) -> R,
    ) -> Option<R> {
        if casted.owner != self.identity {
            return with_resolved(&casted.owner, env, |owner| owner.use_action_mut().map(f))
                .flatten();
        }
        if let Some(item) = &casted.item {
            return self
                .inventory
                .item_mut(item)
                .and_then(Item::use_action_mut)
                .map(f);
        }
        if let Some(action) = self
            .skills
            .get_mut(&casted.id)
            .and_then(Skill::use_action_mut)
        {
            return Some(f(action));
        }
        if casted.id == self.identity.id() {
            return self.use_action.as_mut().map(f);
        }
        None
    }

    /// Resolves a completed cast.
    pub(super) fn use_casted(&mut self, casted: &Casted, env: &Env<'_>) {
        let Some(action) = self.with_casted_action(casted, env, |action| action.clone()) else {
            tracing::warn!(character = %self.identity, usable = %casted.id, "casted action vanished");
            return;
        };
        if !self.meets_all(action.requirements(), env) {
            tracing::debug!(character = %self.identity, usable = %casted.id, "cast fizzled");
            self.with_casted_action(casted, env, UseAction::reset_cast);
            return;
        }
        self.charge_all(action.requirements(), env);

        let me = self.identity.clone();
        let user_effects = self.instantiate(&action.user().effects, env);
        deliver(self, Origin::Itself, &action.user().modifiers, user_effects, env);

        if casted.owner != me {
            let object = action.object();
            let effects = instantiate_from(&object.effects, &casted.owner, env);
            deliver(
                self,
                Origin::Remote(casted.owner.clone()),
                &object.modifiers,
                effects,
                env,
            );
        }

        match self.current_target().cloned() {
            Some(target) if target != me => {
                let onto_target = self.instantiate(&action.target().effects, env);
                let onto_user = instantiate_from(&action.target_user().effects, &target, env);
                let mut pending = Some((onto_target, onto_user));
                let delivered = with_resolved(&target, env, |receiver| {
                    let (onto_target, onto_user) = pending.take().unwrap_or_default();
                    deliver(
                        receiver,
                        Origin::Local(&mut *self),
                        &action.target().modifiers,
                        onto_target,
                        env,
                    );
                    deliver(
                        &mut *self,
                        Origin::Local(receiver),
                        &action.target_user().modifiers,
                        onto_user,
                        env,
                    );
                });
                if delivered.is_none() {
                    tracing::warn!(character = %me, %target, "cast target unavailable");
                }
                if let Some((onto_target, onto_user)) = pending {
                    effect::discard(onto_target, env);
                    effect::discard(onto_user, env);
                }
            }
            _ => {
                let effects = self.instantiate(&action.target().effects, env);
                deliver(self, Origin::Itself, &action.target().modifiers, effects, env);
            }
        }

        self.with_casted_action(casted, env, UseAction::finish);
        self.use_cooldown = env.config().use_cooldown_ms;
        tracing::debug!(character = %me, usable = %casted.id, "cast resolved");
    }

    /// Instantiates effects sourced from this character.
    ///
    /// Melee-hit effects carry this character's damage range as a health modifier.
    fn instantiate(&self, ids: &[String], env: &Env<'_>) -> Vec<Effect> {
        instantiate_from(ids, &self.identity, env)
            .into_iter()
            .map(|mut effect| {
                if effect.melee_hit() {
                    let damage = self.damage();
                    effect.add_modifier(Modifier::health(-damage.max, -damage.min));
                }
                effect
            })
            .collect()
    }
}

fn instantiate_from(ids: &[String], source: &Identity, env: &Env<'_>) -> Vec<Effect> {
    ids.iter()
        .filter_map(|id| Effect::from_content(id, Some(source), env))
        .collect()
}
