//! Capabilities an entity implements to take part in the effect engine.
//!
//! [`Target`] is the contract for receiving modifiers and effects. The smaller
//! [`Killer`], [`Experiencer`] and [`Container`] capabilities are reached through
//! accessor methods on `Target` so callers holding a `dyn Target` can ask for them.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::effect::Effect;
use crate::env::Env;
use crate::item::{Inventory, Item};
use crate::modifier::Modifier;
use crate::registry::Identity;
use crate::sync;
use crate::types::Position;
use crate::useaction::UseAction;

/// Shared, lockable handle to any target.
pub type SharedTarget = Arc<RwLock<dyn Target>>;

/// Callback run once for every modifier a target takes.
pub type ModifierHook = Box<dyn Fn(&Identity, &Modifier) + Send + Sync>;

/// Record of a kill credited to a killer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kill {
    pub victim: Identity,
    pub experience: i64,
}

/// Entity that can be credited with kills.
pub trait Killer {
    fn add_kill(&mut self, kill: Kill);
    fn kills(&self) -> &[Kill];
}

/// Entity that accumulates experience.
pub trait Experiencer {
    fn level(&self) -> i64;
    fn experience(&self) -> i64;
    fn set_experience(&mut self, value: i64);
    fn max_experience(&self, env: &Env<'_>) -> i64;
}

/// Entity that owns an inventory.
pub trait Container {
    fn inventory(&self) -> &Inventory;
    fn inventory_mut(&mut self) -> &mut Inventory;
}

/// Receiver of modifiers and effects.
///
/// Cross-entity changes always go through these methods; nothing outside an
/// entity touches its fields.
pub trait Target: Send + Sync {
    fn identity(&self) -> &Identity;

    fn live(&self) -> bool;

    fn health(&self) -> i64;

    fn position(&self) -> Position;

    /// Level used for kill rewards. Entities without levels report zero.
    fn level(&self) -> i64 {
        0
    }

    /// Applies each modifier in order, then runs the modifier hook for it.
    fn take_modifiers(&mut self, origin: Origin<'_>, modifiers: &[Modifier], env: &Env<'_>);

    /// Reverses the reversible modifiers in the list.
    fn remove_modifiers(&mut self, origin: Origin<'_>, modifiers: &[Modifier], env: &Env<'_>);

    /// Attaches an effect and runs its first tick.
    fn take_effect(&mut self, effect: Effect, origin: Origin<'_>, env: &Env<'_>);

    /// Whether an effect with this definition ID is active.
    fn has_effect(&self, id: &str) -> bool;

    fn set_on_modifier_taken(&mut self, hook: Option<ModifierHook>);

    fn as_killer_mut(&mut self) -> Option<&mut dyn Killer> {
        None
    }

    fn as_experiencer_mut(&mut self) -> Option<&mut dyn Experiencer> {
        None
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn Container> {
        None
    }

    fn use_action(&self) -> Option<&UseAction> {
        None
    }

    fn use_action_mut(&mut self) -> Option<&mut UseAction> {
        None
    }
}

/// Who caused a batch of modifiers.
pub enum Origin<'a> {
    /// No attributable source.
    None,
    /// The receiver caused it.
    Itself,
    /// Another entity, resolved through the registry when needed.
    Remote(Identity),
    /// Another entity the caller already holds.
    Local(&'a mut dyn Target),
}

impl<'a> Origin<'a> {
    /// Origin of an effect's source as seen from its holder.
    pub fn for_source(source: Option<&Identity>, holder: &Identity) -> Origin<'static> {
        match source {
            None => Origin::None,
            Some(source) if source == holder => Origin::Itself,
            Some(source) => Origin::Remote(source.clone()),
        }
    }

    /// Identity of the source, with `Itself` mapped to the receiver.
    pub fn identity(&self, receiver: &Identity) -> Option<Identity> {
        match self {
            Origin::None => None,
            Origin::Itself => Some(receiver.clone()),
            Origin::Remote(identity) => Some(identity.clone()),
            Origin::Local(target) => Some(target.identity().clone()),
        }
    }

    pub fn is_itself(&self) -> bool {
        matches!(self, Origin::Itself)
    }

    /// Borrows this origin for a nested call.
    pub fn reborrow(&mut self) -> Origin<'_> {
        match self {
            Origin::None => Origin::None,
            Origin::Itself => Origin::Itself,
            Origin::Remote(identity) => Origin::Remote(identity.clone()),
            Origin::Local(target) => Origin::Local(&mut **target),
        }
    }

    /// Runs `f` against the source entity when it is another entity.
    ///
    /// Remote sources that cannot be resolved or are busy are skipped with a log.
    pub fn with_source<R>(
        &mut self,
        env: &Env<'_>,
        f: impl FnOnce(&mut dyn Target) -> R,
    ) -> Option<R> {
        match self {
            Origin::None | Origin::Itself => None,
            Origin::Local(target) => Some(f(&mut **target)),
            Origin::Remote(identity) => {
                let shared = match env.registry().resolve(identity) {
                    Ok(shared) => shared,
                    Err(err) => {
                        tracing::warn!(%err, "modifier source unavailable");
                        return None;
                    }
                };
                let Some(mut guard) = sync::try_write(&shared) else {
                    tracing::debug!(source = %identity, "modifier source busy");
                    return None;
                };
                Some(f(&mut *guard))
            }
        }
    }
}

impl fmt::Debug for Origin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::None => f.write_str("None"),
            Origin::Itself => f.write_str("Itself"),
            Origin::Remote(identity) => write!(f, "Remote({identity})"),
            Origin::Local(target) => write!(f, "Local({})", target.identity()),
        }
    }
}

/// Delivers modifiers then effects to a receiver from one origin.
pub(crate) fn deliver(
    receiver: &mut dyn Target,
    mut origin: Origin<'_>,
    modifiers: &[Modifier],
    effects: Vec<Effect>,
    env: &Env<'_>,
) {
    if !modifiers.is_empty() {
        receiver.take_modifiers(origin.reborrow(), modifiers, env);
    }
    for effect in effects {
        receiver.take_effect(effect, origin.reborrow(), env);
    }
}

/// Resolves an identity and runs `f` on it with a non-blocking write lock.
pub(crate) fn with_resolved<R>(
    identity: &Identity,
    env: &Env<'_>,
    f: impl FnOnce(&mut dyn Target) -> R,
) -> Option<R> {
    let shared = match env.registry().resolve(identity) {
        Ok(shared) => shared,
        Err(err) => {
            tracing::warn!(%err, "target unavailable");
            return None;
        }
    };
    let Some(mut guard) = sync::try_write(&shared) else {
        tracing::debug!(entity = %identity, "target busy");
        return None;
    };
    Some(f(&mut *guard))
}

/// Hands items to the origin's inventory; returns what it could not take.
pub(crate) fn transfer_to_source(
    origin: &mut Origin<'_>,
    items: Vec<Item>,
    env: &Env<'_>,
) -> Vec<Item> {
    if items.is_empty() {
        return items;
    }
    let mut pending = Some(items);
    let rejected = origin.with_source(env, |source| {
        let items = pending.take().unwrap_or_default();
        let Some(container) = source.as_container_mut() else {
            return items;
        };
        let mut rejected = Vec::new();
        for item in items {
            if container.inventory().is_full() {
                rejected.push(item);
            } else if let Err(err) = container.inventory_mut().add_item(item) {
                tracing::warn!(%err, "transferred item lost");
            }
        }
        rejected
    });
    match (rejected, pending) {
        (Some(rejected), _) => rejected,
        (None, pending) => pending.unwrap_or_default(),
    }
}
