use super::{Area, AreaObject};
use crate::character::{Character, SharedCharacter};
use crate::env::Env;
use crate::registry::Identity;
use crate::sync::{self, SharedMap};

#[derive(Clone, Debug)]
struct Scheduled {
    object: AreaObject,
    at: i64,
}

/// Queue of dead objects waiting to come back, keyed by identity.
#[derive(Debug, Default)]
pub struct Respawn {
    queue: SharedMap<Identity, Scheduled>,
}

impl Respawn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_queued(&self, identity: &Identity) -> bool {
        self.queue.contains_key(identity)
    }

    /// Area time at which a queued object comes back.
    pub fn scheduled_at(&self, identity: &Identity) -> Option<i64> {
        self.queue.get(identity).map(|s| s.at)
    }

    pub fn clear(&self) {
        self.queue.clear();
    }

    /// Queues newly dead objects, then brings back the ones whose time has come.
    pub(crate) fn update(&self, area: &Area, now: i64, env: &Env<'_>) {
        for (identity, object) in area.objects.snapshot() {
            if object.live() || self.queue.contains_key(&identity) {
                continue;
            }
            let delay = object.respawn();
            if delay <= 0 {
                continue;
            }
            tracing::debug!(
                area = %area.id(),
                object = %identity,
                at = now + delay,
                "respawn scheduled"
            );
            self.queue.insert(
                identity,
                Scheduled {
                    object,
                    at: now + delay,
                },
            );
        }

        for (identity, scheduled) in self.queue.snapshot() {
            if now < scheduled.at {
                continue;
            }
            self.queue.remove(&identity);
            if !area.objects.contains_key(&identity) {
                continue;
            }
            let AreaObject::Character(original) = &scheduled.object else {
                continue;
            };
            let Some(replacement) = Self::replacement(original, env) else {
                continue;
            };
            let replacement = AreaObject::Character(replacement.into_shared(env));
            tracing::debug!(
                area = %area.id(),
                original = %identity,
                replacement = %replacement.identity(),
                "character respawned"
            );
            area.add_object(replacement);
            if let Some(original) = area.remove_object(&identity) {
                original.release(env.registry());
            }
        }
    }

    /// Fresh character from the original's definition, carrying over its respawn
    /// delay, default position and flags. `None` when the original came back to
    /// life in the meantime or its definition is gone.
    fn replacement(original: &SharedCharacter, env: &Env<'_>) -> Option<Character> {
        let original = sync::read(original);
        if original.live() {
            return None;
        }
        let mut replacement = Character::from_content(original.id(), env)?;
        let home = original.default_position();
        replacement.set_respawn(original.respawn());
        replacement.set_default_position(home);
        replacement.set_position(home);
        replacement.set_destination(home);
        for flag in original.flags() {
            replacement.set_flag(flag.clone());
        }
        Some(replacement)
    }
}
