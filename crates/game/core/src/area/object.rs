use std::fmt;

use crate::character::SharedCharacter;
use crate::env::Env;
use crate::object::SharedObject;
use crate::registry::{Identity, Registry};
use crate::sync;
use crate::target::{SharedTarget, Target};
use crate::types::Position;

/// Handle to anything an area holds.
#[derive(Clone)]
pub enum AreaObject {
    Character(SharedCharacter),
    Object(SharedObject),
}

impl AreaObject {
    pub fn identity(&self) -> Identity {
        match self {
            Self::Character(c) => sync::read(c).identity().clone(),
            Self::Object(o) => sync::read(o).identity().clone(),
        }
    }

    /// Unregisters the object and everything it owns.
    pub fn release(&self, registry: &Registry) {
        match self {
            Self::Character(c) => sync::read(c).release(registry),
            Self::Object(o) => sync::read(o).release(registry),
        }
    }

    pub fn update(&self, delta: i64, env: &Env<'_>) {
        match self {
            Self::Character(c) => sync::write(c).update(delta, env),
            Self::Object(o) => sync::write(o).update(delta, env),
        }
    }

    pub fn live(&self) -> bool {
        match self {
            Self::Character(c) => sync::read(c).live(),
            Self::Object(o) => sync::read(o).live(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Character(c) => sync::read(c).position(),
            Self::Object(o) => sync::read(o).position(),
        }
    }

    pub fn sight(&self) -> i64 {
        match self {
            Self::Character(c) => sync::read(c).sight(),
            Self::Object(o) => sync::read(o).sight(),
        }
    }

    pub fn respawn(&self) -> i64 {
        match self {
            Self::Character(c) => sync::read(c).respawn(),
            Self::Object(o) => sync::read(o).respawn(),
        }
    }

    pub fn area_id(&self) -> String {
        match self {
            Self::Character(c) => sync::read(c).area_id().to_string(),
            Self::Object(o) => sync::read(o).area_id().to_string(),
        }
    }

    pub fn set_area_id(&self, area_id: &str) {
        match self {
            Self::Character(c) => sync::write(c).set_area_id(area_id),
            Self::Object(o) => sync::write(o).set_area_id(area_id),
        }
    }

    /// Takes one movement step when the object is a moving character.
    pub(crate) fn step(&self, passable: impl Fn(f64, f64) -> bool, move_cooldown: i64) {
        if let Self::Character(c) = self {
            let mut character = sync::write(c);
            if character.moving() {
                character.step(passable, move_cooldown);
            }
        }
    }

    pub fn as_character(&self) -> Option<&SharedCharacter> {
        match self {
            Self::Character(c) => Some(c),
            Self::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&SharedObject> {
        match self {
            Self::Object(o) => Some(o),
            Self::Character(_) => None,
        }
    }

    pub fn as_target(&self) -> SharedTarget {
        match self {
            Self::Character(c) => c.clone(),
            Self::Object(o) => o.clone(),
        }
    }
}

impl From<SharedCharacter> for AreaObject {
    fn from(character: SharedCharacter) -> Self {
        Self::Character(character)
    }
}

impl From<SharedObject> for AreaObject {
    fn from(object: SharedObject) -> Self {
        Self::Object(object)
    }
}

impl fmt::Debug for AreaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(_) => write!(f, "Character({})", self.identity()),
            Self::Object(_) => write!(f, "Object({})", self.identity()),
        }
    }
}
