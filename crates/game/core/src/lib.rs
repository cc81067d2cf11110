//! Data-driven RPG simulation core.
//!
//! `realm-core` holds the rules every entity plays by: identities, modifiers,
//! effects, the [`Target`] capability, characters, generic objects and the area
//! loop that ticks them. Content definitions, randomness, map geometry and the
//! identity registry reach update code through [`Env`]; nothing here performs I/O.
pub mod area;
pub mod character;
pub mod config;
pub mod dialog;
pub mod effect;
pub mod env;
pub mod error;
pub mod item;
pub mod journal;
pub mod modifier;
pub mod object;
pub mod registry;
pub mod requirement;
pub mod skill;
pub mod stats;
pub mod sync;
pub mod target;
pub mod types;
pub mod useaction;

#[cfg(test)]
mod testing;

pub use area::{
    Area, AreaCharacterData, AreaData, AreaObject, AreaObjectData, Conditions, Respawn, Weather,
};
pub use character::{Casted, Character, CharacterData, SharedCharacter, Usable, UseError};
pub use config::GameConfig;
pub use dialog::Dialog;
pub use effect::{Effect, EffectData, SavedEffect};
pub use env::{
    ContentOracle, ContentSnapshot, Env, LayerMap, MapLayer, MapOracle, MapSize, PcgRng,
    RngOracle,
};
pub use error::{ErrorSeverity, GameError};
pub use item::{Inventory, InventoryData, InventoryError, Item, ItemData};
pub use journal::{Journal, Quest, QuestData};
pub use modifier::Modifier;
pub use object::{Object, ObjectData, SharedObject};
pub use registry::{EntityKind, Identity, Registry, ResolveError};
pub use requirement::Requirement;
pub use skill::{Skill, SkillData};
pub use stats::{Attributes, DamageRange, DerivedStats};
pub use target::{
    Container, Experiencer, Kill, Killer, ModifierHook, Origin, SharedTarget, Target,
};
pub use types::{Alignment, Attitude, Gender, Position};
pub use useaction::{Delivery, UseAction, UseActionData};
