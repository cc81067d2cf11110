//! The primary simulation entity.
//!
//! A character is built from a content definition plus an optional saved-state
//! overlay ([`Character::apply`]), registered with the identity registry at
//! construction, and mutated every tick by [`Character::update`]. It is never
//! explicitly destroyed; it stops existing when no area holds it.
//!
//! Submodules split the behavior:
//! - `data`: definition/save records and the apply/data pair
//! - `update`: the per-tick state machine
//! - `usage`: use, cast and resolve
//! - `modifiers`: the [`Target`] implementation and modifier dispatch
//! - `requirements`: requirement checks and charging
mod data;
mod modifiers;
mod requirements;
mod update;
mod usage;

pub use data::{CharacterData, SavedMemory};
pub use usage::{Casted, Usable, UseError};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::config::GameConfig;
use crate::dialog::Dialog;
use crate::effect::Effect;
use crate::env::Env;
use crate::item::Inventory;
use crate::journal::Journal;
use crate::registry::{EntityKind, Identity, Registry};
use crate::skill::Skill;
use crate::stats::{Attributes, DamageRange, DerivedStats};
use crate::target::{Kill, ModifierHook, SharedTarget};
use crate::types::{Alignment, Attitude, Gender, Position};
use crate::useaction::UseAction;

/// Shared handle to a character.
pub type SharedCharacter = Arc<RwLock<Character>>;

/// Rule values copied from the configuration at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rules {
    sight: i64,
    agony_percent: i64,
    max_targets: usize,
}

impl Rules {
    fn from_config(config: &GameConfig) -> Self {
        Self {
            sight: config.base_sight,
            agony_percent: config.agony_percent,
            max_targets: config.max_targets.max(1),
        }
    }
}

pub struct Character {
    identity: Identity,
    name: String,
    level: i64,
    health: i64,
    mana: i64,
    experience: i64,
    live: bool,
    agony: bool,
    gender: Gender,
    race: String,
    attitude: Attitude,
    alignment: Alignment,
    guild: String,
    attributes: Attributes,
    position: Position,
    destination: Position,
    default_position: Position,
    use_cooldown: i64,
    move_cooldown: i64,
    respawn: i64,
    area_id: String,
    chapter_id: String,
    flags: HashSet<String>,
    inventory: Inventory,
    journal: Journal,
    effects: HashMap<Identity, Effect>,
    skills: HashMap<String, Skill>,
    memory: HashMap<Identity, Attitude>,
    dialogs: Vec<Dialog>,
    targets: Vec<Identity>,
    casted: Option<Casted>,
    use_action: Option<UseAction>,
    kills: Vec<Kill>,
    on_modifier_taken: Option<ModifierHook>,
    rules: Rules,
}

impl Character {
    /// Builds a character from a definition or save record.
    ///
    /// The record's serial is kept when free; otherwise a fresh one is assigned.
    pub fn new(data: &CharacterData, env: &Env<'_>) -> Self {
        let identity =
            env.registry()
                .register(EntityKind::Character, &data.id, data.serial.as_deref());
        let mut character = Self::blank(identity, env.config());
        character.apply(data, env);
        character
    }

    /// Builds a character from its content definition.
    pub fn from_content(id: &str, env: &Env<'_>) -> Option<Self> {
        match env.content().character(id) {
            Some(data) => Some(Self::new(&data, env)),
            None => {
                tracing::warn!(character = id, "character definition not found");
                None
            }
        }
    }

    /// Builds, shares and binds a character so other entities can resolve it.
    pub fn spawn(data: &CharacterData, env: &Env<'_>) -> SharedCharacter {
        Self::new(data, env).into_shared(env)
    }

    /// Wraps the character in a shared handle and binds it in the registry.
    pub fn into_shared(self, env: &Env<'_>) -> SharedCharacter {
        let identity = self.identity.clone();
        let shared = Arc::new(RwLock::new(self));
        let target: SharedTarget = shared.clone();
        env.registry().bind(&identity, &target);
        shared
    }

    /// Unregisters this character with its items and effects. Called when the
    /// character is dropped from the simulation for good.
    pub fn release(&self, registry: &Registry) {
        self.inventory.release(registry);
        for identity in self.effects.keys() {
            registry.unregister(identity);
        }
        registry.unregister(&self.identity);
    }

    fn blank(identity: Identity, config: &GameConfig) -> Self {
        Self {
            identity,
            name: String::new(),
            level: 1,
            health: 0,
            mana: 0,
            experience: 0,
            live: false,
            agony: false,
            gender: Gender::default(),
            race: String::new(),
            attitude: Attitude::default(),
            alignment: Alignment::default(),
            guild: String::new(),
            attributes: Attributes::ZERO,
            position: Position::ORIGIN,
            destination: Position::ORIGIN,
            default_position: Position::ORIGIN,
            use_cooldown: 0,
            move_cooldown: 0,
            respawn: 0,
            area_id: String::new(),
            chapter_id: String::new(),
            flags: HashSet::new(),
            inventory: Inventory::default(),
            journal: Journal::new(),
            effects: HashMap::new(),
            skills: HashMap::new(),
            memory: HashMap::new(),
            dialogs: Vec::new(),
            targets: Vec::new(),
            casted: None,
            use_action: None,
            kills: Vec::new(),
            on_modifier_taken: None,
            rules: Rules::from_config(config),
        }
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn serial(&self) -> &str {
        self.identity.serial()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn experience(&self) -> i64 {
        self.experience
    }

    pub fn set_experience(&mut self, experience: i64) {
        self.experience = experience;
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn race(&self) -> &str {
        &self.race
    }

    pub fn attitude(&self) -> Attitude {
        self.attitude
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn guild(&self) -> &str {
        &self.guild
    }

    // ===== vitals =====

    pub fn health(&self) -> i64 {
        self.health
    }

    pub fn mana(&self) -> i64 {
        self.mana
    }

    pub fn live(&self) -> bool {
        self.live
    }

    pub fn agony(&self) -> bool {
        self.agony
    }

    /// Sets health clamped to `[0, max_health]` and refreshes live/agony.
    pub fn set_health(&mut self, value: i64) {
        self.health = value.min(self.max_health()).max(0);
        self.refresh_vitals();
    }

    /// Sets mana clamped to `[0, max_mana]`.
    pub fn set_mana(&mut self, value: i64) {
        self.mana = value.min(self.max_mana()).max(0);
    }

    fn refresh_vitals(&mut self) {
        let threshold = self.rules.agony_percent / 100 * self.max_health();
        self.live = self.health > 0;
        self.agony = self.health <= threshold;
    }

    // ===== attributes and derived stats =====

    pub fn attributes(&self) -> Attributes {
        self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub fn stats(&self) -> DerivedStats {
        DerivedStats::compute(&self.attributes, self.rules.sight)
    }

    pub fn max_health(&self) -> i64 {
        self.stats().max_health
    }

    pub fn max_mana(&self) -> i64 {
        self.stats().max_mana
    }

    pub fn lift(&self) -> i64 {
        self.stats().lift
    }

    pub fn sight(&self) -> i64 {
        self.rules.sight
    }

    pub fn damage(&self) -> DamageRange {
        self.stats().damage
    }

    // ===== position and movement =====

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn set_destination(&mut self, destination: Position) {
        self.destination = destination;
    }

    pub fn default_position(&self) -> Position {
        self.default_position
    }

    pub fn set_default_position(&mut self, position: Position) {
        self.default_position = position;
    }

    /// Alive, move-cooldown decayed, and not yet at the destination.
    pub fn moving(&self) -> bool {
        self.live && self.move_cooldown <= 0 && self.position != self.destination
    }

    pub fn move_cooldown(&self) -> i64 {
        self.move_cooldown
    }

    /// Takes one step of at most one unit per axis towards the destination.
    ///
    /// An axis whose next position is impassable is skipped. The move-cooldown
    /// restarts either way.
    pub fn step(&mut self, passable: impl Fn(f64, f64) -> bool, move_cooldown: i64) {
        let dx = self.destination.x - self.position.x;
        let step_x = dx.signum() * dx.abs().min(1.0);
        if dx != 0.0 && passable(self.position.x + step_x, self.position.y) {
            self.position.x += step_x;
        }
        let dy = self.destination.y - self.position.y;
        let step_y = dy.signum() * dy.abs().min(1.0);
        if dy != 0.0 && passable(self.position.x, self.position.y + step_y) {
            self.position.y += step_y;
        }
        self.move_cooldown = move_cooldown;
    }

    // ===== area bookkeeping =====

    pub fn area_id(&self) -> &str {
        &self.area_id
    }

    pub fn set_area_id(&mut self, area_id: impl Into<String>) {
        self.area_id = area_id.into();
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn respawn(&self) -> i64 {
        self.respawn
    }

    pub fn set_respawn(&mut self, respawn: i64) {
        self.respawn = respawn;
    }

    // ===== flags =====

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn clear_flag(&mut self, flag: &str) {
        self.flags.remove(flag);
    }

    pub fn flags(&self) -> &HashSet<String> {
        &self.flags
    }

    // ===== owned collections =====

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.values()
    }

    pub fn effect(&self, identity: &Identity) -> Option<&Effect> {
        self.effects.get(identity)
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    pub fn add_skill(&mut self, skill: Skill) {
        self.skills.insert(skill.id().to_string(), skill);
    }

    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    pub fn start_dialog(&mut self, dialog: Dialog) {
        self.dialogs.push(dialog);
    }

    pub fn dialog_mut(&mut self, id: &str) -> Option<&mut Dialog> {
        self.dialogs.iter_mut().find(|d| d.id() == id)
    }

    pub fn kills(&self) -> &[Kill] {
        &self.kills
    }

    pub fn own_use_action(&self) -> Option<&UseAction> {
        self.use_action.as_ref()
    }

    pub fn set_use_action(&mut self, use_action: Option<UseAction>) {
        self.use_action = use_action;
    }

    // ===== targeting and memory =====

    /// Replaces the current target. At most `max_targets` are kept.
    pub fn set_target(&mut self, target: Option<Identity>) {
        self.targets.clear();
        if let Some(target) = target {
            self.targets.push(target);
        }
        self.targets.truncate(self.rules.max_targets);
    }

    pub fn targets(&self) -> &[Identity] {
        &self.targets
    }

    pub fn current_target(&self) -> Option<&Identity> {
        self.targets.first()
    }

    /// Remembers an attitude towards another entity.
    pub fn memorize(&mut self, other: Identity, attitude: Attitude) {
        self.memory.insert(other, attitude);
    }

    pub fn forget(&mut self, other: &Identity) {
        self.memory.remove(other);
    }

    pub fn memory(&self, other: &Identity) -> Option<Attitude> {
        self.memory.get(other).copied()
    }

    /// Attitude towards another entity: remembered attitude, else the base one.
    pub fn attitude_for(&self, other: &Identity) -> Attitude {
        self.memory(other).unwrap_or(self.attitude)
    }

    // ===== cooldowns and casting =====

    pub fn use_cooldown(&self) -> i64 {
        self.use_cooldown
    }

    pub fn casted(&self) -> Option<&Casted> {
        self.casted.as_ref()
    }

    /// Drops the in-progress cast without resolving it.
    pub fn interrupt(&mut self) {
        self.casted = None;
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("identity", &self.identity)
            .field("level", &self.level)
            .field("health", &self.health)
            .field("mana", &self.mana)
            .field("position", &self.position)
            .field("area_id", &self.area_id)
            .field("effects", &self.effects.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
