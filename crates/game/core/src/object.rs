//! Generic area objects: chests, doors, shrines.
//!
//! A reduced character without levels, attributes, journal or dialogs. Objects
//! share the effect and inventory machinery and never move.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::mem;
use std::sync::{Arc, RwLock};

use crate::effect::{self, Effect, SavedEffect};
use crate::env::Env;
use crate::item::{Inventory, InventoryData, Item};
use crate::modifier::{Modifier, normalized_amount};
use crate::registry::{EntityKind, Identity, Registry};
use crate::target::{
    Container, ModifierHook, Origin, SharedTarget, Target, transfer_to_source,
};
use crate::types::Position;
use crate::useaction::{UseAction, UseActionData};

pub type SharedObject = Arc<RwLock<Object>>;

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObjectData {
    pub id: String,
    pub serial: Option<String>,
    pub name: String,
    /// Current health; `None` means full.
    pub health: Option<i64>,
    pub max_health: i64,
    pub position: Position,
    pub sight: i64,
    pub respawn: i64,
    pub area: String,
    pub use_action: Option<UseActionData>,
    pub inventory: InventoryData,
    pub effects: Vec<SavedEffect>,
    pub flags: Vec<String>,
}

impl ObjectData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_health(mut self, max_health: i64) -> Self {
        self.max_health = max_health;
        self
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    #[must_use]
    pub fn with_sight(mut self, sight: i64) -> Self {
        self.sight = sight;
        self
    }

    #[must_use]
    pub fn with_use_action(mut self, use_action: UseActionData) -> Self {
        self.use_action = Some(use_action);
        self
    }
}

pub struct Object {
    identity: Identity,
    name: String,
    health: i64,
    max_health: i64,
    position: Position,
    sight: i64,
    respawn: i64,
    area_id: String,
    use_action: Option<UseAction>,
    inventory: Inventory,
    effects: HashMap<Identity, Effect>,
    flags: HashSet<String>,
    on_modifier_taken: Option<ModifierHook>,
}

impl Object {
    pub fn new(data: &ObjectData, env: &Env<'_>) -> Self {
        let identity = env
            .registry()
            .register(EntityKind::Object, &data.id, data.serial.as_deref());
        let mut object = Self {
            identity,
            name: String::new(),
            health: 0,
            max_health: 0,
            position: Position::ORIGIN,
            sight: 0,
            respawn: 0,
            area_id: String::new(),
            use_action: None,
            inventory: Inventory::default(),
            effects: HashMap::new(),
            flags: HashSet::new(),
            on_modifier_taken: None,
        };
        object.apply(data, env);
        object
    }

    pub fn from_content(id: &str, env: &Env<'_>) -> Option<Self> {
        match env.content().object(id) {
            Some(data) => Some(Self::new(&data, env)),
            None => {
                tracing::warn!(object = id, "object definition not found");
                None
            }
        }
    }

    pub fn spawn(data: &ObjectData, env: &Env<'_>) -> SharedObject {
        Self::new(data, env).into_shared(env)
    }

    pub fn into_shared(self, env: &Env<'_>) -> SharedObject {
        let identity = self.identity.clone();
        let shared = Arc::new(RwLock::new(self));
        let target: SharedTarget = shared.clone();
        env.registry().bind(&identity, &target);
        shared
    }

    /// Unregisters this object with its items and effects.
    pub fn release(&self, registry: &Registry) {
        self.inventory.release(registry);
        for identity in self.effects.keys() {
            registry.unregister(identity);
        }
        registry.unregister(&self.identity);
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_health(&self) -> i64 {
        self.max_health
    }

    pub fn set_health(&mut self, value: i64) {
        self.health = value.min(self.max_health).max(0);
    }

    pub fn sight(&self) -> i64 {
        self.sight
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn respawn(&self) -> i64 {
        self.respawn
    }

    pub fn set_respawn(&mut self, respawn: i64) {
        self.respawn = respawn;
    }

    pub fn area_id(&self) -> &str {
        &self.area_id
    }

    pub fn set_area_id(&mut self, area_id: impl Into<String>) {
        self.area_id = area_id.into();
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.values()
    }

    pub fn update(&mut self, delta: i64, env: &Env<'_>) {
        self.inventory.update(delta);

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

        if let Some(action) = self.use_action.as_mut() {
            action.update(delta);
        }
    }

    pub fn apply(&mut self, data: &ObjectData, env: &Env<'_>) {
        self.name = data.name.clone();
        self.max_health = data.max_health;
        self.position = data.position;
        self.sight = data.sight;
        self.respawn = data.respawn;
        self.area_id = data.area.clone();
        self.use_action = data.use_action.as_ref().map(UseAction::from_data);
        self.flags = data.flags.iter().cloned().collect();
        self.inventory.apply(&data.inventory, env);

        effect::restore(&mut self.effects, &data.effects, &self.identity, env);

        self.set_health(data.health.unwrap_or(data.max_health));
    }

    pub fn data(&self) -> ObjectData {
        let mut effects: Vec<SavedEffect> = self.effects.values().map(Effect::data).collect();
        effects.sort_by(|a, b| (&a.id, &a.serial).cmp(&(&b.id, &b.serial)));
        let mut flags: Vec<String> = self.flags.iter().cloned().collect();
        flags.sort();
        ObjectData {
            id: self.identity.id().to_string(),
            serial: Some(self.identity.serial().to_string()),
            name: self.name.clone(),
            health: Some(self.health),
            max_health: self.max_health,
            position: self.position,
            sight: self.sight,
            respawn: self.respawn,
            area: self.area_id.clone(),
            use_action: self.use_action.as_ref().map(UseAction::data),
            inventory: self.inventory.data(),
            effects,
            flags,
        }
    }

    fn take_modifier(&mut self, origin: &mut Origin<'_>, modifier: &Modifier, env: &Env<'_>) {
        match modifier {
            Modifier::Health { min, max } => {
                let roll = env.rng().range(*min, *max);
                self.set_health(self.health + roll);
            }
            Modifier::Flag { id, off } => {
                if *off {
                    self.flags.remove(id);
                } else {
                    self.flags.insert(id.clone());
                }
            }
            Modifier::Area { id, x, y } => {
                self.area_id = id.clone();
                self.position = Position::new(*x, *y);
            }
            Modifier::AddItem { id, amount } => {
                for _ in 0..normalized_amount(*amount) {
                    let Some(item) = Item::from_content(id, env) else {
                        break;
                    };
                    let identity = item.identity().clone();
                    if self.inventory.add_item(item).is_err() {
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
                for item in transfer_to_source(origin, items, env) {
                    if let Err(err) = self.inventory.add_item(item) {
                        tracing::warn!(%err, "transferred item lost");
                    }
                }
            }
            other => {
                tracing::trace!(object = %self.identity, kind = other.kind(), "modifier ignored by object");
            }
        }
    }
}

impl Target for Object {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn live(&self) -> bool {
        self.health > 0
    }

    fn health(&self) -> i64 {
        self.health
    }

    fn position(&self) -> Position {
        self.position
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

impl Container for Object {
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("identity", &self.identity)
            .field("health", &self.health)
            .field("position", &self.position)
            .field("area_id", &self.area_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, CharacterData};
    use crate::effect::EffectData;
    use crate::env::ContentSnapshot;
    use crate::item::ItemData;
    use crate::sync;
    use crate::testing::Fixture;

    #[test]
    fn objects_take_health_and_ignore_character_modifiers() {
        let fx = Fixture::new(ContentSnapshot::new());
        let env = fx.env();
        let mut chest = Object::new(&ObjectData::new("chest").with_max_health(20), &env);

        chest.take_modifiers(
            Origin::None,
            &[
                Modifier::health(-5, -5),
                Modifier::mana(-5, -5),
                Modifier::AddSkill { id: "x".into() },
            ],
            &env,
        );
        assert_eq!(chest.health(), 15);
        assert!(chest.live());
    }

    #[test]
    fn objects_tick_effects_to_expiry() {
        let fx = Fixture::new(ContentSnapshot::new());
        let env = fx.env();
        let mut shrine = Object::new(&ObjectData::new("shrine").with_max_health(10), &env);
        let glow = EffectData::new("glow")
            .with_modifier(Modifier::flag("glowing", false))
            .with_duration(1000);

        shrine.take_effect(Effect::new(&glow, &env), Origin::None, &env);
        assert!(shrine.has_flag("glowing"));

        shrine.update(1000, &env);
        assert!(!shrine.has_flag("glowing"));
        assert!(!shrine.has_effect("glow"));
    }

    #[test]
    fn character_loots_object_through_transfer() {
        let fx = Fixture::new(ContentSnapshot::new().with_item(ItemData::new("gem")));
        let env = fx.env();
        let chest = Object::spawn(&ObjectData::new("chest").with_max_health(1), &env);
        let mut hero = Character::new(&CharacterData::new("hero"), &env);

        let mut c = sync::write(&chest);
        c.take_modifiers(Origin::None, &[Modifier::add_item("gem", 2)], &env);
        c.take_modifiers(
            Origin::Local(&mut hero),
            &[Modifier::transfer_item("gem", 5)],
            &env,
        );

        assert_eq!(c.inventory().count("gem"), 0);
        assert_eq!(hero.inventory().count("gem"), 2);
    }

    #[test]
    fn data_round_trip() {
        let fx = Fixture::new(ContentSnapshot::new());
        let env = fx.env();
        let mut door = Object::new(
            &ObjectData::new("door")
                .with_max_health(30)
                .with_position(2.0, 8.0)
                .with_sight(40),
            &env,
        );
        door.set_health(12);
        let saved = door.data();
        door.apply(&saved, &env);
        assert_eq!(door.data(), saved);
        assert_eq!(saved.health, Some(12));
    }

    #[test]
    fn apply_reconciles_saved_effects() {
        let fx = Fixture::new(ContentSnapshot::new().with_effect(EffectData::new("ward").infinite()));
        let env = fx.env();
        let mut door = Object::new(&ObjectData::new("door").with_max_health(30), &env);
        let ward = Effect::from_content("ward", None, &env).expect("defined");
        let ward_id = ward.identity().clone();
        door.take_effect(ward, Origin::None, &env);
        let saved = door.data();

        let mut bare = saved.clone();
        bare.effects.clear();
        door.apply(&bare, &env);
        assert_eq!(door.effects().count(), 0);
        assert!(!fx.registry.contains(&ward_id));

        door.apply(&saved, &env);
        let restored: Vec<&Effect> = door.effects().collect();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].identity(), &ward_id);
        assert!(restored[0].started());
    }
}
