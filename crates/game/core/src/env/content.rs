//! Content resolver consumed by the engine.
//!
//! Definitions are looked up by ID whenever an entity needs to instantiate
//! something (an effect from a skill, an item from a modifier, a replacement
//! character on respawn). A missing ID is a content-integrity miss: the caller
//! logs it and skips that one item.

use std::collections::HashMap;

use crate::character::CharacterData;
use crate::effect::EffectData;
use crate::item::ItemData;
use crate::journal::QuestData;
use crate::object::ObjectData;
use crate::skill::SkillData;

/// Read-only definition lookup.
pub trait ContentOracle: Send + Sync {
    fn effect(&self, id: &str) -> Option<EffectData>;
    fn skill(&self, id: &str) -> Option<SkillData>;
    fn item(&self, id: &str) -> Option<ItemData>;
    fn character(&self, id: &str) -> Option<CharacterData>;
    fn object(&self, id: &str) -> Option<ObjectData>;
    fn quest(&self, id: &str) -> Option<QuestData>;
}

/// In-memory content catalog.
///
/// Loaders fill one of these from disk; tests build them inline.
#[derive(Clone, Debug, Default)]
pub struct ContentSnapshot {
    effects: HashMap<String, EffectData>,
    skills: HashMap<String, SkillData>,
    items: HashMap<String, ItemData>,
    characters: HashMap<String, CharacterData>,
    objects: HashMap<String, ObjectData>,
    quests: HashMap<String, QuestData>,
}

impl ContentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_effect(mut self, data: EffectData) -> Self {
        self.insert_effect(data);
        self
    }

    #[must_use]
    pub fn with_skill(mut self, data: SkillData) -> Self {
        self.insert_skill(data);
        self
    }

    #[must_use]
    pub fn with_item(mut self, data: ItemData) -> Self {
        self.insert_item(data);
        self
    }

    #[must_use]
    pub fn with_character(mut self, data: CharacterData) -> Self {
        self.insert_character(data);
        self
    }

    #[must_use]
    pub fn with_object(mut self, data: ObjectData) -> Self {
        self.insert_object(data);
        self
    }

    #[must_use]
    pub fn with_quest(mut self, data: QuestData) -> Self {
        self.insert_quest(data);
        self
    }

    pub fn insert_effect(&mut self, data: EffectData) {
        self.effects.insert(data.id.clone(), data);
    }

    pub fn insert_skill(&mut self, data: SkillData) {
        self.skills.insert(data.id.clone(), data);
    }

    pub fn insert_item(&mut self, data: ItemData) {
        self.items.insert(data.id.clone(), data);
    }

    pub fn insert_character(&mut self, data: CharacterData) {
        self.characters.insert(data.id.clone(), data);
    }

    pub fn insert_object(&mut self, data: ObjectData) {
        self.objects.insert(data.id.clone(), data);
    }

    pub fn insert_quest(&mut self, data: QuestData) {
        self.quests.insert(data.id.clone(), data);
    }

    /// Total number of definitions across every catalog.
    pub fn len(&self) -> usize {
        self.effects.len()
            + self.skills.len()
            + self.items.len()
            + self.characters.len()
            + self.objects.len()
            + self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentOracle for ContentSnapshot {
    fn effect(&self, id: &str) -> Option<EffectData> {
        self.effects.get(id).cloned()
    }

    fn skill(&self, id: &str) -> Option<SkillData> {
        self.skills.get(id).cloned()
    }

    fn item(&self, id: &str) -> Option<ItemData> {
        self.items.get(id).cloned()
    }

    fn character(&self, id: &str) -> Option<CharacterData> {
        self.characters.get(id).cloned()
    }

    fn object(&self, id: &str) -> Option<ObjectData> {
        self.objects.get(id).cloned()
    }

    fn quest(&self, id: &str) -> Option<QuestData> {
        self.quests.get(id).cloned()
    }
}
