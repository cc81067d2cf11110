//! Flat record for character definitions and saves, and the apply/data pair.
//!
//! The same record serves both purposes: a content definition leaves volatile
//! fields empty (`health: None` means full health), a save fills everything.

use std::collections::HashSet;

use super::Character;
use crate::effect::{self, Effect, SavedEffect};
use crate::env::Env;
use crate::item::InventoryData;
use crate::journal::SavedQuest;
use crate::registry::Identity;
use crate::skill::{SavedSkill, Skill};
use crate::stats::Attributes;
use crate::target::Kill;
use crate::types::{Alignment, Attitude, Gender, Position};
use crate::useaction::{UseAction, UseActionData};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CharacterData {
    pub id: String,
    pub serial: Option<String>,
    pub name: String,
    pub level: i64,
    pub health: Option<i64>,
    pub mana: Option<i64>,
    pub experience: i64,
    pub gender: Gender,
    pub race: String,
    pub attitude: Attitude,
    pub alignment: Alignment,
    pub guild: String,
    pub attributes: Attributes,
    pub position: Position,
    pub destination: Option<Position>,
    pub default_position: Option<Position>,
    pub respawn: i64,
    pub area: String,
    pub chapter: String,
    pub flags: Vec<String>,
    pub inventory: InventoryData,
    pub quests: Vec<SavedQuest>,
    pub skills: Vec<SavedSkill>,
    pub effects: Vec<SavedEffect>,
    pub memory: Vec<SavedMemory>,
    pub kills: Vec<Kill>,
    pub use_action: Option<UseActionData>,
}

impl Default for CharacterData {
    fn default() -> Self {
        Self {
            id: String::new(),
            serial: None,
            name: String::new(),
            level: 1,
            health: None,
            mana: None,
            experience: 0,
            gender: Gender::default(),
            race: String::new(),
            attitude: Attitude::default(),
            alignment: Alignment::default(),
            guild: String::new(),
            attributes: Attributes::ZERO,
            position: Position::ORIGIN,
            destination: None,
            default_position: None,
            respawn: 0,
            area: String::new(),
            chapter: String::new(),
            flags: Vec::new(),
            inventory: InventoryData::default(),
            quests: Vec::new(),
            skills: Vec::new(),
            effects: Vec::new(),
            memory: Vec::new(),
            kills: Vec::new(),
            use_action: None,
        }
    }
}

impl CharacterData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    #[must_use]
    pub fn with_skill(mut self, id: impl Into<String>) -> Self {
        self.skills.push(SavedSkill {
            id: id.into(),
            cooldown: 0,
        });
        self
    }

    #[must_use]
    pub fn with_respawn(mut self, respawn: i64) -> Self {
        self.respawn = respawn;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }
}

/// Remembered attitude towards another entity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedMemory {
    pub target: Identity,
    pub attitude: Attitude,
}

impl Character {
    /// Overlays a record onto this character.
    ///
    /// Identity is untouched. Effects, skills and items already held under the
    /// recorded keys are updated in place; missing ones are instantiated from
    /// content; ones absent from the record are dropped.
    pub fn apply(&mut self, data: &CharacterData, env: &Env<'_>) {
        self.name = data.name.clone();
        self.level = data.level.max(1);
        self.experience = data.experience;
        self.gender = data.gender;
        self.race = data.race.clone();
        self.attitude = data.attitude;
        self.alignment = data.alignment;
        self.guild = data.guild.clone();
        self.attributes = data.attributes;
        self.position = data.position;
        self.destination = data.destination.unwrap_or(data.position);
        self.default_position = data.default_position.unwrap_or(data.position);
        self.respawn = data.respawn;
        self.area_id = data.area.clone();
        self.chapter_id = data.chapter.clone();
        self.flags = data.flags.iter().cloned().collect();
        self.use_action = data.use_action.as_ref().map(UseAction::from_data);
        self.kills = data.kills.clone();
        self.memory = data
            .memory
            .iter()
            .map(|m| (m.target.clone(), m.attitude))
            .collect();

        self.inventory.apply(&data.inventory, env);
        self.journal.apply(&data.quests, |id| env.content().quest(id));
        self.apply_skills(&data.skills, env);
        self.apply_effects(&data.effects, env);

        self.set_health(data.health.unwrap_or_else(|| self.max_health()));
        self.set_mana(data.mana.unwrap_or_else(|| self.max_mana()));
    }

    fn apply_skills(&mut self, saved: &[SavedSkill], env: &Env<'_>) {
        let wanted: HashSet<&str> = saved.iter().map(|s| s.id.as_str()).collect();
        self.skills.retain(|id, _| wanted.contains(id.as_str()));
        for entry in saved {
            if !self.skills.contains_key(&entry.id) {
                let Some(def) = env.content().skill(&entry.id) else {
                    tracing::warn!(skill = %entry.id, "skill definition not found");
                    continue;
                };
                self.skills.insert(entry.id.clone(), Skill::new(&def));
            }
            if let Some(action) = self
                .skills
                .get_mut(&entry.id)
                .and_then(Skill::use_action_mut)
            {
                action.set_cooldown(entry.cooldown);
            }
        }
    }

    fn apply_effects(&mut self, saved: &[SavedEffect], env: &Env<'_>) {
        effect::restore(&mut self.effects, saved, &self.identity, env);
    }

    /// Snapshot of this character as a save record.
    pub fn data(&self) -> CharacterData {
        let mut flags: Vec<String> = self.flags.iter().cloned().collect();
        flags.sort();
        let mut effects: Vec<SavedEffect> = self.effects.values().map(Effect::data).collect();
        effects.sort_by(|a, b| (&a.id, &a.serial).cmp(&(&b.id, &b.serial)));
        let mut skills: Vec<SavedSkill> = self.skills.values().map(Skill::data).collect();
        skills.sort_by(|a, b| a.id.cmp(&b.id));
        let mut memory: Vec<SavedMemory> = self
            .memory
            .iter()
            .map(|(target, attitude)| SavedMemory {
                target: target.clone(),
                attitude: *attitude,
            })
            .collect();
        memory.sort_by(|a, b| a.target.cmp(&b.target));

        CharacterData {
            id: self.identity.id().to_string(),
            serial: Some(self.identity.serial().to_string()),
            name: self.name.clone(),
            level: self.level,
            health: Some(self.health),
            mana: Some(self.mana),
            experience: self.experience,
            gender: self.gender,
            race: self.race.clone(),
            attitude: self.attitude,
            alignment: self.alignment,
            guild: self.guild.clone(),
            attributes: self.attributes,
            position: self.position,
            destination: Some(self.destination),
            default_position: Some(self.default_position),
            respawn: self.respawn,
            area: self.area_id.clone(),
            chapter: self.chapter_id.clone(),
            flags,
            inventory: self.inventory.data(),
            quests: self.journal.data(),
            skills,
            effects,
            memory,
            kills: self.kills.clone(),
            use_action: self.use_action.as_ref().map(UseAction::data),
        }
    }
}
