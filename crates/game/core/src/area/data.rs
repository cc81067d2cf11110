//! Area definition/save records and reconciliation.

use std::collections::HashSet;
use std::sync::Arc;

use super::{Area, AreaObject, Weather};
use crate::character::{Character, CharacterData};
use crate::env::Env;
use crate::object::{Object, ObjectData};
use crate::registry::Identity;
use crate::sync;
use crate::types::Position;

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AreaData {
    pub id: String,
    /// Map asset name resolved by the loaders.
    pub map: Option<String>,
    pub time: i64,
    pub weather: Weather,
    pub characters: Vec<AreaCharacterData>,
    pub objects: Vec<AreaObjectData>,
    pub subareas: Vec<AreaData>,
}

/// Character placed in an area: a content reference plus optional saved state.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AreaCharacterData {
    pub id: String,
    pub serial: Option<String>,
    pub position: Position,
    /// Falls back to `position`.
    pub default_position: Option<Position>,
    pub respawn: i64,
    pub state: Option<CharacterData>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AreaObjectData {
    pub id: String,
    pub serial: Option<String>,
    pub position: Position,
    pub respawn: i64,
    pub state: Option<ObjectData>,
}

impl AreaData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_character(mut self, character: AreaCharacterData) -> Self {
        self.characters.push(character);
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: AreaObjectData) -> Self {
        self.objects.push(object);
        self
    }

    #[must_use]
    pub fn with_subarea(mut self, subarea: AreaData) -> Self {
        self.subareas.push(subarea);
        self
    }
}

impl AreaCharacterData {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            position: Position::new(x, y),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    #[must_use]
    pub fn with_respawn(mut self, respawn: i64) -> Self {
        self.respawn = respawn;
        self
    }

    fn key(&self) -> Option<Identity> {
        self.serial.as_ref().map(|serial| Identity::new(&self.id, serial))
    }

    fn record(&self, env: &Env<'_>) -> Option<CharacterData> {
        let mut data = match &self.state {
            Some(state) => state.clone(),
            None => {
                let Some(mut data) = env.content().character(&self.id) else {
                    tracing::warn!(character = %self.id, "character definition not found");
                    return None;
                };
                data.position = self.position;
                data.destination = Some(self.position);
                data.default_position = Some(self.default_position.unwrap_or(self.position));
                data.respawn = self.respawn;
                data
            }
        };
        data.id = self.id.clone();
        data.serial = self.serial.clone();
        Some(data)
    }
}

impl AreaObjectData {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            position: Position::new(x, y),
            ..Default::default()
        }
    }

    fn key(&self) -> Option<Identity> {
        self.serial.as_ref().map(|serial| Identity::new(&self.id, serial))
    }

    fn record(&self, env: &Env<'_>) -> Option<ObjectData> {
        let mut data = match &self.state {
            Some(state) => state.clone(),
            None => {
                let Some(mut data) = env.content().object(&self.id) else {
                    tracing::warn!(object = %self.id, "object definition not found");
                    return None;
                };
                data.position = self.position;
                data.respawn = self.respawn;
                data
            }
        };
        data.id = self.id.clone();
        data.serial = self.serial.clone();
        Some(data)
    }
}

impl Area {
    /// Builds an area tree from a record.
    pub fn from_data(data: &AreaData, env: &Env<'_>) -> Arc<Area> {
        let area = Arc::new(Area::new(&data.id));
        area.apply(data, env);
        area
    }

    /// Reconciles the live area against a record.
    ///
    /// Objects missing from the record are removed, listed ones are updated in
    /// place when their identity is held and created otherwise. Subareas follow
    /// the same rule recursively. Entries without a serial always spawn fresh.
    /// Map geometry is left alone; only the map name is recorded.
    pub fn apply(&self, data: &AreaData, env: &Env<'_>) {
        {
            let mut clock = sync::lock(&self.clock);
            clock.time = data.time;
            clock.weather = data.weather;
            clock.map_name = data.map.clone();
        }

        let wanted: HashSet<Identity> = data
            .characters
            .iter()
            .filter_map(AreaCharacterData::key)
            .chain(data.objects.iter().filter_map(AreaObjectData::key))
            .collect();
        for identity in self.objects.keys() {
            if wanted.contains(&identity) {
                continue;
            }
            if let Some(object) = self.objects.remove(&identity) {
                object.release(env.registry());
            }
        }

        for entry in &data.characters {
            let Some(record) = entry.record(env) else {
                continue;
            };
            let held = entry
                .key()
                .and_then(|key| self.objects.get(&key))
                .and_then(|object| object.as_character().cloned());
            match held {
                Some(character) => {
                    let mut c = sync::write(&character);
                    if entry.state.is_some() {
                        c.apply(&record, env);
                    } else {
                        c.set_position(entry.position);
                        c.set_respawn(entry.respawn);
                    }
                    c.set_area_id(self.id.as_str());
                }
                None => self.add_object(Character::spawn(&record, env)),
            }
        }

        for entry in &data.objects {
            let Some(record) = entry.record(env) else {
                continue;
            };
            let held = entry
                .key()
                .and_then(|key| self.objects.get(&key))
                .and_then(|object| object.as_object().cloned());
            match held {
                Some(object) => {
                    let mut o = sync::write(&object);
                    if entry.state.is_some() {
                        o.apply(&record, env);
                    } else {
                        o.set_position(entry.position);
                        o.set_respawn(entry.respawn);
                    }
                    o.set_area_id(self.id.as_str());
                }
                None => self.add_object(Object::spawn(&record, env)),
            }
        }

        let subareas: HashSet<&str> = data.subareas.iter().map(|s| s.id.as_str()).collect();
        for id in self.subareas.keys() {
            if subareas.contains(id.as_str()) {
                continue;
            }
            if let Some(subarea) = self.subareas.remove(&id) {
                subarea.release(env.registry());
            }
        }
        for sub in &data.subareas {
            match self.subarea(&sub.id) {
                Some(existing) => existing.apply(sub, env),
                None => self.add_subarea(Area::from_data(sub, env)),
            }
        }
    }

    /// Saves the area tree with full per-object state.
    pub fn data(&self) -> AreaData {
        let (time, weather, map) = {
            let clock = sync::lock(&self.clock);
            (clock.time, clock.weather, clock.map_name.clone())
        };
        let mut characters = Vec::new();
        let mut objects = Vec::new();
        for object in self.objects.values() {
            match object {
                AreaObject::Character(character) => {
                    let state = sync::read(&character).data();
                    characters.push(AreaCharacterData {
                        id: state.id.clone(),
                        serial: state.serial.clone(),
                        position: state.position,
                        default_position: state.default_position,
                        respawn: state.respawn,
                        state: Some(state),
                    });
                }
                AreaObject::Object(object) => {
                    let state = sync::read(&object).data();
                    objects.push(AreaObjectData {
                        id: state.id.clone(),
                        serial: state.serial.clone(),
                        position: state.position,
                        respawn: state.respawn,
                        state: Some(state),
                    });
                }
            }
        }
        characters.sort_by(|a, b| (&a.id, &a.serial).cmp(&(&b.id, &b.serial)));
        objects.sort_by(|a, b| (&a.id, &a.serial).cmp(&(&b.id, &b.serial)));
        let mut subareas: Vec<AreaData> =
            self.subareas.values().iter().map(|s| s.data()).collect();
        subareas.sort_by(|a, b| a.id.cmp(&b.id));

        AreaData {
            id: self.id.clone(),
            map,
            time,
            weather,
            characters,
            objects,
            subareas,
        }
    }
}
