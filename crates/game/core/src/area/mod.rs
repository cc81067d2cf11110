//! Areas: the simulation loop over a set of objects.
//!
//! An [`Area`] owns a virtual clock, weather, an optional map, its objects, child
//! areas and a respawn queue. Every collection sits behind a [`SharedMap`] so a
//! loader thread can add objects while the simulation thread ticks; the tick
//! always iterates snapshots.
//!
//! Each [`Area::update`]:
//! 1. advances the clock and the weather
//! 2. ticks every directly-held object, then steps it once if it is moving
//! 3. moves objects whose area ID changed to the departures map
//! 4. recurses into subareas
//! 5. runs the respawn queue
mod data;
mod object;
mod respawn;
mod weather;

pub use data::{AreaCharacterData, AreaData, AreaObjectData};
pub use object::AreaObject;
pub use respawn::Respawn;
pub use weather::{Conditions, Weather};

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::character::SharedCharacter;
use crate::env::{Env, MapOracle};
use crate::registry::{Identity, Registry};
use crate::sync::{self, SharedMap};
use crate::types::Position;

#[derive(Default)]
struct Clock {
    time: i64,
    weather: Weather,
    map: Option<Arc<dyn MapOracle>>,
    map_name: Option<String>,
}

pub struct Area {
    id: String,
    clock: Mutex<Clock>,
    objects: SharedMap<Identity, AreaObject>,
    subareas: SharedMap<String, Arc<Area>>,
    departed: SharedMap<Identity, AreaObject>,
    respawn: Respawn,
}

impl Area {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            clock: Mutex::new(Clock::default()),
            objects: SharedMap::new(),
            subareas: SharedMap::new(),
            departed: SharedMap::new(),
            respawn: Respawn::new(),
        }
    }

    /// Attaches map geometry (builder pattern).
    #[must_use]
    pub fn with_map(self, map: Arc<dyn MapOracle>) -> Self {
        self.set_map(Some(map));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Virtual clock in milliseconds.
    pub fn time(&self) -> i64 {
        sync::lock(&self.clock).time
    }

    pub fn weather(&self) -> Weather {
        sync::lock(&self.clock).weather
    }

    pub fn set_weather(&self, weather: Weather) {
        sync::lock(&self.clock).weather = weather;
    }

    pub fn map(&self) -> Option<Arc<dyn MapOracle>> {
        sync::lock(&self.clock).map.clone()
    }

    pub fn set_map(&self, map: Option<Arc<dyn MapOracle>>) {
        sync::lock(&self.clock).map = map;
    }

    /// Name of the map asset this area was defined with.
    pub fn map_name(&self) -> Option<String> {
        sync::lock(&self.clock).map_name.clone()
    }

    pub fn respawn(&self) -> &Respawn {
        &self.respawn
    }

    pub fn update(&self, delta: i64, env: &Env<'_>) {
        let (now, map) = {
            let mut clock = sync::lock(&self.clock);
            clock.time += delta;
            let now = clock.time;
            clock.weather.update(now, env);
            (now, clock.map.clone())
        };

        let allowed = &env.config().passable_layers;
        let passable =
            |x: f64, y: f64| map.as_ref().is_none_or(|map| map.is_passable(x, y, allowed));

        for (identity, object) in self.objects.snapshot() {
            object.update(delta, env);
            object.step(&passable, env.config().move_cooldown_ms);

            let area_id = object.area_id();
            if area_id != self.id {
                tracing::debug!(
                    area = %self.id,
                    object = %identity,
                    to = %area_id,
                    "object departed"
                );
                self.objects.remove(&identity);
                self.departed.insert(identity, object);
            }
        }

        for subarea in self.subareas.values() {
            subarea.update(delta, env);
        }

        self.respawn.update(self, now, env);
    }

    // ===== objects =====

    /// Adds an object, stamping this area's ID onto it.
    pub fn add_object(&self, object: impl Into<AreaObject>) {
        let object = object.into();
        object.set_area_id(&self.id);
        self.objects.insert(object.identity(), object);
    }

    pub fn remove_object(&self, identity: &Identity) -> Option<AreaObject> {
        self.objects.remove(identity)
    }

    pub fn object(&self, identity: &Identity) -> Option<AreaObject> {
        self.objects.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.objects.contains_key(identity)
    }

    /// Directly-held objects.
    pub fn objects(&self) -> Vec<AreaObject> {
        self.objects.values()
    }

    pub fn characters(&self) -> Vec<SharedCharacter> {
        self.objects
            .values()
            .into_iter()
            .filter_map(|object| object.as_character().cloned())
            .collect()
    }

    /// Objects held by this area and every subarea below it.
    pub fn all_objects(&self) -> Vec<AreaObject> {
        let mut all = self.objects();
        for subarea in self.subareas.values() {
            all.extend(subarea.all_objects());
        }
        all
    }

    /// Objects within `range` of a point, boundary included.
    pub fn near_objects(&self, x: f64, y: f64, range: f64) -> Vec<AreaObject> {
        let point = Position::new(x, y);
        self.objects
            .values()
            .into_iter()
            .filter(|object| object.position().distance(&point) <= range)
            .collect()
    }

    /// Objects whose own sight range covers a point.
    pub fn sight_range_objects(&self, x: f64, y: f64) -> Vec<AreaObject> {
        let point = Position::new(x, y);
        self.objects
            .values()
            .into_iter()
            .filter(|object| object.position().distance(&point) <= object.sight() as f64)
            .collect()
    }

    /// Drains the objects that left this area during past ticks.
    pub fn take_departed(&self) -> Vec<AreaObject> {
        self.departed
            .drain()
            .into_iter()
            .map(|(_, object)| object)
            .collect()
    }

    /// Drops every object in this area and its subareas from the registry.
    pub fn release(&self, registry: &Registry) {
        for object in self.all_objects() {
            object.release(registry);
        }
    }

    // ===== subareas =====

    pub fn add_subarea(&self, area: Arc<Area>) {
        self.subareas.insert(area.id.clone(), area);
    }

    pub fn remove_subarea(&self, id: &str) -> Option<Arc<Area>> {
        self.subareas.remove(&id.to_string())
    }

    pub fn subarea(&self, id: &str) -> Option<Arc<Area>> {
        self.subareas.get(&id.to_string())
    }

    pub fn subareas(&self) -> Vec<Arc<Area>> {
        self.subareas.values()
    }

    /// Finds this area or a descendant by ID.
    pub fn find(self: &Arc<Self>, id: &str) -> Option<Arc<Area>> {
        if self.id == id {
            return Some(self.clone());
        }
        self.subareas
            .values()
            .into_iter()
            .find_map(|subarea| subarea.find(id))
    }
}

impl fmt::Debug for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Area")
            .field("id", &self.id)
            .field("time", &self.time())
            .field("objects", &self.objects.len())
            .field("subareas", &self.subareas.keys())
            .finish_non_exhaustive()
    }
}
