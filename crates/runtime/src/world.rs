//! Top-level area set and cross-area relocation.
use std::collections::BTreeMap;
use std::sync::Arc;

use realm_core::{Area, AreaObject, Env};

/// Every top-level area the simulation ticks, keyed by area ID.
#[derive(Debug, Default)]
pub struct World {
    areas: BTreeMap<String, Arc<Area>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced area when the ID was already taken.
    pub fn add_area(&mut self, area: Arc<Area>) -> Option<Arc<Area>> {
        self.areas.insert(area.id().to_string(), area)
    }

    pub fn remove_area(&mut self, id: &str) -> Option<Arc<Area>> {
        self.areas.remove(id)
    }

    /// Looks up an area by ID, searching subareas too.
    pub fn area(&self, id: &str) -> Option<Arc<Area>> {
        self.areas.values().find_map(|area| area.find(id))
    }

    pub fn areas(&self) -> impl Iterator<Item = &Arc<Area>> {
        self.areas.values()
    }

    pub fn area_ids(&self) -> Vec<String> {
        self.areas.keys().cloned().collect()
    }

    /// Ticks every area, then hands departed objects to the area their area ID
    /// names. Objects heading for an unknown area go back where they came from.
    pub fn step(&self, delta: i64, env: &Env<'_>) {
        for area in self.areas.values() {
            area.update(delta, env);
        }

        let mut departed = Vec::new();
        for area in self.areas.values() {
            collect_departed(area, &mut departed);
        }
        for (origin, object) in departed {
            self.relocate(&origin, object);
        }
    }

    fn relocate(&self, origin: &Arc<Area>, object: AreaObject) {
        let to = object.area_id();
        match self.area(&to) {
            Some(area) => {
                tracing::debug!(
                    object = %object.identity(),
                    from = %origin.id(),
                    to = %to,
                    "object relocated"
                );
                area.add_object(object);
            }
            None => {
                tracing::warn!(
                    object = %object.identity(),
                    from = %origin.id(),
                    to = %to,
                    "destination area not found, keeping object in place"
                );
                origin.add_object(object);
            }
        }
    }
}

fn collect_departed(area: &Arc<Area>, out: &mut Vec<(Arc<Area>, AreaObject)>) {
    for object in area.take_departed() {
        out.push((area.clone(), object));
    }
    for subarea in area.subareas() {
        collect_departed(&subarea, out);
    }
}
