//! Items and inventories.

use std::collections::BTreeMap;

use crate::env::Env;
use crate::error::{ErrorSeverity, GameError};
use crate::registry::{EntityKind, Identity, Registry};
use crate::useaction::{UseAction, UseActionData};

/// Content definition of an item.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemData {
    pub id: String,
    pub name: String,
    pub value: i64,
    pub use_action: Option<UseActionData>,
}

impl ItemData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_use_action(mut self, use_action: UseActionData) -> Self {
        self.use_action = Some(use_action);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    identity: Identity,
    name: String,
    value: i64,
    use_action: Option<UseAction>,
}

impl Item {
    pub fn new(data: &ItemData, env: &Env<'_>) -> Self {
        Self::with_serial(data, None, env)
    }

    pub fn with_serial(data: &ItemData, serial: Option<&str>, env: &Env<'_>) -> Self {
        Self {
            identity: env.registry().register(EntityKind::Item, &data.id, serial),
            name: data.name.clone(),
            value: data.value,
            use_action: data.use_action.as_ref().map(UseAction::from_data),
        }
    }

    /// Looks up a definition and instantiates it. Missing definitions are logged.
    pub fn from_content(id: &str, env: &Env<'_>) -> Option<Self> {
        match env.content().item(id) {
            Some(data) => Some(Self::new(&data, env)),
            None => {
                tracing::warn!(item = id, "item definition not found");
                None
            }
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn use_action(&self) -> Option<&UseAction> {
        self.use_action.as_ref()
    }

    pub fn use_action_mut(&mut self) -> Option<&mut UseAction> {
        self.use_action.as_mut()
    }

    pub fn update(&mut self, delta: i64) {
        if let Some(action) = self.use_action.as_mut() {
            action.update(delta);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("inventory full ({capacity} items)")]
    Full { capacity: usize },

    #[error("item {0} not in inventory")]
    NotFound(Identity),
}

impl GameError for InventoryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Full { .. } => "INVENTORY_FULL",
            Self::NotFound(_) => "INVENTORY_ITEM_NOT_FOUND",
        }
    }
}

/// Saved item reference with its use-action cooldown.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SavedItem {
    pub id: String,
    pub serial: String,
    pub cooldown: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InventoryData {
    pub capacity: usize,
    pub items: Vec<SavedItem>,
}

/// Item storage keyed by identity. A capacity of zero means unlimited.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Inventory {
    capacity: usize,
    items: BTreeMap<Identity, Item>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.items.len() >= self.capacity
    }

    pub fn add_item(&mut self, item: Item) -> Result<(), InventoryError> {
        if self.is_full() {
            return Err(InventoryError::Full {
                capacity: self.capacity,
            });
        }
        self.items.insert(item.identity.clone(), item);
        Ok(())
    }

    pub fn remove_item(&mut self, identity: &Identity) -> Result<Item, InventoryError> {
        self.items
            .remove(identity)
            .ok_or_else(|| InventoryError::NotFound(identity.clone()))
    }

    pub fn item(&self, identity: &Identity) -> Option<&Item> {
        self.items.get(identity)
    }

    pub fn item_mut(&mut self, identity: &Identity) -> Option<&mut Item> {
        self.items.get_mut(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.items.contains_key(identity)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Identities of every item with a definition ID, in stable order.
    pub fn items_with_id(&self, id: &str) -> Vec<Identity> {
        self.items
            .keys()
            .filter(|identity| identity.id() == id)
            .cloned()
            .collect()
    }

    pub fn count(&self, id: &str) -> usize {
        self.items.keys().filter(|identity| identity.id() == id).count()
    }

    /// Removes up to `amount` items with a definition ID and returns them.
    pub fn take(&mut self, id: &str, amount: usize) -> Vec<Item> {
        self.items_with_id(id)
            .into_iter()
            .take(amount)
            .filter_map(|identity| self.items.remove(&identity))
            .collect()
    }

    /// Unregisters every held item.
    pub fn release(&self, registry: &Registry) {
        for identity in self.items.keys() {
            registry.unregister(identity);
        }
    }

    pub fn update(&mut self, delta: i64) {
        for item in self.items.values_mut() {
            item.update(delta);
        }
    }

    pub fn data(&self) -> InventoryData {
        InventoryData {
            capacity: self.capacity,
            items: self
                .items
                .values()
                .map(|item| SavedItem {
                    id: item.id().to_string(),
                    serial: item.identity.serial().to_string(),
                    cooldown: item.use_action().map_or(0, UseAction::cooldown),
                })
                .collect(),
        }
    }

    /// Restores saved items, instantiating those not already held.
    pub fn apply(&mut self, data: &InventoryData, env: &Env<'_>) {
        self.capacity = data.capacity;
        let wanted: Vec<Identity> = data
            .items
            .iter()
            .map(|saved| Identity::new(&saved.id, &saved.serial))
            .collect();
        self.items.retain(|identity, _| {
            let keep = wanted.contains(identity);
            if !keep {
                env.registry().unregister(identity);
            }
            keep
        });
        for saved in &data.items {
            let identity = Identity::new(&saved.id, &saved.serial);
            if let Some(item) = self.items.get_mut(&identity) {
                if let Some(action) = item.use_action_mut() {
                    action.set_cooldown(saved.cooldown);
                }
                continue;
            }
            let Some(def) = env.content().item(&saved.id) else {
                tracing::warn!(item = %saved.id, "item definition not found");
                continue;
            };
            let mut item = Item::with_serial(&def, Some(&saved.serial), env);
            if let Some(action) = item.use_action_mut() {
                action.set_cooldown(saved.cooldown);
            }
            if let Err(err) = self.add_item(item) {
                tracing::warn!(%err, item = %saved.id, "saved item dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::env::{ContentSnapshot, PcgRng};
    use crate::registry::Registry;

    #[test]
    fn capacity_limits_additions() {
        let content = ContentSnapshot::new().with_item(ItemData::new("coin"));
        let (rng, registry, config) = (PcgRng::new(0), Registry::new(), GameConfig::new());
        let env = Env::new(&content, &rng, &registry, &config);

        let mut inventory = Inventory::new(2);
        for _ in 0..2 {
            let item = Item::from_content("coin", &env).expect("coin defined");
            inventory.add_item(item).expect("room left");
        }
        let extra = Item::from_content("coin", &env).expect("coin defined");
        assert_eq!(
            inventory.add_item(extra),
            Err(InventoryError::Full { capacity: 2 })
        );
        assert_eq!(inventory.count("coin"), 2);
    }

    #[test]
    fn take_removes_up_to_amount() {
        let content = ContentSnapshot::new().with_item(ItemData::new("arrow"));
        let (rng, registry, config) = (PcgRng::new(0), Registry::new(), GameConfig::new());
        let env = Env::new(&content, &rng, &registry, &config);

        let mut inventory = Inventory::default();
        for _ in 0..3 {
            inventory
                .add_item(Item::from_content("arrow", &env).expect("defined"))
                .expect("unlimited");
        }
        assert_eq!(inventory.take("arrow", 2).len(), 2);
        assert_eq!(inventory.take("arrow", 5).len(), 1);
        assert!(inventory.is_empty());
    }

    #[test]
    fn apply_restores_saved_serials() {
        let content = ContentSnapshot::new().with_item(ItemData::new("ring"));
        let (rng, registry, config) = (PcgRng::new(0), Registry::new(), GameConfig::new());
        let env = Env::new(&content, &rng, &registry, &config);

        let data = InventoryData {
            capacity: 0,
            items: vec![
                SavedItem {
                    id: "ring".into(),
                    serial: "12".into(),
                    ..Default::default()
                },
                SavedItem {
                    id: "missing".into(),
                    serial: "13".into(),
                    ..Default::default()
                },
            ],
        };
        let mut inventory = Inventory::default();
        inventory.apply(&data, &env);

        assert_eq!(inventory.len(), 1);
        assert!(inventory.contains(&Identity::new("ring", "12")));
    }

    #[test]
    fn saved_cooldown_survives_a_round_trip() {
        let potion = ItemData::new("potion")
            .with_use_action(UseActionData::default().with_cooldown(10_000));
        let content = ContentSnapshot::new().with_item(potion);
        let (rng, registry, config) = (PcgRng::new(0), Registry::new(), GameConfig::new());
        let env = Env::new(&content, &rng, &registry, &config);

        let mut inventory = Inventory::default();
        let mut item = Item::from_content("potion", &env).expect("defined");
        item.use_action_mut().expect("usable").finish();
        item.update(4000);
        let identity = item.identity().clone();
        inventory.add_item(item).expect("unlimited");

        let data = inventory.data();
        assert_eq!(data.items[0].cooldown, 6000);

        registry.reset();
        let mut restored = Inventory::default();
        restored.apply(&data, &env);
        let cooldown = restored
            .item(&identity)
            .and_then(Item::use_action)
            .map(UseAction::cooldown);
        assert_eq!(cooldown, Some(6000));
    }

    #[test]
    fn apply_unregisters_dropped_items() {
        let content = ContentSnapshot::new().with_item(ItemData::new("ring"));
        let (rng, registry, config) = (PcgRng::new(0), Registry::new(), GameConfig::new());
        let env = Env::new(&content, &rng, &registry, &config);

        let mut inventory = Inventory::default();
        let kept = Item::from_content("ring", &env).expect("defined");
        let dropped = Item::from_content("ring", &env).expect("defined");
        let (kept_id, dropped_id) = (kept.identity().clone(), dropped.identity().clone());
        inventory.add_item(kept).expect("unlimited");
        inventory.add_item(dropped).expect("unlimited");

        let mut data = inventory.data();
        data.items.retain(|saved| saved.serial == kept_id.serial());
        inventory.apply(&data, &env);

        assert_eq!(inventory.len(), 1);
        assert!(registry.contains(&kept_id));
        assert!(!registry.contains(&dropped_id));

        inventory.release(&registry);
        assert!(registry.is_empty());
    }
}
