//! Instant mutations applied to targets.
//!
//! The variant set is closed. Receivers dispatch with an exhaustive `match` in
//! their [`Target::take_modifiers`](crate::target::Target::take_modifiers)
//! implementation; a modifier never mutates anything itself.

use strum::AsRefStr;

use crate::stats::Attributes;
use crate::types::Attitude;

/// Instantaneous, stateless change to a target.
#[derive(Clone, Debug, PartialEq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Modifier {
    /// Adds a uniform roll in `[min, max]` to health.
    Health { min: i64, max: i64 },
    /// Adds a uniform roll in `[min, max]` to mana.
    Mana { min: i64, max: i64 },
    /// Sets a flag, or clears it when `off`.
    Flag { id: String, off: bool },
    /// Starts a quest from content.
    Quest { id: String },
    /// Moves the target into another area at the entry point.
    Area { id: String, x: f64, y: f64 },
    Chapter { id: String },
    /// Adds `amount` fresh items from content.
    AddItem { id: String, amount: u32 },
    /// Removes up to `amount` items with this ID.
    RemoveItem { id: String, amount: u32 },
    /// Moves up to `amount` items from the target into the source's inventory.
    TransferItem { id: String, amount: u32 },
    AddSkill { id: String },
    /// Adds a signed delta to each base attribute.
    Attribute(Attributes),
    /// Records the target's attitude towards the source.
    Memory { attitude: Attitude },
}

impl Modifier {
    pub fn health(min: i64, max: i64) -> Self {
        Self::Health { min, max }
    }

    pub fn mana(min: i64, max: i64) -> Self {
        Self::Mana { min, max }
    }

    pub fn flag(id: impl Into<String>, off: bool) -> Self {
        Self::Flag { id: id.into(), off }
    }

    pub fn add_item(id: impl Into<String>, amount: u32) -> Self {
        Self::AddItem {
            id: id.into(),
            amount,
        }
    }

    pub fn remove_item(id: impl Into<String>, amount: u32) -> Self {
        Self::RemoveItem {
            id: id.into(),
            amount,
        }
    }

    pub fn transfer_item(id: impl Into<String>, amount: u32) -> Self {
        Self::TransferItem {
            id: id.into(),
            amount,
        }
    }

    pub fn area(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::Area { id: id.into(), x, y }
    }

    /// Whether removing this modifier undoes it.
    ///
    /// Only standing state (attributes, flags) is reversed; everything else is a pulse.
    pub fn is_reversible(&self) -> bool {
        matches!(self, Self::Attribute(_) | Self::Flag { .. })
    }

    /// The modifier that undoes this one, if any.
    pub fn inverse(&self) -> Option<Modifier> {
        match self {
            Self::Attribute(delta) => Some(Self::Attribute(-*delta)),
            Self::Flag { id, off } => Some(Self::Flag {
                id: id.clone(),
                off: !off,
            }),
            _ => None,
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &str {
        self.as_ref()
    }
}

/// Item counts below one are treated as one.
pub(crate) fn normalized_amount(amount: u32) -> usize {
    amount.max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_standing_state_is_reversible() {
        assert!(Modifier::flag("door_open", false).is_reversible());
        assert!(Modifier::Attribute(Attributes::new(1, 0, 0, 0, 0)).is_reversible());
        assert!(!Modifier::health(-5, -1).is_reversible());
        assert!(!Modifier::add_item("key", 1).is_reversible());
    }

    #[test]
    fn inverse_negates_and_toggles() {
        let attr = Modifier::Attribute(Attributes::new(2, -1, 0, 0, 3));
        assert_eq!(
            attr.inverse(),
            Some(Modifier::Attribute(Attributes::new(-2, 1, 0, 0, -3)))
        );
        assert_eq!(
            Modifier::flag("cursed", false).inverse(),
            Some(Modifier::flag("cursed", true))
        );
        assert_eq!(Modifier::mana(1, 2).inverse(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Modifier::transfer_item("gold", 3).kind(), "transfer_item");
        assert_eq!(normalized_amount(0), 1);
        assert_eq!(normalized_amount(4), 4);
    }
}
