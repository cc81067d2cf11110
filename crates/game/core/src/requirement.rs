//! Gameplay preconditions for use-actions and skill passives.
//!
//! Checking and charging live on the character, which owns every resource a
//! requirement can look at.

use crate::types::Gender;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Requirement {
    /// Character level at least `min`.
    Level { min: i64 },
    Gender(Gender),
    /// Flag present, or absent when `off`.
    Flag { id: String, off: bool },
    /// At least `amount` items with this ID; consumed when `charge`.
    Item { id: String, amount: u32, charge: bool },
    /// Health at least `value` (below it when `less`); paid when `charge`.
    Health { value: i64, less: bool, charge: bool },
    /// Mana at least `value` (below it when `less`); paid when `charge`.
    Mana { value: i64, less: bool, charge: bool },
    /// Quest in the journal, optionally completed.
    Quest { id: String, completed: bool },
    /// Character inside this area.
    Area { id: String },
    /// Current target within `max_range` world units.
    TargetRange { max_range: f64 },
}

impl Requirement {
    pub fn flag(id: impl Into<String>) -> Self {
        Self::Flag {
            id: id.into(),
            off: false,
        }
    }

    pub fn item(id: impl Into<String>, amount: u32, charge: bool) -> Self {
        Self::Item {
            id: id.into(),
            amount,
            charge,
        }
    }

    pub fn mana(value: i64, charge: bool) -> Self {
        Self::Mana {
            value,
            less: false,
            charge,
        }
    }

    /// Whether meeting this requirement consumes a resource.
    pub fn is_chargeable(&self) -> bool {
        match self {
            Self::Item { charge, .. } | Self::Health { charge, .. } | Self::Mana { charge, .. } => {
                *charge
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_charged_resources_are_chargeable() {
        assert!(Requirement::mana(10, true).is_chargeable());
        assert!(!Requirement::mana(10, false).is_chargeable());
        assert!(Requirement::item("key", 1, true).is_chargeable());
        assert!(!Requirement::flag("met_king").is_chargeable());
        assert!(!Requirement::Level { min: 3 }.is_chargeable());
    }
}
