//! Derived stats.
//!
//! Formulas use integer arithmetic; `str / 2` and `wis / 2` truncate toward zero.
//! Saved balance depends on these exact values.

use super::Attributes;

/// Inclusive damage roll bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRange {
    pub min: i64,
    pub max: i64,
}

/// Values computed from base attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedStats {
    pub lift: i64,
    pub sight: i64,
    pub max_health: i64,
    pub max_mana: i64,
    pub damage: DamageRange,
}

impl DerivedStats {
    /// Computes every derived value. Sight is the configured base, unscaled.
    pub fn compute(attrs: &Attributes, base_sight: i64) -> Self {
        Self {
            lift: lift(attrs),
            sight: base_sight,
            max_health: max_health(attrs),
            max_mana: max_mana(attrs),
            damage: damage(attrs),
        }
    }
}

pub(crate) fn lift(attrs: &Attributes) -> i64 {
    10 * (1 + attrs.str)
}

pub(crate) fn max_health(attrs: &Attributes) -> i64 {
    (50 * (1 + attrs.con)) * (1 + attrs.str / 2)
}

pub(crate) fn max_mana(attrs: &Attributes) -> i64 {
    (10 * (1 + attrs.int)) * (1 + attrs.wis / 2)
}

pub(crate) fn damage(attrs: &Attributes) -> DamageRange {
    DamageRange {
        min: 1 + 10 * attrs.str + attrs.dex,
        max: 10 + 10 * attrs.str + attrs.dex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formulas_match_reference_values() {
        let attrs = Attributes::new(3, 2, 4, 5, 3);
        let stats = DerivedStats::compute(&attrs, 300);

        assert_eq!(stats.lift, 40);
        assert_eq!(stats.sight, 300);
        // (50 * 3) * (1 + 1)
        assert_eq!(stats.max_health, 300);
        // (10 * 6) * (1 + 1)
        assert_eq!(stats.max_mana, 120);
        assert_eq!(stats.damage, DamageRange { min: 35, max: 44 });
    }

    #[test]
    fn halving_truncates() {
        let attrs = Attributes::new(1, 0, 0, 0, 1);
        assert_eq!(max_health(&attrs), 50);
        assert_eq!(max_mana(&attrs), 10);

        let attrs = Attributes::new(-3, 0, 0, 0, 0);
        // -3 / 2 == -1 under truncation
        assert_eq!(max_health(&attrs), 0);
    }

    #[test]
    fn zero_attributes() {
        let stats = DerivedStats::compute(&Attributes::ZERO, 300);
        assert_eq!(stats.max_health, 50);
        assert_eq!(stats.max_mana, 10);
        assert_eq!(stats.lift, 10);
        assert_eq!(stats.damage, DamageRange { min: 1, max: 10 });
    }
}
