//! Character attributes and the values derived from them.
//!
//! The five base attributes are the only stored stats. Lift, sight, maximum
//! health, maximum mana and the damage range are pure functions of them and are
//! recomputed on demand.
mod attributes;
mod derived;

pub use attributes::Attributes;
pub use derived::{DamageRange, DerivedStats};
