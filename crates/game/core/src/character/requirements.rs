use super::Character;
use crate::env::Env;
use crate::modifier::normalized_amount;
use crate::requirement::Requirement;
use crate::sync;

impl Character {
    /// Whether the character currently satisfies a requirement.
    pub fn meets(&self, requirement: &Requirement, env: &Env<'_>) -> bool {
        match requirement {
            Requirement::Level { min } => self.level >= *min,
            Requirement::Gender(gender) => self.gender == *gender,
            Requirement::Flag { id, off } => self.flags.contains(id) != *off,
            Requirement::Item { id, amount, .. } => {
                self.inventory.count(id) >= normalized_amount(*amount)
            }
            Requirement::Health { value, less, .. } => compare(self.health, *value, *less),
            Requirement::Mana { value, less, .. } => compare(self.mana, *value, *less),
            Requirement::Quest { id, completed } => self
                .journal
                .quest(id)
                .is_some_and(|quest| !*completed || quest.completed()),
            Requirement::Area { id } => self.area_id == *id,
            Requirement::TargetRange { max_range } => self
                .target_position(env)
                .is_some_and(|pos| pos.distance(&self.position) <= *max_range),
        }
    }

    pub fn meets_all(&self, requirements: &[Requirement], env: &Env<'_>) -> bool {
        requirements.iter().all(|r| self.meets(r, env))
    }

    /// Consumes the resource behind a chargeable requirement.
    pub fn charge(&mut self, requirement: &Requirement, env: &Env<'_>) {
        if !requirement.is_chargeable() {
            return;
        }
        match requirement {
            Requirement::Item { id, amount, .. } => {
                for item in self.inventory.take(id, normalized_amount(*amount)) {
                    env.registry().unregister(item.identity());
                }
            }
            Requirement::Health { value, .. } => self.set_health(self.health - value),
            Requirement::Mana { value, .. } => self.set_mana(self.mana - value),
            _ => {}
        }
    }

    pub fn charge_all(&mut self, requirements: &[Requirement], env: &Env<'_>) {
        for requirement in requirements {
            self.charge(requirement, env);
        }
    }

    fn target_position(&self, env: &Env<'_>) -> Option<crate::types::Position> {
        let target = self.targets.first()?;
        if *target == self.identity {
            return Some(self.position);
        }
        let shared = env.registry().resolve(target).ok()?;
        let guard = sync::try_read(&shared)?;
        Some(guard.position())
    }
}

fn compare(current: i64, value: i64, less: bool) -> bool {
    if less { current < value } else { current >= value }
}
