//! Skills: a use-action plus passive effects kept alive while requirements hold.

use crate::requirement::Requirement;
use crate::useaction::{UseAction, UseActionData};

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillData {
    pub id: String,
    pub name: String,
    pub use_action: Option<UseActionData>,
    /// Effect definition IDs kept on the owner while `passive_requirements` hold.
    pub passive_effects: Vec<String>,
    pub passive_requirements: Vec<Requirement>,
}

impl SkillData {
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

    #[must_use]
    pub fn with_passive_effect(mut self, id: impl Into<String>) -> Self {
        self.passive_effects.push(id.into());
        self
    }

    #[must_use]
    pub fn with_passive_requirement(mut self, requirement: Requirement) -> Self {
        self.passive_requirements.push(requirement);
        self
    }
}

/// Saved skill state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SavedSkill {
    pub id: String,
    pub cooldown: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    id: String,
    name: String,
    use_action: Option<UseAction>,
    passive_effects: Vec<String>,
    passive_requirements: Vec<Requirement>,
}

impl Skill {
    pub fn new(data: &SkillData) -> Self {
        Self {
            id: data.id.clone(),
            name: data.name.clone(),
            use_action: data.use_action.as_ref().map(UseAction::from_data),
            passive_effects: data.passive_effects.clone(),
            passive_requirements: data.passive_requirements.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn use_action(&self) -> Option<&UseAction> {
        self.use_action.as_ref()
    }

    pub fn use_action_mut(&mut self) -> Option<&mut UseAction> {
        self.use_action.as_mut()
    }

    pub fn passive_effects(&self) -> &[String] {
        &self.passive_effects
    }

    pub fn passive_requirements(&self) -> &[Requirement] {
        &self.passive_requirements
    }

    pub fn update(&mut self, delta: i64) {
        if let Some(action) = self.use_action.as_mut() {
            action.update(delta);
        }
    }

    pub fn data(&self) -> SavedSkill {
        SavedSkill {
            id: self.id.clone(),
            cooldown: self.use_action.as_ref().map_or(0, UseAction::cooldown),
        }
    }
}
