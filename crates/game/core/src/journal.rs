//! Quest journal.
//!
//! Quest objective content lives outside the engine. A quest here is started by a
//! quest modifier and completes once its owner carries the completion flag.

use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuestData {
    pub id: String,
    pub name: String,
    pub completion_flag: Option<String>,
}

impl QuestData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn completed_by(mut self, flag: impl Into<String>) -> Self {
        self.completion_flag = Some(flag.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SavedQuest {
    pub id: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quest {
    id: String,
    name: String,
    completion_flag: Option<String>,
    completed: bool,
}

impl Quest {
    pub fn new(data: &QuestData) -> Self {
        Self {
            id: data.id.clone(),
            name: data.name.clone(),
            completion_flag: data.completion_flag.clone(),
            completed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn completed(&self) -> bool {
        self.completed
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Journal {
    quests: BTreeMap<String, Quest>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a quest. Returns false if it was already in the journal.
    pub fn add_quest(&mut self, quest: Quest) -> bool {
        if self.quests.contains_key(&quest.id) {
            return false;
        }
        self.quests.insert(quest.id.clone(), quest);
        true
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.get(id)
    }

    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Completes every open quest whose completion flag is set.
    pub fn update(&mut self, flags: &HashSet<String>) {
        for quest in self.quests.values_mut().filter(|q| !q.completed) {
            if quest
                .completion_flag
                .as_ref()
                .is_some_and(|flag| flags.contains(flag))
            {
                quest.completed = true;
                tracing::debug!(quest = %quest.id, "quest completed");
            }
        }
    }

    pub fn data(&self) -> Vec<SavedQuest> {
        self.quests
            .values()
            .map(|q| SavedQuest {
                id: q.id.clone(),
                completed: q.completed,
            })
            .collect()
    }

    /// Restores saved quests. Definitions come from `lookup`; unknown IDs are skipped.
    pub fn apply(&mut self, saved: &[SavedQuest], lookup: impl Fn(&str) -> Option<QuestData>) {
        self.quests.clear();
        for entry in saved {
            let Some(data) = lookup(&entry.id) else {
                tracing::warn!(quest = %entry.id, "quest definition not found");
                continue;
            };
            let mut quest = Quest::new(&data);
            quest.completed = entry.completed;
            self.quests.insert(quest.id.clone(), quest);
        }
    }
}
