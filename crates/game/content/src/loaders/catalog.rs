//! Definition catalogs.
//!
//! Every catalog file has the same shape, a list of core definition records:
//!
//! ```ron
//! (
//!     entries: [
//!         (id: "poison", duration: 5000, over_time_modifiers: [health(min: -2, max: -1)]),
//!     ],
//! )
//! ```

use std::collections::HashSet;
use std::path::Path;

use realm_core::{CharacterData, EffectData, ItemData, ObjectData, QuestData, SkillData};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_ron};

/// Catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog<T> {
    pub entries: Vec<T>,
}

/// Definition record addressed by a content ID.
pub trait Definition: serde::de::DeserializeOwned {
    /// Label used in diagnostics.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Definition for EffectData {
    const KIND: &'static str = "effect";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Definition for SkillData {
    const KIND: &'static str = "skill";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Definition for ItemData {
    const KIND: &'static str = "item";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Definition for CharacterData {
    const KIND: &'static str = "character";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Definition for ObjectData {
    const KIND: &'static str = "object";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Definition for QuestData {
    const KIND: &'static str = "quest";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Loader for definition catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load every definition in a catalog file.
    ///
    /// Entries with an empty ID are rejected. Duplicate IDs are kept (the later
    /// entry wins once inserted into a snapshot) and reported at `warn`.
    pub fn load<T: Definition>(path: &Path) -> LoadResult<Vec<T>> {
        let catalog: Catalog<T> = read_ron(path, T::KIND)?;

        let mut seen = HashSet::new();
        for entry in &catalog.entries {
            if entry.id().is_empty() {
                anyhow::bail!("{} catalog {} has an entry without id", T::KIND, path.display());
            }
            if !seen.insert(entry.id()) {
                tracing::warn!(kind = T::KIND, id = entry.id(), "duplicate definition");
            }
        }

        tracing::debug!(
            kind = T::KIND,
            count = catalog.entries.len(),
            path = %path.display(),
            "catalog loaded"
        );
        Ok(catalog.entries)
    }
}
