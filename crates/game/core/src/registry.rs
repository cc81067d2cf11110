//! Process-wide `(id, serial)` identity registry.
//!
//! Entities never hold pointers to unrelated entities. They keep an [`Identity`]
//! and resolve it here when they need the other side, so a despawned target simply
//! fails to resolve. The registry stores weak handles only; ownership stays with
//! whatever container holds the entity (usually an [`Area`](crate::area::Area)).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use strum::{AsRefStr, Display};

use crate::error::{ErrorSeverity, GameError};
use crate::sync::lock;
use crate::target::{SharedTarget, Target};

/// Stable reference to a simulation entity.
///
/// `id` names the content definition shared by every instance ("goblin"); `serial`
/// discriminates instances and never changes once assigned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    id: String,
    serial: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            serial: serial.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.serial)
    }
}

/// Kind of entity behind a registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Character,
    Object,
    Effect,
    Item,
}

/// Lookup failures. Callers treat both as "skip this step for now".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{0} is not registered")]
    NotFound(Identity),

    #[error("{0} is registered but has no target handle")]
    Unbound(Identity),
}

impl GameError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "REGISTRY_NOT_FOUND",
            Self::Unbound(_) => "REGISTRY_UNBOUND",
        }
    }
}

struct Entry {
    kind: EntityKind,
    handle: Option<Weak<std::sync::RwLock<dyn Target>>>,
}

#[derive(Default)]
struct RegistryState {
    next_serial: u64,
    entries: HashMap<Identity, Entry>,
}

impl RegistryState {
    fn fresh(&mut self, id: &str) -> Identity {
        loop {
            let candidate = Identity::new(id, self.next_serial.to_string());
            self.next_serial += 1;
            if !self.entries.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// Identity registry. One instance per simulation; tests build their own.
#[derive(Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves an identity for a new entity.
    ///
    /// A preferred serial (from saved state) is kept when that pair is free;
    /// otherwise the next counter value is assigned.
    pub fn register(&self, kind: EntityKind, id: &str, preferred: Option<&str>) -> Identity {
        let mut state = lock(&self.state);
        let identity = match preferred.filter(|s| !s.is_empty()) {
            Some(serial) if !state.entries.contains_key(&Identity::new(id, serial)) => {
                Identity::new(id, serial)
            }
            _ => state.fresh(id),
        };
        state
            .entries
            .insert(identity.clone(), Entry { kind, handle: None });
        tracing::trace!(%identity, kind = kind.as_ref(), "registered");
        identity
    }

    /// Attaches a target handle to a reserved identity.
    pub fn bind(&self, identity: &Identity, target: &SharedTarget) {
        let mut state = lock(&self.state);
        let handle = Some(Arc::downgrade(target));
        match state.entries.get_mut(identity) {
            Some(entry) => entry.handle = handle,
            None => {
                state.entries.insert(
                    identity.clone(),
                    Entry {
                        kind: EntityKind::Object,
                        handle,
                    },
                );
            }
        }
    }

    /// Resolves an identity to its live target handle.
    ///
    /// Entries whose target has been dropped are pruned and reported as not found.
    pub fn resolve(&self, identity: &Identity) -> Result<SharedTarget, ResolveError> {
        let mut state = lock(&self.state);
        let Some(entry) = state.entries.get(identity) else {
            return Err(ResolveError::NotFound(identity.clone()));
        };
        match &entry.handle {
            None => Err(ResolveError::Unbound(identity.clone())),
            Some(weak) => match weak.upgrade() {
                Some(target) => Ok(target),
                None => {
                    state.entries.remove(identity);
                    Err(ResolveError::NotFound(identity.clone()))
                }
            },
        }
    }

    pub fn kind(&self, identity: &Identity) -> Option<EntityKind> {
        lock(&self.state).entries.get(identity).map(|e| e.kind)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        lock(&self.state).entries.contains_key(identity)
    }

    pub fn unregister(&self, identity: &Identity) {
        lock(&self.state).entries.remove(identity);
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and restarts the serial counter.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.next_serial = 0;
        tracing::debug!("registry reset");
    }
}
