//! Started conversations. Dialog tree content lives outside the engine.

use crate::registry::Identity;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    id: String,
    target: Option<Identity>,
    finished: bool,
}

impl Dialog {
    pub fn new(id: impl Into<String>, target: Option<Identity>) -> Self {
        Self {
            id: id.into(),
            target,
            finished: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> Option<&Identity> {
        self.target.as_ref()
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Whether the dialog should be dropped on the next tick.
    pub fn is_stale(&self) -> bool {
        self.finished || self.target.is_none()
    }
}
