//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! loading areas, spawning characters and stepping the simulation.
use tokio::sync::{mpsc, oneshot};

use realm_core::{AreaData, CharacterData, Identity};

use super::errors::{Result, RuntimeError};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Builds an area tree from a record and adds it to the world.
    pub async fn add_area(&self, data: AreaData) -> Result<()> {
        self.request(|reply| Command::AddArea { data, reply }).await?
    }

    /// Spawns a character into an area (top-level or nested) by area ID.
    pub async fn spawn(&self, area: impl Into<String>, character: CharacterData) -> Result<Identity> {
        let area = area.into();
        self.request(|reply| Command::Spawn {
            area,
            character,
            reply,
        })
        .await?
    }

    /// Query a saved snapshot of one area (read-only)
    pub async fn query_area(&self, area: impl Into<String>) -> Result<AreaData> {
        let area = area.into();
        self.request(|reply| Command::QueryArea { area, reply }).await?
    }

    /// IDs of the top-level areas.
    pub async fn area_ids(&self) -> Result<Vec<String>> {
        self.request(|reply| Command::AreaIds { reply }).await
    }

    /// Advance the simulation by `delta` milliseconds outside the timer.
    pub async fn step(&self, delta: i64) -> Result<()> {
        self.request(|reply| Command::Step { delta, reply }).await
    }

    /// Stop the worker loop. Later requests fail with a closed channel.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
