//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and content loading so clients can
//! bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("area {0} not found")]
    AreaNotFound(String),

    #[error("failed to load content: {0}")]
    Content(String),
}

impl RuntimeError {
    /// Wraps a loader error, keeping its whole context chain in the message.
    pub(crate) fn content(err: anyhow::Error) -> Self {
        Self::Content(format!("{err:#}"))
    }
}
