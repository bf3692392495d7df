//! Status events sent to the host UI and the sink abstraction.

use ragpipe_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Severity of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Error,
}

/// Progress state shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    InProgress,
    Complete,
}

/// Payload of a `status` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: StatusState,
    pub level: StatusLevel,
    pub description: String,
    pub done: bool,
}

impl StatusUpdate {
    pub fn new(level: StatusLevel, description: impl Into<String>, done: bool) -> Self {
        Self {
            status: if done {
                StatusState::Complete
            } else {
                StatusState::InProgress
            },
            level,
            description: description.into(),
            done,
        }
    }
}

/// Event pushed to the host, serialized as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum PipeEvent {
    Status(StatusUpdate),
}

impl PipeEvent {
    pub fn status(level: StatusLevel, description: impl Into<String>, done: bool) -> Self {
        Self::Status(StatusUpdate::new(level, description, done))
    }
}

/// Asynchronous sink for pipe events, supplied by the host.
#[async_trait::async_trait]
pub trait EventEmitter: Send + Sync {
    /// Deliver one event. Returns once the host has accepted it.
    async fn emit(&self, event: PipeEvent) -> AppResult<()>;
}

/// Emitter that forwards events into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    sender: mpsc::Sender<PipeEvent>,
}

impl ChannelEmitter {
    pub fn new(sender: mpsc::Sender<PipeEvent>) -> Self {
        Self { sender }
    }

    /// Create an emitter together with the receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PipeEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

#[async_trait::async_trait]
impl EventEmitter for ChannelEmitter {
    async fn emit(&self, event: PipeEvent) -> AppResult<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| AppError::Emitter("event channel closed".to_string()))
    }
}
