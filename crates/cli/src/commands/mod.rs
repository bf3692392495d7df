//! Command handlers for the ragpipe CLI.
//!
//! Each command returns `Ok(true)` on success and `Ok(false)` when the pipe
//! reported an error outcome.

pub mod ask;
pub mod config;
pub mod info;
pub mod turn;

pub use ask::AskCommand;
pub use config::ConfigCommand;
pub use info::InfoCommand;
pub use turn::TurnCommand;

use ragpipe_core::AppResult;
use ragpipe_pipe::{ChannelEmitter, EventEmitter, PipeEvent};
use tokio::task::JoinHandle;

/// Where status events from the pipe end up.
pub enum EventSink {
    /// Events logged through tracing
    Log(LogEmitter),

    /// Events printed to stderr as JSON lines
    Print {
        emitter: ChannelEmitter,
        printer: JoinHandle<()>,
    },
}

impl EventSink {
    /// Pick the sink for the `--events` flag.
    pub fn new(print_events: bool) -> Self {
        if !print_events {
            return Self::Log(LogEmitter);
        }

        let (emitter, mut receiver) = ChannelEmitter::channel(16);
        let printer = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => eprintln!("{}", line),
                    Err(e) => tracing::warn!("Failed to encode status event: {}", e),
                }
            }
        });
        Self::Print { emitter, printer }
    }

    pub fn emitter(&self) -> &dyn EventEmitter {
        match self {
            Self::Log(emitter) => emitter,
            Self::Print { emitter, .. } => emitter,
        }
    }

    /// Flush pending events before output is written.
    pub async fn finish(self) {
        if let Self::Print { emitter, printer } = self {
            drop(emitter);
            if let Err(e) = printer.await {
                tracing::warn!("Event printer stopped abnormally: {}", e);
            }
        }
    }
}

/// Emitter that routes status events into the log.
pub struct LogEmitter;

#[async_trait::async_trait]
impl EventEmitter for LogEmitter {
    async fn emit(&self, event: PipeEvent) -> AppResult<()> {
        let PipeEvent::Status(update) = event;
        if update.done {
            tracing::info!(severity = ?update.level, "{}", update.description);
        } else {
            tracing::debug!(severity = ?update.level, "{}", update.description);
        }
        Ok(())
    }
}
