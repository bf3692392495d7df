//! Chat-host pipe for the intelligent RAG server.
//!
//! A `RagPipe` takes one chat turn, asks the RAG server about the latest
//! message, appends the answer (and optionally the reasoning trace) to the
//! conversation, and reports progress through a throttled status channel.
//!
//! # Example
//! ```no_run
//! use ragpipe_core::PipeConfig;
//! use ragpipe_pipe::{ChatMessage, ChatTurn, InvocationContext, RagPipe};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipe = RagPipe::new(PipeConfig::default())?;
//! let mut turn = ChatTurn::new(vec![ChatMessage::user("What changed in v2?")]);
//! let outcome = pipe.pipe(&mut turn, None, &InvocationContext::new()).await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod events;
pub mod notifier;
pub mod pipe;
pub mod render;

pub use chat::{build_context, ChatMessage, ChatTurn, Role};
pub use events::{ChannelEmitter, EventEmitter, PipeEvent, StatusLevel, StatusState, StatusUpdate};
pub use notifier::StatusNotifier;
pub use pipe::{InvocationContext, PipeMetadata, PipeOutcome, RagPipe, NO_MESSAGES};
