//! Turn command handler.
//!
//! Feeds a host-format chat-turn body (`{"messages": [...], ...}`) through
//! the pipe and prints the outcome and resulting messages.

use anyhow::Context;
use clap::Args;
use ragpipe_core::config::AppConfig;
use ragpipe_pipe::{ChatTurn, InvocationContext, PipeOutcome, RagPipe};
use std::io::Read;
use std::path::PathBuf;

use super::EventSink;

/// Run a host chat-turn JSON body through the pipe
#[derive(Args, Debug)]
pub struct TurnCommand {
    /// Chat-turn JSON file ("-" or omitted reads stdin)
    pub file: Option<PathBuf>,

    /// Chat identifier attached to logs
    #[arg(long)]
    pub chat_id: Option<String>,

    /// Message identifier attached to logs
    #[arg(long)]
    pub message_id: Option<String>,

    /// Print status events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,
}

impl TurnCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<bool> {
        tracing::info!("Executing turn command");
        tracing::debug!("Turn command options: {:?}", self);

        let mut turn = parse_turn(&self.read_input()?)?;
        let pipe = RagPipe::new(config.pipe.clone())?;

        let mut context = InvocationContext::new();
        if let Some(ref chat_id) = self.chat_id {
            context = context.with_chat_id(chat_id.clone());
        }
        if let Some(ref message_id) = self.message_id {
            context = context.with_message_id(message_id.clone());
        }

        let sink = EventSink::new(self.events);
        let outcome = pipe.pipe(&mut turn, Some(sink.emitter()), &context).await;
        sink.finish().await;

        let output = render_output(&outcome, &turn);
        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(!outcome.is_error())
    }

    fn read_input(&self) -> anyhow::Result<String> {
        match &self.file {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read chat turn {:?}", path)),
            _ => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read chat turn from stdin")?;
                Ok(buf)
            }
        }
    }
}

fn parse_turn(input: &str) -> anyhow::Result<ChatTurn> {
    serde_json::from_str(input).context("Chat turn is not a valid JSON body")
}

/// `{outcome, messages}` as printed to stdout.
fn render_output(outcome: &PipeOutcome, turn: &ChatTurn) -> serde_json::Value {
    serde_json::json!({
        "outcome": outcome,
        "messages": turn.messages,
    })
}
