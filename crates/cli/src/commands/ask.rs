//! Ask command handler.
//!
//! Sends one question (optionally after earlier messages) through the pipe.

use anyhow::Context;
use clap::Args;
use ragpipe_core::config::AppConfig;
use ragpipe_pipe::{ChatMessage, ChatTurn, InvocationContext, PipeOutcome, RagPipe};
use std::path::{Path, PathBuf};

use super::EventSink;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// JSON file with earlier messages: [{"role": "...", "content": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Chat identifier attached to logs
    #[arg(long)]
    pub chat_id: Option<String>,

    /// Print status events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,

    /// Output outcome and messages as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<bool> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let mut turn = self.build_turn()?;
        let pipe = RagPipe::new(config.pipe.clone())?;

        let mut context = InvocationContext::new();
        if let Some(ref chat_id) = self.chat_id {
            context = context.with_chat_id(chat_id.clone());
        }

        let sink = EventSink::new(self.events);
        let outcome = pipe.pipe(&mut turn, Some(sink.emitter()), &context).await;
        sink.finish().await;

        if self.json {
            let output = serde_json::json!({
                "outcome": outcome,
                "messages": turn.messages,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            match &outcome {
                PipeOutcome::Answer(answer) => println!("{}", answer),
                PipeOutcome::Error { error } => eprintln!("{}", error),
            }
        }

        Ok(!outcome.is_error())
    }

    /// Earlier messages from `--history`, then the question.
    fn build_turn(&self) -> anyhow::Result<ChatTurn> {
        let mut messages = match &self.history {
            Some(path) => read_history(path)?,
            None => Vec::new(),
        };
        messages.push(ChatMessage::user(self.question.join(" ")));
        Ok(ChatTurn::new(messages))
    }
}

fn read_history(path: &Path) -> anyhow::Result<Vec<ChatMessage>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {:?}", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse history file {:?}", path))
}
