//! Info command handler.
//!
//! Prints what a chat host would register for this pipe.

use clap::Args;
use ragpipe_core::config::AppConfig;
use ragpipe_pipe::RagPipe;

/// Show the pipe identity and endpoint
#[derive(Args, Debug)]
pub struct InfoCommand {}

impl InfoCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<bool> {
        tracing::info!("Executing info command");

        let pipe = RagPipe::new(config.pipe.clone())?;
        let meta = pipe.metadata();
        let output = serde_json::json!({
            "type": meta.kind,
            "id": meta.id,
            "name": meta.name,
            "endpoint": pipe.endpoint(),
            "flavor": pipe.config().flavor,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(true)
    }
}
