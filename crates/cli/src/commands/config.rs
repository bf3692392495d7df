//! Config command handler.

use clap::Args;
use ragpipe_core::config::AppConfig;

/// Show the effective configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

impl ConfigCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<bool> {
        tracing::info!("Executing config command");

        if self.json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            print!("{}", serde_yaml::to_string(config)?);
        }

        Ok(true)
    }
}
