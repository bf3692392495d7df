//! ragpipe CLI
//!
//! Command-line host for the intelligent RAG pipe. Runs chat turns through
//! the pipe the same way a chat platform would, printing answers to stdout
//! and status events to stderr.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ConfigCommand, InfoCommand, TurnCommand};
use ragpipe_core::{config::AppConfig, logging, ConfigOverrides, ResponseFlavor};
use std::path::PathBuf;
use std::process::ExitCode;

/// ragpipe - ask an intelligent RAG server from the command line
#[derive(Parser, Debug)]
#[command(name = "ragpipe")]
#[command(about = "Chat-turn pipe for an intelligent RAG server", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "RAGPIPE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Base URL of the RAG server
    #[arg(short, long, global = true)]
    server_url: Option<String>,

    /// Project ID to query against
    #[arg(short, long, global = true)]
    project_id: Option<String>,

    /// Depth of thinking (1-4)
    #[arg(short = 'd', long, global = true)]
    thinking_depth: Option<u8>,

    /// Seconds between non-terminal status events
    #[arg(long, global = true)]
    emit_interval: Option<f64>,

    /// Disable status events
    #[arg(long, global = true)]
    no_status: bool,

    /// Response flavor (system-trace, inline-reasoning)
    #[arg(long, global = true, value_parser = parse_flavor)]
    flavor: Option<ResponseFlavor>,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long, global = true)]
    timeout: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Run a host chat-turn JSON body through the pipe
    Turn(TurnCommand),

    /// Show the effective configuration
    Config(ConfigCommand),

    /// Show the pipe identity and endpoint
    Info(InfoCommand),
}

fn parse_flavor(s: &str) -> Result<ResponseFlavor, String> {
    ResponseFlavor::parse(s)
        .ok_or_else(|| format!("unknown flavor '{}' (system-trace, inline-reasoning)", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // File and environment first, then CLI flags on top
    let config = AppConfig::load_with(cli.config.clone(), |key| std::env::var(key).ok())?;
    let config = config.with_overrides(ConfigOverrides {
        config_file: cli.config,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
        server_url: cli.server_url,
        project_id: cli.project_id,
        thinking_depth: cli.thinking_depth,
        emit_interval: cli.emit_interval,
        disable_status: cli.no_status,
        flavor: cli.flavor,
        request_timeout: cli.timeout,
    });

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;

    tracing::debug!("Server: {}", config.pipe.server_url);
    tracing::debug!("Project: {}", config.pipe.project_id);
    tracing::debug!("Flavor: {}", config.pipe.flavor);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Turn(_) => "turn",
        Commands::Config(_) => "config",
        Commands::Info(_) => "info",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Turn(cmd) => cmd.execute(&config).await,
        Commands::Config(cmd) => cmd.execute(&config),
        Commands::Info(cmd) => cmd.execute(&config),
    };

    match result {
        Ok(true) => {
            tracing::debug!("Command completed successfully");
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            tracing::error!("Command failed: {:#}", e);
            Err(e)
        }
    }
}
