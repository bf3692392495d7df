//! Configuration management for the RAG pipe.
//!
//! Configuration is resolved in layers, later layers winning:
//! - Built-in defaults
//! - Config file (`RAGPIPE_CONFIG`, else `.ragpipe/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The resolved `PipeConfig` is handed to the pipe once and never re-read
//! during an invocation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Default base address of the RAG server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Default project scope for queries.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Accepted range for `thinking_depth`.
pub const THINKING_DEPTH_RANGE: std::ops::RangeInclusive<u8> = 1..=4;

/// How the pipe writes the server's answer back into the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseFlavor {
    /// Reasoning goes into a separate system message ahead of the answer.
    #[default]
    SystemTrace,

    /// Reasoning is appended to the answer as a fenced JSON block, and prior
    /// turns are forwarded as query context.
    InlineReasoning,
}

impl ResponseFlavor {
    /// Parse a flavor from its config/CLI spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "system-trace" | "system" | "a" => Some(Self::SystemTrace),
            "inline-reasoning" | "inline" | "b" => Some(Self::InlineReasoning),
            _ => None,
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemTrace => "system-trace",
            Self::InlineReasoning => "inline-reasoning",
        }
    }

    /// Whether prior turns are forwarded as `context`.
    pub fn sends_context(&self) -> bool {
        matches!(self, Self::InlineReasoning)
    }

    /// Non-terminal status shown when an invocation starts.
    pub fn start_message(&self) -> &'static str {
        match self {
            Self::SystemTrace => "Querying intelligent RAG server...",
            Self::InlineReasoning => "Calling Intelligent RAG Server...",
        }
    }

    /// Non-terminal status shown right before dispatch, if any.
    pub fn dispatch_message(&self) -> Option<&'static str> {
        match self {
            Self::SystemTrace => None,
            Self::InlineReasoning => Some("Processing query..."),
        }
    }

    /// Terminal status shown on success.
    pub fn complete_message(&self) -> &'static str {
        match self {
            Self::SystemTrace => "Complete",
            Self::InlineReasoning => "Response generated successfully",
        }
    }
}

impl std::fmt::Display for ResponseFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of one pipe instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Base URL of the intelligent RAG server
    pub server_url: String,

    /// Project ID to query against
    pub project_id: String,

    /// Depth of thinking (1-4)
    pub thinking_depth: u8,

    /// Minimum seconds between non-terminal status emissions
    pub emit_interval: f64,

    /// Master toggle for status emissions
    pub enable_status_indicator: bool,

    /// Overall request timeout in seconds; `None` waits indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<f64>,

    /// Response formatting flavor
    pub flavor: ResponseFlavor,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            thinking_depth: 2,
            emit_interval: 2.0,
            enable_status_indicator: true,
            request_timeout: None,
            flavor: ResponseFlavor::default(),
        }
    }
}

impl PipeConfig {
    /// Minimum spacing between non-terminal status events.
    ///
    /// Intervals too large for a `Duration` saturate to `Duration::MAX`.
    pub fn emit_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.emit_interval).unwrap_or(Duration::MAX)
    }

    /// Request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Check value ranges.
    pub fn validate(&self) -> AppResult<()> {
        if self.server_url.trim().is_empty() {
            return Err(AppError::Config("server_url must not be empty".to_string()));
        }

        if !THINKING_DEPTH_RANGE.contains(&self.thinking_depth) {
            return Err(AppError::Config(format!(
                "thinking_depth must be between {} and {}, got {}",
                THINKING_DEPTH_RANGE.start(),
                THINKING_DEPTH_RANGE.end(),
                self.thinking_depth
            )));
        }

        if !self.emit_interval.is_finite() || self.emit_interval < 0.0 {
            return Err(AppError::Config(format!(
                "emit_interval must be a non-negative number of seconds, got {}",
                self.emit_interval
            )));
        }

        if let Some(timeout) = self.request_timeout {
            if !timeout.is_finite() || timeout <= 0.0 {
                return Err(AppError::Config(format!(
                    "request_timeout must be a positive number of seconds, got {}",
                    timeout
                )));
            }
        }

        Ok(())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the settings were read from, if any
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Pipe settings
    pub pipe: PipeConfig,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    pipe: Option<PipeFileConfig>,
    logging: Option<LoggingConfig>,
}

/// Pipe section of the config file; every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PipeFileConfig {
    server_url: Option<String>,
    project_id: Option<String>,
    thinking_depth: Option<u8>,
    emit_interval: Option<f64>,
    enable_status_indicator: Option<bool>,
    request_timeout: Option<f64>,
    flavor: Option<ResponseFlavor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
    pub server_url: Option<String>,
    pub project_id: Option<String>,
    pub thinking_depth: Option<u8>,
    pub emit_interval: Option<f64>,
    pub disable_status: bool,
    pub flavor: Option<ResponseFlavor>,
    pub request_timeout: Option<f64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            pipe: PipeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `RAGPIPE_CONFIG`: Path to config file
    /// - `RAGPIPE_SERVER_URL`, `RAGPIPE_PROJECT_ID`, `RAGPIPE_THINKING_DEPTH`
    /// - `RAGPIPE_EMIT_INTERVAL`, `RAGPIPE_STATUS_INDICATOR`
    /// - `RAGPIPE_FLAVOR`, `RAGPIPE_TIMEOUT`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use ragpipe_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Server: {}", config.pipe.server_url);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, |key| std::env::var(key).ok())
    }

    /// Load configuration, reading variables through `env`.
    ///
    /// An explicit `config_file` takes precedence over `RAGPIPE_CONFIG`.
    pub fn load_with<F>(config_file: Option<PathBuf>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = config_file.or_else(|| env("RAGPIPE_CONFIG").map(PathBuf::from));
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = PathBuf::from(".ragpipe/config.yaml");
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        config.apply_env(env)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        tracing::debug!("Reading config file {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut result = self.merge_yaml_str(&contents).map_err(|e| match e {
            AppError::Serialization(msg) => {
                AppError::Config(format!("Failed to parse config file {:?}: {}", path, msg))
            }
            other => other,
        })?;
        result.config_file = Some(path.to_path_buf());
        Ok(result)
    }

    /// Merge YAML configuration text into this config.
    pub fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(pipe) = config_file.pipe {
            let target = &mut result.pipe;
            if let Some(v) = pipe.server_url {
                target.server_url = v;
            }
            if let Some(v) = pipe.project_id {
                target.project_id = v;
            }
            if let Some(v) = pipe.thinking_depth {
                target.thinking_depth = v;
            }
            if let Some(v) = pipe.emit_interval {
                target.emit_interval = v;
            }
            if let Some(v) = pipe.enable_status_indicator {
                target.enable_status_indicator = v;
            }
            if pipe.request_timeout.is_some() {
                target.request_timeout = pipe.request_timeout;
            }
            if let Some(v) = pipe.flavor {
                target.flavor = v;
            }
        }

        Ok(result)
    }

    /// Apply environment variables on top of this config.
    pub fn apply_env<F>(mut self, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("RAGPIPE_SERVER_URL") {
            self.pipe.server_url = url;
        }

        if let Some(project) = env("RAGPIPE_PROJECT_ID") {
            self.pipe.project_id = project;
        }

        if let Some(depth) = env("RAGPIPE_THINKING_DEPTH") {
            self.pipe.thinking_depth = parse_env("RAGPIPE_THINKING_DEPTH", &depth)?;
        }

        if let Some(interval) = env("RAGPIPE_EMIT_INTERVAL") {
            self.pipe.emit_interval = parse_env("RAGPIPE_EMIT_INTERVAL", &interval)?;
        }

        if let Some(enabled) = env("RAGPIPE_STATUS_INDICATOR") {
            self.pipe.enable_status_indicator = parse_bool("RAGPIPE_STATUS_INDICATOR", &enabled)?;
        }

        if let Some(flavor) = env("RAGPIPE_FLAVOR") {
            self.pipe.flavor = ResponseFlavor::parse(&flavor).ok_or_else(|| {
                AppError::Config(format!("Unknown flavor in RAGPIPE_FLAVOR: {}", flavor))
            })?;
        }

        if let Some(timeout) = env("RAGPIPE_TIMEOUT") {
            self.pipe.request_timeout = Some(parse_env("RAGPIPE_TIMEOUT", &timeout)?);
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(self)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the file and environment.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        // --log-level beats --verbose, which beats RUST_LOG and the file
        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        } else if overrides.verbose {
            self.log_level = Some("debug".to_string());
        }

        if overrides.verbose {
            self.verbose = true;
        }

        if overrides.no_color {
            self.no_color = true;
        }

        if let Some(url) = overrides.server_url {
            self.pipe.server_url = url;
        }

        if let Some(project) = overrides.project_id {
            self.pipe.project_id = project;
        }

        if let Some(depth) = overrides.thinking_depth {
            self.pipe.thinking_depth = depth;
        }

        if let Some(interval) = overrides.emit_interval {
            self.pipe.emit_interval = interval;
        }

        if overrides.disable_status {
            self.pipe.enable_status_indicator = false;
        }

        if let Some(flavor) = overrides.flavor {
            self.pipe.flavor = flavor;
        }

        if overrides.request_timeout.is_some() {
            self.pipe.request_timeout = overrides.request_timeout;
        }

        self
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> AppResult<()> {
        self.pipe.validate()
    }
}

fn parse_env<T>(key: &str, value: &str) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

fn parse_bool(key: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "Invalid value for {}: {} (expected true/false)",
            key, value
        ))),
    }
}
