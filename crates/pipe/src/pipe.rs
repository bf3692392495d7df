//! The RAG pipe: one chat turn in, one server query, answer written back.

use crate::chat::{build_context, ChatMessage, ChatTurn};
use crate::events::{EventEmitter, StatusLevel};
use crate::notifier::StatusNotifier;
use crate::render::apply_response;
use ragpipe_client::{create_client, QueryRequest, RagClient};
use ragpipe_core::{AppResult, PipeConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

/// Text used when a turn carries no messages.
pub const NO_MESSAGES: &str = "No messages found in the request body";

/// Prefix of every query failure reported to the host.
pub const QUERY_ERROR_PREFIX: &str = "Error during RAG query";

/// Identity the pipe registers with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

impl Default for PipeMetadata {
    fn default() -> Self {
        Self {
            kind: "pipe".to_string(),
            id: "intelligent_rag_pipe".to_string(),
            name: "Intelligent RAG Pipe".to_string(),
        }
    }
}

/// Per-invocation details passed explicitly by the host.
///
/// `user` is accepted for host compatibility and not interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationContext {
    pub chat_id: Option<String>,
    pub message_id: Option<String>,
    pub user: Option<Value>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }
}

/// What the pipe hands back to the host.
///
/// Serializes as the bare answer string or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipeOutcome {
    Answer(String),
    Error { error: String },
}

impl PipeOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Answer(answer) => Some(answer),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Answer(_) => None,
            Self::Error { error } => Some(error),
        }
    }
}

/// Adapter between a chat host and the intelligent RAG server.
pub struct RagPipe {
    metadata: PipeMetadata,
    config: PipeConfig,
    client: Arc<dyn RagClient>,
    notifier: StatusNotifier,
}

impl RagPipe {
    /// Create a pipe talking HTTP to `config.server_url`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the configuration is out of range or
    /// the server URL is unusable.
    pub fn new(config: PipeConfig) -> AppResult<Self> {
        config.validate()?;
        let client = create_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a pipe over an existing client.
    pub fn with_client(config: PipeConfig, client: Arc<dyn RagClient>) -> Self {
        let notifier = StatusNotifier::from_config(&config);
        Self {
            metadata: PipeMetadata::default(),
            config,
            client,
            notifier,
        }
    }

    pub fn metadata(&self) -> &PipeMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &PipeConfig {
        &self.config
    }

    /// Address queries are sent to.
    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Answer the last message of `turn`.
    ///
    /// New messages are appended to `turn.messages`. Failures never escape:
    /// they are reported through `emitter` and returned as
    /// `PipeOutcome::Error`.
    pub async fn pipe(
        &self,
        turn: &mut ChatTurn,
        emitter: Option<&dyn EventEmitter>,
        context: &InvocationContext,
    ) -> PipeOutcome {
        let span = tracing::info_span!(
            "rag_pipe",
            chat_id = context.chat_id.as_deref().unwrap_or("-"),
            message_id = context.message_id.as_deref().unwrap_or("-"),
            flavor = %self.config.flavor,
        );
        self.run(turn, emitter).instrument(span).await
    }

    async fn run(&self, turn: &mut ChatTurn, emitter: Option<&dyn EventEmitter>) -> PipeOutcome {
        let flavor = self.config.flavor;
        self.notifier
            .notify(emitter, StatusLevel::Info, flavor.start_message(), false)
            .await;

        let Some(request) = self.build_request(&turn.messages) else {
            tracing::warn!("{}", NO_MESSAGES);
            self.notifier
                .notify(emitter, StatusLevel::Error, NO_MESSAGES, true)
                .await;
            turn.messages.push(ChatMessage::assistant(NO_MESSAGES));
            return PipeOutcome::error(NO_MESSAGES);
        };

        tracing::debug!(
            history = turn.messages.len() - 1,
            has_context = matches!(request.context, Some(Some(_))),
            "Built query"
        );

        if let Some(message) = flavor.dispatch_message() {
            self.notifier
                .notify(emitter, StatusLevel::Info, message, false)
                .await;
        }

        match self.client.query(&request).await {
            Ok(response) => {
                let answer = apply_response(flavor, response, &mut turn.messages);
                self.notifier
                    .notify(emitter, StatusLevel::Info, flavor.complete_message(), true)
                    .await;
                tracing::info!("Query answered");
                PipeOutcome::Answer(answer)
            }
            Err(e) => {
                let message = format!("{}: {}", QUERY_ERROR_PREFIX, e);
                tracing::error!("{}", message);
                self.notifier
                    .notify(emitter, StatusLevel::Error, &message, true)
                    .await;
                PipeOutcome::error(message)
            }
        }
    }

    /// Build the server query for `messages`, or `None` if there is nothing
    /// to ask.
    pub fn build_request(&self, messages: &[ChatMessage]) -> Option<QueryRequest> {
        let question = messages.last()?;
        let request = QueryRequest::new(
            self.config.project_id.clone(),
            question.content.clone(),
            self.config.thinking_depth,
        );

        if self.config.flavor.sends_context() {
            Some(request.with_context(build_context(messages)))
        } else {
            Some(request)
        }
    }
}
