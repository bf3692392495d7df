//! RAG client abstraction and request/response types.
//!
//! This module defines the wire format of the intelligent RAG server's
//! `/api/query` endpoint and the trait every client implements.

use ragpipe_core::AppResult;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of a `POST /api/query` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    /// Project the query is scoped to
    #[serde(rename = "projectId")]
    pub project_id: String,

    /// The question, verbatim from the latest chat message
    pub query: String,

    /// Requested reasoning depth (1-4)
    #[serde(rename = "thinkingDepth")]
    pub thinking_depth: u8,

    /// Prior conversation. The outer `None` omits the key entirely,
    /// `Some(None)` sends an explicit `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Option<String>>,
}

impl QueryRequest {
    /// Create a query without a `context` field.
    pub fn new(project_id: impl Into<String>, query: impl Into<String>, thinking_depth: u8) -> Self {
        Self {
            project_id: project_id.into(),
            query: query.into(),
            thinking_depth,
            context: None,
        }
    }

    /// Attach the `context` field, sent as `null` when `context` is `None`.
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = Some(context);
        self
    }
}

/// Successful reply from the RAG server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResponse {
    /// The answer text
    pub answer: String,

    /// Free-form reasoning trace. `Some(Value::Null)` means the key was
    /// present with a null value; `None` means it was absent.
    #[serde(default, deserialize_with = "present")]
    pub log: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Trait for RAG server clients.
///
/// The pipe only depends on this trait, so hosts and tests can swap the
/// HTTP implementation for anything that answers a `QueryRequest`.
#[async_trait::async_trait]
pub trait RagClient: Send + Sync {
    /// Short client name for logs (e.g., "http").
    fn name(&self) -> &str;

    /// Address queries are sent to.
    fn endpoint(&self) -> &str;

    /// Send one query and wait for the reply.
    ///
    /// # Errors
    /// - `AppError::Transport` when the server cannot be reached
    /// - `AppError::Status` for any non-200 reply
    /// - `AppError::Protocol` when a 200 body is not a valid reply
    async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse>;
}
