//! HTTP client for the intelligent RAG server.
//!
//! Sends `POST <server_url>/api/query` with a JSON body and expects
//! `{"answer": ..., "log"?: ...}` back on 200.

use crate::client::{QueryRequest, QueryResponse, RagClient};
use ragpipe_core::{AppError, AppResult};
use std::error::Error as StdError;
use std::time::Duration;

/// Path of the query endpoint, relative to the server URL.
pub const QUERY_PATH: &str = "/api/query";

/// RAG server client backed by reqwest.
pub struct HttpRagClient {
    /// Full URL of the query endpoint
    endpoint: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpRagClient {
    /// Create a client without a request timeout.
    pub fn new(server_url: &str) -> AppResult<Self> {
        Self::with_timeout(server_url, None)
    }

    /// Create a client; `timeout` bounds the whole request when set.
    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: query_endpoint(server_url),
            client,
        })
    }
}

/// Join the server URL and the query path, tolerating a trailing slash.
pub fn query_endpoint(server_url: &str) -> String {
    format!("{}{}", server_url.trim_end_matches('/'), QUERY_PATH)
}

#[async_trait::async_trait]
impl RagClient for HttpRagClient {
    fn name(&self) -> &str {
        "http"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse> {
        tracing::info!(endpoint = %self.endpoint, "Sending query to RAG server");
        tracing::debug!("Request: {:?}", request);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Transport(describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(describe_transport_error(&e)))?;

        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "RAG server returned an error status");
            return Err(AppError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: QueryResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::Protocol(format!("Failed to parse RAG server response: {}", e))
        })?;

        tracing::info!(
            answer_len = reply.answer.len(),
            has_log = reply.log.is_some(),
            "Received answer from RAG server"
        );
        tracing::debug!("Response: {:?}", reply);

        Ok(reply)
    }
}

/// reqwest's top-level message hides the cause; append the source chain.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
