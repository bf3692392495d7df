//! RAG client factory.
//!
//! Builds the client a pipe talks to from its configuration.

use crate::client::RagClient;
use crate::providers::HttpRagClient;
use ragpipe_core::{AppError, AppResult, PipeConfig};
use std::sync::Arc;

/// Create a RAG client for the configured server.
///
/// # Errors
/// Returns `AppError::Config` if the server URL is not an absolute
/// `http`/`https` URL or the HTTP client cannot be built.
pub fn create_client(config: &PipeConfig) -> AppResult<Arc<dyn RagClient>> {
    let url = reqwest::Url::parse(config.server_url.trim()).map_err(|e| {
        AppError::Config(format!("Invalid server_url {:?}: {}", config.server_url, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::Config(format!(
                "Unsupported server_url scheme: {}. Supported: http, https",
                other
            )))
        }
    }

    let client = HttpRagClient::with_timeout(config.server_url.trim(), config.request_timeout())?;
    tracing::debug!(endpoint = client.endpoint(), "Created RAG client");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_default_client() {
        let client = create_client(&PipeConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/query");
    }

    #[test]
    fn test_rejects_relative_url() {
        let config = PipeConfig {
            server_url: "localhost:3000/rag".to_string(),
            ..Default::default()
        };
        match create_client(&config) {
            Err(AppError::Config(_)) => {}
            Err(other) => panic!("Expected config error, got {other}"),
            Ok(_) => panic!("Expected error for relative URL"),
        }
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let config = PipeConfig {
            server_url: "ftp://rag.local".to_string(),
            ..Default::default()
        };
        match create_client(&config) {
            Err(err) => assert!(err.to_string().contains("Unsupported server_url scheme")),
            Ok(_) => panic!("Expected error for ftp scheme"),
        }
    }
}
